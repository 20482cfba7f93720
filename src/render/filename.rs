use crate::types::ClassInfo;
use chrono::{NaiveDate, Utc};

fn sanitize(part: &str) -> String {
    part.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// `Dept_Subject_Section_COA.xlsx`, or a dated fallback when the class has
/// none of the three. The fallback is stamped with the UTC calendar date.
pub fn export_filename(info: &ClassInfo) -> String {
    export_filename_on(info, Utc::now().date_naive())
}

pub fn export_filename_on(info: &ClassInfo, today: NaiveDate) -> String {
    let parts: Vec<String> = [&info.department, &info.subject, &info.year_section]
        .into_iter()
        .map(|p| sanitize(p))
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        format!("Assessment_Result_Sheet_{}.xlsx", today.format("%Y-%m-%d"))
    } else {
        format!("{}_COA.xlsx", parts.join("_"))
    }
}
