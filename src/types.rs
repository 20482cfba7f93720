use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassInfo {
    /// Campus / college / department path.
    pub cacode: String,
    pub program: String,
    pub course: String,
    pub ay_semester: String,
    pub faculty: String,

    // Only consulted when naming an exported workbook.
    pub department: String,
    pub subject: String,
    pub year_section: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassworkItem {
    pub name: String,
    pub blooms: Vec<String>,
    pub max_score: Option<f64>,
}

impl ClassworkItem {
    pub fn new(name: impl Into<String>, blooms: &[&str], max_score: Option<f64>) -> Self {
        Self {
            name: name.into(),
            blooms: dedup_tags(blooms.iter().map(|b| b.to_string())),
            max_score,
        }
    }

    /// Negative maxima are never valid and count as missing.
    pub fn valid_max(&self) -> Option<f64> {
        self.max_score.filter(|m| m.is_finite() && *m >= 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseOutcome {
    pub name: String,
    pub classwork: Vec<ClassworkItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramOutcome {
    pub name: String,
    pub cos: Vec<CourseOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub remarks: Option<String>,
    /// CO name -> raw scores aligned with that CO's classwork.
    #[serde(default)]
    pub scores: HashMap<String, Vec<Option<f64>>>,
}

impl Student {
    pub fn scores_for(&self, co_name: &str) -> Option<&[Option<f64>]> {
        self.scores.get(co_name).map(Vec::as_slice)
    }

    /// A student appears on the sheet only with a 10-digit id, a non-blank
    /// name and no withdrawal remark.
    pub fn is_reportable(&self) -> bool {
        let id_ok = self.id.len() == 10 && self.id.bytes().all(|b| b.is_ascii_digit());
        let name_ok = !self.name.trim().is_empty();
        let no_remarks = self
            .remarks
            .as_deref()
            .map_or(true, |r| r.trim().is_empty());
        id_ok && name_ok && no_remarks
    }
}

/// The normalized assessment model handed to the layout engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentData {
    pub info: ClassInfo,
    pub pos: Vec<ProgramOutcome>,
    pub students: Vec<Student>,
}

pub(crate) fn dedup_tags<I: IntoIterator<Item = String>>(tags: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
