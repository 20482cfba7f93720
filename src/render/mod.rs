pub mod filename;
pub mod grid;
pub mod table;
pub mod xlsx;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Longest remark kept on a sheet.
pub const MAX_REMARKS_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum ResultStatus {
    #[default]
    Incomplete,
    Complete,
}

/// Instructor-entered values shown on the sheet. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetAnnotations {
    pub result_status: Option<ResultStatus>,
    pub remarks: Option<String>,
}

impl SheetAnnotations {
    pub fn new(result_status: Option<ResultStatus>, remarks: Option<&str>) -> Self {
        Self {
            result_status,
            remarks: remarks
                .map(|r| r.chars().take(MAX_REMARKS_CHARS).collect::<String>())
                .filter(|r| !r.trim().is_empty()),
        }
    }

    pub fn status_text(&self) -> String {
        match self.result_status {
            Some(status) => format!("Result Status: {}", status),
            None => "Result Status: (Completed or Not)".to_string(),
        }
    }

    pub fn remarks_text(&self) -> String {
        match &self.remarks {
            Some(remarks) => format!("Remarks:\n{}", remarks),
            None => "Remarks:".to_string(),
        }
    }
}
