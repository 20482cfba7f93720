//! The flat "display" payload: `{ classInfo, pos, students }` with
//! per-CO score arrays of `{ raw }` objects. Malformed POs, COs and
//! students are dropped one by one. Every classwork element keeps its
//! slot, since student scores line up with it by position.

use super::keyed::{array_of, as_number, as_text, field};
use super::{AssessmentId, OutcomeIndex};
use crate::types::{dedup_tags, ClassInfo, ClassworkItem, CourseOutcome, ProgramOutcome, Student};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct DisplayCo {
    name: String,
    #[serde(default)]
    classwork: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DisplayPo {
    name: String,
    #[serde(default)]
    cos: Vec<Value>,
}

/// Fields are kept loose: ids and names may arrive as numbers and score
/// maps may hold anything.
#[derive(Debug, Deserialize)]
struct DisplayStudent {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Value,
    #[serde(default)]
    remarks: Value,
    #[serde(default)]
    scores: Value,
}

/// True when `raw` looks like the display payload rather than the keyed one.
pub fn is_display_payload(raw: &Value) -> bool {
    raw.get("assessments").is_none() && raw.get("pos").is_some_and(Value::is_array)
}

fn each<T: DeserializeOwned>(value: Option<&Value>, what: &str) -> Vec<T> {
    array_of(value)
        .filter_map(|v| match serde_json::from_value::<T>(v.clone()) {
            Ok(t) => Some(t),
            Err(e) => {
                debug!("   Skipping malformed {}: {}", what, e);
                None
            }
        })
        .collect()
}

pub fn class_info(raw: &Value) -> ClassInfo {
    raw.get("classInfo")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

/// One item per source element, null or malformed ones included. Those
/// come back without a max score and are filtered later.
fn classwork_item(raw: &Value) -> ClassworkItem {
    if !raw.is_object() {
        debug!("   Keeping slot for malformed classwork item: {}", raw);
    }
    let blooms = dedup_tags(
        array_of(raw.get("blooms"))
            .map(|t| as_text(Some(t)))
            .filter(|t| !t.is_empty()),
    );
    let max_score = field(raw, &["maxScore", "max_score"])
        .and_then(as_number)
        .filter(|m| *m >= 0.0);
    ClassworkItem {
        name: as_text(raw.get("name")),
        blooms,
        max_score,
    }
}

pub fn program_outcomes(raw: &Value) -> (Vec<ProgramOutcome>, OutcomeIndex) {
    let mut index = OutcomeIndex::default();
    let pos: Vec<ProgramOutcome> = each::<DisplayPo>(raw.get("pos"), "program outcome")
        .into_iter()
        .map(|po| {
            let cos: Vec<CourseOutcome> = each::<DisplayCo>(
                Some(&Value::Array(po.cos)),
                "course outcome",
            )
            .into_iter()
            .map(|co| {
                let classwork: Vec<ClassworkItem> =
                    co.classwork.iter().map(classwork_item).collect();
                if index.ids(&co.name).is_none() {
                    let ids: Vec<Option<AssessmentId>> = vec![None; classwork.len()];
                    index.extend(&co.name, ids);
                }
                CourseOutcome {
                    name: co.name,
                    classwork,
                }
            })
            .collect();
            ProgramOutcome { name: po.name, cos }
        })
        .collect();
    (pos, index)
}

/// Score arrays are padded or cut to the length the index records for
/// each CO.
pub fn collect_students(raw: &Value, index: &OutcomeIndex) -> Vec<Student> {
    each::<DisplayStudent>(raw.get("students"), "student")
        .into_iter()
        .map(|s| {
            let scores = index
                .iter()
                .map(|(co_name, ids)| {
                    let given = s.scores.get(co_name).and_then(Value::as_array);
                    let aligned = (0..ids.len())
                        .map(|i| {
                            given
                                .and_then(|v| v.get(i))
                                .and_then(|sc| sc.get("raw"))
                                .and_then(as_number)
                        })
                        .collect();
                    (co_name.to_string(), aligned)
                })
                .collect();
            Student {
                id: as_text(Some(&s.id)).trim().to_string(),
                name: as_text(Some(&s.name)),
                remarks: Some(as_text(Some(&s.remarks))).filter(|r| !r.is_empty()),
                scores,
            }
        })
        .collect()
}
