use super::keyed::{array_of, as_id, as_number, as_text, field};
use super::{AssessmentId, OutcomeIndex};
use crate::types::Student;
use serde_json::Value;
use std::collections::HashMap;

/// Builds every student in the payload, valid or not. Score vectors are
/// looked up through assessment ids, so backend ordering of `scores` does
/// not matter.
pub fn collect_students(students: Option<&Value>, index: &OutcomeIndex) -> Vec<Student> {
    array_of(students)
        .filter(|s| s.is_object())
        .map(|s| build_student(s, index))
        .collect()
}

fn build_student(raw: &Value, index: &OutcomeIndex) -> Student {
    let raw_scores = score_lookup(raw.get("scores"));

    let scores = index
        .iter()
        .map(|(co_name, ids)| (co_name.to_string(), align_scores(ids, &raw_scores)))
        .collect();

    let remarks = field(raw, &["remarks"])
        .map(|v| as_text(Some(v)))
        .filter(|r| !r.is_empty());

    Student {
        id: as_text(field(raw, &["id_number", "student_id"])).trim().to_string(),
        name: as_text(field(raw, &["student_name", "name"])),
        remarks,
        scores,
    }
}

fn score_lookup(scores: Option<&Value>) -> HashMap<AssessmentId, Option<f64>> {
    let mut lookup = HashMap::new();
    for entry in array_of(scores) {
        let Some(id) = entry.get("assessment_id").and_then(as_id) else {
            continue;
        };
        let value = entry.get("value").and_then(as_number);
        lookup.insert(id, value);
    }
    lookup
}

/// Always exactly `ids.len()` long.
pub fn align_scores(
    ids: &[Option<AssessmentId>],
    lookup: &HashMap<AssessmentId, Option<f64>>,
) -> Vec<Option<f64>> {
    ids.iter()
        .map(|id| id.and_then(|id| lookup.get(&id).copied().flatten()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_scores_keeps_length() {
        let ids = [Some(1), Some(2), None, Some(9)];
        let mut lookup = HashMap::new();
        lookup.insert(2, Some(7.0));
        lookup.insert(9, None);
        lookup.insert(100, Some(1.0));
        assert_eq!(
            align_scores(&ids, &lookup),
            vec![None, Some(7.0), None, None]
        );
    }
}
