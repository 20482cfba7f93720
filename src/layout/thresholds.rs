use super::cluster::{ClusteredItem, ClusteredOutcome};
use crate::config::KpiSettings;
use crate::types::Student;
use serde::Serialize;

/// Minimum total a student needs on one CO.
pub fn pass_individual(total_max: f64, kpi: &KpiSettings) -> f64 {
    (total_max * kpi.individual_ratio()).round()
}

/// Number of students who must pass before the class attains the CO.
pub fn pass_class_count(student_count: usize, kpi: &KpiSettings) -> usize {
    (student_count as f64 * kpi.class_ratio()).ceil() as usize
}

/// Sum over surviving items only; null scores count as zero.
pub fn student_total(scores: &[Option<f64>], items: &[ClusteredItem]) -> f64 {
    items
        .iter()
        .map(|item| scores.get(item.source_index).copied().flatten().unwrap_or(0.0))
        .sum()
}

/// `"2 (66.67%)"`
pub fn count_label(count: usize, of: usize) -> String {
    let pct = if of == 0 {
        0.0
    } else {
        count as f64 / of as f64 * 100.0
    };
    format!("{} ({:.2}%)", count, pct)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StudentResult {
    pub total: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeThreshold {
    pub total_max: f64,
    pub pass_individual: f64,
    pub pass_class_count: usize,
    pub achieved: usize,
    pub class_attained: bool,
    /// One per student in display order. `None` when the student has no
    /// score vector for this CO.
    pub results: Vec<Option<StudentResult>>,
}

impl OutcomeThreshold {
    pub fn compute(outcome: &ClusteredOutcome, students: &[Student], kpi: &KpiSettings) -> Self {
        let total_max: f64 = outcome.items.iter().map(|i| i.max_score).sum();
        let pass_individual = pass_individual(total_max, kpi);
        let pass_class_count = pass_class_count(students.len(), kpi);

        let results: Vec<Option<StudentResult>> = students
            .iter()
            .map(|s| {
                s.scores_for(&outcome.name).map(|scores| {
                    let total = student_total(scores, &outcome.items);
                    StudentResult {
                        total,
                        passed: total >= pass_individual,
                    }
                })
            })
            .collect();

        // Missing vectors count as a total of zero.
        let achieved = results
            .iter()
            .filter(|r| match r {
                Some(r) => r.passed,
                None => 0.0 >= pass_individual,
            })
            .count();

        Self {
            total_max,
            pass_individual,
            pass_class_count,
            achieved,
            class_attained: achieved >= pass_class_count,
            results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoAttainment {
    pub outcome: String,
    pub achieved: usize,
    pub not_achieved: usize,
    pub achieved_label: String,
    pub not_achieved_label: String,
}

impl CoAttainment {
    pub fn new(outcome: &str, threshold: &OutcomeThreshold, student_count: usize) -> Self {
        let achieved = threshold.achieved.min(student_count);
        let not_achieved = student_count - achieved;
        Self {
            outcome: outcome.to_string(),
            achieved,
            not_achieved,
            achieved_label: count_label(achieved, student_count),
            not_achieved_label: count_label(not_achieved, student_count),
        }
    }
}
