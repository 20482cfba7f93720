//! Pure derivation of the sheet layout from the normalized model.
//!
//! Everything here is recomputed from scratch on every call: merged display
//! groups, clustered classwork, header bands and thresholds. Both renderers
//! read the resulting [`DerivedLayout`] and never touch the model directly.

pub mod cluster;
pub mod merge;
pub mod thresholds;

use self::cluster::ClusteredOutcome;
use self::thresholds::{CoAttainment, OutcomeThreshold};
use crate::config::KpiSettings;
use crate::types::{AssessmentData, ClassInfo, Student};
use serde::Serialize;
use tracing::{debug, info};

/// Classwork item that survived the max-score filter, tagged with its
/// position in the CO's unfiltered classwork list.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedItem {
    pub source_index: usize,
    pub name: String,
    pub blooms: Vec<String>,
    pub max_score: f64,
}

/// A CO with only its valid classwork.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidCourseOutcome {
    pub name: String,
    pub classwork: Vec<IndexedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeGroup {
    pub name: String,
    pub cos: Vec<ClusteredOutcome>,
    pub thresholds: Vec<OutcomeThreshold>,
}

impl OutcomeGroup {
    pub fn width(&self) -> usize {
        self.cos.iter().map(ClusteredOutcome::width).sum()
    }

    pub fn outcomes(&self) -> impl Iterator<Item = (&ClusteredOutcome, &OutcomeThreshold)> {
        self.cos.iter().zip(self.thresholds.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedLayout {
    pub info: ClassInfo,
    pub kpi: KpiSettings,
    pub groups: Vec<OutcomeGroup>,
    pub students: Vec<Student>,
}

impl DerivedLayout {
    /// No outcome survived filtering; renderers show the empty state.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    /// At least one student passed the exclusion filter.
    pub fn has_students(&self) -> bool {
        !self.students.is_empty()
    }

    /// Columns right of the Name column, spacer included.
    pub fn dynamic_columns(&self) -> usize {
        1 + self.groups.iter().map(OutcomeGroup::width).sum::<usize>()
    }

    pub fn outcomes(&self) -> impl Iterator<Item = (&ClusteredOutcome, &OutcomeThreshold)> {
        self.groups.iter().flat_map(OutcomeGroup::outcomes)
    }

    pub fn attainment(&self) -> Vec<CoAttainment> {
        let n = self.student_count();
        self.outcomes()
            .map(|(co, threshold)| CoAttainment::new(&co.name, threshold, n))
            .collect()
    }
}

pub fn derive_layout(data: &AssessmentData, kpi: &KpiSettings) -> DerivedLayout {
    let students: Vec<Student> = data
        .students
        .iter()
        .filter(|s| s.is_reportable())
        .cloned()
        .collect();

    let mut counter = 0;
    let groups: Vec<OutcomeGroup> = merge::merge_outcomes(&data.pos)
        .into_iter()
        .map(|group| {
            let cos: Vec<ClusteredOutcome> = group
                .cos
                .iter()
                .map(|co| {
                    counter += 1;
                    let label = merge::format_co_label(&co.name, counter);
                    ClusteredOutcome::new(&co.name, label, &co.classwork)
                })
                .collect();
            let thresholds = cos
                .iter()
                .map(|co| OutcomeThreshold::compute(co, &students, kpi))
                .collect();
            debug!("   Group '{}': {} COs", group.name, cos.len());
            OutcomeGroup {
                name: group.name,
                cos,
                thresholds,
            }
        })
        .collect();

    info!(
        "Derived layout: {} groups, {} COs, {} students",
        groups.len(),
        counter,
        students.len()
    );

    DerivedLayout {
        info: data.info.clone(),
        kpi: *kpi,
        groups,
        students,
    }
}
