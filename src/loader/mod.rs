pub mod display;
pub mod keyed;
pub mod students;

use self::keyed::{array_of, as_id, as_number, as_text, field, Keyed};
use crate::blooms;
use crate::error::SheetResult;
use crate::types::{AssessmentData, ClassInfo, ClassworkItem, CourseOutcome, ProgramOutcome};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub type AssessmentId = i64;

/// CO name -> backend assessment ids, one per classwork item and in the
/// same order as the CO's classwork.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeIndex {
    entries: Vec<(String, Vec<Option<AssessmentId>>)>,
    lookup: HashMap<String, usize>,
}

impl OutcomeIndex {
    fn extend(&mut self, co_name: &str, ids: impl IntoIterator<Item = Option<AssessmentId>>) {
        let slot = match self.lookup.get(co_name) {
            Some(&i) => i,
            None => {
                self.entries.push((co_name.to_string(), Vec::new()));
                self.lookup.insert(co_name.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[slot].1.extend(ids);
    }

    pub fn ids(&self, co_name: &str) -> Option<&[Option<AssessmentId>]> {
        self.lookup
            .get(co_name)
            .map(|&i| self.entries[i].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<AssessmentId>])> {
        self.entries.iter().map(|(n, ids)| (n.as_str(), ids.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedResponse {
    pub data: AssessmentData,
    pub index: OutcomeIndex,
    /// Students present in the payload but left off the sheet.
    pub excluded_students: usize,
}

pub fn load_response<P: AsRef<Path>>(path: P) -> SheetResult<NormalizedResponse> {
    let path = path.as_ref();
    debug!("   Loading assessment payload from: {}", path.display());
    let content = fs::read_to_string(path)?;
    parse_response(&content)
}

/// Only a syntactically broken document is an error; every shape problem
/// below the top level degrades to "empty".
pub fn parse_response(text: &str) -> SheetResult<NormalizedResponse> {
    let raw: Value = serde_json::from_str(text)?;
    Ok(normalize(&raw))
}

pub fn normalize(raw: &Value) -> NormalizedResponse {
    let (info, pos, index, all_students) = if display::is_display_payload(raw) {
        debug!("   Reading display-shaped payload");
        let (pos, index) = display::program_outcomes(raw);
        let all_students = display::collect_students(raw, &index);
        (display::class_info(raw), pos, index, all_students)
    } else {
        let (pos, index) = program_outcomes(raw.get("assessments"));
        let all_students = students::collect_students(raw.get("students"), &index);
        (class_info(raw.get("info")), pos, index, all_students)
    };
    let total = all_students.len();
    let students: Vec<_> = all_students
        .into_iter()
        .filter(|s| {
            let keep = s.is_reportable();
            if !keep {
                debug!("   Excluding student '{}' ({})", s.name.trim(), s.id);
            }
            keep
        })
        .collect();
    let excluded_students = total - students.len();

    info!(
        "Normalized payload: {} POs, {} COs, {} students ({} excluded)",
        pos.len(),
        index.len(),
        students.len(),
        excluded_students
    );

    NormalizedResponse {
        data: AssessmentData {
            info,
            pos,
            students,
        },
        index,
        excluded_students,
    }
}

pub fn class_info(info: Option<&Value>) -> ClassInfo {
    let Some(info) = info.filter(|v| v.is_object()) else {
        return ClassInfo::default();
    };
    let text = |names: &[&str]| as_text(field(info, names));

    ClassInfo {
        cacode: text(&["university_hierarchy", "cacode"]),
        program: text(&["program_name", "program"]),
        course: text(&["course_title", "course"]),
        ay_semester: text(&["academic_year_and_semester_type", "ay_semester", "aySemester"]),
        faculty: text(&["instructor_assigned", "faculty"]),
        department: text(&["department", "department_name"]),
        subject: text(&["subject", "course_code"]),
        year_section: text(&["year_section", "yearSection", "section"]),
    }
}

/// Classwork found under one CO name, concatenated over every place the
/// name occurs.
#[derive(Default)]
struct CoAccumulator {
    order: Vec<String>,
    items: HashMap<String, Vec<ClassworkItem>>,
}

impl CoAccumulator {
    fn push(&mut self, co_name: &str, item: ClassworkItem) {
        if !self.items.contains_key(co_name) {
            self.order.push(co_name.to_string());
        }
        self.items.entry(co_name.to_string()).or_default().push(item);
    }

    fn touch(&mut self, co_name: &str) {
        if !self.items.contains_key(co_name) {
            self.order.push(co_name.to_string());
            self.items.insert(co_name.to_string(), Vec::new());
        }
    }
}

fn program_outcomes(assessments: Option<&Value>) -> (Vec<ProgramOutcome>, OutcomeIndex) {
    let mut index = OutcomeIndex::default();
    let mut acc = CoAccumulator::default();
    // PO name -> CO names in first-seen order
    let mut po_order: Vec<(String, Vec<String>)> = Vec::new();

    for block in array_of(assessments) {
        for po_entry in array_of(block.get("program_outcomes")) {
            let Some(po) = Keyed::first(po_entry) else {
                continue;
            };
            let slot = match po_order.iter().position(|(n, _)| *n == po.key) {
                Some(i) => i,
                None => {
                    po_order.push((po.key.clone(), Vec::new()));
                    po_order.len() - 1
                }
            };

            for section in array_of(Some(po.value)) {
                for co_entry in array_of(section.get("course_outcomes")) {
                    let Some(co) = Keyed::first(co_entry) else {
                        continue;
                    };
                    for variant in course_outcome_variants(&co) {
                        let names = &mut po_order[slot].1;
                        if !names.contains(&variant.key) {
                            names.push(variant.key.clone());
                        }
                        acc.touch(&variant.key);
                        collect_bloom_groups(&variant, &mut acc, &mut index);
                    }
                }
            }
        }
    }

    let pos = po_order
        .into_iter()
        .map(|(name, co_names)| ProgramOutcome {
            name,
            cos: co_names
                .into_iter()
                .map(|co_name| CourseOutcome {
                    classwork: acc.items.get(&co_name).cloned().unwrap_or_default(),
                    name: co_name,
                })
                .collect(),
        })
        .collect();

    debug!("   Collected classwork for {} COs", acc.order.len());
    (pos, index)
}

/// A CO code entry holds either lecture/laboratory variants
/// (`[{ "CO1 (Lecture)": [...] }]`) or bloom holders directly. The direct
/// form is treated as a single variant named after the code.
fn course_outcome_variants<'a>(co: &Keyed<&'a Value>) -> Vec<Keyed<Vec<&'a Value>>> {
    let mut direct: Vec<&'a Value> = Vec::new();
    let mut variants: Vec<Keyed<Vec<&'a Value>>> = Vec::new();

    for entry in array_of(Some(co.value)) {
        if entry.get("blooms_classification").is_some() {
            direct.push(entry);
        } else if let Some(variant) = Keyed::first(entry) {
            variants.push(variant.map(|v| array_of(Some(v)).collect()));
        }
    }

    if !direct.is_empty() {
        variants.insert(
            0,
            Keyed {
                key: co.key.clone(),
                value: direct,
            },
        );
    }
    variants
}

fn collect_bloom_groups(
    variant: &Keyed<Vec<&Value>>,
    acc: &mut CoAccumulator,
    index: &mut OutcomeIndex,
) {
    for holder in &variant.value {
        for group_obj in array_of(holder.get("blooms_classification")) {
            for group in Keyed::all(group_obj) {
                let tags = blooms::parse_group_key(&group.key);
                let mut ids = Vec::new();
                for assessment in array_of(Some(group.value)) {
                    let (item, id) = classwork_item(assessment, &variant.key, &group.key, &tags);
                    acc.push(&variant.key, item);
                    ids.push(id);
                }
                index.extend(&variant.key, ids);
            }
        }
    }
    // A variant with no bloom groups still owns an (empty) id list.
    index.extend(&variant.key, std::iter::empty());
}

fn classwork_item(
    assessment: &Value,
    section_key: &str,
    group_key: &str,
    tags: &[String],
) -> (ClassworkItem, Option<AssessmentId>) {
    let title = as_text(field(assessment, &["assessment_title", "title", "name"]));
    let name = if title.trim().is_empty() {
        format!("{} {}", section_key, group_key).trim().to_string()
    } else {
        title
    };
    let max_score = field(assessment, &["assessment_highest_score", "max_score", "maxScore"])
        .and_then(as_number)
        .filter(|m| *m >= 0.0);
    let id = field(assessment, &["assessment_id", "id"]).and_then(as_id);

    (
        ClassworkItem {
            name,
            blooms: tags.to_vec(),
            max_score,
        },
        id,
    )
}
