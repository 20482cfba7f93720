use super::{IndexedItem, ValidCourseOutcome};
use crate::types::ProgramOutcome;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

static PO_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z])\s*-\s*").expect("PO code pattern is valid"));
static CO_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)CO(\d+)").expect("CO reference pattern is valid"));
static CO_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\((Lecture|Laboratory)\)").expect("CO unit pattern is valid")
});

/// Sort key used when a CO name carries no `CO<n>` reference.
const NO_CO_NUMBER: u32 = 9999;

/// A merged display group before clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedGroup {
    /// Sorted short labels joined with `", "`.
    pub name: String,
    pub labels: Vec<String>,
    pub cos: Vec<ValidCourseOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CourseUnit {
    Lecture,
    Laboratory,
    Unlabeled,
}

impl CourseUnit {
    pub fn of(co_name: &str) -> Self {
        if co_name.contains("(Lecture)") {
            Self::Lecture
        } else if co_name.contains("(Laboratory)") {
            Self::Laboratory
        } else {
            Self::Unlabeled
        }
    }
}

/// `"a - Engineering knowledge"` -> `"PO-a"`; anything else verbatim.
pub fn short_label(po_name: &str) -> String {
    match PO_CODE.captures(po_name) {
        Some(caps) => format!("PO-{}", &caps[1]),
        None => po_name.to_string(),
    }
}

/// Distinct CO numbers in order of appearance.
pub fn co_numbers(co_name: &str) -> Vec<u32> {
    let mut nums: Vec<u32> = Vec::new();
    for caps in CO_REF.captures_iter(co_name) {
        let n = caps[1].parse().unwrap_or(NO_CO_NUMBER);
        if !nums.contains(&n) {
            nums.push(n);
        }
    }
    if nums.is_empty() {
        nums.push(NO_CO_NUMBER);
    }
    nums
}

pub fn compare_course_outcomes(a: &str, b: &str) -> Ordering {
    let (a_nums, b_nums) = (co_numbers(a), co_numbers(b));
    a_nums
        .len()
        .cmp(&b_nums.len())
        .then_with(|| a_nums.cmp(&b_nums))
        .then_with(|| CourseUnit::of(a).cmp(&CourseUnit::of(b)))
}

/// Display order of merged groups: case folded first, so `PO-a` sorts
/// before `PO-B`. Lowercase wins an exact fold tie.
pub fn compare_group_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Header text for a CO cell: `"CO1 & CO2 (Lecture)"`, or `CO<counter>`
/// when the name has no CO reference.
pub fn format_co_label(co_name: &str, counter: usize) -> String {
    let refs: Vec<String> = CO_REF
        .find_iter(co_name)
        .map(|m| m.as_str().to_uppercase())
        .collect();
    let numbers = if refs.is_empty() {
        format!("CO{}", counter)
    } else {
        refs.join(" & ")
    };
    match CO_UNIT.captures(co_name) {
        Some(caps) => format!("{} ({})", numbers, &caps[1]),
        None => numbers,
    }
}

pub(crate) fn find(parent: &mut [usize], x: usize) -> usize {
    if parent[x] != x {
        let root = find(parent, parent[x]);
        parent[x] = root;
    }
    parent[x]
}

pub(crate) fn union(parent: &mut [usize], x: usize, y: usize) {
    let (px, py) = (find(parent, x), find(parent, y));
    if px != py {
        parent[px] = py;
    }
}

struct FilteredPo {
    name: String,
    cos: Vec<ValidCourseOutcome>,
}

/// Drops classwork without a max score, then COs and POs left empty.
fn prefilter(pos: &[ProgramOutcome]) -> Vec<FilteredPo> {
    pos.iter()
        .filter_map(|po| {
            let cos: Vec<ValidCourseOutcome> = po
                .cos
                .iter()
                .filter_map(|co| {
                    let classwork: Vec<IndexedItem> = co
                        .classwork
                        .iter()
                        .enumerate()
                        .filter_map(|(source_index, cw)| {
                            cw.valid_max().map(|max_score| IndexedItem {
                                source_index,
                                name: cw.name.clone(),
                                blooms: cw.blooms.clone(),
                                max_score,
                            })
                        })
                        .collect();
                    (!classwork.is_empty()).then(|| ValidCourseOutcome {
                        name: co.name.clone(),
                        classwork,
                    })
                })
                .collect();
            (!cos.is_empty()).then(|| FilteredPo {
                name: po.name.clone(),
                cos,
            })
        })
        .collect()
}

pub fn merge_outcomes(pos: &[ProgramOutcome]) -> Vec<MergedGroup> {
    let filtered = prefilter(pos);
    let mut parent: Vec<usize> = (0..filtered.len()).collect();

    let mut co_owner: HashMap<&str, usize> = HashMap::new();
    for (i, po) in filtered.iter().enumerate() {
        for co in &po.cos {
            match co_owner.get(co.name.as_str()) {
                Some(&first) => union(&mut parent, first, i),
                None => {
                    co_owner.insert(co.name.as_str(), i);
                }
            }
        }
    }

    // Components in order of their lowest member.
    let mut roots: Vec<usize> = Vec::new();
    let mut members: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..filtered.len() {
        let root = find(&mut parent, i);
        if !members.contains_key(&root) {
            roots.push(root);
        }
        members.entry(root).or_default().push(i);
    }

    let mut groups: Vec<MergedGroup> = roots
        .iter()
        .map(|root| {
            let indices = &members[root];
            let mut labels: Vec<String> = indices
                .iter()
                .map(|&i| short_label(&filtered[i].name))
                .collect();
            labels.sort();

            let mut seen: HashSet<&str> = HashSet::new();
            let mut cos: Vec<ValidCourseOutcome> = Vec::new();
            for &i in indices {
                for co in &filtered[i].cos {
                    if seen.insert(co.name.as_str()) {
                        cos.push(co.clone());
                    }
                }
            }
            cos.sort_by(|a, b| compare_course_outcomes(&a.name, &b.name));

            MergedGroup {
                name: labels.join(", "),
                labels,
                cos,
            }
        })
        .collect();

    groups.sort_by(|a, b| compare_group_labels(&a.labels[0], &b.labels[0]));

    debug!(
        "   Merged {} POs into {} display groups",
        filtered.len(),
        groups.len()
    );
    groups
}
