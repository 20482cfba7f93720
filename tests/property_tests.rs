use proptest::collection::{hash_map, vec};
use proptest::option;
use proptest::prelude::*;
use proptest::sample::select;
use resultsheet::blooms;
use resultsheet::config::KpiSettings;
use resultsheet::layout::derive_layout;
use resultsheet::layout::thresholds::{pass_class_count, pass_individual};
use resultsheet::loader::students::align_scores;
use resultsheet::render::grid::build_grid;
use resultsheet::render::SheetAnnotations;
use resultsheet::types::{AssessmentData, ClassworkItem, CourseOutcome, ProgramOutcome, Student};
use std::collections::HashMap;

const TAGS: &[&str] = &[
    "Remember",
    "Understand",
    "Apply",
    "Analyze",
    "Evaluate",
    "Create",
    "Synthesis",
];

const CO_NAMES: &[&str] = &[
    "CO1 (Lecture)",
    "CO1 (Laboratory)",
    "CO2",
    "CO2 & CO3 (Lecture)",
    "Capstone",
];

prop_compose! {
    fn arb_item()(
        name in "[A-Z][a-z]{2,8}",
        tags in vec(select(TAGS), 0..4),
        max in option::of(-10.0f64..100.0),
    ) -> ClassworkItem {
        ClassworkItem::new(name, &tags, max)
    }
}

prop_compose! {
    fn arb_co()(name in select(CO_NAMES), classwork in vec(arb_item(), 0..5)) -> CourseOutcome {
        CourseOutcome { name: name.to_string(), classwork }
    }
}

prop_compose! {
    fn arb_po()(
        name in select(&["a - Knowledge", "b - Design", "c - Analysis", "Lifelong learning"][..]),
        cos in vec(arb_co(), 0..3),
    ) -> ProgramOutcome {
        ProgramOutcome { name: name.to_string(), cos }
    }
}

prop_compose! {
    fn arb_student()(
        suffix in 0u32..100,
        scores in hash_map(select(CO_NAMES), vec(option::of(0.0f64..100.0), 0..6), 0..4),
    ) -> Student {
        Student {
            id: format!("20210000{:02}", suffix),
            name: format!("Student {}", suffix),
            remarks: None,
            scores: scores
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<HashMap<_, _>>(),
        }
    }
}

prop_compose! {
    fn arb_model()(
        pos in vec(arb_po(), 0..4),
        students in vec(arb_student(), 0..6),
    ) -> AssessmentData {
        AssessmentData { pos, students, ..Default::default() }
    }
}

prop_compose! {
    fn arb_kpi()(kpi_individual in 1u8..=100, kpi_class in 1u8..=100) -> KpiSettings {
        KpiSettings { kpi_individual, kpi_class }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_signature_normalization_is_idempotent(tags in vec(select(TAGS), 0..6)) {
        let once = blooms::normalize(&tags);
        prop_assert_eq!(blooms::normalize_signature(&once), once.clone());

        let ranks = blooms::rank_vector(&once);
        prop_assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_aligned_scores_match_index_length(
        ids in vec(option::of(0i64..20), 0..12),
        given in hash_map(0i64..30, option::of(0.0f64..100.0), 0..20),
    ) {
        prop_assert_eq!(align_scores(&ids, &given).len(), ids.len());
    }

    #[test]
    fn test_thresholds_are_monotone(a in 0.0f64..1000.0, b in 0.0f64..1000.0, kpi in arb_kpi(), n in 0usize..200) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(pass_individual(lo, &kpi) <= pass_individual(hi, &kpi));

        let required = pass_class_count(n, &kpi);
        prop_assert!(required <= n);
        if n > 0 {
            prop_assert!(required >= 1);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_layout_invariants(data in arb_model(), kpi in arb_kpi()) {
        let layout = derive_layout(&data, &kpi);
        let n = layout.student_count();

        for (co, threshold) in layout.outcomes() {
            prop_assert!(!co.items.is_empty());
            prop_assert_eq!(threshold.results.len(), n);
            prop_assert!(threshold.achieved <= n);
            prop_assert_eq!(threshold.class_attained, threshold.achieved >= threshold.pass_class_count);

            let ranks: Vec<Vec<usize>> = co.items.iter().map(|i| blooms::rank_vector(&i.signature)).collect();
            prop_assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(co.item_columns(), co.items.len());
        }

        for row in layout.attainment() {
            prop_assert_eq!(row.achieved + row.not_achieved, n);
        }

        // Every CO name lands in exactly one group.
        let mut seen = std::collections::HashSet::new();
        for group in &layout.groups {
            for co in &group.cos {
                prop_assert!(seen.insert(co.name.clone()));
            }
        }
    }

    #[test]
    fn test_grid_cells_never_overlap(data in arb_model(), kpi in arb_kpi()) {
        let layout = derive_layout(&data, &kpi);
        let grid = build_grid(&layout, &SheetAnnotations::default());
        if layout.is_empty() {
            prop_assert!(grid.is_empty());
            return Ok(());
        }

        prop_assert_eq!(grid.cols, 3 + layout.dynamic_columns());
        let mut covered = vec![vec![false; grid.cols]; grid.rows];
        for cell in &grid.cells {
            prop_assert!(cell.last_row() < grid.rows);
            prop_assert!(cell.last_col() < grid.cols);
            for row in covered.iter_mut().take(cell.last_row() + 1).skip(cell.row) {
                for slot in row.iter_mut().take(cell.last_col() + 1).skip(cell.col) {
                    prop_assert!(!*slot, "overlap at cell {:?}", cell);
                    *slot = true;
                }
            }
        }
    }
}
