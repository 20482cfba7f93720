use resultsheet::config::KpiSettings;
use resultsheet::error::SheetResult;
use resultsheet::layout::{derive_layout, DerivedLayout};
use resultsheet::render::grid::{
    build_grid, CellRole, CellValue, SheetGrid, CO_ROW, FIRST_STUDENT_ROW, HEADER_ROW, NAMES_ROW,
    PO_ROW, TITLE_ROW,
};
use resultsheet::render::table::{
    attainment_table, sheet_table, table_grid, TableView, EMPTY_MESSAGE,
};
use resultsheet::render::xlsx::{export_workbook, save_workbook, write_sheet, SheetSink};
use resultsheet::render::{ResultStatus, SheetAnnotations};
use resultsheet::types::{
    AssessmentData, ClassInfo, ClassworkItem, CourseOutcome, ProgramOutcome, Student,
};
use std::collections::HashMap;

fn student(id: &str, name: &str, scores: Option<Vec<Option<f64>>>) -> Student {
    let mut map = HashMap::new();
    if let Some(scores) = scores {
        map.insert("CO1 (Lecture)".to_string(), scores);
    }
    Student {
        id: id.to_string(),
        name: name.to_string(),
        remarks: None,
        scores: map,
    }
}

fn layout_with(students: Vec<Student>) -> DerivedLayout {
    let shared = CourseOutcome {
        name: "CO1 (Lecture)".to_string(),
        classwork: vec![ClassworkItem::new("Midterm", &["Apply"], Some(100.0))],
    };
    let data = AssessmentData {
        info: ClassInfo {
            cacode: "Main / CoE / DCE".into(),
            program: "BSCpE".into(),
            course: "Data Structures".into(),
            ay_semester: "2024 - 2025 / First".into(),
            faculty: "Reyes, Maria".into(),
            ..Default::default()
        },
        pos: vec![
            ProgramOutcome {
                name: "a - Engineering knowledge".into(),
                cos: vec![shared.clone()],
            },
            ProgramOutcome {
                name: "b - Design".into(),
                cos: vec![shared],
            },
        ],
        students,
    };
    derive_layout(&data, &KpiSettings::default())
}

fn shared_outcome_layout() -> DerivedLayout {
    layout_with(vec![
        student("2021000001", "Cruz, Ana", Some(vec![Some(80.0)])),
        student("2021000002", "Diaz, Ben", Some(vec![Some(60.0)])),
        student("2021000003", "Lim, Cy", Some(vec![Some(90.0)])),
    ])
}

/// Sink that remembers what a spreadsheet would receive.
#[derive(Default)]
struct RecordingSink {
    texts: HashMap<(usize, usize), String>,
    merges: Vec<((usize, usize), (usize, usize))>,
    widths: HashMap<usize, f64>,
    heights: HashMap<usize, f64>,
}

impl SheetSink for RecordingSink {
    fn write_cell(
        &mut self,
        row: usize,
        col: usize,
        value: &CellValue,
        _role: CellRole,
    ) -> SheetResult<()> {
        self.texts.insert((row, col), value.display());
        Ok(())
    }

    fn merge_cells(
        &mut self,
        first: (usize, usize),
        last: (usize, usize),
        value: &CellValue,
        _role: CellRole,
    ) -> SheetResult<()> {
        self.merges.push((first, last));
        self.texts.insert(first, value.display());
        Ok(())
    }

    fn set_column_width(&mut self, col: usize, width: f64) -> SheetResult<()> {
        self.widths.insert(col, width);
        Ok(())
    }

    fn set_row_height(&mut self, row: usize, height: f64) -> SheetResult<()> {
        self.heights.insert(row, height);
        Ok(())
    }
}

fn text(grid: &SheetGrid, row: usize, col: usize) -> String {
    grid.cell_at(row, col)
        .map(|c| c.value.display())
        .unwrap_or_else(|| panic!("no cell starts at ({}, {})", row, col))
}

// --- GRID TOPOLOGY TESTS ---

#[test]
fn test_shared_outcome_grid() {
    let layout = shared_outcome_layout();
    let grid = build_grid(&layout, &SheetAnnotations::default());

    // No., Student ID, Name, spacer, one item, Total, two flags.
    assert_eq!(grid.cols, 8);
    assert_eq!(grid.rows, FIRST_STUDENT_ROW + 3);

    let title = grid.cell_at(TITLE_ROW, 0).unwrap();
    assert_eq!(title.col_span, 8);
    assert_eq!(title.value.display(), "Assessment Result Sheet");

    let po = grid.cell_at(PO_ROW, 4).unwrap();
    assert_eq!(po.value.display(), "PO-a, PO-b");
    assert_eq!(po.col_span, 4);
    assert_eq!(text(&grid, CO_ROW, 4), "CO1 (Lecture)");

    assert_eq!(text(&grid, NAMES_ROW, 4), "Midterm");
    assert_eq!(text(&grid, NAMES_ROW, 5), "Total");
    assert_eq!(text(&grid, NAMES_ROW, 6), "Passing (70%)");
    assert_eq!(text(&grid, NAMES_ROW, 7), "Passing (80%)");

    let header: Vec<String> = (4..8).map(|c| text(&grid, HEADER_ROW, c)).collect();
    assert_eq!(header, vec!["100", "100", "70", "3"]);

    let flags: Vec<String> = (0..3).map(|i| text(&grid, FIRST_STUDENT_ROW + i, 6)).collect();
    assert_eq!(flags, vec!["YES", "NO", "YES"]);

    let class_flag = grid.cell_at(FIRST_STUDENT_ROW, 7).unwrap();
    assert_eq!(class_flag.row_span, 3);
    assert_eq!(class_flag.value, CellValue::Flag(false));
    assert!(grid.cell_at(FIRST_STUDENT_ROW + 1, 7).is_none());

    let spacer = grid.cell_at(PO_ROW, 3).unwrap();
    assert_eq!(spacer.role, CellRole::Spacer);
    assert_eq!(spacer.row_span, 5 + 3);
}

#[test]
fn test_annotations_and_info_rows() {
    let layout = shared_outcome_layout();
    let notes = SheetAnnotations::new(Some(ResultStatus::Complete), Some("Reviewed by chair"));
    let grid = build_grid(&layout, &notes);

    assert_eq!(text(&grid, 0, 0), "Campus/College/Department:");
    assert_eq!(text(&grid, 0, 3), "Main / CoE / DCE");
    assert_eq!(text(&grid, 4, 3), "Reyes, Maria");
    assert_eq!(text(&grid, PO_ROW, 0), "Result Status: Complete");

    let remarks = grid.cell_at(CO_ROW, 0).unwrap();
    assert_eq!(remarks.value.display(), "Remarks:\nReviewed by chair");
    assert_eq!((remarks.row_span, remarks.col_span), (3, 3));
}

#[test]
fn test_student_without_scores_renders_blank() {
    let layout = layout_with(vec![
        student("2021000001", "Cruz, Ana", Some(vec![Some(80.0)])),
        student("2021000002", "Diaz, Ben", None),
        student("2021000003", "Lim, Cy", Some(vec![Some(90.0)])),
    ]);
    let grid = build_grid(&layout, &SheetAnnotations::default());

    let row = FIRST_STUDENT_ROW + 1;
    assert_eq!(grid.cell_at(row, 4).unwrap().value, CellValue::Blank);
    assert_eq!(grid.cell_at(row, 5).unwrap().value, CellValue::Blank);
    assert_eq!(grid.cell_at(row, 6).unwrap().value, CellValue::Blank);
    assert_eq!(layout.attainment()[0].achieved_label, "2 (66.67%)");
}

// --- RENDERER PARITY TESTS ---

#[test]
fn test_table_and_sheet_agree() {
    let layout = shared_outcome_layout();
    let grid = build_grid(&layout, &SheetAnnotations::default());
    let view = TableView::from_grid(&grid);

    let mut sink = RecordingSink::default();
    write_sheet(&grid, &mut sink).unwrap();

    for cell in &grid.cells {
        let sheet_text = sink.texts.get(&(cell.row, cell.col)).map(String::as_str);
        assert_eq!(
            sheet_text,
            view.text_at(cell.row, cell.col),
            "mismatch at ({}, {})",
            cell.row,
            cell.col
        );
    }

    let merged = grid.cells.iter().filter(|c| c.is_merged()).count();
    assert_eq!(sink.merges.len(), merged);
    assert_eq!(sink.widths.len(), grid.cols);
    assert_eq!(sink.widths[&3], 2.0);
    assert_eq!(sink.heights[&NAMES_ROW], 80.0);
}

#[test]
fn test_table_view_json_shape() {
    let layout = shared_outcome_layout();
    let view = TableView::from_grid(&build_grid(&layout, &SheetAnnotations::default()));
    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(json["columns"], 8);
    assert!(json.get("emptyMessage").is_none());
    let first = &json["rows"][0]["cells"][0];
    assert_eq!(first["className"], "info-label");
    assert_eq!(first["colSpan"], 3);

    let ben_flag = view.rows[FIRST_STUDENT_ROW + 1]
        .cells
        .iter()
        .find(|c| c.col == 6)
        .unwrap();
    assert_eq!(ben_flag.class_name, "individual-flag failed");
}

#[test]
fn test_terminal_tables_render() {
    let layout = shared_outcome_layout();
    let grid = build_grid(&layout, &SheetAnnotations::default());

    let sheet = sheet_table(&grid).to_string();
    assert!(sheet.contains("PO-a, PO-b"));
    assert!(sheet.contains("Cruz, Ana"));

    let summary = attainment_table(&layout.attainment()).to_string();
    assert!(summary.contains("CO1 (Lecture)"));
    assert!(summary.contains("2 (66.67%)"));
    assert!(summary.contains("1 (33.33%)"));
}

// --- EMPTY STATE TESTS ---

#[test]
fn test_empty_layout() {
    let layout = derive_layout(&AssessmentData::default(), &KpiSettings::default());
    let grid = build_grid(&layout, &SheetAnnotations::default());
    assert!(grid.is_empty());

    let view = TableView::from_grid(&grid);
    assert_eq!(view.empty_message.as_deref(), Some(EMPTY_MESSAGE));
    assert!(view.rows.is_empty());

    let bytes = export_workbook(&grid).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_no_valid_students_shows_empty_message() {
    // Short id is filtered out during derivation.
    let layout = layout_with(vec![student("12345", "Cruz, Ana", Some(vec![Some(80.0)]))]);
    assert!(!layout.is_empty());
    assert!(!layout.has_students());

    let notes = SheetAnnotations::default();
    let view = TableView::from_layout(&layout, &notes);
    assert_eq!(view.empty_message.as_deref(), Some(EMPTY_MESSAGE));
    assert!(view.rows.is_empty());
    assert!(table_grid(&layout, &notes).is_empty());
    assert!(sheet_table(&table_grid(&layout, &notes))
        .to_string()
        .contains(EMPTY_MESSAGE));

    // The spreadsheet keeps its header rows.
    let grid = build_grid(&layout, &notes);
    assert!(!grid.is_empty());
    assert_eq!(grid.rows, FIRST_STUDENT_ROW);
}

// --- XLSX EXPORT TESTS ---

#[test]
fn test_save_workbook_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("exports").join("2024");
    let grid = build_grid(&shared_outcome_layout(), &SheetAnnotations::default());

    let path = save_workbook(&grid, &out_dir, "DCE_CPE101_3A_COA.xlsx").unwrap();

    assert_eq!(path, out_dir.join("DCE_CPE101_3A_COA.xlsx"));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.len() > 1000);
    assert!(bytes.starts_with(b"PK"));
}
