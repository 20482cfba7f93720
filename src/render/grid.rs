//! Shared cell topology consumed by both renderers.
//!
//! Rows, top to bottom: five class-info rows, the title, the PO row (which
//! also carries the result status and the spacer column), the CO row (with
//! the remarks block), bloom bands, classwork names, column headers with max
//! scores, then one row per student.

use super::SheetAnnotations;
use crate::layout::DerivedLayout;
use crate::types::ClassInfo;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

pub const INFO_ROWS: usize = 5;
pub const TITLE_ROW: usize = 5;
pub const PO_ROW: usize = 6;
pub const CO_ROW: usize = 7;
pub const BLOOM_ROW: usize = 8;
pub const NAMES_ROW: usize = 9;
pub const HEADER_ROW: usize = 10;
pub const FIRST_STUDENT_ROW: usize = 11;

/// No., Student ID, Name.
pub const FIXED_COLUMNS: usize = 3;
pub const SPACER_COL: usize = 3;
pub const FIRST_OUTCOME_COL: usize = 4;

pub const TITLE: &str = "Assessment Result Sheet";
pub const KPI_HEADER: &str = "KPI\n(passed the assessment)";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Blank,
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Flag(true) => "YES".to_string(),
            Self::Flag(false) => "NO".to_string(),
            Self::Blank => String::new(),
        }
    }
}

/// Integral values print without a fraction.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CellRole {
    InfoLabel,
    InfoValue,
    Title,
    ResultStatus,
    Spacer,
    Remarks,
    ProgramOutcome,
    CourseOutcome,
    Bloom,
    KpiHeader,
    ClassworkName,
    SummaryHeader,
    ColumnHeader,
    MaxScore,
    Threshold,
    RowNumber,
    StudentId,
    StudentName,
    Score,
    Total,
    IndividualFlag,
    ClassFlag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub value: CellValue,
    pub role: CellRole,
}

impl GridCell {
    pub fn is_merged(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }

    pub fn last_row(&self) -> usize {
        self.row + self.row_span - 1
    }

    pub fn last_col(&self) -> usize {
        self.col + self.col_span - 1
    }
}

/// Placed cells in row-major order. Only origin cells are stored; cells
/// covered by a span are implicit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SheetGrid {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<GridCell>,
}

impl SheetGrid {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn place(
        &mut self,
        (row, col): (usize, usize),
        (row_span, col_span): (usize, usize),
        value: CellValue,
        role: CellRole,
    ) {
        if row_span == 0 || col_span == 0 {
            return;
        }
        self.cells.push(GridCell {
            row,
            col,
            row_span,
            col_span,
            value,
            role,
        });
    }

    fn sort(&mut self) {
        self.cells.sort_by_key(|c| (c.row, c.col));
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    pub fn row(&self, row: usize) -> impl Iterator<Item = &GridCell> {
        self.cells.iter().filter(move |c| c.row == row)
    }
}

fn info_rows(info: &ClassInfo) -> [(&'static str, &str); INFO_ROWS] {
    [
        ("Campus/College/Department:", info.cacode.as_str()),
        ("Program:", info.program.as_str()),
        ("Course:", info.course.as_str()),
        ("AY/Semester:", info.ay_semester.as_str()),
        ("Faculty:", info.faculty.as_str()),
    ]
}

pub fn build_grid(layout: &DerivedLayout, notes: &SheetAnnotations) -> SheetGrid {
    if layout.is_empty() {
        return SheetGrid::default();
    }

    let n = layout.student_count();
    let cols = FIXED_COLUMNS + layout.dynamic_columns();
    let mut grid = SheetGrid {
        rows: FIRST_STUDENT_ROW + n,
        cols,
        cells: Vec::new(),
    };

    for (row, (label, value)) in info_rows(&layout.info).into_iter().enumerate() {
        grid.place((row, 0), (1, FIXED_COLUMNS), CellValue::text(label), CellRole::InfoLabel);
        grid.place(
            (row, FIXED_COLUMNS),
            (1, cols - FIXED_COLUMNS),
            CellValue::text(value),
            CellRole::InfoValue,
        );
    }
    grid.place((TITLE_ROW, 0), (1, cols), CellValue::text(TITLE), CellRole::Title);

    grid.place(
        (PO_ROW, 0),
        (1, FIXED_COLUMNS),
        CellValue::Text(notes.status_text()),
        CellRole::ResultStatus,
    );
    grid.place((PO_ROW, SPACER_COL), (5 + n, 1), CellValue::Blank, CellRole::Spacer);
    grid.place(
        (CO_ROW, 0),
        (3, FIXED_COLUMNS),
        CellValue::Text(notes.remarks_text()),
        CellRole::Remarks,
    );
    for (col, label) in ["No.", "Student ID", "Name"].into_iter().enumerate() {
        grid.place((HEADER_ROW, col), (1, 1), CellValue::text(label), CellRole::ColumnHeader);
    }
    for (i, student) in layout.students.iter().enumerate() {
        let row = FIRST_STUDENT_ROW + i;
        grid.place((row, 0), (1, 1), CellValue::Number((i + 1) as f64), CellRole::RowNumber);
        grid.place((row, 1), (1, 1), CellValue::text(&student.id), CellRole::StudentId);
        grid.place((row, 2), (1, 1), CellValue::text(&student.name), CellRole::StudentName);
    }

    let summary_labels = [
        "Total".to_string(),
        format!("Passing ({}%)", layout.kpi.kpi_individual),
        format!("Passing ({}%)", layout.kpi.kpi_class),
    ];

    let mut col = FIRST_OUTCOME_COL;
    for group in &layout.groups {
        grid.place(
            (PO_ROW, col),
            (1, group.width()),
            CellValue::text(&group.name),
            CellRole::ProgramOutcome,
        );

        for (co, threshold) in group.outcomes() {
            grid.place(
                (CO_ROW, col),
                (1, co.width()),
                CellValue::text(&co.label),
                CellRole::CourseOutcome,
            );

            let mut c = col;
            for band in &co.bands {
                grid.place(
                    (BLOOM_ROW, c),
                    (1, band.width()),
                    CellValue::Text(band.signature.replace('/', "/\n")),
                    CellRole::Bloom,
                );
                c += band.width();
            }
            grid.place((BLOOM_ROW, c), (1, 3), CellValue::text(KPI_HEADER), CellRole::KpiHeader);

            let mut c = col;
            if co.items.is_empty() {
                grid.place((NAMES_ROW, c), (1, 1), CellValue::Blank, CellRole::ClassworkName);
                grid.place((HEADER_ROW, c), (1, 1), CellValue::Blank, CellRole::MaxScore);
                for i in 0..n {
                    let row = FIRST_STUDENT_ROW + i;
                    grid.place((row, c), (1, 1), CellValue::Blank, CellRole::Score);
                }
                c += 1;
            }
            for item in &co.items {
                grid.place(
                    (NAMES_ROW, c),
                    (1, 1),
                    CellValue::text(&item.name),
                    CellRole::ClassworkName,
                );
                grid.place(
                    (HEADER_ROW, c),
                    (1, 1),
                    CellValue::Number(item.max_score),
                    CellRole::MaxScore,
                );
                c += 1;
            }
            for (offset, label) in summary_labels.iter().enumerate() {
                grid.place(
                    (NAMES_ROW, c + offset),
                    (1, 1),
                    CellValue::text(label),
                    CellRole::SummaryHeader,
                );
            }
            for (offset, value) in [
                threshold.total_max,
                threshold.pass_individual,
                threshold.pass_class_count as f64,
            ]
            .into_iter()
            .enumerate()
            {
                grid.place(
                    (HEADER_ROW, c + offset),
                    (1, 1),
                    CellValue::Number(value),
                    CellRole::Threshold,
                );
            }

            for (i, student) in layout.students.iter().enumerate() {
                let row = FIRST_STUDENT_ROW + i;
                let scores = student.scores_for(&co.name);
                for (k, item) in co.items.iter().enumerate() {
                    let value = scores
                        .and_then(|s| s.get(item.source_index).copied().flatten())
                        .map_or(CellValue::Blank, CellValue::Number);
                    grid.place((row, col + k), (1, 1), value, CellRole::Score);
                }
                let (total, passed) = match threshold.results.get(i).copied().flatten() {
                    Some(r) => (CellValue::Number(r.total), CellValue::Flag(r.passed)),
                    None => (CellValue::Blank, CellValue::Blank),
                };
                grid.place((row, c), (1, 1), total, CellRole::Total);
                grid.place((row, c + 1), (1, 1), passed, CellRole::IndividualFlag);
            }
            grid.place(
                (FIRST_STUDENT_ROW, c + 2),
                (n, 1),
                CellValue::Flag(threshold.class_attained),
                CellRole::ClassFlag,
            );

            col += co.width();
        }
    }

    grid.sort();
    grid
}
