use super::grid::{build_grid, CellRole, CellValue, GridCell, SheetGrid};
use super::SheetAnnotations;
use crate::layout::thresholds::CoAttainment;
use crate::layout::DerivedLayout;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

pub const EMPTY_MESSAGE: &str = "No data available to display.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub col: usize,
    pub text: String,
    pub row_span: usize,
    pub col_span: usize,
    pub role: CellRole,
    pub class_name: String,
}

impl From<&GridCell> for TableCell {
    fn from(cell: &GridCell) -> Self {
        Self {
            col: cell.col,
            text: cell.value.display(),
            row_span: cell.row_span,
            col_span: cell.col_span,
            role: cell.role,
            class_name: class_name(cell),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub index: usize,
    pub cells: Vec<TableCell>,
}

/// Grid shown by the interactive table. Empty when no outcome or no
/// student survived filtering; the spreadsheet still gets the full header.
pub fn table_grid(layout: &DerivedLayout, notes: &SheetAnnotations) -> SheetGrid {
    if layout.has_students() {
        build_grid(layout, notes)
    } else {
        SheetGrid::default()
    }
}

/// The sheet as a tree of rows for an interactive front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub columns: usize,
    pub rows: Vec<TableRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

impl TableView {
    pub fn from_grid(grid: &SheetGrid) -> Self {
        if grid.is_empty() {
            return Self {
                columns: 0,
                rows: Vec::new(),
                empty_message: Some(EMPTY_MESSAGE.to_string()),
            };
        }
        let rows = (0..grid.rows)
            .map(|index| TableRow {
                index,
                cells: grid.row(index).map(TableCell::from).collect(),
            })
            .collect();
        Self {
            columns: grid.cols,
            rows,
            empty_message: None,
        }
    }

    pub fn from_layout(layout: &DerivedLayout, notes: &SheetAnnotations) -> Self {
        Self::from_grid(&table_grid(layout, notes))
    }

    /// Text of the origin cell at `(row, col)`, if one starts there.
    pub fn text_at(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)?
            .cells
            .iter()
            .find(|c| c.col == col)
            .map(|c| c.text.as_str())
    }
}

fn class_name(cell: &GridCell) -> String {
    match cell.value {
        CellValue::Flag(false) => format!("{} failed", cell.role),
        _ => cell.role.to_string(),
    }
}

fn styled(cell: &GridCell) -> Cell {
    let out = Cell::new(cell.value.display());
    let out = match cell.role {
        CellRole::InfoLabel
        | CellRole::ResultStatus
        | CellRole::Remarks
        | CellRole::InfoValue
        | CellRole::RowNumber
        | CellRole::StudentId
        | CellRole::StudentName => out.set_alignment(CellAlignment::Left),
        _ => out.set_alignment(CellAlignment::Center),
    };
    match (cell.role, &cell.value) {
        (CellRole::CourseOutcome, _) => out.add_attribute(Attribute::Bold).fg(Color::Red),
        (CellRole::MaxScore | CellRole::Threshold | CellRole::Total, _) => {
            out.add_attribute(Attribute::Bold).fg(Color::Blue)
        }
        (_, CellValue::Flag(false)) => out.add_attribute(Attribute::Bold).fg(Color::Red),
        (_, CellValue::Flag(true)) => out.add_attribute(Attribute::Bold),
        (
            CellRole::InfoLabel
            | CellRole::Title
            | CellRole::ResultStatus
            | CellRole::Remarks
            | CellRole::KpiHeader
            | CellRole::ClassworkName
            | CellRole::SummaryHeader
            | CellRole::ColumnHeader,
            _,
        ) => out.add_attribute(Attribute::Bold),
        _ => out,
    }
}

/// Lays the grid out on a dense terminal table. Spanned cells print in
/// their origin slot; covered slots stay empty.
pub fn sheet_table(grid: &SheetGrid) -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    if grid.is_empty() {
        table.add_row(vec![Cell::new(EMPTY_MESSAGE)]);
        return table;
    }

    let mut dense: Vec<Vec<Cell>> = (0..grid.rows)
        .map(|_| (0..grid.cols).map(|_| Cell::new("")).collect())
        .collect();
    for cell in &grid.cells {
        if let Some(slot) = dense.get_mut(cell.row).and_then(|r| r.get_mut(cell.col)) {
            *slot = styled(cell);
        }
    }
    for row in dense {
        table.add_row(row);
    }
    table
}

pub fn attainment_table(rows: &[CoAttainment]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Outcome").add_attribute(Attribute::Bold),
        Cell::new("No. of Students Achieved").fg(Color::Green),
        Cell::new("No. of Students Not Achieved").fg(Color::Red),
    ]);

    for i in 1..=2 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.outcome).add_attribute(Attribute::Bold),
            Cell::new(&row.achieved_label).fg(Color::Green),
            Cell::new(&row.not_achieved_label).fg(Color::Red),
        ]);
    }
    table
}
