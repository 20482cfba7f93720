use super::grid::{
    self, CellRole, CellValue, GridCell, SheetGrid, BLOOM_ROW, CO_ROW, INFO_ROWS, NAMES_ROW,
    PO_ROW,
};
use crate::error::{SheetError, SheetResult};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const BLACK: &str = "#000000";
const COA_BLUE: &str = "#1F3864";
const COA_RED: &str = "#9C0006";
const COA_YELLOW: &str = "#FCF305";
const BORDER_GRAY: &str = "#808080";

const WIDTH_NO: f64 = 5.0;
const WIDTH_STUDENT_ID: f64 = 12.0;
const WIDTH_NAME: f64 = 25.0;
const WIDTH_SPACER: f64 = 2.0;
const WIDTH_ASSESSMENT: f64 = 11.0;

const HEIGHT_CLASS_INFO: f64 = 20.0;
const HEIGHT_PO: f64 = 20.0;
const HEIGHT_CO: f64 = 20.0;
const HEIGHT_BLOOMS: f64 = 30.0;
const HEIGHT_CLASSWORK_NAMES: f64 = 80.0;

/// Destination for a laid-out sheet. Coordinates are zero-based.
pub trait SheetSink {
    fn write_cell(
        &mut self,
        row: usize,
        col: usize,
        value: &CellValue,
        role: CellRole,
    ) -> SheetResult<()>;

    /// Merges the inclusive range and writes `value` into it.
    fn merge_cells(
        &mut self,
        first: (usize, usize),
        last: (usize, usize),
        value: &CellValue,
        role: CellRole,
    ) -> SheetResult<()>;

    fn set_column_width(&mut self, col: usize, width: f64) -> SheetResult<()>;

    fn set_row_height(&mut self, row: usize, height: f64) -> SheetResult<()>;
}

pub fn column_width(col: usize) -> f64 {
    match col {
        0 => WIDTH_NO,
        1 => WIDTH_STUDENT_ID,
        2 => WIDTH_NAME,
        grid::SPACER_COL => WIDTH_SPACER,
        _ => WIDTH_ASSESSMENT,
    }
}

pub fn row_height(row: usize) -> Option<f64> {
    match row {
        r if r < INFO_ROWS => Some(HEIGHT_CLASS_INFO),
        PO_ROW => Some(HEIGHT_PO),
        CO_ROW => Some(HEIGHT_CO),
        BLOOM_ROW => Some(HEIGHT_BLOOMS),
        NAMES_ROW => Some(HEIGHT_CLASSWORK_NAMES),
        _ => None,
    }
}

/// Walks the grid into `sink`. Single cells are written directly; spans
/// larger than one cell are merged.
pub fn write_sheet<S: SheetSink>(grid: &SheetGrid, sink: &mut S) -> SheetResult<()> {
    for cell in &grid.cells {
        write_grid_cell(cell, sink)?;
    }
    for col in 0..grid.cols {
        sink.set_column_width(col, column_width(col))?;
    }
    for row in 0..grid.rows {
        if let Some(height) = row_height(row) {
            sink.set_row_height(row, height)?;
        }
    }
    Ok(())
}

fn write_grid_cell<S: SheetSink>(cell: &GridCell, sink: &mut S) -> SheetResult<()> {
    if cell.is_merged() {
        sink.merge_cells(
            (cell.row, cell.col),
            (cell.last_row(), cell.last_col()),
            &cell.value,
            cell.role,
        )
    } else {
        sink.write_cell(cell.row, cell.col, &cell.value, cell.role)
    }
}

fn to_row(row: usize) -> SheetResult<u32> {
    u32::try_from(row).map_err(|_| SheetError::Validation(format!("row {} out of range", row)))
}

fn to_col(col: usize) -> SheetResult<u16> {
    u16::try_from(col)
        .map_err(|_| SheetError::Validation(format!("column {} out of range", col)))
}

/// Cell format for a role. Every cell gets a thin gray border.
pub fn format_for(role: CellRole, value: &CellValue) -> Format {
    let base = Format::new()
        .set_border(FormatBorder::Thin)
        .set_border_color(BORDER_GRAY)
        .set_align(FormatAlign::VerticalCenter)
        .set_align(FormatAlign::Center);

    match role {
        CellRole::InfoLabel | CellRole::ResultStatus | CellRole::ColumnHeader => {
            base.set_align(FormatAlign::Left).set_bold()
        }
        CellRole::InfoValue => base.set_align(FormatAlign::Left).set_text_wrap(),
        CellRole::Title => base.set_bold(),
        CellRole::Remarks => base
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::Top)
            .set_text_wrap()
            .set_bold(),
        CellRole::ProgramOutcome => base.set_text_wrap(),
        CellRole::CourseOutcome => base
            .set_text_wrap()
            .set_bold()
            .set_font_color(COA_RED)
            .set_pattern(FormatPattern::Solid)
            .set_background_color(COA_YELLOW),
        CellRole::Bloom => base.set_text_wrap().set_font_size(10),
        CellRole::KpiHeader => base.set_text_wrap().set_font_size(10).set_bold(),
        CellRole::ClassworkName => base
            .set_align(FormatAlign::Bottom)
            .set_text_wrap()
            .set_rotation(90)
            .set_font_size(9)
            .set_bold(),
        CellRole::SummaryHeader => base
            .set_align(FormatAlign::Bottom)
            .set_text_wrap()
            .set_font_size(10)
            .set_bold(),
        CellRole::MaxScore | CellRole::Threshold | CellRole::Total => {
            base.set_bold().set_font_color(COA_BLUE)
        }
        CellRole::RowNumber | CellRole::StudentId | CellRole::StudentName => {
            base.set_align(FormatAlign::Left)
        }
        CellRole::IndividualFlag | CellRole::ClassFlag => {
            let color = match value {
                CellValue::Flag(false) => COA_RED,
                _ => BLACK,
            };
            base.set_bold().set_font_color(color)
        }
        CellRole::Spacer | CellRole::Score => base,
    }
}

/// [`SheetSink`] backed by an in-memory `rust_xlsxwriter` worksheet.
pub struct XlsxSink {
    worksheet: Worksheet,
}

impl XlsxSink {
    pub fn new() -> SheetResult<Self> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(grid::TITLE)?;
        Ok(Self { worksheet })
    }

    pub fn into_workbook(self) -> Workbook {
        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.worksheet);
        workbook
    }

    fn put(&mut self, row: u32, col: u16, value: &CellValue, format: &Format) -> SheetResult<()> {
        match value {
            CellValue::Number(n) => {
                self.worksheet.write_number_with_format(row, col, *n, format)?;
            }
            CellValue::Blank => {
                self.worksheet.write_blank(row, col, format)?;
            }
            CellValue::Text(_) | CellValue::Flag(_) => {
                self.worksheet
                    .write_string_with_format(row, col, value.display(), format)?;
            }
        }
        Ok(())
    }
}

impl SheetSink for XlsxSink {
    fn write_cell(
        &mut self,
        row: usize,
        col: usize,
        value: &CellValue,
        role: CellRole,
    ) -> SheetResult<()> {
        let format = format_for(role, value);
        self.put(to_row(row)?, to_col(col)?, value, &format)
    }

    fn merge_cells(
        &mut self,
        first: (usize, usize),
        last: (usize, usize),
        value: &CellValue,
        role: CellRole,
    ) -> SheetResult<()> {
        let format = format_for(role, value);
        let (row, col) = (to_row(first.0)?, to_col(first.1)?);
        let text = match value {
            CellValue::Number(_) => String::new(),
            other => other.display(),
        };
        self.worksheet
            .merge_range(row, col, to_row(last.0)?, to_col(last.1)?, &text, &format)?;
        // merge_range only takes strings; numbers overwrite the top-left cell.
        if let CellValue::Number(_) = value {
            self.put(row, col, value, &format)?;
        }
        Ok(())
    }

    fn set_column_width(&mut self, col: usize, width: f64) -> SheetResult<()> {
        self.worksheet.set_column_width(to_col(col)?, width)?;
        Ok(())
    }

    fn set_row_height(&mut self, row: usize, height: f64) -> SheetResult<()> {
        self.worksheet.set_row_height(to_row(row)?, height)?;
        Ok(())
    }
}

pub fn build_workbook(grid: &SheetGrid) -> SheetResult<Workbook> {
    let mut sink = XlsxSink::new()?;
    write_sheet(grid, &mut sink)?;
    Ok(sink.into_workbook())
}

pub fn export_workbook(grid: &SheetGrid) -> SheetResult<Vec<u8>> {
    let mut workbook = build_workbook(grid)?;
    Ok(workbook.save_to_buffer()?)
}

/// Writes the workbook as `dir/filename`, creating `dir` when missing.
pub fn save_workbook(grid: &SheetGrid, dir: &Path, filename: &str) -> SheetResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    let bytes = export_workbook(grid)?;
    fs::write(&path, &bytes)?;
    info!("💾 Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
