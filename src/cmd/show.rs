use clap::Args;
use resultsheet::config::KpiSettings;
use resultsheet::error::SheetResult;
use resultsheet::render::table::{attainment_table, sheet_table, table_grid, TableView};
use resultsheet::render::SheetAnnotations;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    /// Print the table layout tree as JSON instead of drawing it.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: ShowArgs, kpi: &KpiSettings, notes: &SheetAnnotations) -> SheetResult<()> {
    let layout = super::load_layout(&args.input, kpi)?;
    let grid = table_grid(&layout, notes);

    if args.json {
        let view = TableView::from_grid(&grid);
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("\n📋 === ASSESSMENT RESULT SHEET === 📋");
    println!("{}", sheet_table(&grid));

    let attainment = layout.attainment();
    if !attainment.is_empty() && layout.has_students() {
        println!("\n📊 === OUTCOME ATTAINMENT === 📊");
        println!("{}", attainment_table(&attainment));
    }
    Ok(())
}
