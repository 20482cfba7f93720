use clap::Args;
use resultsheet::config::{ExportSettings, KpiSettings};
use resultsheet::error::SheetResult;
use resultsheet::render::filename::export_filename;
use resultsheet::render::grid::build_grid;
use resultsheet::render::xlsx::save_workbook;
use resultsheet::render::SheetAnnotations;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub export: ExportSettings,
}

pub fn run(args: ExportArgs, kpi: &KpiSettings, notes: &SheetAnnotations) -> SheetResult<()> {
    let layout = super::load_layout(&args.input, kpi)?;
    let grid = build_grid(&layout, notes);
    let filename = export_filename(&layout.info);

    let path = save_workbook(&grid, &args.export.out_dir, &filename)?;
    info!("✅ Result sheet exported: {}", path.display());
    println!("{}", path.display());
    Ok(())
}
