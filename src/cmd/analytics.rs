use clap::Args;
use resultsheet::config::KpiSettings;
use resultsheet::error::SheetResult;
use resultsheet::render::table::attainment_table;
use std::path::PathBuf;
use tracing::warn;

#[derive(Args, Debug, Clone)]
pub struct AnalyticsArgs {
    #[arg(short, long)]
    pub input: PathBuf,
}

pub fn run(args: AnalyticsArgs, kpi: &KpiSettings) -> SheetResult<()> {
    let layout = super::load_layout(&args.input, kpi)?;
    if layout.student_count() == 0 {
        warn!("⚠️  No students to summarize.");
    }

    println!("\n📊 === OUTCOME ATTAINMENT === 📊");
    println!("{}", attainment_table(&layout.attainment()));
    Ok(())
}
