pub mod analytics;
pub mod export;
pub mod show;

use resultsheet::config::KpiSettings;
use resultsheet::error::SheetResult;
use resultsheet::layout::{derive_layout, DerivedLayout};
use resultsheet::loader;
use std::path::Path;
use tracing::{info, warn};

pub fn load_layout(input: &Path, kpi: &KpiSettings) -> SheetResult<DerivedLayout> {
    info!("📂 Loading assessment data: {}", input.display());
    let normalized = loader::load_response(input)?;
    if normalized.excluded_students > 0 {
        info!(
            "🚫 {} students left off the sheet (invalid id, blank name or remarks)",
            normalized.excluded_students
        );
    }
    let layout = derive_layout(&normalized.data, kpi);
    if layout.is_empty() {
        warn!("⚠️  No course outcome has scored classwork.");
    } else if !layout.has_students() {
        warn!("⚠️  No students left after filtering.");
    }
    Ok(layout)
}
