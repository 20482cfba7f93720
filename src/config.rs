use crate::error::{SheetError, SheetResult};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Attainment percentages used by the threshold calculator.
///
/// `kpi_individual` is the share of a course outcome's total that a single
/// student must reach; `kpi_class` is the share of the class that must reach
/// it for the outcome itself to count as attained.
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiSettings {
    #[arg(global = true, long, default_value_t = 70)]
    pub kpi_individual: u8,
    #[arg(global = true, long, default_value_t = 80)]
    pub kpi_class: u8,
}

impl Default for KpiSettings {
    fn default() -> Self {
        Self {
            kpi_individual: 70,
            kpi_class: 80,
        }
    }
}

impl KpiSettings {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SheetResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SheetError::Config(format!("Failed to read KPI file '{}': {}", path.display(), e))
        })?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Copies values the user typed on the command line over `self`,
    /// leaving file-provided values alone for everything defaulted by clap.
    pub fn merge_from_cli(&mut self, cli: &KpiSettings, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field;
                }
            };
        }

        update_if_present!(kpi_individual, "kpi_individual");
        update_if_present!(kpi_class, "kpi_class");
    }

    pub fn validate(&self) -> SheetResult<()> {
        for (name, value) in [
            ("kpi_individual", self.kpi_individual),
            ("kpi_class", self.kpi_class),
        ] {
            if !(1..=100).contains(&value) {
                return Err(SheetError::Config(format!(
                    "{} must be between 1 and 100, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn individual_ratio(&self) -> f64 {
        f64::from(self.kpi_individual) / 100.0
    }

    pub fn class_ratio(&self) -> f64 {
        f64::from(self.kpi_class) / 100.0
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
        }
    }
}
