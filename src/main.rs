use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use resultsheet::config::KpiSettings;
use resultsheet::error::SheetResult;
use resultsheet::render::{ResultStatus, SheetAnnotations};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};

mod cmd;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with `kpi_individual` / `kpi_class`.
    #[arg(global = true, long)]
    kpi_config: Option<PathBuf>,

    #[command(flatten)]
    kpi: KpiSettings,

    #[arg(global = true, long)]
    result_status: Option<ResultStatus>,

    #[arg(global = true, long)]
    remarks: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Show(cmd::show::ShowArgs),
    Export(cmd::export::ExportArgs),
    Analytics(cmd::analytics::AnalyticsArgs),
}

fn resolve_kpi(cli: &Cli, matches: &ArgMatches) -> SheetResult<KpiSettings> {
    let mut kpi = match &cli.kpi_config {
        Some(path) => {
            info!("⚖️  Loading KPI settings from: {}", path.display());
            KpiSettings::load_from_file(path)?
        }
        None => KpiSettings::default(),
    };
    kpi.merge_from_cli(&cli.kpi, matches);
    kpi.validate()?;
    Ok(kpi)
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let kpi = resolve_kpi(&cli, &matches).unwrap_or_else(|e| {
        error!("❌ {}", e);
        process::exit(1);
    });
    info!(
        "📐 KPI: individual {}%, class {}%",
        kpi.kpi_individual, kpi.kpi_class
    );

    let notes = SheetAnnotations::new(cli.result_status, cli.remarks.as_deref());

    let result = match cli.command {
        Commands::Show(args) => cmd::show::run(args, &kpi, &notes),
        Commands::Export(args) => cmd::export::run(args, &kpi, &notes),
        Commands::Analytics(args) => cmd::analytics::run(args, &kpi),
    };

    if let Err(e) = result {
        error!("❌ {}", e);
        process::exit(1);
    }
}
