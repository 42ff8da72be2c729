use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use ebeye_enrich::app::App;
use ebeye_enrich::config::{ConfigLoader, ConfigOverrides};
use ebeye_enrich::error::EnrichError;
use ebeye_enrich::output::{JsonOutput, LogProgress, OutputMode};
use ebeye_enrich::store::SdrfStore;

#[derive(Parser)]
#[command(name = "ebeye-enrich")]
#[command(about = "Add tissue and disease annotations from condensed SDRF files to an EB-eye XML dump")]
#[command(version, author)]
struct Cli {
    /// EB-eye XML dump, e.g. ebeye_baseline_experiments.xml
    xml_file: Utf8PathBuf,

    /// Directory holding one <accession>/<accession>.condensed-sdrf.tsv per experiment
    sdrf_root: Option<String>,

    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    progress_every: Option<usize>,

    #[arg(long)]
    output_suffix: Option<String>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<EnrichError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &EnrichError) -> u8 {
    match error {
        EnrichError::MissingSdrf(_) => 2,
        EnrichError::XmlParse(_) => 3,
        EnrichError::ConfigRead(_)
        | EnrichError::ConfigParse(_)
        | EnrichError::InvalidConfig(_) => 4,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Log
    };

    let overrides = ConfigOverrides {
        sdrf_root: cli.sdrf_root,
        progress_every: cli.progress_every,
        output_suffix: cli.output_suffix,
    };
    let config = ConfigLoader::resolve(cli.config.as_deref(), overrides)?;

    let store = match config.sdrf_root.as_deref() {
        Some(root) => SdrfStore::new(root),
        None => SdrfStore::current_dir()?,
    };
    let app = App::new(store, config);

    match output_mode {
        OutputMode::Json => {
            let summary = app.run(&cli.xml_file, &JsonOutput)?;
            JsonOutput::print_summary(&summary).into_diagnostic()?;
        }
        OutputMode::Log => {
            let summary = app.run(&cli.xml_file, &LogProgress)?;
            LogProgress::print_summary(&summary);
        }
    }
    Ok(())
}
