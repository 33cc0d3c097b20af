use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use disaster_etl::config::EtlConfig;
use disaster_etl::pipeline::{Pipeline, RunRequest};
use disaster_etl::{constants, logging, metrics};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "disaster_etl")]
#[command(about = "Merge disaster messages with their categories and load them into SQLite")]
#[command(version)]
struct Cli {
    /// CSV file of messages, keyed by `id`
    messages_filepath: PathBuf,
    /// CSV file of packed categories, keyed by `id`
    categories_filepath: PathBuf,
    /// SQLite file to write the cleaned table to
    database_filepath: PathBuf,
    /// TOML configuration file (defaults to $ETL_CONFIG, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output table name, overriding the configuration
    #[arg(long)]
    table: Option<String>,
    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            println!("{}", constants::USAGE);
            eprintln!("{}", e.render());
            return ExitCode::from(2);
        }
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match logging::init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("ETL run failed: {:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<EtlConfig> {
    let mut config =
        EtlConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(table) = &cli.table {
        config.output.table_name = table.clone();
        config.validate()?;
    }
    Ok(config)
}

fn run(cli: &Cli, config: &EtlConfig) -> anyhow::Result<()> {
    if config.metrics.textfile.is_some() {
        metrics::init_metrics();
    }

    let request = RunRequest {
        messages_path: cli.messages_filepath.clone(),
        categories_path: cli.categories_filepath.clone(),
        database_path: cli.database_filepath.clone(),
    };

    let result = Pipeline::new(config)
        .with_progress(true)
        .run(&request)
        .with_context(|| {
            format!(
                "Failed to load {} and {} into {}",
                request.messages_path.display(),
                request.categories_path.display(),
                request.database_path.display()
            )
        })?;

    info!(
        rows_written = result.rows_written,
        duplicates_dropped = result.duplicates_dropped,
        categories = result.category_columns.len(),
        table = %result.table_name,
        "ETL run complete"
    );

    if let Some(path) = &cli.summary {
        result
            .write_json(path)
            .with_context(|| format!("Failed to write run summary to {}", path.display()))?;
    }

    if let Some(path) = &config.metrics.textfile {
        metrics::write_textfile(path)
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
    }

    Ok(())
}
