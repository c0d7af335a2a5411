// OHJP conversion CLI
//
// Purpose: convert an Ultimo OMS export (CSV/Parquet) into an OHJP workbook
// Usage: cargo run --release --bin ohjp_convert -- export.csv --start-year 2025

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ohjp_converter::{write_csv_sheets, write_workbook, ConversionConfig, HorizonMode, OhjpConverter, OmsExport};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Xlsx,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "ohjp_convert", about = "Convert an Ultimo OMS export into an OHJP planning workbook")]
struct Cli {
    /// OMS export (.csv or .parquet)
    input: PathBuf,

    /// TOML config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First year of the plan
    #[arg(long)]
    start_year: Option<i32>,

    /// First week of the plan (1-52)
    #[arg(long)]
    start_week: Option<u32>,

    /// Zero-based row holding the column names
    #[arg(long)]
    header_row: Option<usize>,

    /// Output name without extension
    #[arg(long)]
    export_name: Option<String>,

    /// Sheet name for standalone objects
    #[arg(long)]
    fixed_group_name: Option<String>,

    #[arg(long, value_enum)]
    horizon_mode: Option<HorizonMode>,

    /// Directory the workbook (or CSV sheets) are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, value_enum, default_value = "xlsx")]
    format: OutputFormat,

    /// Build the per-complex sheets in parallel
    #[arg(long)]
    parallel: bool,

    /// Print the conversion report as JSON on stdout
    #[arg(long)]
    report_json: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<ConversionConfig> {
        let mut config = match &self.config {
            Some(path) => ConversionConfig::load(path).with_context(|| format!("Failed to load config {:?}", path))?,
            None => ConversionConfig::default(),
        };

        if let Some(year) = self.start_year {
            config.start_year = year;
        }
        if let Some(week) = self.start_week {
            config.start_week = week;
        }
        if let Some(row) = self.header_row {
            config.header_row = row;
        }
        if let Some(name) = &self.export_name {
            config.export_name = name.clone();
        }
        if let Some(name) = &self.fixed_group_name {
            config.fixed_group_name = name.clone();
        }
        if let Some(mode) = self.horizon_mode {
            config.horizon_mode = mode;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ohjp_converter=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    tracing::info!("Configuration:");
    tracing::info!("  start: week {} of {}", config.start_week, config.start_year);
    tracing::info!("  horizon mode: {:?}", config.horizon_mode);
    tracing::info!("  fixed objects sheet: {}", config.fixed_group_name);

    let export = OmsExport::load(&cli.input, config.header_row)
        .with_context(|| format!("Failed to load OMS export {:?}", cli.input))?;

    let converter = OhjpConverter::new(config.clone())?;
    let conversion = if cli.parallel {
        converter.convert_parallel(&export)
    } else {
        converter.convert(&export)
    };
    let conversion = conversion.map_err(|err| {
        tracing::error!("Conversion failed during {}: {}", err.stage(), err);
        err
    })?;

    if let Some(horizon) = &conversion.report.horizon {
        tracing::warn!(
            "{} task(s) planned after week {} of {} were left out",
            horizon.count(),
            config.start_week,
            config.start_year + 1
        );
        for task in &horizon.dropped {
            tracing::warn!("  row {}: {} (start {})", task.row, task.description, task.start_week);
        }
    }

    match cli.format {
        OutputFormat::Xlsx => {
            std::fs::create_dir_all(&cli.out_dir)
                .with_context(|| format!("Failed to create output directory {:?}", cli.out_dir))?;
            let path = config.workbook_path(&cli.out_dir);
            write_workbook(&conversion.workbook, &path)?;
            tracing::info!("OHJP workbook saved as {:?}", path);
        }
        OutputFormat::Csv => {
            let dir = cli.out_dir.join(&config.export_name);
            let paths = write_csv_sheets(&conversion.workbook, &dir)?;
            tracing::info!("OHJP sheets saved as {} CSV file(s) in {:?}", paths.len(), dir);
        }
    }

    if cli.report_json {
        let json = serde_json::to_string_pretty(&conversion.report).context("Failed to serialize report")?;
        println!("{}", json);
    }

    Ok(())
}
