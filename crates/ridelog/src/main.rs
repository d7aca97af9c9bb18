use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use polars::prelude::DataFrame;
use ridelog_core::{render_table, run_pipeline, PipelineConfig};
use ridelog_parser::load_trip_file;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Clean and summarize ride history exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean the trip file, write the cleaned table and the chart tables
    Run(RunArgs),
    /// Print a column overview of the raw trip file
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Raw ride history export
    #[arg(long)]
    input: Option<PathBuf>,
    /// Where the cleaned table is written
    #[arg(long)]
    output: Option<PathBuf>,
    /// Directory for chart tables
    #[arg(long)]
    visuals_dir: Option<PathBuf>,
    /// TOML file with pipeline settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Skip the chart tables
    #[arg(long)]
    no_summary: bool,
}

#[derive(Args, Debug, Default)]
struct InspectArgs {
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            let mut config = load_config(args.config.as_ref())?;
            if let Some(input) = args.input {
                config.input_path = input;
            }
            if let Some(output) = args.output {
                config.output_path = output;
            }
            if let Some(visuals_dir) = args.visuals_dir {
                config.visuals_dir = visuals_dir;
            }
            if args.no_summary {
                config.write_summaries = false;
            }

            let report = run_pipeline(&config).with_context(|| {
                format!("pipeline failed for {}", config.input_path.display())
            })?;
            info!(output = %report.output_path.display(), "Pipeline finished");

            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("serializing run report")?
            );
            for table in &report.charts {
                println!("\n{}", render_table(table));
            }
            Ok(())
        }
        Command::Inspect(args) => {
            let mut config = load_config(args.config.as_ref())?;
            if let Some(input) = args.input {
                config.input_path = input;
            }

            let loaded = load_trip_file(&config.input_path, &config.loader)
                .with_context(|| format!("failed to load {}", config.input_path.display()))?;
            println!("{}", column_overview(&loaded.df));
            if !loaded.rejected_miles.is_empty() {
                println!(
                    "{} distance values were not non-negative numbers",
                    loaded.rejected_miles.len()
                );
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("failed to read config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn column_overview(df: &DataFrame) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Column", "Non-Null", "Dtype"]);
    for column in df.get_columns() {
        table.add_row(vec![
            column.name().to_string(),
            (column.len() - column.null_count()).to_string(),
            column.dtype().to_string(),
        ]);
    }
    format!("{} rows\n{table}", df.height())
}
