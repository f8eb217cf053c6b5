pub mod cli;
pub mod config;
pub mod report;

use std::fs::File;

use anyhow::{Context, Result};
use tax_core::TaxEngine;
use tax_data::{CapitalSaleLoader, ReturnDocument};
use tracing::{debug, info};

use cli::{CalculateArgs, Cli, Command};
use config::{CliConfig, OutputFormat};

/// Executes `cli` and returns the text to print on stdout.
pub fn run(
    cli: &Cli,
    config: &CliConfig,
) -> Result<String> {
    let engine = TaxEngine::standard().context("Invalid form registry")?;
    match &cli.command {
        Command::Calculate(args) => calculate(&engine, args, config),
        Command::Forms { format } => {
            let forms = engine.registry().describe();
            match format.unwrap_or(config.format) {
                OutputFormat::Text => Ok(report::render_forms_text(&forms)),
                OutputFormat::Json => {
                    report::render_forms_json(&forms).context("Failed to serialize forms")
                }
            }
        }
    }
}

fn calculate(
    engine: &TaxEngine,
    args: &CalculateArgs,
    config: &CliConfig,
) -> Result<String> {
    let mut document = ReturnDocument::load(&args.return_file)
        .with_context(|| format!("Failed to load return: {}", args.return_file.display()))?;

    if let Some(path) = &args.sales {
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let sales = CapitalSaleLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        debug!(sales = sales.len(), "merging broker sales");
        document = document.with_sales(sales);
    }

    let tax_year = args
        .year
        .or(document.tax_year)
        .unwrap_or(config.tax_year);
    let result = engine
        .calculate(&document.tax_return, tax_year)
        .with_context(|| format!("Failed to calculate {}", args.return_file.display()))?;
    info!(
        tax_year,
        refund = %result.refund_amount,
        owed = %result.amount_owed,
        "return calculated"
    );

    match args.format.unwrap_or(config.format) {
        OutputFormat::Text => Ok(report::render_text(&result, args.lines)),
        OutputFormat::Json => report::render_json(&result).context("Failed to serialize result"),
    }
}
