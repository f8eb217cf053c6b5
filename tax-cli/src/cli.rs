use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::OutputFormat;

/// Federal individual income tax calculator (Form 1040).
///
/// Loads a return from TOML or JSON, optionally merges broker sales from a
/// CSV export, evaluates every applicable form and prints the result.
#[derive(Debug, Parser)]
#[command(name = "tax-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to `tax-cli.toml` in the working
    /// directory, when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate a return.
    Calculate(CalculateArgs),

    /// List the registered forms with their inputs, dependencies and outputs.
    Forms {
        /// Output format.
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Debug, Args)]
pub struct CalculateArgs {
    /// Return document (`.toml` or `.json`).
    #[arg(short, long = "return", value_name = "FILE")]
    pub return_file: PathBuf,

    /// Broker CSV of capital-asset sales to add to the return.
    #[arg(short, long, value_name = "CSV")]
    pub sales: Option<PathBuf>,

    /// Tax year; overrides the year in the return document and config.
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Output format.
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Print every form's line items after the summary (text format only).
    #[arg(long, default_value_t = false)]
    pub lines: bool,
}
