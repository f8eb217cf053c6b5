//! Runs parsed command lines against the files in `test-data/`.

use std::path::{Path, PathBuf};

use clap::Parser;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_cli::cli::Cli;
use tax_cli::config::{CliConfig, OutputFormat};
use tax_core::{CalculationResult, EngineError};

fn test_data(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test-data")
        .join(name)
        .display()
        .to_string()
}

fn run(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(args).expect("valid command line");
    tax_cli::run(&cli, &CliConfig::default())
}

#[test]
fn calculate_text_report() {
    let output =
        run(&["tax-cli", "calculate", "--return", &test_data("single_2025.toml")]).unwrap();

    assert!(output.contains("Taxable income"));
    assert!(output.contains("$44250.00"));
    assert!(output.contains("$928.50"));
}

#[test]
fn calculate_json_report() {
    let output = run(&[
        "tax-cli",
        "calculate",
        "-r",
        &test_data("single_2025.toml"),
        "--format",
        "json",
    ])
    .unwrap();

    let result: CalculationResult = serde_json::from_str(&output).unwrap();
    assert_eq!(result.total_tax, dec!(5071.50));
    assert_eq!(result.refund_amount, dec!(928.50));
}

#[test]
fn unsupported_year_flag_fails() {
    let err = run(&[
        "tax-cli",
        "calculate",
        "--return",
        &test_data("single_2025.toml"),
        "--year",
        "2024",
    ])
    .unwrap_err();

    assert!(format!("{err:#}").contains("tax year 2024 is not supported"), "got: {err:#}");
}

#[test]
fn failed_calculation_is_an_error() {
    let err = run(&["tax-cli", "calculate", "--return", &test_data("missing_basis.toml")])
        .unwrap_err();

    let engine_error = err.downcast_ref::<EngineError>().expect("engine error in chain");
    assert!(matches!(engine_error, EngineError::CalculationFailed { .. }));
}

#[test]
fn missing_return_file_is_an_error() {
    let err = run(&["tax-cli", "calculate", "--return", "no-such-return.toml"]).unwrap_err();

    assert!(err.to_string().contains("no-such-return.toml"));
}

#[test]
fn forms_listing() {
    let output = run(&["tax-cli", "forms"]).unwrap();

    assert!(output.starts_with("form_8949 (form)"));
    assert!(output.contains("form_1040 (form)"));
}

#[test]
fn config_file_sets_default_format() {
    let config = CliConfig::load(Path::new(&test_data("tax-cli.toml"))).unwrap();
    assert_eq!(config.format, OutputFormat::Json);

    let cli = Cli::try_parse_from([
        "tax-cli",
        "--config",
        &test_data("tax-cli.toml"),
        "calculate",
        "--return",
        &test_data("single_2025.toml"),
    ])
    .unwrap();
    let output = tax_cli::run(&cli, &config).unwrap();

    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["tax_year"], 2025);
}
