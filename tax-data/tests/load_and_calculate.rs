//! Loads returns from the files in `test-data/` and runs them through the
//! standard engine.

use std::fs::File;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_core::{FilingStatusCode, FormId, HoldingPeriod, TaxEngine};
use tax_data::{CapitalSaleLoader, ReturnDocument, SnapshotLoadError};

fn test_data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test-data")
        .join(name)
}

#[test]
fn test_toml_return_with_broker_sales() {
    let document =
        ReturnDocument::load(&test_data("single_2025.toml")).expect("Failed to load return");
    let file = File::open(test_data("brokerage_2025.csv")).expect("Failed to open CSV");
    let sales = CapitalSaleLoader::parse(file).expect("Failed to parse CSV");

    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].holding_period, Some(HoldingPeriod::LongTerm));

    let document = document.with_sales(sales);
    let engine = TaxEngine::standard().expect("Failed to build engine");
    let result = engine
        .calculate(&document.tax_return, document.tax_year.unwrap_or(2025))
        .expect("Calculation failed");

    assert_eq!(result.agi, dec!(60000));
    assert_eq!(result.taxable_income, dec!(44250));
    assert_eq!(result.total_tax, dec!(3871.50));
    assert_eq!(result.refund_amount, dec!(128.50));
    assert_eq!(
        result.required_forms,
        vec![FormId::Form8949, FormId::ScheduleD, FormId::Form1040]
    );
}

#[test]
fn test_json_return_for_family() {
    let document =
        ReturnDocument::load(&test_data("family_2025.json")).expect("Failed to load return");

    assert_eq!(
        document.tax_return.filing_status,
        FilingStatusCode::MarriedFilingJointly
    );
    assert!(document.tax_return.spouse.is_some());

    let engine = TaxEngine::standard().expect("Failed to build engine");
    let result = engine
        .calculate(&document.tax_return, 2025)
        .expect("Calculation failed");

    assert_eq!(result.total_credits, dec!(4400));
    assert_eq!(result.refund_amount, dec!(4257));
    assert!(result.warnings.is_empty());
}

#[test]
fn test_missing_file_reports_path() {
    let path = test_data("does_not_exist.toml");

    let err = ReturnDocument::load(&path).expect_err("Should fail");

    let SnapshotLoadError::Io { path: reported, .. } = err else {
        panic!("Expected Io error, got: {:?}", err);
    };
    assert_eq!(reported, path);
}
