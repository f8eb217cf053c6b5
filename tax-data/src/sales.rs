use std::io::Read;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{CapitalSale, HoldingPeriod};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading capital-asset sales.
#[derive(Debug, Error)]
pub enum SaleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("row {row}: invalid holding period '{value}' (expected short_term or long_term)")]
    InvalidHoldingPeriod { row: usize, value: String },

    #[error("row {row}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: proceeds must not be negative")]
    NegativeProceeds { row: usize },
}

impl From<csv::Error> for SaleLoaderError {
    fn from(err: csv::Error) -> Self {
        SaleLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of a broker sales export.
///
/// Columns:
/// - `description`: What was sold (e.g., "100 sh XYZ")
/// - `date_acquired`, `date_sold`: `YYYY-MM-DD`, or empty / `VARIOUS`
/// - `proceeds`: Gross proceeds
/// - `cost_basis`: Empty when the broker did not report it
/// - `adjustment_amount`: Form 8949 column (g), empty for none
/// - `holding_period`: `short_term`, `long_term`, or empty to derive from
///   the dates
/// - `basis_reported_to_irs`: `true`/`false`, `yes`/`no`, `1`/`0`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SaleRecord {
    pub description: String,
    #[serde(default)]
    pub date_acquired: Option<String>,
    #[serde(default)]
    pub date_sold: Option<String>,
    pub proceeds: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub cost_basis: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub adjustment_amount: Option<Decimal>,
    #[serde(default)]
    pub holding_period: Option<String>,
    #[serde(default)]
    pub basis_reported_to_irs: Option<String>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .replace(['$', ','], "")
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl SaleRecord {
    /// Converts the raw row into a [`CapitalSale`]. `row` is 1-based and
    /// counts data rows only.
    pub fn into_sale(
        self,
        row: usize,
    ) -> Result<CapitalSale, SaleLoaderError> {
        if self.proceeds < Decimal::ZERO {
            return Err(SaleLoaderError::NegativeProceeds { row });
        }

        Ok(CapitalSale {
            date_acquired: parse_date(row, self.date_acquired.as_deref())?,
            date_sold: parse_date(row, self.date_sold.as_deref())?,
            holding_period: parse_holding_period(row, self.holding_period.as_deref())?,
            basis_reported_to_irs: parse_flag(self.basis_reported_to_irs.as_deref()),
            description: self.description,
            proceeds: self.proceeds,
            cost_basis: self.cost_basis,
            adjustment_amount: self.adjustment_amount.unwrap_or_default(),
        })
    }
}

fn parse_date(
    row: usize,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, SaleLoaderError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(various) if various.eq_ignore_ascii_case("various") => Ok(None),
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| SaleLoaderError::InvalidDate {
                row,
                value: date.to_string(),
            }),
    }
}

fn parse_holding_period(
    row: usize,
    value: Option<&str>,
) -> Result<Option<HoldingPeriod>, SaleLoaderError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    match value.to_ascii_lowercase().as_str() {
        "short_term" | "short" => Ok(Some(HoldingPeriod::ShortTerm)),
        "long_term" | "long" => Ok(Some(HoldingPeriod::LongTerm)),
        _ => Err(SaleLoaderError::InvalidHoldingPeriod {
            row,
            value: value.to_string(),
        }),
    }
}

fn parse_flag(value: Option<&str>) -> bool {
    value
        .map(|value| value.trim().to_ascii_lowercase())
        .is_some_and(|value| matches!(value.as_str(), "true" | "yes" | "y" | "1"))
}

/// Loader for capital-asset sales from broker CSV exports.
pub struct CapitalSaleLoader;

impl CapitalSaleLoader {
    /// Parse sales from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or a
    /// byte slice. Whitespace around fields is ignored.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<CapitalSale>, SaleLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut sales = Vec::new();

        for (index, result) in csv_reader.deserialize().enumerate() {
            let record: SaleRecord = result?;
            sales.push(record.into_sale(index + 1)?);
        }

        debug!(sales = sales.len(), "parsed capital sales");
        Ok(sales)
    }
}
