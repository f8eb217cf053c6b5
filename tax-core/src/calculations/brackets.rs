//! Progressive tax rate schedules.
//!
//! Tax is computed by summing, for every bracket below the taxable income, the
//! portion of income inside that bracket times the bracket's rate. The result
//! is continuous at every bracket boundary.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::TaxBracket;
//! use tax_core::calculations::TaxRateSchedule;
//!
//! let brackets = vec![
//!     TaxBracket::new(dec!(0), Some(dec!(11925)), dec!(0.10)),
//!     TaxBracket::new(dec!(11925), Some(dec!(48475)), dec!(0.12)),
//!     TaxBracket::new(dec!(48475), None, dec!(0.22)),
//! ];
//!
//! let schedule = TaxRateSchedule::new(&brackets);
//!
//! assert_eq!(schedule.tax_on(dec!(44250)).unwrap(), dec!(5071.50));
//! assert_eq!(schedule.marginal_rate(dec!(44250)).unwrap(), dec!(0.12));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use crate::TaxBracket;
use crate::calculations::common::{max, round_half_up};

/// Errors that can occur when applying a tax rate schedule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxScheduleError {
    /// No tax brackets were provided for the calculation.
    #[error("no tax brackets provided")]
    NoTaxBrackets,

    /// No tax bracket found for the given taxable income.
    #[error("no tax bracket found for taxable income {0}")]
    NoMatchingBracket(Decimal),
}

/// A rate schedule over a slice of ascending, contiguous brackets.
#[derive(Debug, Clone, Copy)]
pub struct TaxRateSchedule<'a> {
    tax_brackets: &'a [TaxBracket],
}

impl<'a> TaxRateSchedule<'a> {
    /// Creates a schedule over the given brackets.
    ///
    /// Brackets should be sorted by `min_income` in ascending order and the
    /// last bracket should have `max_income` as `None`.
    pub fn new(tax_brackets: &'a [TaxBracket]) -> Self {
        Self { tax_brackets }
    }

    pub fn brackets(&self) -> &'a [TaxBracket] {
        self.tax_brackets
    }

    /// Tax on `taxable_income`, rounded to cents.
    ///
    /// # Errors
    ///
    /// Returns [`TaxScheduleError`] if:
    /// - No tax brackets were provided
    /// - The income lies above a closed top bracket
    pub fn tax_on(
        &self,
        taxable_income: Decimal,
    ) -> Result<Decimal, TaxScheduleError> {
        if self.tax_brackets.is_empty() {
            return Err(TaxScheduleError::NoTaxBrackets);
        }
        if taxable_income <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        self.bracket_for(taxable_income)?;

        let tax = self
            .tax_brackets
            .iter()
            .filter(|bracket| taxable_income > bracket.min_income)
            .map(|bracket| {
                let top = bracket
                    .max_income
                    .map_or(taxable_income, |max_income| taxable_income.min(max_income));
                max(top - bracket.min_income, Decimal::ZERO) * bracket.tax_rate
            })
            .sum::<Decimal>();

        Ok(round_half_up(tax))
    }

    /// Rate applied to the next dollar of income.
    ///
    /// Zero or negative income reports the first bracket's rate.
    pub fn marginal_rate(
        &self,
        taxable_income: Decimal,
    ) -> Result<Decimal, TaxScheduleError> {
        let first = self
            .tax_brackets
            .first()
            .ok_or(TaxScheduleError::NoTaxBrackets)?;
        if taxable_income <= first.min_income {
            return Ok(first.tax_rate);
        }
        self.bracket_for(taxable_income)
            .map(|bracket| bracket.tax_rate)
    }

    fn bracket_for(
        &self,
        taxable_income: Decimal,
    ) -> Result<&'a TaxBracket, TaxScheduleError> {
        self.tax_brackets
            .iter()
            .find(|bracket| bracket.contains(taxable_income))
            .ok_or(TaxScheduleError::NoMatchingBracket(taxable_income))
    }
}
