//! Qualified Dividends and Capital Gain Tax Worksheet (Form 1040 line 16).
//!
//! Taxes the qualified-dividend and net-capital-gain portion of taxable income
//! at the preferential 0%/15%/20% rates and the rest at ordinary rates, then
//! keeps the smaller of that and the all-ordinary tax.
//!
//! # Worksheet Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Taxable income |
//! | 2    | Qualified dividends |
//! | 3    | Net capital gain (smaller of Schedule D lines 15 and 16, not below zero) |
//! | 4    | Line 2 + Line 3 |
//! | 5    | Line 1 - Line 4 (not below zero) |
//! | 6    | Top of the 0% capital-gain bracket |
//! | 7    | Smaller of Line 1 or Line 6 |
//! | 8    | Smaller of Line 5 or Line 7 |
//! | 9    | Line 7 - Line 8 (taxed at 0%) |
//! | 10   | Smaller of Line 1 or Line 4 |
//! | 11   | Line 9 |
//! | 12   | Line 10 - Line 11 |
//! | 13   | Top of the 15% capital-gain bracket |
//! | 14   | Smaller of Line 1 or Line 13 |
//! | 15   | Line 5 + Line 9 |
//! | 16   | Line 14 - Line 15 (not below zero) |
//! | 17   | Smaller of Line 12 or Line 16 |
//! | 18   | Line 17 × 15% |
//! | 19   | Line 9 + Line 17 |
//! | 20   | Line 10 - Line 19 |
//! | 21   | Line 20 × 20% |
//! | 22   | Tax on Line 5 (ordinary schedule) |
//! | 23   | Line 18 + Line 21 + Line 22 |
//! | 24   | Tax on Line 1 (ordinary schedule) |
//! | 25   | Smaller of Line 23 or Line 24 |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TaxBracket;
use crate::calculations::brackets::{TaxRateSchedule, TaxScheduleError};
use crate::calculations::common::{max, round_half_up};

/// Errors that can occur during QDCG worksheet calculations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QualifiedDividendsWorksheetError {
    #[error(transparent)]
    Schedule(#[from] TaxScheduleError),

    /// The capital-gain schedule must have exactly the 0%, 15% and 20% tiers.
    #[error("expected 3 capital gain brackets, found {0}")]
    CapitalGainBrackets(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedDividendsWorksheetInput {
    /// Form 1040 line 15.
    pub taxable_income: Decimal,

    /// Form 1040 line 3a.
    pub qualified_dividends: Decimal,

    /// Smaller of Schedule D lines 15 and 16, or capital gain distributions
    /// when no Schedule D is filed.
    pub net_capital_gain: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedDividendsWorksheetResult {
    /// Line 5: income taxed at ordinary rates.
    pub ordinary_income: Decimal,

    /// Line 9: preferential income taxed at 0%.
    pub zero_rate_amount: Decimal,

    /// Line 17: preferential income taxed at 15%.
    pub fifteen_rate_amount: Decimal,

    /// Line 20: preferential income taxed at 20%.
    pub twenty_rate_amount: Decimal,

    /// Line 23.
    pub worksheet_tax: Decimal,

    /// Line 24.
    pub ordinary_tax: Decimal,

    /// Line 25: the tax reported on Form 1040 line 16.
    pub tax: Decimal,
}

/// Calculator for the Qualified Dividends and Capital Gain Tax Worksheet.
#[derive(Debug, Clone)]
pub struct QualifiedDividendsWorksheet<'a> {
    ordinary: TaxRateSchedule<'a>,
    capital_gain_brackets: &'a [TaxBracket],
}

impl<'a> QualifiedDividendsWorksheet<'a> {
    pub fn new(
        ordinary_brackets: &'a [TaxBracket],
        capital_gain_brackets: &'a [TaxBracket],
    ) -> Self {
        Self {
            ordinary: TaxRateSchedule::new(ordinary_brackets),
            capital_gain_brackets,
        }
    }

    /// # Errors
    ///
    /// Returns [`QualifiedDividendsWorksheetError`] if either schedule is
    /// malformed.
    pub fn calculate(
        &self,
        input: &QualifiedDividendsWorksheetInput,
    ) -> Result<QualifiedDividendsWorksheetResult, QualifiedDividendsWorksheetError> {
        let [zero_tier, fifteen_tier, twenty_tier] = self.capital_gain_tiers()?;
        let zero_rate_threshold = zero_tier.max_income.unwrap_or(Decimal::MAX);
        let fifteen_rate_threshold = fifteen_tier.max_income.unwrap_or(Decimal::MAX);

        let line_1 = max(input.taxable_income, Decimal::ZERO);
        let line_2 = max(input.qualified_dividends, Decimal::ZERO);
        let line_3 = max(input.net_capital_gain, Decimal::ZERO);
        let line_4 = line_2 + line_3;
        let line_5 = max(line_1 - line_4, Decimal::ZERO);
        let line_7 = line_1.min(zero_rate_threshold);
        let line_8 = line_5.min(line_7);
        let line_9 = line_7 - line_8;
        let line_10 = line_1.min(line_4);
        let line_12 = line_10 - line_9;
        let line_14 = line_1.min(fifteen_rate_threshold);
        let line_15 = line_5 + line_9;
        let line_16 = max(line_14 - line_15, Decimal::ZERO);
        let line_17 = line_12.min(line_16);
        let line_18 = self.preferential_tax(line_17, fifteen_tier.tax_rate);
        let line_19 = line_9 + line_17;
        let line_20 = max(line_10 - line_19, Decimal::ZERO);
        let line_21 = self.preferential_tax(line_20, twenty_tier.tax_rate);
        let line_22 = self.ordinary.tax_on(line_5)?;
        let line_23 = round_half_up(line_18 + line_21 + line_22);
        let line_24 = self.ordinary.tax_on(line_1)?;

        Ok(QualifiedDividendsWorksheetResult {
            ordinary_income: line_5,
            zero_rate_amount: line_9,
            fifteen_rate_amount: line_17,
            twenty_rate_amount: line_20,
            worksheet_tax: line_23,
            ordinary_tax: line_24,
            tax: line_23.min(line_24),
        })
    }

    fn capital_gain_tiers(&self) -> Result<[&'a TaxBracket; 3], QualifiedDividendsWorksheetError> {
        match self.capital_gain_brackets {
            [zero, fifteen, twenty] => Ok([zero, fifteen, twenty]),
            other => Err(QualifiedDividendsWorksheetError::CapitalGainBrackets(
                other.len(),
            )),
        }
    }

    fn preferential_tax(
        &self,
        amount: Decimal,
        rate: Decimal,
    ) -> Decimal {
        round_half_up(amount * rate)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn single_ordinary() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(11925)), dec!(0.10)),
            TaxBracket::new(dec!(11925), Some(dec!(48475)), dec!(0.12)),
            TaxBracket::new(dec!(48475), Some(dec!(103350)), dec!(0.22)),
            TaxBracket::new(dec!(103350), Some(dec!(197300)), dec!(0.24)),
            TaxBracket::new(dec!(197300), Some(dec!(250525)), dec!(0.32)),
            TaxBracket::new(dec!(250525), Some(dec!(626350)), dec!(0.35)),
            TaxBracket::new(dec!(626350), None, dec!(0.37)),
        ]
    }

    fn single_capital_gain() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(48350)), dec!(0)),
            TaxBracket::new(dec!(48350), Some(dec!(533400)), dec!(0.15)),
            TaxBracket::new(dec!(533400), None, dec!(0.20)),
        ]
    }

    fn calculate(input: QualifiedDividendsWorksheetInput) -> QualifiedDividendsWorksheetResult {
        let ordinary = single_ordinary();
        let capital_gain = single_capital_gain();
        QualifiedDividendsWorksheet::new(&ordinary, &capital_gain)
            .calculate(&input)
            .unwrap()
    }

    #[test]
    fn qualified_dividends_straddling_zero_rate_threshold() {
        let result = calculate(QualifiedDividendsWorksheetInput {
            taxable_income: dec!(49250),
            qualified_dividends: dec!(2500),
            net_capital_gain: dec!(0),
        });

        assert_eq!(result.ordinary_income, dec!(46750));
        assert_eq!(result.zero_rate_amount, dec!(1600));
        assert_eq!(result.fifteen_rate_amount, dec!(900));
        assert_eq!(result.worksheet_tax, dec!(5506.50));
        assert_eq!(result.ordinary_tax, dec!(5749.00));
        assert_eq!(result.tax, dec!(5506.50));
    }

    #[test]
    fn gain_entirely_in_zero_rate_band() {
        let result = calculate(QualifiedDividendsWorksheetInput {
            taxable_income: dec!(30000),
            qualified_dividends: dec!(0),
            net_capital_gain: dec!(5000),
        });

        assert_eq!(result.zero_rate_amount, dec!(5000));
        assert_eq!(result.fifteen_rate_amount, dec!(0));
        // Tax on 25,000 at ordinary rates
        assert_eq!(result.tax, dec!(2761.50));
    }

    #[test]
    fn high_income_reaches_twenty_percent_band() {
        let result = calculate(QualifiedDividendsWorksheetInput {
            taxable_income: dec!(600000),
            qualified_dividends: dec!(0),
            net_capital_gain: dec!(100000),
        });

        // Line 14 caps the 15% band at 533,400
        assert_eq!(result.ordinary_income, dec!(500000));
        assert_eq!(result.zero_rate_amount, dec!(0));
        assert_eq!(result.fifteen_rate_amount, dec!(33400));
        assert_eq!(result.twenty_rate_amount, dec!(66600));
    }

    #[test]
    fn preferential_income_capped_at_taxable_income() {
        let result = calculate(QualifiedDividendsWorksheetInput {
            taxable_income: dec!(1000),
            qualified_dividends: dec!(5000),
            net_capital_gain: dec!(0),
        });

        assert_eq!(result.ordinary_income, dec!(0));
        assert_eq!(result.zero_rate_amount, dec!(1000));
        assert_eq!(result.tax, dec!(0));
    }

    #[test]
    fn rejects_malformed_capital_gain_schedule() {
        let ordinary = single_ordinary();
        let capital_gain = vec![TaxBracket::new(dec!(0), None, dec!(0))];
        let worksheet = QualifiedDividendsWorksheet::new(&ordinary, &capital_gain);

        let result = worksheet.calculate(&QualifiedDividendsWorksheetInput {
            taxable_income: dec!(1000),
            qualified_dividends: dec!(100),
            net_capital_gain: dec!(0),
        });

        assert_eq!(
            result,
            Err(QualifiedDividendsWorksheetError::CapitalGainBrackets(1))
        );
    }
}
