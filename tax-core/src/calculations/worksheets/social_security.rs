//! Social Security Benefits Worksheet (Form 1040 lines 6a and 6b).
//!
//! Determines how much of the year's benefits is taxable: none below the base
//! amount, up to 50% between the base and adjusted base amounts, and up to 85%
//! above.
//!
//! # Worksheet Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Total benefits (SSA-1099 box 5) |
//! | 2    | Line 1 × 50% |
//! | 3    | Other income (Form 1040 lines 1z, 2b, 3b, 4b, 5b, 7, 8) |
//! | 4    | Tax-exempt interest (Form 1040 line 2a) |
//! | 5    | Line 2 + Line 3 + Line 4 |
//! | 6    | Adjustments (Schedule 1 lines 11-20, 23, 25) |
//! | 7    | Line 5 - Line 6 (if Line 6 ≥ Line 5, none taxable) |
//! | 8    | Base amount |
//! | 9    | Line 7 - Line 8 (if Line 8 ≥ Line 7, none taxable) |
//! | 10   | Adjusted base amount - base amount |
//! | 11   | Line 9 - Line 10 (not below zero) |
//! | 12   | Smaller of Line 9 or Line 10 |
//! | 13   | Line 12 × 50% |
//! | 14   | Smaller of Line 2 or Line 13 |
//! | 15   | Line 11 × 85% |
//! | 16   | Line 14 + Line 15 |
//! | 17   | Line 1 × 85% |
//! | 18   | Taxable benefits: smaller of Line 16 or Line 17 |
//!
//! Married filing separately uses a zero base amount.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{max, round_half_up};

const HALF: Decimal = dec!(0.50);
const MAX_TAXABLE_SHARE: Decimal = dec!(0.85);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityWorksheetInput {
    /// Net benefits for the year (SSA-1099 box 5, all recipients).
    pub total_benefits: Decimal,

    /// Income other than benefits that enters AGI.
    pub other_income: Decimal,

    pub tax_exempt_interest: Decimal,

    /// Adjustments to income except student loan interest.
    pub adjustments: Decimal,

    /// 25,000, 32,000 or 0 depending on filing status.
    pub base_amount: Decimal,

    /// 34,000, 44,000 or 0 depending on filing status.
    pub adjusted_base_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityWorksheetResult {
    /// Line 7: provisional income after adjustments.
    pub provisional_income: Decimal,

    /// Line 9.
    pub excess_over_base: Decimal,

    /// Line 18.
    pub taxable_benefits: Decimal,
}

/// Calculator for the Social Security Benefits Worksheet.
#[derive(Debug, Clone, Default)]
pub struct SocialSecurityWorksheet;

impl SocialSecurityWorksheet {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(
        &self,
        input: &SocialSecurityWorksheetInput,
    ) -> SocialSecurityWorksheetResult {
        let line_1 = max(input.total_benefits, Decimal::ZERO);
        if line_1.is_zero() {
            return SocialSecurityWorksheetResult {
                provisional_income: Decimal::ZERO,
                excess_over_base: Decimal::ZERO,
                taxable_benefits: Decimal::ZERO,
            };
        }

        let line_2 = round_half_up(line_1 * HALF);
        let line_5 = line_2 + input.other_income + input.tax_exempt_interest;
        let line_7 = max(line_5 - input.adjustments, Decimal::ZERO);
        let line_9 = max(line_7 - input.base_amount, Decimal::ZERO);
        let line_10 = max(input.adjusted_base_amount - input.base_amount, Decimal::ZERO);
        let line_11 = max(line_9 - line_10, Decimal::ZERO);
        let line_12 = line_9.min(line_10);
        let line_13 = round_half_up(line_12 * HALF);
        let line_14 = line_2.min(line_13);
        let line_15 = round_half_up(line_11 * MAX_TAXABLE_SHARE);
        let line_16 = line_14 + line_15;
        let line_17 = round_half_up(line_1 * MAX_TAXABLE_SHARE);

        SocialSecurityWorksheetResult {
            provisional_income: line_7,
            excess_over_base: line_9,
            taxable_benefits: line_16.min(line_17),
        }
    }
}
