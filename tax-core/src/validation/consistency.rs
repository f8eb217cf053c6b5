//! Cross-checks between the headline figures of a result and the Form 1040
//! lines they summarize.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{ValidationIssue, ValidationSection};
use crate::calculations::common::max;
use crate::models::{CalculationResult, FormId, ReturnSnapshot};

const TOLERANCE: Decimal = dec!(0.01);

const INCOME_LINES: &[&str] = &[
    "line_1z", "line_2b", "line_3b", "line_4b", "line_5b", "line_6b", "line_7", "line_8",
];

const OTHER_LINES: &[&str] = &[
    "line_10", "line_14", "line_25a", "line_25b", "line_25c", "line_25d",
];

pub(super) fn check(
    snapshot: &ReturnSnapshot,
    result: &CalculationResult,
    issues: &mut Vec<ValidationIssue>,
) {
    // Registries with a reduced Form 1040 are not cross-checked.
    let Some(form_1040) = result.form(FormId::Form1040) else {
        return;
    };
    if !INCOME_LINES
        .iter()
        .chain(OTHER_LINES)
        .all(|key| form_1040.contains(key))
    {
        return;
    }

    let line = |key: &str| form_1040.amount(key);
    let mut compare = |code: &'static str, what: &str, reported: Decimal, expected: Decimal| {
        if (reported - expected).abs() > TOLERANCE {
            issues.push(ValidationIssue::error(
                ValidationSection::MathConsistency,
                code,
                FormId::Form1040,
                format!("{what} is {reported} but its lines add up to {expected}"),
            ));
        }
    };

    let total_income: Decimal = INCOME_LINES.iter().map(|&key| line(key)).sum();
    compare("TOTAL_INCOME_MISMATCH", "total income", result.total_income, total_income);
    compare(
        "AGI_MISMATCH",
        "AGI",
        result.agi,
        result.total_income - line("line_10"),
    );
    compare(
        "TAXABLE_INCOME_MISMATCH",
        "taxable income",
        result.taxable_income,
        max(result.agi - line("line_14"), Decimal::ZERO),
    );

    let w2_withholding: Decimal = snapshot.wages().map(|w2| w2.box_2_fed_tax_withheld).sum();
    compare(
        "WITHHOLDING_MISMATCH",
        "W-2 withholding",
        line("line_25a"),
        w2_withholding,
    );
    compare(
        "WITHHOLDING_MISMATCH",
        "total withholding",
        line("line_25d"),
        line("line_25a") + line("line_25b") + line("line_25c"),
    );

    let balance = result.total_payments - result.total_tax;
    compare(
        "REFUND_MISMATCH",
        "the refund",
        result.refund_amount,
        max(balance, Decimal::ZERO),
    );
    compare(
        "AMOUNT_OWED_MISMATCH",
        "the amount owed",
        result.amount_owed,
        max(-balance, Decimal::ZERO),
    );

    if result.refund_amount > Decimal::ZERO && result.amount_owed > Decimal::ZERO {
        issues.push(ValidationIssue::error(
            ValidationSection::MathConsistency,
            "REFUND_AND_OWED_CONFLICT",
            FormId::Form1040,
            format!(
                "the return shows both a refund of {} and an amount owed of {}",
                result.refund_amount, result.amount_owed
            ),
        ));
    }
}
