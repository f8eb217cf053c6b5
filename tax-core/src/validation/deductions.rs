use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{ValidationIssue, ValidationSection};
use crate::calculations::common::round_half_up;
use crate::engine::Parameters;
use crate::models::{CalculationResult, FormId, ReturnSnapshot};

/// Charitable gifts above this share of AGI are flagged for review.
const REVIEW_CHARITABLE_SHARE: Decimal = dec!(0.50);

const SECTION: ValidationSection = ValidationSection::Deductions;

pub(super) fn check_inputs(
    snapshot: &ReturnSnapshot,
    issues: &mut Vec<ValidationIssue>,
) {
    for (name, amount) in snapshot.adjustments.amounts() {
        if amount < Decimal::ZERO {
            issues.push(
                ValidationIssue::error(
                    SECTION,
                    "NEGATIVE_ADJUSTMENT",
                    FormId::Schedule1,
                    format!("{} of {amount} is negative", name.replace('_', " ")),
                )
                .on(format!("adjustments.{name}")),
            );
        }
    }

    let Some(itemized) = &snapshot.itemized_deductions else {
        return;
    };
    for (name, amount) in itemized.amounts() {
        if amount < Decimal::ZERO {
            issues.push(
                ValidationIssue::error(
                    SECTION,
                    "NEGATIVE_DEDUCTION",
                    FormId::ScheduleA,
                    format!("{} of {amount} is negative", name.replace('_', " ")),
                )
                .on(format!("itemized_deductions.{name}")),
            );
        }
    }
}

pub(super) fn check_result(
    snapshot: &ReturnSnapshot,
    params: &Parameters,
    result: &CalculationResult,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(itemized) = &snapshot.itemized_deductions else {
        return;
    };
    let agi = result.agi;
    if agi <= Decimal::ZERO {
        return;
    }

    let medical = itemized.medical_expenses;
    let floor = agi * params.itemized.medical_floor_rate;
    if medical > Decimal::ZERO && medical <= floor {
        issues.push(
            ValidationIssue::warning(
                SECTION,
                "MEDICAL_BELOW_AGI_FLOOR",
                FormId::ScheduleA,
                format!(
                    "medical expenses of {medical} do not exceed {} of AGI and are not \
                     deductible",
                    round_half_up(floor)
                ),
            )
            .on("itemized_deductions.medical_expenses"),
        );
    }

    let charitable = itemized.charitable_cash + itemized.charitable_noncash;
    if charitable > agi * REVIEW_CHARITABLE_SHARE {
        issues.push(
            ValidationIssue::warning(
                SECTION,
                "EXCESSIVE_CHARITABLE",
                FormId::ScheduleA,
                format!("charitable gifts of {charitable} are more than half of AGI"),
            )
            .on("itemized_deductions"),
        );
    }
}
