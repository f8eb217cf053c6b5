use rust_decimal::Decimal;

use super::{ValidationIssue, ValidationSection};
use crate::engine::Parameters;
use crate::models::{CalculationResult, FilingStatusCode, FormId, ReturnSnapshot};

const SECTION: ValidationSection = ValidationSection::Credits;

pub(super) fn check_inputs(
    snapshot: &ReturnSnapshot,
    params: &Parameters,
    issues: &mut Vec<ValidationIssue>,
) {
    let year = params.tax_year;
    for (index, dependent) in snapshot.dependents.iter().enumerate() {
        let name = describe(&dependent.display_name(), "dependent", index);
        let at = |field: &str| format!("dependents[{index}].{field}");

        if dependent.months_lived_with_taxpayer > 12 {
            issues.push(
                ValidationIssue::error(
                    SECTION,
                    "DEPENDENT_MONTHS_OUT_OF_RANGE",
                    FormId::Schedule8812,
                    format!(
                        "{name} lived with the taxpayer {} months; a year has 12",
                        dependent.months_lived_with_taxpayer
                    ),
                )
                .on(at("months_lived_with_taxpayer")),
            );
        }
        match dependent.age_at_year_end(year) {
            Some(age) if age < 0 => issues.push(
                ValidationIssue::error(
                    SECTION,
                    "DEPENDENT_BORN_AFTER_TAX_YEAR",
                    FormId::Schedule8812,
                    format!("{name} was born after {year}"),
                )
                .on(at("date_of_birth")),
            ),
            Some(age) if age >= params.child_tax_credit.child_age_limit => issues.push(
                ValidationIssue::warning(
                    SECTION,
                    "CTC_CHILD_TOO_OLD",
                    FormId::Schedule8812,
                    format!(
                        "{name} is {age} at the end of {year} and is claimed for the credit \
                         for other dependents"
                    ),
                )
                .on(at("date_of_birth")),
            ),
            _ => {}
        }
    }

    for (index, expense) in snapshot.education_expenses.iter().enumerate() {
        let student = describe(&expense.student_name, "student", index);
        if expense.qualified_expenses < Decimal::ZERO
            || expense.scholarships_received < Decimal::ZERO
        {
            issues.push(
                ValidationIssue::error(
                    SECTION,
                    "EDUCATION_NEGATIVE_EXPENSES",
                    FormId::Form8863,
                    format!("{student} has negative expenses or scholarships"),
                )
                .on(format!("education_expenses[{index}]")),
            );
        } else if expense.net_expenses().is_zero() {
            issues.push(
                ValidationIssue::warning(
                    SECTION,
                    "EDUCATION_NO_EXPENSES",
                    FormId::Form8863,
                    format!("{student} has no qualified expenses left after scholarships"),
                )
                .on(format!("education_expenses[{index}].qualified_expenses")),
            );
        }
    }

    for (index, contribution) in snapshot.retirement_contributions.iter().enumerate() {
        let amounts = [
            contribution.traditional_ira,
            contribution.roth_ira,
            contribution.elective_deferrals,
        ];
        if amounts.iter().any(|amount| *amount < Decimal::ZERO) {
            issues.push(
                ValidationIssue::error(
                    SECTION,
                    "CONTRIBUTION_NEGATIVE",
                    FormId::Form8880,
                    "retirement contributions must not be negative",
                )
                .on(format!("retirement_contributions[{index}]")),
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
    let status = snapshot.filing_status;
    let agi = result.agi;

    // Form 8863 already explains why these filers get no education credit.
    let claims_education = snapshot
        .education_expenses
        .iter()
        .any(|expense| expense.net_expenses() > Decimal::ZERO)
        && status != FilingStatusCode::MarriedFilingSeparately
        && !snapshot.taxpayer.can_be_claimed_as_dependent;
    if claims_education {
        let credits = &params.education_credits;
        let start = *credits.phase_out_start.get(status);
        let end = start + *credits.phase_out_range.get(status);
        if agi >= end {
            issues.push(ValidationIssue::warning(
                SECTION,
                "EDUCATION_AGI_EXCEEDS_LIMIT",
                FormId::Form8863,
                format!(
                    "AGI of {agi} is at or above {end}; education credits are fully phased out"
                ),
            ));
        } else if agi > start {
            issues.push(ValidationIssue::warning(
                SECTION,
                "EDUCATION_AGI_PHASE_OUT",
                FormId::Form8863,
                format!("AGI of {agi} is above {start}; education credits are reduced"),
            ));
        }
    }

    let contributed: Decimal = snapshot
        .retirement_contributions
        .iter()
        .map(|contribution| contribution.total())
        .sum();
    let top_tier = params.savers_credit.tiers.get(status).last();
    let exceeded = top_tier.filter(|tier| contributed > Decimal::ZERO && agi > tier.agi_limit);
    if let Some(tier) = exceeded {
        issues.push(ValidationIssue::warning(
            SECTION,
            "SAVERS_CREDIT_AGI_EXCEEDS_LIMIT",
            FormId::Form8880,
            format!(
                "AGI of {agi} is above {}; retirement contributions earn no saver's credit",
                tier.agi_limit
            ),
        ));
    }
}

/// `name`, or a positional label when it is blank.
fn describe(
    name: &str,
    label: &str,
    index: usize,
) -> String {
    if name.is_empty() {
        format!("{label} #{}", index + 1)
    } else {
        name.to_string()
    }
}
