//! Magnitude limits on entered amounts.
//!
//! Form arithmetic multiplies and sums amounts without overflow checks. Every
//! amount is held to [`MAX_AMOUNT`] and their absolute sum to
//! [`MAX_RETURN_TOTAL`], which keeps every intermediate well inside
//! [`Decimal`]'s range.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{ValidationIssue, ValidationSection};
use crate::models::{FormId, IncomeItem, ReturnSnapshot};

/// Largest magnitude accepted for a single amount.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Largest accepted sum of the magnitudes of every amount on a return.
pub const MAX_RETURN_TOTAL: Decimal = dec!(100000000000000);

const SECTION: ValidationSection = ValidationSection::Amounts;

pub(super) fn check(snapshot: &ReturnSnapshot) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut total = Some(Decimal::ZERO);
    for (field, amount) in amounts(snapshot) {
        let magnitude = amount.abs();
        if magnitude > MAX_AMOUNT {
            issues.push(
                ValidationIssue::error(
                    SECTION,
                    "AMOUNT_OUT_OF_RANGE",
                    FormId::Form1040,
                    format!("{amount} is outside the supported range of +/-{MAX_AMOUNT}"),
                )
                .on(field),
            );
        }
        total = total.and_then(|sum| sum.checked_add(magnitude));
    }

    if issues.is_empty() && total.is_none_or(|sum| sum > MAX_RETURN_TOTAL) {
        issues.push(ValidationIssue::error(
            SECTION,
            "RETURN_TOTAL_OUT_OF_RANGE",
            FormId::Form1040,
            format!("the amounts on this return add up to more than {MAX_RETURN_TOTAL}"),
        ));
    }
    issues
}

/// Every monetary input on the return, keyed by its snapshot path.
fn amounts(snapshot: &ReturnSnapshot) -> Vec<(String, Decimal)> {
    let mut amounts = Vec::new();
    let mut push = |field: String, amount: Decimal| amounts.push((field, amount));

    for (index, item) in snapshot.income.iter().enumerate() {
        let at = |name: &str| format!("income[{index}].{name}");
        match item {
            IncomeItem::Wage(w2) => {
                push(at("box_1_wages"), w2.box_1_wages);
                push(at("box_2_fed_tax_withheld"), w2.box_2_fed_tax_withheld);
                push(at("box_3_ss_wages"), w2.box_3_ss_wages);
                push(at("box_4_ss_tax"), w2.box_4_ss_tax);
                push(at("box_5_medicare_wages"), w2.box_5_medicare_wages);
                push(at("box_6_medicare_tax"), w2.box_6_medicare_tax);
            }
            IncomeItem::Interest(statement) => {
                push(at("box_1_interest"), statement.box_1_interest);
                push(at("box_4_fed_tax_withheld"), statement.box_4_fed_tax_withheld);
                push(at("box_8_tax_exempt_interest"), statement.box_8_tax_exempt_interest);
            }
            IncomeItem::Dividend(statement) => {
                push(at("box_1a_ordinary_dividends"), statement.box_1a_ordinary_dividends);
                push(at("box_1b_qualified_dividends"), statement.box_1b_qualified_dividends);
                push(at("box_2a_total_capital_gain"), statement.box_2a_total_capital_gain);
                push(at("box_4_fed_tax_withheld"), statement.box_4_fed_tax_withheld);
            }
            IncomeItem::CapitalSale(sale) => {
                push(at("proceeds"), sale.proceeds);
                push(at("cost_basis"), sale.cost_basis.unwrap_or_default());
                push(at("adjustment_amount"), sale.adjustment_amount);
            }
            IncomeItem::Retirement(distribution) => {
                push(at("box_1_gross_distribution"), distribution.box_1_gross_distribution);
                push(
                    at("box_2a_taxable_amount"),
                    distribution.box_2a_taxable_amount.unwrap_or_default(),
                );
                push(at("box_4_fed_tax_withheld"), distribution.box_4_fed_tax_withheld);
            }
            IncomeItem::Unemployment(statement) => {
                push(at("box_1_unemployment"), statement.box_1_unemployment);
                push(at("box_4_fed_tax_withheld"), statement.box_4_fed_tax_withheld);
            }
            IncomeItem::SocialSecurity(statement) => {
                push(at("box_5_net_benefits"), statement.box_5_net_benefits);
                push(at("box_6_voluntary_withholding"), statement.box_6_voluntary_withholding);
            }
        }
    }

    push("other_income".to_string(), snapshot.other_income);
    push("estimated_tax_payments".to_string(), snapshot.estimated_tax_payments);
    for (name, amount) in snapshot.adjustments.amounts() {
        push(format!("adjustments.{name}"), amount);
    }
    if let Some(itemized) = &snapshot.itemized_deductions {
        for (name, amount) in itemized.amounts() {
            push(format!("itemized_deductions.{name}"), amount);
        }
    }
    for (index, expense) in snapshot.education_expenses.iter().enumerate() {
        push(
            format!("education_expenses[{index}].qualified_expenses"),
            expense.qualified_expenses,
        );
        push(
            format!("education_expenses[{index}].scholarships_received"),
            expense.scholarships_received,
        );
    }
    for (index, contribution) in snapshot.retirement_contributions.iter().enumerate() {
        push(
            format!("retirement_contributions[{index}].traditional_ira"),
            contribution.traditional_ira,
        );
        push(
            format!("retirement_contributions[{index}].roth_ira"),
            contribution.roth_ira,
        );
        push(
            format!("retirement_contributions[{index}].elective_deferrals"),
            contribution.elective_deferrals,
        );
    }
    push(
        "capital_loss_carryover.short_term".to_string(),
        snapshot.capital_loss_carryover.short_term,
    );
    push(
        "capital_loss_carryover.long_term".to_string(),
        snapshot.capital_loss_carryover.long_term,
    );
    amounts
}
