//! Per-document checks on income statements and payments.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{ValidationIssue, ValidationSection};
use crate::models::{FormId, IncomeItem, ReturnSnapshot};

/// Wages above this are flagged for review.
const REVIEW_WAGES: Decimal = dec!(10000000);

/// Roughly the largest annual Social Security benefit.
const REVIEW_BENEFITS: Decimal = dec!(60000);

const SECTION: ValidationSection = ValidationSection::Income;

pub(super) fn check(
    snapshot: &ReturnSnapshot,
    issues: &mut Vec<ValidationIssue>,
) {
    for (index, item) in snapshot.income.iter().enumerate() {
        let at = |name: &str| format!("income[{index}].{name}");
        let mut error = |code, form, field: &str, message: String| {
            issues.push(ValidationIssue::error(SECTION, code, form, message).on(at(field)))
        };
        match item {
            IncomeItem::Wage(w2) => {
                let employer = w2.employer_name.as_deref().unwrap_or("W-2");
                if w2.box_1_wages < Decimal::ZERO {
                    error(
                        "W2_NEGATIVE_WAGES",
                        FormId::Form1040,
                        "box_1_wages",
                        format!("{employer} reports negative wages of {}", w2.box_1_wages),
                    );
                }
                if w2.box_2_fed_tax_withheld < Decimal::ZERO {
                    error(
                        "W2_NEGATIVE_WITHHOLDING",
                        FormId::Form1040,
                        "box_2_fed_tax_withheld",
                        format!("{employer} reports negative withholding"),
                    );
                } else if w2.box_1_wages > Decimal::ZERO
                    && w2.box_2_fed_tax_withheld > w2.box_1_wages
                {
                    error(
                        "W2_WITHHOLDING_EXCEEDS_WAGES",
                        FormId::Form1040,
                        "box_2_fed_tax_withheld",
                        format!(
                            "{employer} withholding of {} exceeds wages of {}",
                            w2.box_2_fed_tax_withheld, w2.box_1_wages
                        ),
                    );
                }
                if w2.box_1_wages.is_zero() {
                    issues.push(
                        ValidationIssue::warning(
                            SECTION,
                            "W2_ZERO_WAGES",
                            FormId::Form1040,
                            format!("{employer} reports no wages"),
                        )
                        .on(at("box_1_wages")),
                    );
                } else if w2.box_1_wages > REVIEW_WAGES {
                    issues.push(
                        ValidationIssue::warning(
                            SECTION,
                            "W2_EXCESSIVE_WAGES",
                            FormId::Form1040,
                            format!("{employer} wages of {} are unusually high", w2.box_1_wages),
                        )
                        .on(at("box_1_wages")),
                    );
                }
            }
            IncomeItem::Interest(statement) => {
                if statement.box_1_interest < Decimal::ZERO {
                    error(
                        "INTEREST_NEGATIVE",
                        FormId::ScheduleB,
                        "box_1_interest",
                        format!("interest of {} is negative", statement.box_1_interest),
                    );
                }
                if statement.box_8_tax_exempt_interest < Decimal::ZERO {
                    error(
                        "INTEREST_NEGATIVE",
                        FormId::ScheduleB,
                        "box_8_tax_exempt_interest",
                        format!(
                            "tax-exempt interest of {} is negative",
                            statement.box_8_tax_exempt_interest
                        ),
                    );
                }
            }
            IncomeItem::Dividend(statement) => {
                let ordinary = statement.box_1a_ordinary_dividends;
                let qualified = statement.box_1b_qualified_dividends;
                if ordinary < Decimal::ZERO {
                    error(
                        "DIVIDEND_NEGATIVE_ORDINARY",
                        FormId::ScheduleB,
                        "box_1a_ordinary_dividends",
                        format!("ordinary dividends of {ordinary} are negative"),
                    );
                }
                if qualified < Decimal::ZERO {
                    error(
                        "DIVIDEND_NEGATIVE_QUALIFIED",
                        FormId::ScheduleB,
                        "box_1b_qualified_dividends",
                        format!("qualified dividends of {qualified} are negative"),
                    );
                } else if qualified > ordinary && ordinary >= Decimal::ZERO {
                    error(
                        "DIVIDEND_QUALIFIED_EXCEEDS_ORDINARY",
                        FormId::ScheduleB,
                        "box_1b_qualified_dividends",
                        format!(
                            "qualified dividends of {qualified} exceed ordinary dividends of \
                             {ordinary}"
                        ),
                    );
                }
            }
            IncomeItem::CapitalSale(sale) => {
                if sale.proceeds < Decimal::ZERO {
                    error(
                        "CAPITAL_GAIN_NEGATIVE_PROCEEDS",
                        FormId::Form8949,
                        "proceeds",
                        format!("proceeds of {} are negative", sale.proceeds),
                    );
                }
                if let Some(basis) = sale.cost_basis.filter(|basis| *basis < Decimal::ZERO) {
                    error(
                        "CAPITAL_GAIN_NEGATIVE_BASIS",
                        FormId::Form8949,
                        "cost_basis",
                        format!("cost basis of {basis} is negative"),
                    );
                }
                if sale.proceeds.is_zero() && sale.cost_basis.is_some_and(|b| b > Decimal::ZERO) {
                    issues.push(
                        ValidationIssue::warning(
                            SECTION,
                            "CAPITAL_GAIN_ZERO_PROCEEDS",
                            FormId::Form8949,
                            format!(
                                "{} has no proceeds; the full basis is claimed as a loss",
                                describe_sale(&sale.description, index)
                            ),
                        )
                        .on(at("proceeds")),
                    );
                }
            }
            IncomeItem::Retirement(distribution) => {
                let gross = distribution.box_1_gross_distribution;
                if gross < Decimal::ZERO {
                    error(
                        "RETIREMENT_NEGATIVE_DISTRIBUTION",
                        FormId::Form1040,
                        "box_1_gross_distribution",
                        format!("gross distribution of {gross} is negative"),
                    );
                }
                match distribution.box_2a_taxable_amount {
                    Some(taxable) if taxable < Decimal::ZERO => error(
                        "RETIREMENT_NEGATIVE_DISTRIBUTION",
                        FormId::Form1040,
                        "box_2a_taxable_amount",
                        format!("taxable amount of {taxable} is negative"),
                    ),
                    Some(taxable) if taxable > gross && gross >= Decimal::ZERO => {
                        issues.push(
                            ValidationIssue::warning(
                                SECTION,
                                "RETIREMENT_TAXABLE_EXCEEDS_GROSS",
                                FormId::Form1040,
                                format!(
                                    "taxable amount of {taxable} exceeds the gross \
                                     distribution of {gross}"
                                ),
                            )
                            .on(at("box_2a_taxable_amount")),
                        );
                    }
                    _ => {}
                }
            }
            IncomeItem::Unemployment(statement) => {
                if statement.box_1_unemployment < Decimal::ZERO {
                    error(
                        "UNEMPLOYMENT_NEGATIVE",
                        FormId::Schedule1,
                        "box_1_unemployment",
                        format!(
                            "unemployment compensation of {} is negative",
                            statement.box_1_unemployment
                        ),
                    );
                }
            }
            IncomeItem::SocialSecurity(statement) => {
                let benefits = statement.box_5_net_benefits;
                let (code, message) = if benefits < Decimal::ZERO {
                    (
                        "SSA_NEGATIVE_BENEFITS",
                        format!(
                            "net benefits of {benefits} are negative; repayments exceeded \
                             benefits"
                        ),
                    )
                } else if benefits > REVIEW_BENEFITS {
                    (
                        "SSA_EXCESSIVE_BENEFITS",
                        format!("net benefits of {benefits} are above the usual annual maximum"),
                    )
                } else {
                    continue;
                };
                issues.push(
                    ValidationIssue::warning(SECTION, code, FormId::Form1040, message)
                        .on(at("box_5_net_benefits")),
                );
            }
        }
    }

    if snapshot.estimated_tax_payments < Decimal::ZERO {
        issues.push(
            ValidationIssue::error(
                SECTION,
                "NEGATIVE_ESTIMATED_PAYMENTS",
                FormId::Form1040,
                format!(
                    "estimated tax payments of {} are negative",
                    snapshot.estimated_tax_payments
                ),
            )
            .on("estimated_tax_payments"),
        );
    }
}

fn describe_sale(
    description: &str,
    index: usize,
) -> String {
    if description.is_empty() {
        format!("sale #{}", index + 1)
    } else {
        description.to_string()
    }
}
