//! Form 8863, Education Credits.
//!
//! # Line Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Tentative American opportunity credit, all students |
//! | 2-6  | Phase-out: upper limit, AGI, difference, range, fraction kept |
//! | 7    | American opportunity credit after phase-out |
//! | 8    | Refundable part (40%), to Form 1040 line 29 |
//! | 9    | Nonrefundable part |
//! | 10   | Lifetime learning expenses, all students |
//! | 11   | Smaller of line 10 or the expense limit |
//! | 12   | Tentative lifetime learning credit (20%) |
//! | 18   | Lifetime learning credit after phase-out |
//! | 19   | Nonrefundable credits, limited by tax (to Schedule 3 line 3) |

use rust_decimal::Decimal;

use crate::calculations::common::max;
use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::forms::retained_fraction;
use crate::models::{
    EducationCreditType, EducationExpense, FilingStatusCode, FormId, LineItems, ReturnSnapshot,
};

pub struct Form8863;

impl TaxForm for Form8863 {
    fn id(&self) -> FormId {
        FormId::Form8863
    }

    fn title(&self) -> &'static str {
        "Form 8863: Education Credits"
    }

    fn activates(
        &self,
        snapshot: &ReturnSnapshot,
        _params: &Parameters,
    ) -> bool {
        !snapshot.education_expenses.is_empty()
    }

    fn inputs(&self) -> &'static [SnapshotField] {
        &[
            SnapshotField::FilingStatus,
            SnapshotField::Taxpayer,
            SnapshotField::EducationExpenses,
        ]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        const DEPENDENCIES: &[Dependency] = &[
            Dependency::required(FormId::AgiWorksheet, "line_11"),
            Dependency::required(FormId::TaxComputation, "line_18"),
        ];
        DEPENDENCIES
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            "line_1", "line_2", "line_3", "line_4", "line_5", "line_6", "line_7", "line_8",
            "line_9", "line_10", "line_11", "line_12", "line_18", "line_19",
        ]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let snapshot = ctx.snapshot();
        let credits = &ctx.params().education_credits;
        let status = ctx.filing_status();
        let agi = ctx.amount(FormId::AgiWorksheet, "line_11")?;
        let tax = ctx.amount(FormId::TaxComputation, "line_18")?;

        let ineligible_filer = if status == FilingStatusCode::MarriedFilingSeparately {
            Some("education credits are not allowed when married filing separately")
        } else if snapshot.taxpayer.can_be_claimed_as_dependent {
            Some("education credits are not allowed for a filer claimed as a dependent")
        } else {
            None
        };
        if let Some(reason) = ineligible_filer {
            ctx.warn(reason);
        }

        let mut aotc = Decimal::ZERO;
        let mut llc_expenses = Decimal::ZERO;
        if ineligible_filer.is_none() {
            for (index, expense) in snapshot.education_expenses.iter().enumerate() {
                validate(index, expense)?;
                match expense.credit_type {
                    EducationCreditType::AmericanOpportunity if expense.is_aotc_eligible() => {
                        aotc += self.tentative_aotc(ctx.params(), expense.net_expenses());
                    }
                    EducationCreditType::AmericanOpportunity => {
                        ctx.warn(format!(
                            "{} does not qualify for the American opportunity credit; \
                             expenses claimed for the lifetime learning credit",
                            expense.student_name
                        ));
                        llc_expenses += expense.net_expenses();
                    }
                    EducationCreditType::LifetimeLearning => {
                        llc_expenses += expense.net_expenses();
                    }
                }
            }
        }

        let mut lines = LineItems::new();
        let start = *credits.phase_out_start.get(status);
        let range = *credits.phase_out_range.get(status);

        // Part I: refundable American opportunity credit
        let line_1 = lines.set_amount("line_1", aotc);
        let line_2 = lines.set_amount("line_2", start + range);
        let line_3 = lines.set_amount("line_3", agi);
        let line_4 = lines.set_amount("line_4", max(line_2 - line_3, Decimal::ZERO));
        lines.set_amount("line_5", range);
        let fraction = if line_4.is_zero() {
            Decimal::ZERO
        } else {
            retained_fraction(agi, start, range)
        };
        lines.set_rate("line_6", fraction);
        let line_7 = lines.set_amount("line_7", line_1 * fraction);
        let line_8 = lines.set_amount("line_8", line_7 * credits.aotc_refundable_rate);

        // Part II: nonrefundable credits
        let line_9 = lines.set_amount("line_9", line_7 - line_8);
        let line_10 = lines.set_amount("line_10", llc_expenses);
        let line_11 = lines.set_amount("line_11", line_10.min(credits.llc_expense_limit));
        let line_12 = lines.set_amount("line_12", line_11 * credits.llc_rate);
        let line_18 = lines.set_amount("line_18", line_12 * fraction);

        // Credit Limit Worksheet
        lines.set_amount("line_19", (line_9 + line_18).min(max(tax, Decimal::ZERO)));

        Ok(lines)
    }
}

impl Form8863 {
    /// Part III line 30 for one student.
    fn tentative_aotc(
        &self,
        params: &Parameters,
        net_expenses: Decimal,
    ) -> Decimal {
        let credits = &params.education_credits;
        let full_rate = net_expenses.min(credits.aotc_full_rate_expenses);
        let partial_rate = max(net_expenses - credits.aotc_full_rate_expenses, Decimal::ZERO)
            .min(credits.aotc_partial_rate_expenses);
        full_rate + partial_rate * credits.aotc_partial_rate
    }
}

fn validate(
    index: usize,
    expense: &EducationExpense,
) -> Result<(), EvaluationError> {
    if expense.qualified_expenses < Decimal::ZERO || expense.scholarships_received < Decimal::ZERO {
        return Err(EvaluationError::OutOfRange {
            field: format!("education_expenses[{index}]"),
            message: "expenses and scholarships must not be negative".to_string(),
        });
    }
    Ok(())
}
