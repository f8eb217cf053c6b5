//! Schedule 1, Additional Income and Adjustments to Income.
//!
//! Part I carries unemployment compensation (line 7) and other income
//! (line 8z) to Form 1040 line 8. Part II totals the modelled adjustments
//! into line 26, which becomes Form 1040 line 10.
//!
//! The student loan interest phase-out uses modified AGI computed without
//! that deduction and without taxable Social Security benefits.

use rust_decimal::Decimal;

use crate::calculations::common::max;
use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::forms::{RetirementTotals, interest_and_dividends, retained_fraction};
use crate::models::{FilingStatusCode, FormId, LineItems, ReturnSnapshot};

pub struct Schedule1;

impl TaxForm for Schedule1 {
    fn id(&self) -> FormId {
        FormId::Schedule1
    }

    fn title(&self) -> &'static str {
        "Schedule 1: Additional Income and Adjustments to Income"
    }

    fn activates(
        &self,
        snapshot: &ReturnSnapshot,
        _params: &Parameters,
    ) -> bool {
        snapshot.total_unemployment() > Decimal::ZERO
            || !snapshot.other_income.is_zero()
            || !snapshot.adjustments.is_empty()
    }

    fn inputs(&self) -> &'static [SnapshotField] {
        &[
            SnapshotField::FilingStatus,
            SnapshotField::Unemployment,
            SnapshotField::OtherIncome,
            SnapshotField::Adjustments,
            SnapshotField::Wages,
            SnapshotField::Interest,
            SnapshotField::Dividends,
            SnapshotField::RetirementDistributions,
        ]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        const DEPENDENCIES: &[Dependency] = &[
            Dependency::conditional(FormId::ScheduleB, "line_4"),
            Dependency::conditional(FormId::ScheduleB, "line_6"),
            Dependency::conditional(FormId::ScheduleD, "line_21"),
        ];
        DEPENDENCIES
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            "line_7",
            "line_8z",
            "line_9",
            "line_10",
            "line_11",
            "line_13",
            "line_20",
            "line_21",
            "line_26",
            "student_loan_magi",
        ]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let snapshot = ctx.snapshot();
        let params = ctx.params();
        let adjustments = &snapshot.adjustments;
        let mut lines = LineItems::new();

        // Part I: additional income
        let line_7 = lines.set_amount("line_7", snapshot.total_unemployment());
        let line_8z = lines.set_amount("line_8z", snapshot.other_income);
        let line_9 = lines.set_amount("line_9", line_8z);
        let line_10 = lines.set_amount("line_10", line_7 + line_9);

        // Part II: adjustments
        let limit = params.educator_expense_limit;
        let mut educator = adjustments.educator_expenses_taxpayer.min(limit);
        if ctx.filing_status().is_joint() {
            educator += adjustments.educator_expenses_spouse.min(limit);
        } else if !adjustments.educator_expenses_spouse.is_zero() {
            ctx.warn("spouse educator expenses ignored on a return that is not joint");
        }
        let line_11 = lines.set_amount("line_11", max(educator, Decimal::ZERO));
        let line_13 = lines.set_amount("line_13", max(adjustments.hsa_deduction, Decimal::ZERO));
        let line_20 = lines.set_amount("line_20", max(adjustments.ira_deduction, Decimal::ZERO));

        let (interest, dividends) = interest_and_dividends(ctx)?;
        let capital_gain = ctx.amount(FormId::ScheduleD, "line_21")?;
        let magi = snapshot.total_wages()
            + interest
            + dividends
            + RetirementTotals::from_snapshot(snapshot).taxable()
            + capital_gain
            + line_10
            - (line_11 + line_13 + line_20);
        lines.set_amount("student_loan_magi", magi);

        let line_21 = self.student_loan_interest(ctx, magi);
        let line_21 = lines.set_amount("line_21", line_21);

        lines.set_amount("line_26", line_11 + line_13 + line_20 + line_21);
        Ok(lines)
    }
}

impl Schedule1 {
    /// Student Loan Interest Deduction Worksheet.
    fn student_loan_interest(
        &self,
        ctx: &mut FormContext<'_>,
        magi: Decimal,
    ) -> Decimal {
        let paid = max(ctx.snapshot().adjustments.student_loan_interest, Decimal::ZERO);
        if paid.is_zero() {
            return Decimal::ZERO;
        }
        let status = ctx.filing_status();
        if status == FilingStatusCode::MarriedFilingSeparately {
            ctx.warn("student loan interest is not deductible when married filing separately");
            return Decimal::ZERO;
        }

        let limits = &ctx.params().student_loan_interest;
        let capped = paid.min(limits.max_deduction);
        let retained = retained_fraction(
            magi,
            *limits.phase_out_start.get(status),
            *limits.phase_out_range.get(status),
        );
        capped * retained
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::engine::ResultStore;
    use crate::forms::testing::evaluate;
    use crate::models::{Adjustments, IncomeItem, UnemploymentCompensation, WageStatement};

    fn snapshot(
        status: FilingStatusCode,
        wages: Decimal,
        adjustments: Adjustments,
    ) -> ReturnSnapshot {
        let mut snapshot = ReturnSnapshot::new(status).with_income(IncomeItem::Wage(WageStatement {
            box_1_wages: wages,
            ..Default::default()
        }));
        snapshot.adjustments = adjustments;
        snapshot
    }

    #[test]
    fn unemployment_and_other_income_flow_to_line_10() {
        let mut snapshot = ReturnSnapshot::new(FilingStatusCode::Single).with_income(
            IncomeItem::Unemployment(UnemploymentCompensation {
                box_1_unemployment: dec!(4200),
                ..Default::default()
            }),
        );
        snapshot.other_income = dec!(300);

        let (result, _) = evaluate(&Schedule1, &snapshot, &ResultStore::new());
        let lines = result.unwrap();

        assert_eq!(lines.amount("line_7"), dec!(4200));
        assert_eq!(lines.amount("line_9"), dec!(300));
        assert_eq!(lines.amount("line_10"), dec!(4500));
        assert_eq!(lines.amount("line_26"), dec!(0));
    }

    #[test]
    fn educator_expenses_capped_per_educator() {
        let snapshot = snapshot(
            FilingStatusCode::MarriedFilingJointly,
            dec!(90000),
            Adjustments {
                educator_expenses_taxpayer: dec!(450),
                educator_expenses_spouse: dec!(120),
                ..Default::default()
            },
        );

        let (result, _) = evaluate(&Schedule1, &snapshot, &ResultStore::new());

        assert_eq!(result.unwrap().amount("line_11"), dec!(420));
    }

    #[test]
    fn student_loan_interest_capped_below_phase_out() {
        let snapshot = snapshot(
            FilingStatusCode::Single,
            dec!(60000),
            Adjustments {
                student_loan_interest: dec!(3100),
                ..Default::default()
            },
        );

        let (result, _) = evaluate(&Schedule1, &snapshot, &ResultStore::new());
        let lines = result.unwrap();

        assert_eq!(lines.amount("line_21"), dec!(2500));
        assert_eq!(lines.amount("line_26"), dec!(2500));
    }

    #[test]
    fn student_loan_interest_partially_phased_out() {
        let snapshot = snapshot(
            FilingStatusCode::Single,
            dec!(90000),
            Adjustments {
                student_loan_interest: dec!(2000),
                ..Default::default()
            },
        );

        let (result, _) = evaluate(&Schedule1, &snapshot, &ResultStore::new());

        // (100,000 - 90,000) / 15,000 = 0.667 retained
        assert_eq!(result.unwrap().amount("line_21"), dec!(1334));
    }

    #[test]
    fn student_loan_interest_denied_when_married_filing_separately() {
        let snapshot = snapshot(
            FilingStatusCode::MarriedFilingSeparately,
            dec!(40000),
            Adjustments {
                student_loan_interest: dec!(1000),
                ..Default::default()
            },
        );

        let (result, warnings) = evaluate(&Schedule1, &snapshot, &ResultStore::new());

        assert_eq!(result.unwrap().amount("line_21"), dec!(0));
        assert_eq!(warnings.len(), 1);
    }
}
