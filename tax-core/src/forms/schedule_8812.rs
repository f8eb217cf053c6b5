//! Schedule 8812, Credits for Qualifying Children and Other Dependents.
//!
//! # Line Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1-3  | Modified AGI (no foreign exclusions are modelled) |
//! | 4-5  | Qualifying children and the child tax credit before phase-out |
//! | 6-7  | Other dependents and the credit for other dependents |
//! | 8    | Total before phase-out |
//! | 9-11 | Phase-out: threshold, excess rounded up to $1,000, 5% reduction |
//! | 12   | Credit after phase-out |
//! | 13   | Credit Limit Worksheet A: tax less earlier nonrefundable credits |
//! | 14   | Nonrefundable credit (to Form 1040 line 19) |
//! | 16a  | Credit left over after line 14 |
//! | 16b  | Refundable limit per qualifying child |
//! | 17   | Smaller of 16a and 16b |
//! | 18a  | Earned income |
//! | 19-20| Earned income over the threshold, times 15% |
//! | 27   | Additional child tax credit (to Form 1040 line 28) |

use rust_decimal::Decimal;

use crate::calculations::common::{max, round_up_to_multiple};
use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::models::{Dependent, FormId, LineItems, ReturnSnapshot};

pub struct Schedule8812;

/// How a dependent counts toward the credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DependentClass {
    QualifyingChild,
    OtherDependent,
    /// Born after the end of the tax year.
    NotYetBorn,
}

fn classify(
    dependent: &Dependent,
    params: &Parameters,
) -> Option<DependentClass> {
    let ctc = &params.child_tax_credit;
    let age = dependent.age_at_year_end(params.tax_year)?;
    if age < 0 {
        return Some(DependentClass::NotYetBorn);
    }
    let qualifies = age < ctc.child_age_limit
        && dependent.months_lived_with_taxpayer >= ctc.min_months_lived_with
        && dependent.has_ssn;
    Some(if qualifies {
        DependentClass::QualifyingChild
    } else {
        DependentClass::OtherDependent
    })
}

impl TaxForm for Schedule8812 {
    fn id(&self) -> FormId {
        FormId::Schedule8812
    }

    fn title(&self) -> &'static str {
        "Schedule 8812: Credits for Qualifying Children and Other Dependents"
    }

    fn activates(
        &self,
        snapshot: &ReturnSnapshot,
        _params: &Parameters,
    ) -> bool {
        !snapshot.dependents.is_empty()
    }

    fn inputs(&self) -> &'static [SnapshotField] {
        &[SnapshotField::FilingStatus, SnapshotField::Dependents]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        const DEPENDENCIES: &[Dependency] = &[
            Dependency::required(FormId::AgiWorksheet, "line_11"),
            Dependency::required(FormId::AgiWorksheet, "earned_income"),
            Dependency::required(FormId::TaxComputation, "line_18"),
            Dependency::optional(FormId::Schedule3, "line_3"),
            Dependency::optional(FormId::Schedule3, "line_4"),
        ];
        DEPENDENCIES
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            "line_1", "line_3", "line_4", "line_5", "line_6", "line_7", "line_8", "line_9",
            "line_10", "line_11", "line_12", "line_13", "line_14", "line_16a", "line_16b",
            "line_17", "line_18a", "line_19", "line_20", "line_27",
        ]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let snapshot = ctx.snapshot();
        let params = ctx.params();
        let ctc = &params.child_tax_credit;
        let status = ctx.filing_status();

        let mut children: u32 = 0;
        let mut others: u32 = 0;
        for dependent in &snapshot.dependents {
            match classify(dependent, params) {
                Some(DependentClass::QualifyingChild) => children += 1,
                Some(DependentClass::OtherDependent) => others += 1,
                Some(DependentClass::NotYetBorn) => ctx.warn(format!(
                    "{} was born after {}; not counted",
                    dependent.display_name(),
                    params.tax_year
                )),
                None => {
                    ctx.warn(format!(
                        "{} has no date of birth; claimed as an other dependent",
                        dependent.display_name()
                    ));
                    others += 1;
                }
            }
        }

        let mut lines = LineItems::new();
        let agi = ctx.amount(FormId::AgiWorksheet, "line_11")?;
        let line_1 = lines.set_amount("line_1", agi);
        let line_3 = lines.set_amount("line_3", line_1);

        lines.set_count("line_4", children);
        let line_5 = lines.set_amount("line_5", Decimal::from(children) * ctc.credit_per_child);
        lines.set_count("line_6", others);
        let line_7 = lines.set_amount(
            "line_7",
            Decimal::from(others) * ctc.credit_per_other_dependent,
        );
        let line_8 = lines.set_amount("line_8", line_5 + line_7);

        let line_9 = lines.set_amount("line_9", *ctc.phase_out_threshold.get(status));
        let line_10 = lines.set_amount(
            "line_10",
            round_up_to_multiple(line_3 - line_9, ctc.phase_out_step),
        );
        let line_11 = lines.set_amount("line_11", line_10 * ctc.phase_out_rate);
        let line_12 = lines.set_amount("line_12", max(line_8 - line_11, Decimal::ZERO));

        // Credit Limit Worksheet A
        let tax = ctx.amount(FormId::TaxComputation, "line_18")?;
        let prior_credits = ctx.amount(FormId::Schedule3, "line_3")?
            + ctx.amount(FormId::Schedule3, "line_4")?;
        let line_13 = lines.set_amount("line_13", max(tax - prior_credits, Decimal::ZERO));
        let line_14 = lines.set_amount("line_14", line_12.min(line_13));

        // Part II-A: additional child tax credit
        let line_16a = lines.set_amount("line_16a", max(line_12 - line_14, Decimal::ZERO));
        let line_16b = lines.set_amount(
            "line_16b",
            Decimal::from(children) * ctc.refundable_limit_per_child,
        );
        let line_17 = lines.set_amount("line_17", line_16a.min(line_16b));
        let line_18a = lines.set_amount(
            "line_18a",
            ctx.amount(FormId::AgiWorksheet, "earned_income")?,
        );
        let line_19 = lines.set_amount(
            "line_19",
            max(line_18a - ctc.earned_income_threshold, Decimal::ZERO),
        );
        let line_20 = lines.set_amount("line_20", line_19 * ctc.refundable_rate);
        let line_27 = if line_16a.is_zero() {
            Decimal::ZERO
        } else {
            line_17.min(line_20)
        };
        lines.set_amount("line_27", line_27);

        Ok(lines)
    }
}
