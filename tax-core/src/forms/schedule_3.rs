//! Schedule 3, Additional Credits and Payments.
//!
//! Part I collects the nonrefundable education and saver's credits. Part II
//! carries excess Social Security tax withheld when a filer had more than
//! one employer.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::calculations::common::max;
use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::forms::{Form8863, Form8880};
use crate::models::{FormId, LineItems, Owner, ReturnSnapshot};

pub struct Schedule3;

/// Social Security tax withheld above the annual maximum, summed over
/// filers who had two or more employers.
///
/// A single employer that over-withholds must refund the excess itself, so
/// those amounts are not counted.
pub fn excess_social_security_tax(
    snapshot: &ReturnSnapshot,
    params: &Parameters,
) -> Decimal {
    let limit = params.payroll.max_social_security_tax();
    withholding_by_filer(snapshot)
        .into_values()
        .filter(|(employers, _)| *employers > 1)
        .map(|(_, withheld)| max(withheld - limit, Decimal::ZERO))
        .sum()
}

/// Employer count and box 4 total per filer on the return.
fn withholding_by_filer(snapshot: &ReturnSnapshot) -> BTreeMap<u8, (usize, Decimal)> {
    let joint = snapshot.filing_status.is_joint();
    let mut totals = BTreeMap::new();
    for w2 in snapshot.wages() {
        let key = match w2.owner {
            Owner::Taxpayer => 0,
            Owner::Spouse if joint => 1,
            Owner::Spouse => continue,
        };
        let entry = totals.entry(key).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += w2.box_4_ss_tax;
    }
    totals
}

impl TaxForm for Schedule3 {
    fn id(&self) -> FormId {
        FormId::Schedule3
    }

    fn title(&self) -> &'static str {
        "Schedule 3: Additional Credits and Payments"
    }

    fn activates(
        &self,
        snapshot: &ReturnSnapshot,
        params: &Parameters,
    ) -> bool {
        Form8863.activates(snapshot, params)
            || Form8880.activates(snapshot, params)
            || excess_social_security_tax(snapshot, params) > Decimal::ZERO
    }

    fn inputs(&self) -> &'static [SnapshotField] {
        &[SnapshotField::FilingStatus, SnapshotField::Wages]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        const DEPENDENCIES: &[Dependency] = &[
            Dependency::optional(FormId::Form8863, "line_19"),
            Dependency::optional(FormId::Form8880, "line_12"),
        ];
        DEPENDENCIES
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["line_3", "line_4", "line_8", "line_11", "line_15"]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let snapshot = ctx.snapshot();
        let params = ctx.params();
        let mut lines = LineItems::new();

        // Part I
        let line_3 = lines.set_amount("line_3", ctx.amount(FormId::Form8863, "line_19")?);
        let line_4 = lines.set_amount("line_4", ctx.amount(FormId::Form8880, "line_12")?);
        lines.set_amount("line_8", line_3 + line_4);

        // Part II
        let limit = params.payroll.max_social_security_tax();
        let single_employer_excess = withholding_by_filer(snapshot)
            .into_values()
            .any(|(employers, withheld)| employers == 1 && withheld > limit);
        if single_employer_excess {
            ctx.warn(
                "Social Security tax over-withheld by a single employer must be refunded by that \
                 employer",
            );
        }
        let line_11 = lines.set_amount("line_11", excess_social_security_tax(snapshot, params));
        lines.set_amount("line_15", line_11);

        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::engine::ResultStore;
    use crate::forms::testing::{evaluate, lines, store};
    use crate::models::{FilingStatusCode, IncomeItem, WageStatement};

    fn w2(
        owner: Owner,
        ss_tax: Decimal,
    ) -> IncomeItem {
        IncomeItem::Wage(WageStatement {
            owner,
            box_1_wages: ss_tax * dec!(16),
            box_4_ss_tax: ss_tax,
            ..Default::default()
        })
    }

    #[test]
    fn two_employers_over_the_maximum() {
        let params = Parameters::tax_year_2025();
        let snapshot = ReturnSnapshot::new(FilingStatusCode::Single)
            .with_income(w2(Owner::Taxpayer, dec!(7000)))
            .with_income(w2(Owner::Taxpayer, dec!(5000)));

        // 12,000 - 6.2% of 176,100
        assert_eq!(excess_social_security_tax(&snapshot, &params), dec!(1081.80));
        assert!(Schedule3.activates(&snapshot, &params));

        let (result, warnings) = evaluate(&Schedule3, &snapshot, &ResultStore::new());
        let lines = result.unwrap();

        assert_eq!(lines.amount("line_11"), dec!(1081.80));
        assert_eq!(lines.amount("line_15"), dec!(1081.80));
        assert_eq!(lines.amount("line_8"), dec!(0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn spouses_are_tested_separately() {
        let params = Parameters::tax_year_2025();
        let snapshot = ReturnSnapshot::new(FilingStatusCode::MarriedFilingJointly)
            .with_income(w2(Owner::Taxpayer, dec!(7000)))
            .with_income(w2(Owner::Spouse, dec!(7000)));

        assert_eq!(excess_social_security_tax(&snapshot, &params), dec!(0));
    }

    #[test]
    fn single_employer_excess_is_not_claimed() {
        let snapshot = ReturnSnapshot::new(FilingStatusCode::Single)
            .with_income(w2(Owner::Taxpayer, dec!(12000)));

        let (result, warnings) = evaluate(&Schedule3, &snapshot, &ResultStore::new());

        assert_eq!(result.unwrap().amount("line_11"), dec!(0));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn nonrefundable_credits_total() {
        let snapshot = ReturnSnapshot::new(FilingStatusCode::Single);
        let store = store(vec![
            (FormId::Form8863, lines(&[("line_19", dec!(1500))])),
            (FormId::Form8880, lines(&[("line_12", dec!(200))])),
        ]);

        let (result, _) = evaluate(&Schedule3, &snapshot, &store);
        let lines = result.unwrap();

        assert_eq!(lines.amount("line_3"), dec!(1500));
        assert_eq!(lines.amount("line_4"), dec!(200));
        assert_eq!(lines.amount("line_8"), dec!(1700));
    }

    #[test]
    fn plain_return_does_not_activate() {
        let snapshot = ReturnSnapshot::new(FilingStatusCode::Single)
            .with_income(w2(Owner::Taxpayer, dec!(3720)));

        assert!(!Schedule3.activates(&snapshot, &Parameters::tax_year_2025()));
    }
}
