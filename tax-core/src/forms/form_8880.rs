//! Form 8880, Credit for Qualified Retirement Savings Contributions.
//!
//! Lines 1 through 5 are collapsed into a single per-person total capped at
//! the contribution limit (line 6a for the taxpayer, 6b for the spouse).
//! Distributions received during the testing period are not modelled.

use rust_decimal::Decimal;

use crate::calculations::common::max;
use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::models::{FormId, LineItems, Owner, Person, ReturnSnapshot};

pub struct Form8880;

impl TaxForm for Form8880 {
    fn id(&self) -> FormId {
        FormId::Form8880
    }

    fn title(&self) -> &'static str {
        "Form 8880: Credit for Qualified Retirement Savings Contributions"
    }

    fn activates(
        &self,
        snapshot: &ReturnSnapshot,
        _params: &Parameters,
    ) -> bool {
        snapshot
            .retirement_contributions
            .iter()
            .any(|contribution| contribution.total() > Decimal::ZERO)
    }

    fn inputs(&self) -> &'static [SnapshotField] {
        &[
            SnapshotField::FilingStatus,
            SnapshotField::Taxpayer,
            SnapshotField::Spouse,
            SnapshotField::RetirementContributions,
        ]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        const DEPENDENCIES: &[Dependency] = &[
            Dependency::required(FormId::AgiWorksheet, "line_11"),
            Dependency::required(FormId::TaxComputation, "line_18"),
            Dependency::optional(FormId::Form8863, "line_19"),
        ];
        DEPENDENCIES
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            "line_6a", "line_6b", "line_7", "line_8", "line_9", "line_10", "line_11", "line_12",
        ]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let snapshot = ctx.snapshot();
        let params = ctx.params();
        let savers = &params.savers_credit;
        let status = ctx.filing_status();

        let spouse_contributions = contributions(snapshot, Owner::Spouse);
        if !status.is_joint() && spouse_contributions > Decimal::ZERO {
            ctx.warn("spouse contributions are only counted on a joint return");
        }

        let mut lines = LineItems::new();
        let taxpayer = self.eligible_contributions(ctx, Owner::Taxpayer, Some(&snapshot.taxpayer))?;
        let line_6a = lines.set_amount("line_6a", taxpayer);
        let spouse = if status.is_joint() {
            self.eligible_contributions(ctx, Owner::Spouse, snapshot.spouse.as_ref())?
        } else {
            Decimal::ZERO
        };
        let line_6b = lines.set_amount("line_6b", spouse);
        let line_7 = lines.set_amount("line_7", line_6a + line_6b);

        let line_8 = lines.set_amount("line_8", ctx.amount(FormId::AgiWorksheet, "line_11")?);
        let rate = savers.rate_for(savers.tiers.get(status), line_8);
        lines.set_rate("line_9", rate);
        let line_10 = lines.set_amount("line_10", line_7 * rate);

        // Credit Limit Worksheet
        let tax = ctx.amount(FormId::TaxComputation, "line_18")?;
        let education_credits = ctx.amount(FormId::Form8863, "line_19")?;
        let line_11 = lines.set_amount("line_11", max(tax - education_credits, Decimal::ZERO));
        lines.set_amount("line_12", line_10.min(line_11));

        Ok(lines)
    }
}

impl Form8880 {
    /// Contributions by `owner` that count toward the credit, capped at the
    /// per-person limit.
    fn eligible_contributions(
        &self,
        ctx: &mut FormContext<'_>,
        owner: Owner,
        person: Option<&Person>,
    ) -> Result<Decimal, EvaluationError> {
        let snapshot = ctx.snapshot();
        let params = ctx.params();
        let total = contributions(snapshot, owner);
        if total <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let label = match owner {
            Owner::Taxpayer => "taxpayer",
            Owner::Spouse => "spouse",
        };
        let Some(person) = person else {
            return Err(EvaluationError::missing(label));
        };
        if person.date_of_birth.is_none() {
            return Err(EvaluationError::missing(format!("{label}.date_of_birth")));
        }

        let reason = if !person.is_at_least(params.savers_credit.min_age, params.tax_year) {
            Some("is under the minimum age")
        } else if person.is_full_time_student {
            Some("is a full-time student")
        } else if person.can_be_claimed_as_dependent {
            Some("can be claimed as a dependent")
        } else {
            None
        };
        if let Some(reason) = reason {
            ctx.warn(format!(
                "{label} {reason}; contributions do not qualify for the saver's credit"
            ));
            return Ok(Decimal::ZERO);
        }

        Ok(total.min(params.savers_credit.contribution_limit))
    }
}

fn contributions(
    snapshot: &ReturnSnapshot,
    owner: Owner,
) -> Decimal {
    snapshot
        .retirement_contributions
        .iter()
        .filter(|contribution| contribution.contributor == owner)
        .map(|contribution| contribution.total())
        .sum()
}
