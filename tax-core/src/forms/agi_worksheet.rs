//! Form 1040 lines 1a through 11, split out so later forms can read AGI
//! before Form 1040 itself is assembled.
//!
//! # Worksheet Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1a   | W-2 box 1 wages |
//! | 1z   | Total wages (line 1a; lines 1b-1h are not modelled) |
//! | 2a   | Tax-exempt interest |
//! | 2b   | Taxable interest (Schedule B line 4, or the statements) |
//! | 3a   | Qualified dividends |
//! | 3b   | Ordinary dividends (Schedule B line 6, or the statements) |
//! | 4a/b | IRA distributions, gross and taxable |
//! | 5a/b | Pensions and annuities, gross and taxable |
//! | 6a/b | Social Security benefits, gross and taxable |
//! | 7    | Capital gain or loss (Schedule D line 21) |
//! | 8    | Additional income (Schedule 1 line 10) |
//! | 9    | Total income |
//! | 10   | Adjustments to income (Schedule 1 line 26) |
//! | 11   | Adjusted gross income |

use crate::calculations::{SocialSecurityWorksheet, SocialSecurityWorksheetInput};
use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::forms::{RetirementTotals, interest_and_dividends};
use crate::models::{FormId, FormKind, LineItems, ReturnSnapshot};

pub struct AgiWorksheet;

impl TaxForm for AgiWorksheet {
    fn id(&self) -> FormId {
        FormId::AgiWorksheet
    }

    fn title(&self) -> &'static str {
        "Form 1040 lines 1-11: Income and Adjusted Gross Income"
    }

    fn kind(&self) -> FormKind {
        FormKind::Worksheet
    }

    fn activates(
        &self,
        _snapshot: &ReturnSnapshot,
        _params: &Parameters,
    ) -> bool {
        true
    }

    fn inputs(&self) -> &'static [SnapshotField] {
        &[
            SnapshotField::FilingStatus,
            SnapshotField::Wages,
            SnapshotField::Interest,
            SnapshotField::Dividends,
            SnapshotField::RetirementDistributions,
            SnapshotField::SocialSecurity,
        ]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        const DEPENDENCIES: &[Dependency] = &[
            Dependency::conditional(FormId::ScheduleB, "line_4"),
            Dependency::conditional(FormId::ScheduleB, "line_6"),
            Dependency::conditional(FormId::ScheduleD, "line_21"),
            Dependency::conditional(FormId::Schedule1, "line_10"),
            Dependency::conditional(FormId::Schedule1, "line_26"),
        ];
        DEPENDENCIES
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            "line_1a",
            "line_1z",
            "line_2a",
            "line_2b",
            "line_3a",
            "line_3b",
            "line_4a",
            "line_4b",
            "line_5a",
            "line_5b",
            "line_6a",
            "line_6b",
            "line_7",
            "line_8",
            "line_9",
            "line_10",
            "line_11",
            "earned_income",
        ]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let snapshot = ctx.snapshot();
        let mut lines = LineItems::new();

        let line_1a = lines.set_amount("line_1a", snapshot.total_wages());
        let line_1z = lines.set_amount("line_1z", line_1a);
        lines.set_amount("earned_income", line_1z);

        let (interest, dividends) = interest_and_dividends(ctx)?;
        let line_2a = lines.set_amount("line_2a", snapshot.tax_exempt_interest());
        let line_2b = lines.set_amount("line_2b", interest);
        lines.set_amount("line_3a", snapshot.qualified_dividends());
        let line_3b = lines.set_amount("line_3b", dividends);

        let retirement = RetirementTotals::from_snapshot(snapshot);
        if retirement.undetermined > 0 {
            ctx.warn(format!(
                "{} retirement distribution(s) without a determined taxable amount; \
                 the gross distribution was treated as taxable",
                retirement.undetermined
            ));
        }
        lines.set_amount("line_4a", retirement.ira_gross);
        let line_4b = lines.set_amount("line_4b", retirement.ira_taxable);
        lines.set_amount("line_5a", retirement.pension_gross);
        let line_5b = lines.set_amount("line_5b", retirement.pension_taxable);

        let line_7 = lines.set_amount("line_7", ctx.amount(FormId::ScheduleD, "line_21")?);
        let line_8 = lines.set_amount("line_8", ctx.amount(FormId::Schedule1, "line_10")?);
        let line_10 = ctx.amount(FormId::Schedule1, "line_26")?;

        let benefits = snapshot.total_social_security_benefits();
        let line_6a = lines.set_amount("line_6a", benefits);
        let status = ctx.filing_status();
        let thresholds = &ctx.params().social_security_benefits;
        let worksheet = SocialSecurityWorksheet::new().calculate(&SocialSecurityWorksheetInput {
            total_benefits: line_6a,
            other_income: line_1z + line_2b + line_3b + line_4b + line_5b + line_7 + line_8,
            tax_exempt_interest: line_2a,
            adjustments: line_10,
            base_amount: *thresholds.base_amount.get(status),
            adjusted_base_amount: *thresholds.adjusted_base_amount.get(status),
        });
        let line_6b = lines.set_amount("line_6b", worksheet.taxable_benefits);

        let line_9 = lines.set_amount(
            "line_9",
            line_1z + line_2b + line_3b + line_4b + line_5b + line_6b + line_7 + line_8,
        );
        let line_10 = lines.set_amount("line_10", line_10);
        lines.set_amount("line_11", line_9 - line_10);

        Ok(lines)
    }
}
