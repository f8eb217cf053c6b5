//! Form 1040 lines 12 through 18: deduction, taxable income and tax.
//!
//! The larger of the standard deduction and Schedule A line 17 is taken;
//! a tie keeps the standard deduction. Tax on line 16 comes from the
//! Qualified Dividends and Capital Gain Tax Worksheet whenever there are
//! qualified dividends or a net capital gain, otherwise from the ordinary
//! rate schedule.

use rust_decimal::Decimal;

use crate::calculations::common::max;
use crate::calculations::{
    QualifiedDividendsWorksheet, QualifiedDividendsWorksheetInput, TaxRateSchedule,
};
use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::models::{FormId, FormKind, LineItems, ReturnSnapshot};

pub struct TaxComputation;

/// Standard deduction for the return, including the additional amounts for
/// age and blindness and the dependent-filer limitation.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::forms::standard_deduction;
/// use tax_core::{FilingStatusCode, Parameters, ReturnSnapshot};
///
/// let params = Parameters::tax_year_2025();
/// let snapshot = ReturnSnapshot::new(FilingStatusCode::Single);
///
/// assert_eq!(standard_deduction(&snapshot, &params, dec!(60000)), dec!(15750));
/// ```
pub fn standard_deduction(
    snapshot: &ReturnSnapshot,
    params: &Parameters,
    earned_income: Decimal,
) -> Decimal {
    let status = snapshot.filing_status;
    let deduction = &params.standard_deduction;

    let mut base = *deduction.base.get(status);
    if snapshot.taxpayer.can_be_claimed_as_dependent {
        base = base.min(params.dependent_standard_deduction_limit(earned_income));
    }

    let conditions: u32 = snapshot
        .filers()
        .iter()
        .map(|(_, person)| {
            u32::from(person.is_at_least(deduction.senior_age, params.tax_year))
                + u32::from(person.is_blind)
        })
        .sum();

    base + *deduction.additional.get(status) * Decimal::from(conditions)
}

impl TaxForm for TaxComputation {
    fn id(&self) -> FormId {
        FormId::TaxComputation
    }

    fn title(&self) -> &'static str {
        "Form 1040 lines 12-18: Deductions and Tax"
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
            SnapshotField::Taxpayer,
            SnapshotField::Spouse,
        ]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        const DEPENDENCIES: &[Dependency] = &[
            Dependency::required(FormId::AgiWorksheet, "line_11"),
            Dependency::required(FormId::AgiWorksheet, "line_3a"),
            Dependency::required(FormId::AgiWorksheet, "earned_income"),
            Dependency::conditional(FormId::ScheduleD, "net_capital_gain"),
            Dependency::optional(FormId::ScheduleA, "line_17"),
            Dependency::conditional(FormId::Schedule2, "line_3"),
        ];
        DEPENDENCIES
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            "standard_deduction",
            "itemized_deduction",
            "itemized_deduction_used",
            "line_12",
            "line_13",
            "line_14",
            "line_15",
            "line_16",
            "line_17",
            "line_18",
            "qdcg_worksheet_used",
            "marginal_rate",
        ]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let params = ctx.params();
        let status = ctx.filing_status();
        let agi = ctx.amount(FormId::AgiWorksheet, "line_11")?;
        let earned_income = ctx.amount(FormId::AgiWorksheet, "earned_income")?;
        let mut lines = LineItems::new();

        let standard = lines.set_amount(
            "standard_deduction",
            standard_deduction(ctx.snapshot(), params, earned_income),
        );
        let itemized = lines.set_amount(
            "itemized_deduction",
            ctx.amount(FormId::ScheduleA, "line_17")?,
        );
        let use_itemized = itemized > standard;
        lines.set_flag("itemized_deduction_used", use_itemized);

        let line_12 = lines.set_amount("line_12", if use_itemized { itemized } else { standard });
        // Qualified business income deduction is not modelled.
        let line_13 = lines.set_amount("line_13", Decimal::ZERO);
        let line_14 = lines.set_amount("line_14", line_12 + line_13);
        let line_15 = lines.set_amount("line_15", max(agi - line_14, Decimal::ZERO));

        let ordinary_brackets = params.ordinary_brackets.get(status);
        let schedule = TaxRateSchedule::new(ordinary_brackets);
        let qualified_dividends = ctx.amount(FormId::AgiWorksheet, "line_3a")?;
        let net_capital_gain = ctx.amount(FormId::ScheduleD, "net_capital_gain")?;
        let use_worksheet = qualified_dividends > Decimal::ZERO || net_capital_gain > Decimal::ZERO;
        let tax = if use_worksheet {
            let capital_gain_brackets = params.capital_gain_brackets.get(status);
            QualifiedDividendsWorksheet::new(ordinary_brackets, capital_gain_brackets)
                .calculate(&QualifiedDividendsWorksheetInput {
                    taxable_income: line_15,
                    qualified_dividends,
                    net_capital_gain,
                })?
                .tax
        } else {
            schedule.tax_on(line_15)?
        };
        lines.set_flag("qdcg_worksheet_used", use_worksheet);

        let line_16 = lines.set_amount("line_16", tax);
        let line_17 = lines.set_amount("line_17", ctx.amount(FormId::Schedule2, "line_3")?);
        lines.set_amount("line_18", line_16 + line_17);
        lines.set_rate("marginal_rate", schedule.marginal_rate(line_15)?);

        Ok(lines)
    }
}
