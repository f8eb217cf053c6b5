//! Schedule 2, Additional Taxes.
//!
//! Part I line 2 (alternative minimum tax) is not modelled and stays zero.
//! Part II carries the additional tax on early retirement distributions
//! (line 8), Additional Medicare Tax from Form 8959 (line 11) and the net
//! investment income tax from Form 8960 (line 12).

use rust_decimal::Decimal;

use crate::calculations::common::{max, round_half_up};
use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::models::{FormId, LineItems, ReturnSnapshot};

pub struct Schedule2;

impl TaxForm for Schedule2 {
    fn id(&self) -> FormId {
        FormId::Schedule2
    }

    fn title(&self) -> &'static str {
        "Schedule 2: Additional Taxes"
    }

    fn activates(
        &self,
        snapshot: &ReturnSnapshot,
        params: &Parameters,
    ) -> bool {
        let status = snapshot.filing_status;
        let payroll = &params.payroll;
        let medicare_wages: Decimal = snapshot.wages().map(|w2| w2.box_5_medicare_wages).sum();
        let owes_additional_medicare =
            medicare_wages > *payroll.additional_medicare_threshold.get(status);
        let medicare_withheld: Decimal = snapshot.wages().map(|w2| w2.box_6_medicare_tax).sum();
        let overwithheld_medicare =
            medicare_withheld > round_half_up(medicare_wages * payroll.medicare_rate);
        let niit_threshold = *params.net_investment_income_tax.threshold.get(status);
        let owes_niit = investment_income(snapshot, params) > Decimal::ZERO
            && magi_ceiling(snapshot, params) > niit_threshold;
        let has_early_distribution = snapshot
            .retirement_distributions()
            .any(|distribution| distribution.is_early_distribution());

        owes_additional_medicare || overwithheld_medicare || owes_niit || has_early_distribution
    }

    fn inputs(&self) -> &'static [SnapshotField] {
        &[
            SnapshotField::FilingStatus,
            SnapshotField::Wages,
            SnapshotField::Interest,
            SnapshotField::Dividends,
            SnapshotField::CapitalSales,
            SnapshotField::RetirementDistributions,
            SnapshotField::Unemployment,
            SnapshotField::SocialSecurity,
            SnapshotField::OtherIncome,
        ]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        const DEPENDENCIES: &[Dependency] = &[
            Dependency::required(FormId::AgiWorksheet, "line_11"),
            Dependency::required(FormId::AgiWorksheet, "line_2b"),
            Dependency::required(FormId::AgiWorksheet, "line_3b"),
            Dependency::required(FormId::AgiWorksheet, "line_7"),
        ];
        DEPENDENCIES
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            "line_2",
            "line_3",
            "line_8",
            "line_11",
            "line_12",
            "line_21",
            "additional_medicare_withheld",
        ]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let snapshot = ctx.snapshot();
        let params = ctx.params();
        let status = ctx.filing_status();
        let mut lines = LineItems::new();

        // Part I
        let line_2 = lines.set_amount("line_2", Decimal::ZERO);
        lines.set_amount("line_3", line_2);

        // Part II
        let early_distributions: Decimal = snapshot
            .retirement_distributions()
            .filter(|distribution| distribution.is_early_distribution())
            .map(|distribution| {
                distribution
                    .box_2a_taxable_amount
                    .unwrap_or(distribution.box_1_gross_distribution)
            })
            .sum();
        let line_8 = lines.set_amount(
            "line_8",
            max(early_distributions, Decimal::ZERO) * params.early_distribution_rate,
        );

        // Form 8959
        let payroll = &params.payroll;
        let medicare_wages: Decimal = snapshot.wages().map(|w2| w2.box_5_medicare_wages).sum();
        let medicare_withheld: Decimal = snapshot.wages().map(|w2| w2.box_6_medicare_tax).sum();
        let excess_wages = max(
            medicare_wages - *payroll.additional_medicare_threshold.get(status),
            Decimal::ZERO,
        );
        let line_11 = lines.set_amount("line_11", excess_wages * payroll.additional_medicare_rate);
        lines.set_amount(
            "additional_medicare_withheld",
            max(
                medicare_withheld - round_half_up(medicare_wages * payroll.medicare_rate),
                Decimal::ZERO,
            ),
        );

        // Form 8960
        let net_investment_income = max(
            ctx.amount(FormId::AgiWorksheet, "line_2b")?
                + ctx.amount(FormId::AgiWorksheet, "line_3b")?
                + ctx.amount(FormId::AgiWorksheet, "line_7")?,
            Decimal::ZERO,
        );
        let magi = ctx.amount(FormId::AgiWorksheet, "line_11")?;
        let niit = &params.net_investment_income_tax;
        let excess_magi = max(magi - *niit.threshold.get(status), Decimal::ZERO);
        let line_12 = lines.set_amount(
            "line_12",
            net_investment_income.min(excess_magi) * niit.rate,
        );

        lines.set_amount("line_21", line_8 + line_11 + line_12);
        Ok(lines)
    }
}

/// Net capital gain on the statements, with a net loss limited the way
/// Schedule D line 21 limits it.
fn net_capital(
    snapshot: &ReturnSnapshot,
    params: &Parameters,
) -> Decimal {
    let sales: Decimal = snapshot
        .capital_sales()
        .map(|sale| sale.proceeds - sale.cost_basis.unwrap_or_default() + sale.adjustment_amount)
        .sum();
    let limit = *params.capital_loss_limit.get(snapshot.filing_status);
    max(snapshot.capital_gain_distributions() + sales, -limit)
}

/// Interest, dividends and net capital gain on the statements.
fn investment_income(
    snapshot: &ReturnSnapshot,
    params: &Parameters,
) -> Decimal {
    snapshot.taxable_interest() + snapshot.ordinary_dividends() + net_capital(snapshot, params)
}

/// An amount AGI cannot exceed: every income item at its largest possible
/// taxable value, with no adjustments. Used only to decide activation.
fn magi_ceiling(
    snapshot: &ReturnSnapshot,
    params: &Parameters,
) -> Decimal {
    let retirement: Decimal = snapshot
        .retirement_distributions()
        .map(|distribution| {
            distribution
                .box_2a_taxable_amount
                .unwrap_or(distribution.box_1_gross_distribution)
        })
        .sum();
    snapshot.total_wages()
        + investment_income(snapshot, params)
        + retirement
        + snapshot.total_unemployment()
        + max(snapshot.total_social_security_benefits(), Decimal::ZERO)
        + max(snapshot.other_income, Decimal::ZERO)
}
