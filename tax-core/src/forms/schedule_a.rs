//! Schedule A, Itemized Deductions.
//!
//! # Line Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1-4  | Medical and dental expenses above 7.5% of AGI |
//! | 5a-e | State and local taxes, limited by the SALT cap |
//! | 6-7  | Other taxes (not modelled) and total taxes |
//! | 8a-e | Home mortgage interest and points |
//! | 9-10 | Investment interest and total interest |
//! | 11-14| Gifts to charity, cash and noncash limited by AGI |
//! | 15   | Casualty and theft losses |
//! | 16   | Other itemized deductions |
//! | 17   | Total itemized deductions |
//!
//! The SALT cap is reduced by 30% of AGI over the phase-down threshold but
//! never below the floor.

use rust_decimal::Decimal;

use crate::calculations::common::{max, round_half_up};
use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::models::{FilingStatusCode, FormId, ItemizedDeductions, LineItems, ReturnSnapshot};

pub struct ScheduleA;

impl TaxForm for ScheduleA {
    fn id(&self) -> FormId {
        FormId::ScheduleA
    }

    fn title(&self) -> &'static str {
        "Schedule A: Itemized Deductions"
    }

    fn activates(
        &self,
        snapshot: &ReturnSnapshot,
        _params: &Parameters,
    ) -> bool {
        snapshot.itemized_deductions.is_some()
    }

    fn inputs(&self) -> &'static [SnapshotField] {
        &[SnapshotField::FilingStatus, SnapshotField::ItemizedDeductions]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        const DEPENDENCIES: &[Dependency] =
            &[Dependency::required(FormId::AgiWorksheet, "line_11")];
        DEPENDENCIES
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            "line_1", "line_2", "line_3", "line_4", "line_5a", "line_5b", "line_5c", "line_5d",
            "line_5e", "line_6", "line_7", "line_8a", "line_8c", "line_8e", "line_9", "line_10",
            "line_11", "line_12", "line_13", "line_14", "line_15", "line_16", "line_17",
            "salt_cap",
        ]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let Some(itemized) = ctx.snapshot().itemized_deductions.as_ref() else {
            return Err(EvaluationError::missing("itemized_deductions"));
        };
        validate(itemized)?;

        let agi = ctx.amount(FormId::AgiWorksheet, "line_11")?;
        let params = ctx.params();
        let status = ctx.filing_status();
        let mut lines = LineItems::new();

        // Medical and dental
        let line_1 = lines.set_amount("line_1", itemized.medical_expenses);
        let line_2 = lines.set_amount("line_2", agi);
        let line_3 = lines.set_amount(
            "line_3",
            max(line_2, Decimal::ZERO) * params.itemized.medical_floor_rate,
        );
        let line_4 = lines.set_amount("line_4", max(line_1 - line_3, Decimal::ZERO));

        // Taxes you paid
        let line_5a = lines.set_amount(
            "line_5a",
            if itemized.use_sales_tax {
                itemized.state_local_sales_tax
            } else {
                itemized.state_local_income_tax
            },
        );
        let line_5b = lines.set_amount("line_5b", itemized.real_estate_tax);
        let line_5c = lines.set_amount("line_5c", itemized.personal_property_tax);
        let line_5d = lines.set_amount("line_5d", line_5a + line_5b + line_5c);
        let cap = lines.set_amount("salt_cap", salt_cap(params, status, agi));
        let line_5e = lines.set_amount("line_5e", line_5d.min(cap));
        if line_5d > cap {
            ctx.warn(format!("state and local taxes of {line_5d} limited to {cap}"));
        }
        let line_6 = lines.set_amount("line_6", Decimal::ZERO);
        let line_7 = lines.set_amount("line_7", line_5e + line_6);

        // Interest you paid
        if !itemized.mortgage_insurance.is_zero() {
            ctx.warn("mortgage insurance premiums are not deductible for 2025");
        }
        let line_8a = lines.set_amount("line_8a", itemized.mortgage_interest);
        let line_8c = lines.set_amount("line_8c", itemized.mortgage_points);
        let line_8e = lines.set_amount("line_8e", line_8a + line_8c);
        let line_9 = lines.set_amount("line_9", itemized.investment_interest);
        let line_10 = lines.set_amount("line_10", line_8e + line_9);

        // Gifts to charity
        let positive_agi = max(agi, Decimal::ZERO);
        let cash_limit = round_half_up(positive_agi * params.itemized.charitable_cash_limit_rate);
        let noncash_limit =
            round_half_up(positive_agi * params.itemized.charitable_noncash_limit_rate);
        let line_11 = lines.set_amount("line_11", itemized.charitable_cash.min(cash_limit));
        let line_12 = lines.set_amount("line_12", itemized.charitable_noncash.min(noncash_limit));
        if itemized.charitable_cash > cash_limit || itemized.charitable_noncash > noncash_limit {
            ctx.warn("charitable contributions limited by AGI; the excess carries forward");
        }
        let line_13 = lines.set_amount("line_13", itemized.charitable_carryover);
        let line_14 = lines.set_amount("line_14", line_11 + line_12 + line_13);

        let line_15 = lines.set_amount("line_15", itemized.casualty_loss);
        let line_16 = lines.set_amount("line_16", itemized.other_deductions);

        lines.set_amount(
            "line_17",
            line_4 + line_7 + line_10 + line_14 + line_15 + line_16,
        );
        Ok(lines)
    }
}

/// SALT cap after the income phase-down.
fn salt_cap(
    params: &Parameters,
    status: FilingStatusCode,
    agi: Decimal,
) -> Decimal {
    let salt = &params.salt;
    let cap = *salt.cap.get(status);
    let excess = max(agi - *salt.phase_down_threshold.get(status), Decimal::ZERO);
    max(cap - excess * salt.phase_down_rate, *salt.floor.get(status))
}

fn validate(itemized: &ItemizedDeductions) -> Result<(), EvaluationError> {
    let amounts = itemized.amounts();
    match amounts.iter().find(|(_, amount)| *amount < Decimal::ZERO) {
        Some((name, amount)) => Err(EvaluationError::OutOfRange {
            field: format!("itemized_deductions.{name}"),
            message: format!("{amount} is negative"),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::engine::ResultStore;
    use crate::forms::testing::{evaluate, lines, store};

    fn with_agi(agi: Decimal) -> ResultStore {
        store(vec![(FormId::AgiWorksheet, lines(&[("line_11", agi)]))])
    }

    fn snapshot(
        status: FilingStatusCode,
        itemized: ItemizedDeductions,
    ) -> ReturnSnapshot {
        let mut snapshot = ReturnSnapshot::new(status);
        snapshot.itemized_deductions = Some(itemized);
        snapshot
    }

    #[test]
    fn totals_every_section() {
        let snapshot = snapshot(
            FilingStatusCode::MarriedFilingJointly,
            ItemizedDeductions {
                medical_expenses: dec!(10000),
                state_local_income_tax: dec!(8000),
                real_estate_tax: dec!(6000),
                mortgage_interest: dec!(12000),
                charitable_cash: dec!(3000),
                ..Default::default()
            },
        );

        let (result, warnings) = evaluate(&ScheduleA, &snapshot, &with_agi(dec!(120000)));
        let lines = result.unwrap();

        // 10,000 - 7.5% of 120,000
        assert_eq!(lines.amount("line_4"), dec!(1000));
        assert_eq!(lines.amount("line_7"), dec!(14000));
        assert_eq!(lines.amount("line_10"), dec!(12000));
        assert_eq!(lines.amount("line_14"), dec!(3000));
        assert_eq!(lines.amount("line_17"), dec!(30000));
        assert!(warnings.is_empty());
    }

    #[test]
    fn salt_capped_at_forty_thousand_below_phase_down() {
        let snapshot = snapshot(
            FilingStatusCode::Single,
            ItemizedDeductions {
                state_local_income_tax: dec!(30000),
                real_estate_tax: dec!(15000),
                ..Default::default()
            },
        );

        let (result, warnings) = evaluate(&ScheduleA, &snapshot, &with_agi(dec!(300000)));
        let lines = result.unwrap();

        assert_eq!(lines.amount("line_5d"), dec!(45000));
        assert_eq!(lines.amount("line_5e"), dec!(40000));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn salt_cap_phases_down_to_floor() {
        let params = Parameters::tax_year_2025();

        assert_eq!(
            salt_cap(&params, FilingStatusCode::Single, dec!(550000)),
            dec!(25000)
        );
        assert_eq!(
            salt_cap(&params, FilingStatusCode::Single, dec!(700000)),
            dec!(10000)
        );
        assert_eq!(
            salt_cap(&params, FilingStatusCode::MarriedFilingSeparately, dec!(200000)),
            dec!(20000)
        );
    }

    #[test]
    fn charitable_cash_limited_to_sixty_percent_of_agi() {
        let snapshot = snapshot(
            FilingStatusCode::Single,
            ItemizedDeductions {
                charitable_cash: dec!(40000),
                charitable_noncash: dec!(5000),
                ..Default::default()
            },
        );

        let (result, warnings) = evaluate(&ScheduleA, &snapshot, &with_agi(dec!(50000)));
        let lines = result.unwrap();

        assert_eq!(lines.amount("line_11"), dec!(30000));
        assert_eq!(lines.amount("line_12"), dec!(5000));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn negative_amount_is_out_of_range() {
        let snapshot = snapshot(
            FilingStatusCode::Single,
            ItemizedDeductions {
                mortgage_interest: dec!(-1),
                ..Default::default()
            },
        );

        let (result, _) = evaluate(&ScheduleA, &snapshot, &with_agi(dec!(50000)));

        assert!(matches!(
            result,
            Err(EvaluationError::OutOfRange { field, .. }) if field == "itemized_deductions.mortgage_interest"
        ));
    }
}
