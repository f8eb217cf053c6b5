//! Form 8949, Sales and Other Dispositions of Capital Assets.
//!
//! Sales are totalled into Part I (short-term) and Part II (long-term).
//! Schedule D reads only the gain or loss columns.

use rust_decimal::Decimal;

use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::models::{CapitalSale, FormId, HoldingPeriod, LineItems, ReturnSnapshot};

pub struct Form8949;

#[derive(Debug, Default)]
struct PartTotals {
    proceeds: Decimal,
    basis: Decimal,
    adjustment: Decimal,
}

impl PartTotals {
    fn add(
        &mut self,
        sale: &CapitalSale,
        basis: Decimal,
    ) {
        self.proceeds += sale.proceeds;
        self.basis += basis;
        self.adjustment += sale.adjustment_amount;
    }

    fn gain_loss(&self) -> Decimal {
        self.proceeds - self.basis + self.adjustment
    }

    fn write(
        &self,
        lines: &mut LineItems,
        part: &str,
    ) {
        lines.set_amount(&format!("{part}_proceeds"), self.proceeds);
        lines.set_amount(&format!("{part}_basis"), self.basis);
        lines.set_amount(&format!("{part}_adjustment"), self.adjustment);
        lines.set_amount(&format!("{part}_gain_loss"), self.gain_loss());
    }
}

impl TaxForm for Form8949 {
    fn id(&self) -> FormId {
        FormId::Form8949
    }

    fn title(&self) -> &'static str {
        "Form 8949: Sales and Other Dispositions of Capital Assets"
    }

    fn activates(
        &self,
        snapshot: &ReturnSnapshot,
        _params: &Parameters,
    ) -> bool {
        snapshot.capital_sales().next().is_some()
    }

    fn inputs(&self) -> &'static [SnapshotField] {
        &[SnapshotField::CapitalSales]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        &[]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            "st_proceeds",
            "st_basis",
            "st_adjustment",
            "st_gain_loss",
            "lt_proceeds",
            "lt_basis",
            "lt_adjustment",
            "lt_gain_loss",
            "transaction_count",
        ]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let mut short_term = PartTotals::default();
        let mut long_term = PartTotals::default();
        let mut count: u32 = 0;

        for (index, sale) in ctx.snapshot().capital_sales().enumerate() {
            if sale.proceeds < Decimal::ZERO {
                return Err(EvaluationError::OutOfRange {
                    field: format!("capital_sales[{index}].proceeds"),
                    message: format!("{} is negative", sale.proceeds),
                });
            }
            let basis = sale.cost_basis.ok_or_else(|| {
                EvaluationError::missing(format!("capital_sales[{index}].cost_basis"))
            })?;
            let period = sale.resolved_holding_period().ok_or_else(|| {
                EvaluationError::missing(format!("capital_sales[{index}].holding_period"))
            })?;

            match period {
                HoldingPeriod::ShortTerm => short_term.add(sale, basis),
                HoldingPeriod::LongTerm => long_term.add(sale, basis),
            }
            count = count.saturating_add(1);
        }

        let mut lines = LineItems::new();
        short_term.write(&mut lines, "st");
        long_term.write(&mut lines, "lt");
        lines.set_count("transaction_count", count);
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::engine::ResultStore;
    use crate::forms::testing::evaluate;
    use crate::models::{FilingStatusCode, IncomeItem};

    fn date(
        year: i32,
        month: u32,
        day: u32,
    ) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn snapshot(sales: Vec<CapitalSale>) -> ReturnSnapshot {
        sales.into_iter().fold(
            ReturnSnapshot::new(FilingStatusCode::Single),
            |snapshot, sale| snapshot.with_income(IncomeItem::CapitalSale(sale)),
        )
    }

    #[test]
    fn splits_sales_by_holding_period() {
        let snapshot = snapshot(vec![
            CapitalSale {
                description: "100 sh ABC".into(),
                proceeds: dec!(5000),
                cost_basis: Some(dec!(3000)),
                holding_period: Some(HoldingPeriod::LongTerm),
                ..Default::default()
            },
            CapitalSale {
                description: "10 sh XYZ".into(),
                proceeds: dec!(1200),
                cost_basis: Some(dec!(1500)),
                adjustment_amount: dec!(50),
                holding_period: Some(HoldingPeriod::ShortTerm),
                ..Default::default()
            },
        ]);

        let (result, _) = evaluate(&Form8949, &snapshot, &ResultStore::new());
        let lines = result.unwrap();

        assert_eq!(lines.amount("lt_gain_loss"), dec!(2000));
        assert_eq!(lines.amount("st_gain_loss"), dec!(-250));
        assert_eq!(lines.amount("st_adjustment"), dec!(50));
        assert_eq!(lines.amount("transaction_count"), dec!(2));
    }

    #[test]
    fn holding_period_derived_from_dates() {
        let snapshot = snapshot(vec![CapitalSale {
            proceeds: dec!(1000),
            cost_basis: Some(dec!(400)),
            date_acquired: date(2023, 3, 1),
            date_sold: date(2025, 6, 30),
            ..Default::default()
        }]);

        let (result, _) = evaluate(&Form8949, &snapshot, &ResultStore::new());

        assert_eq!(result.unwrap().amount("lt_gain_loss"), dec!(600));
    }

    #[test]
    fn missing_basis_is_reported() {
        let snapshot = snapshot(vec![CapitalSale {
            proceeds: dec!(1000),
            holding_period: Some(HoldingPeriod::ShortTerm),
            ..Default::default()
        }]);

        let (result, _) = evaluate(&Form8949, &snapshot, &ResultStore::new());

        assert_eq!(result, Err(EvaluationError::missing("capital_sales[0].cost_basis")));
    }

    #[test]
    fn undeterminable_holding_period_is_reported() {
        let snapshot = snapshot(vec![CapitalSale {
            proceeds: dec!(1000),
            cost_basis: Some(dec!(900)),
            date_sold: date(2025, 2, 1),
            ..Default::default()
        }]);

        let (result, _) = evaluate(&Form8949, &snapshot, &ResultStore::new());

        assert_eq!(
            result,
            Err(EvaluationError::missing("capital_sales[0].holding_period"))
        );
    }

    #[test]
    fn inactive_without_sales() {
        let snapshot = ReturnSnapshot::new(FilingStatusCode::Single);

        assert!(!Form8949.activates(&snapshot, &Parameters::tax_year_2025()));
    }
}
