//! Schedule D, Capital Gains and Losses.
//!
//! | Line | Description |
//! |------|-------------|
//! | 6    | Short-term capital loss carryover (negative) |
//! | 7    | Net short-term gain or loss |
//! | 13   | Capital gain distributions |
//! | 14   | Long-term capital loss carryover (negative) |
//! | 15   | Net long-term gain or loss |
//! | 16   | Combined net gain or loss |
//! | 21   | Amount carried to Form 1040 line 7 (a gain, or the allowed loss) |
//!
//! `net_capital_gain` is the smaller of lines 15 and 16 when both are gains,
//! the amount the Qualified Dividends and Capital Gain Tax Worksheet taxes at
//! preferential rates. `carryforward_loss` is the part of a net loss that the
//! annual limit holds back for next year.

use rust_decimal::Decimal;

use crate::calculations::common::max;
use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::models::{FormId, LineItems, ReturnSnapshot};

pub struct ScheduleD;

impl TaxForm for ScheduleD {
    fn id(&self) -> FormId {
        FormId::ScheduleD
    }

    fn title(&self) -> &'static str {
        "Schedule D: Capital Gains and Losses"
    }

    fn activates(
        &self,
        snapshot: &ReturnSnapshot,
        _params: &Parameters,
    ) -> bool {
        snapshot.capital_sales().next().is_some()
            || snapshot.capital_gain_distributions() > Decimal::ZERO
            || !snapshot.capital_loss_carryover.is_empty()
    }

    fn inputs(&self) -> &'static [SnapshotField] {
        &[
            SnapshotField::FilingStatus,
            SnapshotField::Dividends,
            SnapshotField::CapitalLossCarryover,
        ]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        const DEPENDENCIES: &[Dependency] = &[
            Dependency::conditional(FormId::Form8949, "st_gain_loss"),
            Dependency::conditional(FormId::Form8949, "lt_gain_loss"),
        ];
        DEPENDENCIES
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            "line_6",
            "line_7",
            "line_13",
            "line_14",
            "line_15",
            "line_16",
            "line_21",
            "net_capital_gain",
            "carryforward_loss",
        ]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let snapshot = ctx.snapshot();
        let carryover = &snapshot.capital_loss_carryover;
        let loss_limit = *ctx
            .params()
            .capital_loss_limit
            .get(ctx.filing_status());
        let mut lines = LineItems::new();

        // Part I: short-term
        let line_6 = lines.set_amount("line_6", Decimal::ZERO - carryover.short_term.abs());
        let short_term = ctx.amount(FormId::Form8949, "st_gain_loss")?;
        let line_7 = lines.set_amount("line_7", short_term + line_6);

        // Part II: long-term
        let long_term = ctx.amount(FormId::Form8949, "lt_gain_loss")?;
        let line_13 = lines.set_amount("line_13", snapshot.capital_gain_distributions());
        let line_14 = lines.set_amount("line_14", Decimal::ZERO - carryover.long_term.abs());
        let line_15 = lines.set_amount("line_15", long_term + line_13 + line_14);

        // Part III: summary
        let line_16 = lines.set_amount("line_16", line_7 + line_15);
        let (line_21, carryforward) = if line_16 >= Decimal::ZERO {
            (line_16, Decimal::ZERO)
        } else {
            let allowed = max(line_16, -loss_limit);
            (allowed, allowed - line_16)
        };
        lines.set_amount("line_21", line_21);
        lines.set_amount("carryforward_loss", carryforward);

        let net_capital_gain = if line_15 > Decimal::ZERO && line_16 > Decimal::ZERO {
            line_15.min(line_16)
        } else {
            Decimal::ZERO
        };
        lines.set_amount("net_capital_gain", net_capital_gain);

        Ok(lines)
    }
}
