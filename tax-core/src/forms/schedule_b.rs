//! Schedule B, Interest and Ordinary Dividends.

use rust_decimal::Decimal;

use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::models::{FormId, LineItems, ReturnSnapshot};

/// Filed when taxable interest or ordinary dividends exceed the threshold.
pub struct ScheduleB;

impl TaxForm for ScheduleB {
    fn id(&self) -> FormId {
        FormId::ScheduleB
    }

    fn title(&self) -> &'static str {
        "Schedule B: Interest and Ordinary Dividends"
    }

    fn activates(
        &self,
        snapshot: &ReturnSnapshot,
        params: &Parameters,
    ) -> bool {
        snapshot.taxable_interest() > params.schedule_b_threshold
            || snapshot.ordinary_dividends() > params.schedule_b_threshold
    }

    fn inputs(&self) -> &'static [SnapshotField] {
        &[SnapshotField::Interest, SnapshotField::Dividends]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        &[]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["line_1", "line_2", "line_3", "line_4", "line_5", "line_6"]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let snapshot = ctx.snapshot();
        let mut lines = LineItems::new();

        // Part I
        let line_1 = lines.set_amount("line_1", snapshot.taxable_interest());
        let line_2 = lines.set_amount("line_2", line_1);
        // Excludable savings bond interest (Form 8815) is not modelled.
        let line_3 = lines.set_amount("line_3", Decimal::ZERO);
        lines.set_amount("line_4", line_2 - line_3);

        // Part II
        let line_5 = lines.set_amount("line_5", snapshot.ordinary_dividends());
        lines.set_amount("line_6", line_5);

        Ok(lines)
    }
}
