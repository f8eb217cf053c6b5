//! Built-in form units for the 2025 individual return.
//!
//! Each unit is a stateless struct implementing [`crate::engine::TaxForm`].
//! Line keys follow the IRS line numbers of the form they model (`line_8z`,
//! `line_25d`); values with no printed line of their own use descriptive
//! names such as `earned_income`.

mod agi_worksheet;
mod form_1040;
mod form_8863;
mod form_8880;
mod form_8949;
mod schedule_1;
mod schedule_2;
mod schedule_3;
mod schedule_8812;
mod schedule_a;
mod schedule_b;
mod schedule_d;
mod tax_computation;

pub use agi_worksheet::AgiWorksheet;
pub use form_1040::Form1040;
pub use form_8863::Form8863;
pub use form_8880::Form8880;
pub use form_8949::Form8949;
pub use schedule_1::Schedule1;
pub use schedule_2::Schedule2;
pub use schedule_3::{Schedule3, excess_social_security_tax};
pub use schedule_8812::Schedule8812;
pub use schedule_a::ScheduleA;
pub use schedule_b::ScheduleB;
pub use schedule_d::ScheduleD;
pub use tax_computation::{TaxComputation, standard_deduction};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::calculations::common::max;
use crate::engine::{EvaluationError, FormContext};
use crate::models::{FormId, ReturnSnapshot};

/// Taxable interest and ordinary dividends.
///
/// Taken from Schedule B when it was filed, otherwise summed from the
/// statements. Callers must declare `Conditional` links to
/// `schedule_b.line_4` and `schedule_b.line_6`.
fn interest_and_dividends(ctx: &FormContext<'_>) -> Result<(Decimal, Decimal), EvaluationError> {
    if ctx.has(FormId::ScheduleB) {
        return Ok((
            ctx.amount(FormId::ScheduleB, "line_4")?,
            ctx.amount(FormId::ScheduleB, "line_6")?,
        ));
    }
    let snapshot = ctx.snapshot();
    Ok((snapshot.taxable_interest(), snapshot.ordinary_dividends()))
}

/// Form 1099-R totals split between IRA distributions (line 4) and pensions
/// and annuities (line 5).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RetirementTotals {
    ira_gross: Decimal,
    ira_taxable: Decimal,
    pension_gross: Decimal,
    pension_taxable: Decimal,
    /// Distributions whose taxable amount was not determined by the payer.
    undetermined: usize,
}

impl RetirementTotals {
    fn from_snapshot(snapshot: &ReturnSnapshot) -> Self {
        snapshot
            .retirement_distributions()
            .fold(Self::default(), |mut totals, distribution| {
                let gross = distribution.box_1_gross_distribution;
                let taxable = match distribution.box_2a_taxable_amount {
                    Some(taxable) => taxable,
                    None => {
                        totals.undetermined += 1;
                        gross
                    }
                };
                if distribution.is_ira {
                    totals.ira_gross += gross;
                    totals.ira_taxable += taxable;
                } else {
                    totals.pension_gross += gross;
                    totals.pension_taxable += taxable;
                }
                totals
            })
    }

    fn taxable(&self) -> Decimal {
        self.ira_taxable + self.pension_taxable
    }
}

/// Share of a benefit kept under a linear phase-out, to three decimal places.
///
/// One below `start`, zero at or above `start + range`.
fn retained_fraction(
    income: Decimal,
    start: Decimal,
    range: Decimal,
) -> Decimal {
    if range <= Decimal::ZERO {
        return if income < start { Decimal::ONE } else { Decimal::ZERO };
    }
    let remaining = max(start + range - income, Decimal::ZERO);
    if remaining >= range {
        return Decimal::ONE;
    }
    (remaining / range).round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
}
