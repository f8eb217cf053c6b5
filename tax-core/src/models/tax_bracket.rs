use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One marginal-rate bracket of a tax rate schedule.
///
/// Income above `min_income` and up to `max_income` is taxed at `tax_rate`.
/// The top bracket has no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            tax_rate,
        }
    }

    /// Whether `income` falls inside this bracket (exclusive lower, inclusive upper).
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income > self.min_income && self.max_income.is_none_or(|max| income <= max)
    }
}
