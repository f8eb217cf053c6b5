use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{round_half_up, round_rate};

/// A single line value on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineValue {
    /// Dollars, whole cents.
    Amount(Decimal),
    /// Fraction, four places.
    Rate(Decimal),
    Count(u32),
    Flag(bool),
}

impl LineValue {
    /// Numeric view used when one form reads another's line.
    pub fn as_decimal(&self) -> Decimal {
        match *self {
            Self::Amount(value) | Self::Rate(value) => value,
            Self::Count(count) => Decimal::from(count),
            Self::Flag(flag) => {
                if flag {
                    Decimal::ONE
                } else {
                    Decimal::ZERO
                }
            }
        }
    }

    pub fn as_flag(&self) -> bool {
        match *self {
            Self::Flag(flag) => flag,
            other => !other.as_decimal().is_zero(),
        }
    }
}

/// Line values produced by one form, keyed by IRS line identifier.
///
/// Setters round at the form boundary so every stored amount is whole cents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItems(BTreeMap<String, LineValue>);

impl LineItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_amount(
        &mut self,
        line: &str,
        value: Decimal,
    ) -> Decimal {
        let rounded = round_half_up(value);
        self.0.insert(line.to_string(), LineValue::Amount(rounded));
        rounded
    }

    pub fn set_rate(
        &mut self,
        line: &str,
        value: Decimal,
    ) {
        self.0
            .insert(line.to_string(), LineValue::Rate(round_rate(value)));
    }

    pub fn set_count(
        &mut self,
        line: &str,
        value: u32,
    ) {
        self.0.insert(line.to_string(), LineValue::Count(value));
    }

    pub fn set_flag(
        &mut self,
        line: &str,
        value: bool,
    ) {
        self.0.insert(line.to_string(), LineValue::Flag(value));
    }

    pub fn get(
        &self,
        line: &str,
    ) -> Option<&LineValue> {
        self.0.get(line)
    }

    /// Numeric value of `line`, zero when absent.
    pub fn amount(
        &self,
        line: &str,
    ) -> Decimal {
        self.0
            .get(line)
            .map(LineValue::as_decimal)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn flag(
        &self,
        line: &str,
    ) -> bool {
        self.0.get(line).is_some_and(LineValue::as_flag)
    }

    pub fn contains(
        &self,
        line: &str,
    ) -> bool {
        self.0.contains_key(line)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LineValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn set_amount_rounds_to_cents() {
        let mut lines = LineItems::new();

        let stored = lines.set_amount("line_16", dec!(5071.505));

        assert_eq!(stored, dec!(5071.51));
        assert_eq!(lines.amount("line_16"), dec!(5071.51));
    }

    #[test]
    fn set_rate_keeps_four_places() {
        let mut lines = LineItems::new();

        lines.set_rate("effective_rate", dec!(0.084525));

        assert_eq!(lines.get("effective_rate"), Some(&LineValue::Rate(dec!(0.0845))));
    }

    #[test]
    fn absent_line_reads_as_zero() {
        let lines = LineItems::new();

        assert_eq!(lines.amount("line_1"), dec!(0));
        assert!(!lines.flag("itemized_deduction_used"));
    }

    #[test]
    fn count_and_flag_read_numerically() {
        let mut lines = LineItems::new();
        lines.set_count("line_4", 2);
        lines.set_flag("qdcg_worksheet_used", true);

        assert_eq!(lines.amount("line_4"), dec!(2));
        assert_eq!(lines.amount("qdcg_worksheet_used"), dec!(1));
    }

    #[test]
    fn serializes_as_ordered_map() {
        let mut lines = LineItems::new();
        lines.set_amount("line_2", dec!(10.00));
        lines.set_count("line_1", 3);

        let json = serde_json::to_string(&lines).expect("serializable");

        assert_eq!(json, r#"{"line_1":{"count":3},"line_2":{"amount":"10.00"}}"#);
    }
}
