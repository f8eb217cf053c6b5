use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whose document an item is, on a joint return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    #[default]
    Taxpayer,
    Spouse,
}

/// One source document reported on the return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncomeItem {
    Wage(WageStatement),
    Interest(InterestStatement),
    Dividend(DividendStatement),
    CapitalSale(CapitalSale),
    Retirement(RetirementDistribution),
    Unemployment(UnemploymentCompensation),
    SocialSecurity(SocialSecurityStatement),
}

/// Form W-2.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WageStatement {
    pub employer_name: Option<String>,
    pub owner: Owner,
    pub box_1_wages: Decimal,
    pub box_2_fed_tax_withheld: Decimal,
    pub box_3_ss_wages: Decimal,
    pub box_4_ss_tax: Decimal,
    pub box_5_medicare_wages: Decimal,
    pub box_6_medicare_tax: Decimal,
}

/// Form 1099-INT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestStatement {
    pub payer_name: Option<String>,
    pub box_1_interest: Decimal,
    pub box_4_fed_tax_withheld: Decimal,
    pub box_8_tax_exempt_interest: Decimal,
}

/// Form 1099-DIV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DividendStatement {
    pub payer_name: Option<String>,
    pub box_1a_ordinary_dividends: Decimal,
    pub box_1b_qualified_dividends: Decimal,
    pub box_2a_total_capital_gain: Decimal,
    pub box_4_fed_tax_withheld: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingPeriod {
    ShortTerm,
    LongTerm,
}

/// One Form 8949 row (sale or other disposition of a capital asset).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalSale {
    pub description: String,
    pub date_acquired: Option<NaiveDate>,
    pub date_sold: Option<NaiveDate>,
    pub proceeds: Decimal,
    pub cost_basis: Option<Decimal>,
    pub adjustment_amount: Decimal,
    pub holding_period: Option<HoldingPeriod>,
    pub basis_reported_to_irs: bool,
}

impl CapitalSale {
    /// The reported holding period, or one derived from the trade dates.
    ///
    /// An asset is held long-term when it is sold after the anniversary of
    /// its acquisition date.
    pub fn resolved_holding_period(&self) -> Option<HoldingPeriod> {
        if let Some(period) = self.holding_period {
            return Some(period);
        }
        let (acquired, sold) = (self.date_acquired?, self.date_sold?);
        let anniversary = acquired.checked_add_months(Months::new(12))?;
        if sold > anniversary {
            Some(HoldingPeriod::LongTerm)
        } else {
            Some(HoldingPeriod::ShortTerm)
        }
    }
}

/// Form 1099-R.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetirementDistribution {
    pub payer_name: Option<String>,
    pub owner: Owner,
    pub box_1_gross_distribution: Decimal,
    /// `None` when box 2b "taxable amount not determined" is checked.
    pub box_2a_taxable_amount: Option<Decimal>,
    pub box_4_fed_tax_withheld: Decimal,
    pub box_7_distribution_code: Option<String>,
    /// Box 7 IRA/SEP/SIMPLE checkbox; IRA distributions go on line 4, others on line 5.
    pub is_ira: bool,
}

impl RetirementDistribution {
    /// Distribution code 1: early distribution, no known exception.
    pub fn is_early_distribution(&self) -> bool {
        self.box_7_distribution_code
            .as_deref()
            .is_some_and(|code| code.trim().starts_with('1'))
    }
}

/// Form 1099-G.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnemploymentCompensation {
    pub payer_name: Option<String>,
    pub box_1_unemployment: Decimal,
    pub box_4_fed_tax_withheld: Decimal,
}

/// Form SSA-1099.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialSecurityStatement {
    pub owner: Owner,
    pub box_5_net_benefits: Decimal,
    pub box_6_voluntary_withholding: Decimal,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sale(
        acquired: (i32, u32, u32),
        sold: (i32, u32, u32),
    ) -> CapitalSale {
        CapitalSale {
            date_acquired: NaiveDate::from_ymd_opt(acquired.0, acquired.1, acquired.2),
            date_sold: NaiveDate::from_ymd_opt(sold.0, sold.1, sold.2),
            ..Default::default()
        }
    }

    #[test]
    fn sale_on_anniversary_is_short_term() {
        let sale = sale((2024, 3, 15), (2025, 3, 15));

        assert_eq!(sale.resolved_holding_period(), Some(HoldingPeriod::ShortTerm));
    }

    #[test]
    fn sale_after_anniversary_is_long_term() {
        let sale = sale((2024, 3, 15), (2025, 3, 16));

        assert_eq!(sale.resolved_holding_period(), Some(HoldingPeriod::LongTerm));
    }

    #[test]
    fn explicit_holding_period_wins_over_dates() {
        let mut sale = sale((2024, 3, 15), (2025, 6, 1));
        sale.holding_period = Some(HoldingPeriod::ShortTerm);

        assert_eq!(sale.resolved_holding_period(), Some(HoldingPeriod::ShortTerm));
    }

    #[test]
    fn missing_dates_leave_holding_period_unknown() {
        let sale = CapitalSale::default();

        assert_eq!(sale.resolved_holding_period(), None);
    }

    #[test]
    fn early_distribution_detected_from_code() {
        let distribution = RetirementDistribution {
            box_7_distribution_code: Some("1".to_string()),
            ..Default::default()
        };

        assert!(distribution.is_early_distribution());
        assert!(!RetirementDistribution::default().is_early_distribution());
    }

    #[test]
    fn income_item_deserializes_from_tagged_json() {
        let item: IncomeItem = serde_json::from_str(
            r#"{"kind": "wage", "box_1_wages": "60000.00", "box_2_fed_tax_withheld": "6000.00"}"#,
        )
        .expect("valid wage item");

        match item {
            IncomeItem::Wage(w2) => {
                assert_eq!(w2.box_1_wages, Decimal::new(6_000_000, 2));
                assert_eq!(w2.owner, Owner::Taxpayer);
            }
            other => panic!("expected wage item, got {other:?}"),
        }
    }
}
