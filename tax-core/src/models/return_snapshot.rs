use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::filing_status::FilingStatusCode;
use super::income::{
    CapitalSale, DividendStatement, IncomeItem, InterestStatement, Owner, RetirementDistribution,
    SocialSecurityStatement, UnemploymentCompensation, WageStatement,
};

/// Taxpayer or spouse profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_blind: bool,
    pub is_full_time_student: bool,
    pub can_be_claimed_as_dependent: bool,
}

impl Person {
    /// Age in whole years on `date`, if the date of birth is known.
    pub fn age_on(
        &self,
        date: NaiveDate,
    ) -> Option<i32> {
        self.date_of_birth.map(|dob| age_on(dob, date))
    }

    /// Whether the person counts as `age` or older for the tax year.
    ///
    /// The IRS treats a person as reaching an age the day before the
    /// birthday, so someone born on January 1 of the following year's
    /// cutoff still qualifies.
    pub fn is_at_least(
        &self,
        age: i32,
        tax_year: i32,
    ) -> bool {
        NaiveDate::from_ymd_opt(tax_year + 1, 1, 1)
            .and_then(|jan_1| self.age_on(jan_1))
            .is_some_and(|years| years >= age)
    }
}

/// A person claimed as a dependent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependent {
    pub first_name: String,
    pub last_name: String,
    pub relationship: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub months_lived_with_taxpayer: u8,
    pub has_ssn: bool,
}

impl Default for Dependent {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            relationship: None,
            date_of_birth: None,
            months_lived_with_taxpayer: 12,
            has_ssn: true,
        }
    }
}

impl Dependent {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Age on December 31 of the tax year, if the date of birth is known.
    pub fn age_at_year_end(
        &self,
        tax_year: i32,
    ) -> Option<i32> {
        let dec_31 = NaiveDate::from_ymd_opt(tax_year, 12, 31)?;
        self.date_of_birth.map(|dob| age_on(dob, dec_31))
    }
}

/// Schedule 1 Part II inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    pub educator_expenses_taxpayer: Decimal,
    pub educator_expenses_spouse: Decimal,
    pub hsa_deduction: Decimal,
    pub ira_deduction: Decimal,
    pub student_loan_interest: Decimal,
}

impl Adjustments {
    pub fn is_empty(&self) -> bool {
        self.amounts().iter().all(|(_, amount)| amount.is_zero())
    }

    /// Every entered amount, keyed by field name.
    pub fn amounts(&self) -> [(&'static str, Decimal); 5] {
        [
            ("educator_expenses_taxpayer", self.educator_expenses_taxpayer),
            ("educator_expenses_spouse", self.educator_expenses_spouse),
            ("hsa_deduction", self.hsa_deduction),
            ("ira_deduction", self.ira_deduction),
            ("student_loan_interest", self.student_loan_interest),
        ]
    }
}

/// Schedule A inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemizedDeductions {
    pub medical_expenses: Decimal,
    pub state_local_income_tax: Decimal,
    pub state_local_sales_tax: Decimal,
    /// Elect sales tax instead of income tax on line 5a.
    pub use_sales_tax: bool,
    pub real_estate_tax: Decimal,
    pub personal_property_tax: Decimal,
    pub mortgage_interest: Decimal,
    pub mortgage_points: Decimal,
    pub mortgage_insurance: Decimal,
    pub investment_interest: Decimal,
    pub charitable_cash: Decimal,
    pub charitable_noncash: Decimal,
    pub charitable_carryover: Decimal,
    pub casualty_loss: Decimal,
    pub other_deductions: Decimal,
}

impl ItemizedDeductions {
    /// Every entered amount, keyed by field name.
    pub fn amounts(&self) -> [(&'static str, Decimal); 14] {
        [
            ("medical_expenses", self.medical_expenses),
            ("state_local_income_tax", self.state_local_income_tax),
            ("state_local_sales_tax", self.state_local_sales_tax),
            ("real_estate_tax", self.real_estate_tax),
            ("personal_property_tax", self.personal_property_tax),
            ("mortgage_interest", self.mortgage_interest),
            ("mortgage_points", self.mortgage_points),
            ("mortgage_insurance", self.mortgage_insurance),
            ("investment_interest", self.investment_interest),
            ("charitable_cash", self.charitable_cash),
            ("charitable_noncash", self.charitable_noncash),
            ("charitable_carryover", self.charitable_carryover),
            ("casualty_loss", self.casualty_loss),
            ("other_deductions", self.other_deductions),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EducationCreditType {
    #[serde(rename = "aotc")]
    AmericanOpportunity,
    #[serde(rename = "llc")]
    LifetimeLearning,
}

/// Form 8863 per-student inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationExpense {
    pub student_name: String,
    pub credit_type: EducationCreditType,
    pub qualified_expenses: Decimal,
    pub scholarships_received: Decimal,
    pub is_first_four_years: bool,
    pub is_at_least_half_time: bool,
    pub has_felony_drug_conviction: bool,
}

impl Default for EducationExpense {
    fn default() -> Self {
        Self {
            student_name: String::new(),
            credit_type: EducationCreditType::AmericanOpportunity,
            qualified_expenses: Decimal::ZERO,
            scholarships_received: Decimal::ZERO,
            is_first_four_years: true,
            is_at_least_half_time: true,
            has_felony_drug_conviction: false,
        }
    }
}

impl EducationExpense {
    /// Qualified expenses net of tax-free assistance.
    pub fn net_expenses(&self) -> Decimal {
        (self.qualified_expenses - self.scholarships_received).max(Decimal::ZERO)
    }

    pub fn is_aotc_eligible(&self) -> bool {
        self.is_first_four_years && self.is_at_least_half_time && !self.has_felony_drug_conviction
    }
}

/// Form 8880 per-person contributions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetirementContribution {
    pub contributor: Owner,
    pub traditional_ira: Decimal,
    pub roth_ira: Decimal,
    pub elective_deferrals: Decimal,
}

impl RetirementContribution {
    pub fn total(&self) -> Decimal {
        self.traditional_ira + self.roth_ira + self.elective_deferrals
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalLossCarryover {
    pub short_term: Decimal,
    pub long_term: Decimal,
}

impl CapitalLossCarryover {
    pub fn is_empty(&self) -> bool {
        self.short_term.is_zero() && self.long_term.is_zero()
    }
}

/// Everything the engine reads about one return.
///
/// Built once before a calculation and never mutated while forms evaluate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnSnapshot {
    pub filing_status: FilingStatusCode,
    pub taxpayer: Person,
    pub spouse: Option<Person>,
    pub income: Vec<IncomeItem>,
    pub other_income: Decimal,
    pub adjustments: Adjustments,
    pub itemized_deductions: Option<ItemizedDeductions>,
    pub dependents: Vec<Dependent>,
    pub education_expenses: Vec<EducationExpense>,
    pub retirement_contributions: Vec<RetirementContribution>,
    pub estimated_tax_payments: Decimal,
    pub capital_loss_carryover: CapitalLossCarryover,
}

macro_rules! income_filter {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> impl Iterator<Item = &$ty> {
            self.income.iter().filter_map(|item| match item {
                IncomeItem::$variant(inner) => Some(inner),
                _ => None,
            })
        }
    };
}

impl ReturnSnapshot {
    pub fn new(filing_status: FilingStatusCode) -> Self {
        Self {
            filing_status,
            ..Default::default()
        }
    }

    pub fn with_income(
        mut self,
        item: IncomeItem,
    ) -> Self {
        self.income.push(item);
        self
    }

    income_filter!(wages, Wage, WageStatement);
    income_filter!(interest_statements, Interest, InterestStatement);
    income_filter!(dividend_statements, Dividend, DividendStatement);
    income_filter!(capital_sales, CapitalSale, CapitalSale);
    income_filter!(retirement_distributions, Retirement, RetirementDistribution);
    income_filter!(unemployment, Unemployment, UnemploymentCompensation);
    income_filter!(social_security, SocialSecurity, SocialSecurityStatement);

    pub fn person(
        &self,
        owner: Owner,
    ) -> Option<&Person> {
        match owner {
            Owner::Taxpayer => Some(&self.taxpayer),
            Owner::Spouse => self.spouse.as_ref(),
        }
    }

    /// Persons whose items belong on this return.
    pub fn filers(&self) -> Vec<(Owner, &Person)> {
        let mut filers = vec![(Owner::Taxpayer, &self.taxpayer)];
        if let (true, Some(spouse)) = (self.filing_status.is_joint(), &self.spouse) {
            filers.push((Owner::Spouse, spouse));
        }
        filers
    }

    pub fn total_wages(&self) -> Decimal {
        self.wages().map(|w2| w2.box_1_wages).sum()
    }

    pub fn taxable_interest(&self) -> Decimal {
        self.interest_statements().map(|i| i.box_1_interest).sum()
    }

    pub fn tax_exempt_interest(&self) -> Decimal {
        self.interest_statements()
            .map(|i| i.box_8_tax_exempt_interest)
            .sum()
    }

    pub fn ordinary_dividends(&self) -> Decimal {
        self.dividend_statements()
            .map(|d| d.box_1a_ordinary_dividends)
            .sum()
    }

    pub fn qualified_dividends(&self) -> Decimal {
        self.dividend_statements()
            .map(|d| d.box_1b_qualified_dividends)
            .sum()
    }

    pub fn capital_gain_distributions(&self) -> Decimal {
        self.dividend_statements()
            .map(|d| d.box_2a_total_capital_gain)
            .sum()
    }

    pub fn total_unemployment(&self) -> Decimal {
        self.unemployment().map(|g| g.box_1_unemployment).sum()
    }

    pub fn total_social_security_benefits(&self) -> Decimal {
        self.social_security().map(|s| s.box_5_net_benefits).sum()
    }
}

fn age_on(
    dob: NaiveDate,
    date: NaiveDate,
) -> i32 {
    let years = date.year() - dob.year();
    if (date.month(), date.day()) < (dob.month(), dob.day()) {
        years - 1
    } else {
        years
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn person_born_january_first_counts_as_65_for_prior_year() {
        let person = Person {
            date_of_birth: Some(date(1961, 1, 1)),
            ..Default::default()
        };

        assert!(person.is_at_least(65, 2025));
    }

    #[test]
    fn person_born_january_second_is_not_yet_65() {
        let person = Person {
            date_of_birth: Some(date(1961, 1, 2)),
            ..Default::default()
        };

        assert!(!person.is_at_least(65, 2025));
    }

    #[test]
    fn unknown_birth_date_is_never_old_enough() {
        assert!(!Person::default().is_at_least(18, 2025));
    }

    #[test]
    fn dependent_age_is_measured_on_december_31() {
        let child = Dependent {
            date_of_birth: Some(date(2008, 12, 31)),
            ..Default::default()
        };

        assert_eq!(child.age_at_year_end(2025), Some(17));
    }

    #[test]
    fn dependent_defaults_to_full_year_with_ssn() {
        let child: Dependent = serde_json::from_str(r#"{"first_name": "Ada"}"#).expect("valid");

        assert_eq!(child.months_lived_with_taxpayer, 12);
        assert!(child.has_ssn);
    }

    #[test]
    fn education_expense_nets_scholarships() {
        let expense = EducationExpense {
            qualified_expenses: dec!(3000),
            scholarships_received: dec!(3500),
            ..Default::default()
        };

        assert_eq!(expense.net_expenses(), dec!(0));
    }

    #[test]
    fn filers_include_spouse_only_on_joint_return() {
        let mut snapshot = ReturnSnapshot::new(FilingStatusCode::MarriedFilingSeparately);
        snapshot.spouse = Some(Person::default());

        assert_eq!(snapshot.filers().len(), 1);

        snapshot.filing_status = FilingStatusCode::MarriedFilingJointly;
        assert_eq!(snapshot.filers().len(), 2);
    }

    #[test]
    fn income_sums_filter_by_item_kind() {
        let snapshot = ReturnSnapshot::new(FilingStatusCode::Single)
            .with_income(IncomeItem::Wage(WageStatement {
                box_1_wages: dec!(50000),
                ..Default::default()
            }))
            .with_income(IncomeItem::Interest(InterestStatement {
                box_1_interest: dec!(120.50),
                ..Default::default()
            }))
            .with_income(IncomeItem::Wage(WageStatement {
                box_1_wages: dec!(2500),
                ..Default::default()
            }));

        assert_eq!(snapshot.total_wages(), dec!(52500));
        assert_eq!(snapshot.taxable_interest(), dec!(120.50));
        assert_eq!(snapshot.ordinary_dividends(), dec!(0));
    }
}
