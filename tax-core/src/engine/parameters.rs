//! Year-scoped tax parameters.
//!
//! Every constant a form needs comes from [`Parameters`]; forms never embed
//! dollar amounts or rates themselves. Values that differ by filing status are
//! held in [`ByFilingStatus`] so every lookup is total.

use std::sync::OnceLock;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::engine::error::ParameterError;
use crate::models::{ByFilingStatus, TaxBracket};

pub const SUPPORTED_TAX_YEAR: i32 = 2025;

static PARAMETERS_2025: OnceLock<Result<Parameters, ParameterError>> = OnceLock::new();

/// Returns the validated parameter table for `tax_year`.
///
/// The table is built and validated once per process and shared read-only
/// afterwards.
///
/// # Errors
///
/// Returns [`ParameterError::UnsupportedYear`] for any year other than 2025,
/// or [`ParameterError::Invalid`] if the built-in table fails validation.
pub fn get_parameters(tax_year: i32) -> Result<&'static Parameters, ParameterError> {
    if tax_year != SUPPORTED_TAX_YEAR {
        return Err(ParameterError::UnsupportedYear(tax_year));
    }
    PARAMETERS_2025
        .get_or_init(|| {
            let parameters = Parameters::tax_year_2025();
            parameters.validate().map(|()| parameters)
        })
        .as_ref()
        .map_err(Clone::clone)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardDeductionParameters {
    pub base: ByFilingStatus<Decimal>,
    /// Per age-65-or-older or blind condition.
    pub additional: ByFilingStatus<Decimal>,
    /// Floor of the dependent-filer limitation.
    pub dependent_minimum: Decimal,
    /// Added to earned income for the dependent-filer limitation.
    pub dependent_earned_income_addition: Decimal,
    pub senior_age: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaltParameters {
    pub cap: ByFilingStatus<Decimal>,
    pub floor: ByFilingStatus<Decimal>,
    pub phase_down_threshold: ByFilingStatus<Decimal>,
    pub phase_down_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedDeductionParameters {
    pub medical_floor_rate: Decimal,
    pub charitable_cash_limit_rate: Decimal,
    pub charitable_noncash_limit_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildTaxCreditParameters {
    pub credit_per_child: Decimal,
    pub credit_per_other_dependent: Decimal,
    pub refundable_limit_per_child: Decimal,
    pub earned_income_threshold: Decimal,
    pub refundable_rate: Decimal,
    pub phase_out_threshold: ByFilingStatus<Decimal>,
    /// Reduction per step of income over the threshold.
    pub phase_out_rate: Decimal,
    pub phase_out_step: Decimal,
    /// A qualifying child is under this age on December 31.
    pub child_age_limit: i32,
    pub min_months_lived_with: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationCreditParameters {
    pub aotc_full_rate_expenses: Decimal,
    pub aotc_partial_rate_expenses: Decimal,
    pub aotc_partial_rate: Decimal,
    pub aotc_refundable_rate: Decimal,
    pub llc_expense_limit: Decimal,
    pub llc_rate: Decimal,
    pub phase_out_start: ByFilingStatus<Decimal>,
    pub phase_out_range: ByFilingStatus<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaversCreditTier {
    /// Upper AGI bound of the tier, inclusive.
    pub agi_limit: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaversCreditParameters {
    pub contribution_limit: Decimal,
    pub min_age: i32,
    /// Ascending tiers; AGI above the last tier earns no credit.
    pub tiers: ByFilingStatus<Vec<SaversCreditTier>>,
}

impl SaversCreditParameters {
    pub fn rate_for(
        &self,
        tiers: &[SaversCreditTier],
        agi: Decimal,
    ) -> Decimal {
        tiers
            .iter()
            .find(|tier| agi <= tier.agi_limit)
            .map_or(Decimal::ZERO, |tier| tier.rate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityBenefitParameters {
    pub base_amount: ByFilingStatus<Decimal>,
    pub adjusted_base_amount: ByFilingStatus<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollParameters {
    pub social_security_wage_base: Decimal,
    pub social_security_rate: Decimal,
    pub medicare_rate: Decimal,
    pub additional_medicare_rate: Decimal,
    pub additional_medicare_threshold: ByFilingStatus<Decimal>,
}

impl PayrollParameters {
    /// Most Social Security tax a single employee can owe for the year.
    pub fn max_social_security_tax(&self) -> Decimal {
        self.social_security_wage_base * self.social_security_rate
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetInvestmentIncomeTaxParameters {
    pub rate: Decimal,
    pub threshold: ByFilingStatus<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentLoanInterestParameters {
    pub max_deduction: Decimal,
    pub phase_out_start: ByFilingStatus<Decimal>,
    pub phase_out_range: ByFilingStatus<Decimal>,
}

/// All constants for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    pub tax_year: i32,
    pub ordinary_brackets: ByFilingStatus<Vec<TaxBracket>>,
    pub capital_gain_brackets: ByFilingStatus<Vec<TaxBracket>>,
    pub standard_deduction: StandardDeductionParameters,
    pub salt: SaltParameters,
    pub itemized: ItemizedDeductionParameters,
    pub schedule_b_threshold: Decimal,
    pub capital_loss_limit: ByFilingStatus<Decimal>,
    pub child_tax_credit: ChildTaxCreditParameters,
    pub education_credits: EducationCreditParameters,
    pub savers_credit: SaversCreditParameters,
    pub social_security_benefits: SocialSecurityBenefitParameters,
    pub payroll: PayrollParameters,
    pub net_investment_income_tax: NetInvestmentIncomeTaxParameters,
    pub early_distribution_rate: Decimal,
    pub educator_expense_limit: Decimal,
    pub student_loan_interest: StudentLoanInterestParameters,
}

const ORDINARY_RATES: [Decimal; 7] = [
    dec!(0.10),
    dec!(0.12),
    dec!(0.22),
    dec!(0.24),
    dec!(0.32),
    dec!(0.35),
    dec!(0.37),
];

const CAPITAL_GAIN_RATES: [Decimal; 3] = [dec!(0), dec!(0.15), dec!(0.20)];

/// Builds contiguous brackets from the upper bounds of every bracket but the last.
fn brackets(
    upper_bounds: &[Decimal],
    rates: &[Decimal],
) -> Vec<TaxBracket> {
    let mut min_income = Decimal::ZERO;
    rates
        .iter()
        .enumerate()
        .map(|(index, &rate)| {
            let max_income = upper_bounds.get(index).copied();
            let bracket = TaxBracket::new(min_income, max_income, rate);
            if let Some(max_income) = max_income {
                min_income = max_income;
            }
            bracket
        })
        .collect()
}

fn saver_tiers(limits: [Decimal; 3]) -> Vec<SaversCreditTier> {
    limits
        .into_iter()
        .zip([dec!(0.50), dec!(0.20), dec!(0.10)])
        .map(|(agi_limit, rate)| SaversCreditTier { agi_limit, rate })
        .collect()
}

impl Parameters {
    /// Tax year 2025 values, as amended by the 2025 reconciliation act.
    pub fn tax_year_2025() -> Self {
        let single_ordinary = [
            dec!(11925),
            dec!(48475),
            dec!(103350),
            dec!(197300),
            dec!(250525),
            dec!(626350),
        ];
        let joint_ordinary = [
            dec!(23850),
            dec!(96950),
            dec!(206700),
            dec!(394600),
            dec!(501050),
            dec!(751600),
        ];
        let separate_ordinary = [
            dec!(11925),
            dec!(48475),
            dec!(103350),
            dec!(197300),
            dec!(250525),
            dec!(375800),
        ];
        let head_ordinary = [
            dec!(17000),
            dec!(64850),
            dec!(103350),
            dec!(197300),
            dec!(250500),
            dec!(626350),
        ];

        Self {
            tax_year: SUPPORTED_TAX_YEAR,
            ordinary_brackets: ByFilingStatus::new(
                brackets(&single_ordinary, &ORDINARY_RATES),
                brackets(&joint_ordinary, &ORDINARY_RATES),
                brackets(&separate_ordinary, &ORDINARY_RATES),
                brackets(&head_ordinary, &ORDINARY_RATES),
                brackets(&joint_ordinary, &ORDINARY_RATES),
            ),
            capital_gain_brackets: ByFilingStatus::new(
                brackets(&[dec!(48350), dec!(533400)], &CAPITAL_GAIN_RATES),
                brackets(&[dec!(96700), dec!(600050)], &CAPITAL_GAIN_RATES),
                brackets(&[dec!(48350), dec!(300000)], &CAPITAL_GAIN_RATES),
                brackets(&[dec!(64750), dec!(566700)], &CAPITAL_GAIN_RATES),
                brackets(&[dec!(96700), dec!(600050)], &CAPITAL_GAIN_RATES),
            ),
            standard_deduction: StandardDeductionParameters {
                base: ByFilingStatus::new(
                    dec!(15750),
                    dec!(31500),
                    dec!(15750),
                    dec!(23625),
                    dec!(31500),
                ),
                additional: ByFilingStatus::new(
                    dec!(2000),
                    dec!(1600),
                    dec!(1600),
                    dec!(2000),
                    dec!(1600),
                ),
                dependent_minimum: dec!(1350),
                dependent_earned_income_addition: dec!(450),
                senior_age: 65,
            },
            salt: SaltParameters {
                cap: ByFilingStatus::new(
                    dec!(40000),
                    dec!(40000),
                    dec!(20000),
                    dec!(40000),
                    dec!(40000),
                ),
                floor: ByFilingStatus::new(
                    dec!(10000),
                    dec!(10000),
                    dec!(5000),
                    dec!(10000),
                    dec!(10000),
                ),
                phase_down_threshold: ByFilingStatus::new(
                    dec!(500000),
                    dec!(500000),
                    dec!(250000),
                    dec!(500000),
                    dec!(500000),
                ),
                phase_down_rate: dec!(0.30),
            },
            itemized: ItemizedDeductionParameters {
                medical_floor_rate: dec!(0.075),
                charitable_cash_limit_rate: dec!(0.60),
                charitable_noncash_limit_rate: dec!(0.30),
            },
            schedule_b_threshold: dec!(1500),
            capital_loss_limit: ByFilingStatus::new(
                dec!(3000),
                dec!(3000),
                dec!(1500),
                dec!(3000),
                dec!(3000),
            ),
            child_tax_credit: ChildTaxCreditParameters {
                credit_per_child: dec!(2200),
                credit_per_other_dependent: dec!(500),
                refundable_limit_per_child: dec!(1700),
                earned_income_threshold: dec!(2500),
                refundable_rate: dec!(0.15),
                phase_out_threshold: ByFilingStatus::new(
                    dec!(200000),
                    dec!(400000),
                    dec!(200000),
                    dec!(200000),
                    dec!(200000),
                ),
                phase_out_rate: dec!(0.05),
                phase_out_step: dec!(1000),
                child_age_limit: 17,
                min_months_lived_with: 7,
            },
            education_credits: EducationCreditParameters {
                aotc_full_rate_expenses: dec!(2000),
                aotc_partial_rate_expenses: dec!(2000),
                aotc_partial_rate: dec!(0.25),
                aotc_refundable_rate: dec!(0.40),
                llc_expense_limit: dec!(10000),
                llc_rate: dec!(0.20),
                phase_out_start: ByFilingStatus::new(
                    dec!(80000),
                    dec!(160000),
                    dec!(80000),
                    dec!(80000),
                    dec!(80000),
                ),
                phase_out_range: ByFilingStatus::new(
                    dec!(10000),
                    dec!(20000),
                    dec!(10000),
                    dec!(10000),
                    dec!(10000),
                ),
            },
            savers_credit: SaversCreditParameters {
                contribution_limit: dec!(2000),
                min_age: 18,
                tiers: ByFilingStatus::new(
                    saver_tiers([dec!(23750), dec!(25500), dec!(39500)]),
                    saver_tiers([dec!(47500), dec!(51000), dec!(79000)]),
                    saver_tiers([dec!(23750), dec!(25500), dec!(39500)]),
                    saver_tiers([dec!(35625), dec!(38250), dec!(59250)]),
                    saver_tiers([dec!(23750), dec!(25500), dec!(39500)]),
                ),
            },
            social_security_benefits: SocialSecurityBenefitParameters {
                base_amount: ByFilingStatus::new(
                    dec!(25000),
                    dec!(32000),
                    dec!(0),
                    dec!(25000),
                    dec!(25000),
                ),
                adjusted_base_amount: ByFilingStatus::new(
                    dec!(34000),
                    dec!(44000),
                    dec!(0),
                    dec!(34000),
                    dec!(34000),
                ),
            },
            payroll: PayrollParameters {
                social_security_wage_base: dec!(176100),
                social_security_rate: dec!(0.062),
                medicare_rate: dec!(0.0145),
                additional_medicare_rate: dec!(0.009),
                additional_medicare_threshold: ByFilingStatus::new(
                    dec!(200000),
                    dec!(250000),
                    dec!(125000),
                    dec!(200000),
                    dec!(200000),
                ),
            },
            net_investment_income_tax: NetInvestmentIncomeTaxParameters {
                rate: dec!(0.038),
                threshold: ByFilingStatus::new(
                    dec!(200000),
                    dec!(250000),
                    dec!(125000),
                    dec!(200000),
                    dec!(250000),
                ),
            },
            early_distribution_rate: dec!(0.10),
            educator_expense_limit: dec!(300),
            student_loan_interest: StudentLoanInterestParameters {
                max_deduction: dec!(2500),
                phase_out_start: ByFilingStatus::new(
                    dec!(85000),
                    dec!(170000),
                    dec!(0),
                    dec!(85000),
                    dec!(85000),
                ),
                phase_out_range: ByFilingStatus::new(
                    dec!(15000),
                    dec!(30000),
                    dec!(0),
                    dec!(15000),
                    dec!(15000),
                ),
            },
        }
    }

    /// Validates the table.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Invalid`] naming the first offending
    /// parameter:
    /// - a rate outside [0, 1]
    /// - a bracket schedule that does not start at zero, has gaps or
    ///   descending bounds, or lacks an open top bracket
    /// - a negative dollar amount
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (status, schedule) in self.ordinary_brackets.iter() {
            validate_brackets(&format!("ordinary_brackets.{}", status.as_str()), schedule)?;
        }
        for (status, schedule) in self.capital_gain_brackets.iter() {
            let name = format!("capital_gain_brackets.{}", status.as_str());
            validate_brackets(&name, schedule)?;
            if schedule.len() != CAPITAL_GAIN_RATES.len() {
                return Err(ParameterError::invalid(name, "expected 0%, 15% and 20% tiers"));
            }
        }
        for (status, tiers) in self.savers_credit.tiers.iter() {
            let name = format!("savers_credit.tiers.{}", status.as_str());
            for tier in tiers {
                validate_rate(&name, tier.rate)?;
            }
            if tiers.windows(2).any(|pair| pair[0].agi_limit >= pair[1].agi_limit) {
                return Err(ParameterError::invalid(name, "AGI limits must ascend"));
            }
        }

        let rates = [
            ("salt.phase_down_rate", self.salt.phase_down_rate),
            ("itemized.medical_floor_rate", self.itemized.medical_floor_rate),
            (
                "itemized.charitable_cash_limit_rate",
                self.itemized.charitable_cash_limit_rate,
            ),
            (
                "itemized.charitable_noncash_limit_rate",
                self.itemized.charitable_noncash_limit_rate,
            ),
            ("child_tax_credit.refundable_rate", self.child_tax_credit.refundable_rate),
            ("child_tax_credit.phase_out_rate", self.child_tax_credit.phase_out_rate),
            (
                "education_credits.aotc_partial_rate",
                self.education_credits.aotc_partial_rate,
            ),
            (
                "education_credits.aotc_refundable_rate",
                self.education_credits.aotc_refundable_rate,
            ),
            ("education_credits.llc_rate", self.education_credits.llc_rate),
            ("payroll.social_security_rate", self.payroll.social_security_rate),
            ("payroll.medicare_rate", self.payroll.medicare_rate),
            (
                "payroll.additional_medicare_rate",
                self.payroll.additional_medicare_rate,
            ),
            ("net_investment_income_tax.rate", self.net_investment_income_tax.rate),
            ("early_distribution_rate", self.early_distribution_rate),
        ];
        for (name, rate) in rates {
            validate_rate(name, rate)?;
        }

        let amounts = [
            ("schedule_b_threshold", self.schedule_b_threshold),
            ("educator_expense_limit", self.educator_expense_limit),
            ("student_loan_interest.max_deduction", self.student_loan_interest.max_deduction),
            ("payroll.social_security_wage_base", self.payroll.social_security_wage_base),
            ("savers_credit.contribution_limit", self.savers_credit.contribution_limit),
            ("child_tax_credit.credit_per_child", self.child_tax_credit.credit_per_child),
        ];
        for (name, amount) in amounts {
            if amount < Decimal::ZERO {
                return Err(ParameterError::invalid(name, format!("{amount} is negative")));
            }
        }
        if self.child_tax_credit.phase_out_step <= Decimal::ZERO {
            return Err(ParameterError::invalid(
                "child_tax_credit.phase_out_step",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Top of the standard deduction for a dependent filer with `earned_income`.
    pub fn dependent_standard_deduction_limit(
        &self,
        earned_income: Decimal,
    ) -> Decimal {
        let params = &self.standard_deduction;
        (earned_income + params.dependent_earned_income_addition).max(params.dependent_minimum)
    }
}

fn validate_rate(
    name: &str,
    rate: Decimal,
) -> Result<(), ParameterError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ParameterError::invalid(
            name,
            format!("rate {rate} is outside [0, 1]"),
        ));
    }
    Ok(())
}

fn validate_brackets(
    name: &str,
    schedule: &[TaxBracket],
) -> Result<(), ParameterError> {
    let Some(first) = schedule.first() else {
        return Err(ParameterError::invalid(name, "no brackets"));
    };
    if !first.min_income.is_zero() {
        return Err(ParameterError::invalid(name, "first bracket must start at zero"));
    }
    for bracket in schedule {
        validate_rate(name, bracket.tax_rate)?;
    }
    for pair in schedule.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        match lower.max_income {
            Some(max_income) if max_income == upper.min_income && max_income > lower.min_income => {}
            Some(_) => {
                return Err(ParameterError::invalid(
                    name,
                    format!("bracket starting at {} is not contiguous", upper.min_income),
                ));
            }
            None => {
                return Err(ParameterError::invalid(name, "open bracket before the top"));
            }
        }
    }
    if schedule.last().is_some_and(|top| top.max_income.is_some()) {
        return Err(ParameterError::invalid(name, "top bracket must be open"));
    }
    Ok(())
}
