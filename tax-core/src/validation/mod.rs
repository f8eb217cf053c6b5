//! Return validation.
//!
//! [`ReturnValidator`] checks a return in two passes:
//! 1. [`ReturnValidator::validate_inputs`] reads only the snapshot. The engine
//!    runs it before any form and refuses the return when it finds errors.
//! 2. [`ReturnValidator::validate_result`] reads the finished
//!    [`CalculationResult`] as well. Its issues are reported on the result.
//!
//! Issues are grouped into [`ValidationSection`]s so callers can run one
//! section at a time.

mod amounts;
mod consistency;
mod credits;
mod deductions;
mod income;
mod required_fields;

use std::fmt;

use serde::Serialize;

use crate::engine::Parameters;
use crate::models::{CalculationResult, FormId, FormIssue, ReturnSnapshot};

pub use amounts::{MAX_AMOUNT, MAX_RETURN_TOTAL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The return cannot be calculated as entered.
    Error,
    /// The return calculates but something deserves a second look.
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSection {
    Amounts,
    RequiredFields,
    Income,
    Deductions,
    Credits,
    MathConsistency,
}

impl ValidationSection {
    pub const ALL: [Self; 6] = [
        Self::Amounts,
        Self::RequiredFields,
        Self::Income,
        Self::Deductions,
        Self::Credits,
        Self::MathConsistency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amounts => "amounts",
            Self::RequiredFields => "required_fields",
            Self::Income => "income",
            Self::Deductions => "deductions",
            Self::Credits => "credits",
            Self::MathConsistency => "math_consistency",
        }
    }
}

impl fmt::Display for ValidationSection {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding of a validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub section: ValidationSection,
    /// Stable rule code, e.g. `W2_NEGATIVE_WAGES`.
    pub code: &'static str,
    /// Form the finding is reported against.
    pub form: FormId,
    /// Snapshot path of the offending value, when there is one.
    pub field: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    pub(crate) fn error(
        section: ValidationSection,
        code: &'static str,
        form: FormId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            section,
            code,
            form,
            field: None,
            message: message.into(),
        }
    }

    pub(crate) fn warning(
        section: ValidationSection,
        code: &'static str,
        form: FormId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(section, code, form, message)
        }
    }

    pub(crate) fn on(
        mut self,
        field: impl Into<String>,
    ) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The issue as carried on a [`CalculationResult`].
    pub fn to_form_issue(&self) -> FormIssue {
        FormIssue::with_code(self.form, self.code, self.message.clone())
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{} ({}): {}", self.code, field, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

/// Every issue one validation pass found, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }

    /// True when no issue is an error.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Codes of every issue, for compact assertions and logs.
    pub fn codes(&self) -> Vec<&'static str> {
        self.issues.iter().map(|issue| issue.code).collect()
    }
}

/// Runs the validation rules against one return.
pub struct ReturnValidator<'a> {
    snapshot: &'a ReturnSnapshot,
    params: &'a Parameters,
}

impl<'a> ReturnValidator<'a> {
    pub fn new(
        snapshot: &'a ReturnSnapshot,
        params: &'a Parameters,
    ) -> Self {
        Self { snapshot, params }
    }

    /// Rules that need only the snapshot.
    pub fn validate_inputs(&self) -> ValidationReport {
        if let Some(rejected) = self.rejected_amounts() {
            return rejected;
        }
        let mut issues = Vec::new();
        for section in ValidationSection::ALL {
            self.check_inputs(section, &mut issues);
        }
        ValidationReport { issues }
    }

    /// Rules that read the calculated return.
    pub fn validate_result(
        &self,
        result: &CalculationResult,
    ) -> ValidationReport {
        if let Some(rejected) = self.rejected_amounts() {
            return rejected;
        }
        let mut issues = Vec::new();
        for section in ValidationSection::ALL {
            self.check_result(section, result, &mut issues);
        }
        ValidationReport { issues }
    }

    /// Both passes; the result pass only when `result` is given.
    pub fn validate_all(
        &self,
        result: Option<&CalculationResult>,
    ) -> ValidationReport {
        let mut report = self.validate_inputs();
        if let (true, Some(result)) = (report.is_valid(), result) {
            report.issues.extend(self.validate_result(result).issues);
        }
        report
    }

    /// One section's rules. Amount errors are reported in place of any other
    /// section's rules, which add amounts together.
    pub fn validate_section(
        &self,
        section: ValidationSection,
        result: Option<&CalculationResult>,
    ) -> ValidationReport {
        if let Some(rejected) = self.rejected_amounts() {
            return rejected;
        }
        let mut issues = Vec::new();
        self.check_inputs(section, &mut issues);
        if let Some(result) = result {
            self.check_result(section, result, &mut issues);
        }
        ValidationReport { issues }
    }

    fn rejected_amounts(&self) -> Option<ValidationReport> {
        let issues = amounts::check(self.snapshot);
        (!issues.is_empty()).then_some(ValidationReport { issues })
    }

    fn check_inputs(
        &self,
        section: ValidationSection,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let (snapshot, params) = (self.snapshot, self.params);
        match section {
            // Already run by `rejected_amounts`.
            ValidationSection::Amounts => {}
            ValidationSection::RequiredFields => required_fields::check(snapshot, issues),
            ValidationSection::Income => income::check(snapshot, issues),
            ValidationSection::Deductions => deductions::check_inputs(snapshot, issues),
            ValidationSection::Credits => credits::check_inputs(snapshot, params, issues),
            ValidationSection::MathConsistency => {}
        }
    }

    fn check_result(
        &self,
        section: ValidationSection,
        result: &CalculationResult,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let (snapshot, params) = (self.snapshot, self.params);
        match section {
            ValidationSection::Deductions => {
                deductions::check_result(snapshot, params, result, issues)
            }
            ValidationSection::Credits => credits::check_result(snapshot, params, result, issues),
            ValidationSection::MathConsistency => consistency::check(snapshot, result, issues),
            _ => {}
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use rust_decimal::Decimal;

    use crate::models::CalculationResult;

    /// A result carrying only `agi`, for rules that read nothing else.
    pub(crate) fn result_with_agi(agi: Decimal) -> CalculationResult {
        CalculationResult {
            tax_year: 2025,
            total_income: agi,
            agi,
            taxable_income: Decimal::ZERO,
            total_tax: Decimal::ZERO,
            total_credits: Decimal::ZERO,
            total_payments: Decimal::ZERO,
            refund_amount: Decimal::ZERO,
            amount_owed: Decimal::ZERO,
            effective_tax_rate: Decimal::ZERO,
            marginal_tax_rate: Decimal::ZERO,
            standard_deduction_amount: Decimal::ZERO,
            itemized_deduction_amount: Decimal::ZERO,
            deduction_method: Default::default(),
            form_results: Default::default(),
            required_forms: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}
