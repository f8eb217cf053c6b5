use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::form_id::FormId;
use super::line_items::LineItems;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionMethod {
    #[default]
    Standard,
    Itemized,
}

/// A message attached to one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormIssue {
    pub form: FormId,
    pub message: String,
    /// Rule code for issues raised by return validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl FormIssue {
    pub fn new(
        form: FormId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            form,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(
        form: FormId,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            form,
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

/// Outcome of one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub tax_year: i32,
    pub total_income: Decimal,
    pub agi: Decimal,
    pub taxable_income: Decimal,
    pub total_tax: Decimal,
    /// Nonrefundable credits applied against tax (Form 1040 line 21).
    pub total_credits: Decimal,
    pub total_payments: Decimal,
    pub refund_amount: Decimal,
    pub amount_owed: Decimal,
    pub effective_tax_rate: Decimal,
    pub marginal_tax_rate: Decimal,
    pub standard_deduction_amount: Decimal,
    pub itemized_deduction_amount: Decimal,
    pub deduction_method: DeductionMethod,
    /// Line items of every evaluated unit, worksheets included.
    pub form_results: BTreeMap<FormId, LineItems>,
    /// Filed forms that were activated and evaluated.
    pub required_forms: Vec<FormId>,
    pub errors: Vec<FormIssue>,
    pub warnings: Vec<FormIssue>,
}

impl CalculationResult {
    pub fn form(
        &self,
        id: FormId,
    ) -> Option<&LineItems> {
        self.form_results.get(&id)
    }

    /// Numeric value of one line, zero when the form or line is absent.
    pub fn line(
        &self,
        id: FormId,
        line: &str,
    ) -> Decimal {
        self.form(id)
            .map(|lines| lines.amount(line))
            .unwrap_or(Decimal::ZERO)
    }
}
