//! Rendering of calculation results and the form catalog.

use std::fmt::Write;

use rust_decimal::Decimal;
use tax_core::engine::FormDescription;
use tax_core::{CalculationResult, DeductionMethod, FormKind, LineValue};

const LABEL_WIDTH: usize = 24;
const VALUE_WIDTH: usize = 14;

fn fmt_currency(val: Decimal) -> String {
    format!("${:.2}", val)
}

fn fmt_percent(rate: Decimal) -> String {
    format!("{:.2}%", rate * Decimal::ONE_HUNDRED)
}

fn fmt_line_value(value: &LineValue) -> String {
    match value {
        LineValue::Amount(amount) => fmt_currency(*amount),
        LineValue::Rate(rate) => fmt_percent(*rate),
        LineValue::Count(count) => count.to_string(),
        LineValue::Flag(flag) => if *flag { "yes" } else { "no" }.to_string(),
    }
}

fn row(
    out: &mut String,
    label: &str,
    value: impl AsRef<str>,
) {
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "  {:<label_w$}{:>value_w$}",
        label,
        value.as_ref(),
        label_w = LABEL_WIDTH,
        value_w = VALUE_WIDTH
    );
}

/// Human-readable summary of a run. With `show_lines`, every evaluated
/// form's line items follow the summary.
pub fn render_text(
    result: &CalculationResult,
    show_lines: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Federal return, tax year {}", result.tax_year);

    row(&mut out, "Total income", fmt_currency(result.total_income));
    row(&mut out, "Adjusted gross income", fmt_currency(result.agi));
    match result.deduction_method {
        DeductionMethod::Standard => row(
            &mut out,
            "Standard deduction",
            fmt_currency(result.standard_deduction_amount),
        ),
        DeductionMethod::Itemized => row(
            &mut out,
            "Itemized deductions",
            fmt_currency(result.itemized_deduction_amount),
        ),
    }
    row(&mut out, "Taxable income", fmt_currency(result.taxable_income));
    row(&mut out, "Nonrefundable credits", fmt_currency(result.total_credits));
    row(&mut out, "Total tax", fmt_currency(result.total_tax));
    row(&mut out, "Total payments", fmt_currency(result.total_payments));
    if result.amount_owed > Decimal::ZERO {
        row(&mut out, "Amount owed", fmt_currency(result.amount_owed));
    } else {
        row(&mut out, "Refund", fmt_currency(result.refund_amount));
    }
    row(&mut out, "Effective tax rate", fmt_percent(result.effective_tax_rate));
    row(&mut out, "Marginal tax rate", fmt_percent(result.marginal_tax_rate));

    let forms: Vec<&str> = result.required_forms.iter().map(|id| id.as_str()).collect();
    let _ = writeln!(out, "\nForms: {}", forms.join(", "));

    for (heading, issues) in [("Errors", &result.errors), ("Warnings", &result.warnings)] {
        if issues.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{heading}:");
        for issue in issues {
            match &issue.code {
                Some(code) => {
                    let _ = writeln!(out, "  {} [{code}]: {}", issue.form, issue.message);
                }
                None => {
                    let _ = writeln!(out, "  {}: {}", issue.form, issue.message);
                }
            }
        }
    }

    if show_lines {
        for (form, lines) in &result.form_results {
            let _ = writeln!(out, "\n[{}]", form);
            for (line, value) in lines.iter() {
                row(&mut out, line, fmt_line_value(value));
            }
        }
    }

    out
}

pub fn render_json(result: &CalculationResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// One block per registered unit with its inputs, dependencies and outputs.
pub fn render_forms_text(forms: &[FormDescription]) -> String {
    let mut out = String::new();
    for (index, form) in forms.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let kind = match form.kind {
            FormKind::Form => "form",
            FormKind::Worksheet => "worksheet",
        };
        let _ = writeln!(out, "{} ({}) {}", form.id, kind, form.title);
        if !form.inputs.is_empty() {
            let _ = writeln!(out, "  inputs:  {}", form.inputs.join(", "));
        }
        for dependency in &form.dependencies {
            let _ = writeln!(
                out,
                "  reads:   {}.{} ({})",
                dependency.form, dependency.field, dependency.link
            );
        }
        let _ = writeln!(out, "  outputs: {}", form.outputs.join(", "));
    }
    out
}

pub fn render_forms_json(forms: &[FormDescription]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(forms)
}
