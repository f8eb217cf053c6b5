use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::engine::context::{FormContext, ResultStore};
use crate::engine::error::{ConfigurationError, EngineError, EvaluationError, FormError};
use crate::engine::form::{TaxForm, producers};
use crate::engine::parameters::{Parameters, get_parameters};
use crate::engine::registry::FormRegistry;
use crate::engine::solver;
use crate::models::{
    CalculationResult, DeductionMethod, FormId, FormIssue, FormKind, LineItems, ReturnSnapshot,
};
use crate::validation::{ReturnValidator, ValidationIssue};

/// Drives the registry, solver and form units for one return at a time.
///
/// The engine holds no per-run state; one instance can serve concurrent runs
/// from several threads.
pub struct TaxEngine {
    registry: FormRegistry,
}

impl TaxEngine {
    /// Validates `registry` and checks the full registered graph for cycles.
    ///
    /// # Errors
    ///
    /// Returns any [`ConfigurationError`] found in the declarations.
    pub fn new(registry: FormRegistry) -> Result<Self, ConfigurationError> {
        registry.validate()?;
        let all: Vec<&dyn TaxForm> = registry.forms().collect();
        solver::order(&all)?;
        Ok(Self { registry })
    }

    /// Engine over [`FormRegistry::standard`].
    pub fn standard() -> Result<Self, ConfigurationError> {
        Self::new(FormRegistry::standard())
    }

    pub fn registry(&self) -> &FormRegistry {
        &self.registry
    }

    /// Calculates `snapshot` with the built-in parameters for `tax_year`.
    ///
    /// # Errors
    ///
    /// See [`TaxEngine::calculate_with`]; additionally
    /// [`EngineError::Parameters`] for an unsupported year.
    pub fn calculate(
        &self,
        snapshot: &ReturnSnapshot,
        tax_year: i32,
    ) -> Result<CalculationResult, EngineError> {
        let params = get_parameters(tax_year)?;
        self.calculate_with(snapshot, params)
    }

    /// Calculates `snapshot` against an explicit parameter table.
    ///
    /// The snapshot is validated first. Forms whose failure-propagating
    /// producers failed are skipped; forms whose optional producers failed run
    /// with those lines at zero. Validation warnings, and any inconsistency
    /// found in the finished result, are reported on the result.
    ///
    /// # Errors
    ///
    /// * [`EngineError::InvalidReturn`] if input validation found errors.
    /// * [`EngineError::Configuration`] on an unresolved dependency, a cycle
    ///   among activated forms, or a form reading or producing lines it did
    ///   not declare.
    /// * [`EngineError::CalculationFailed`] if Form 1040 could not be
    ///   evaluated.
    pub fn calculate_with(
        &self,
        snapshot: &ReturnSnapshot,
        params: &Parameters,
    ) -> Result<CalculationResult, EngineError> {
        let validator = ReturnValidator::new(snapshot, params);
        let report = validator.validate_inputs();
        if !report.is_valid() {
            let issues: Vec<ValidationIssue> = report.errors().cloned().collect();
            warn!(errors = issues.len(), "return failed input validation");
            return Err(EngineError::InvalidReturn { issues });
        }

        let activated = self.registry.activated_forms(snapshot, params);
        let ordered = solver::order(&activated)?;
        debug!(
            filing_status = snapshot.filing_status.as_str(),
            forms = ordered.len(),
            "evaluation order resolved"
        );

        let mut store = ResultStore::new();
        let mut failed = BTreeSet::new();
        let mut errors = Vec::new();
        let mut warnings: Vec<FormIssue> = report
            .warnings()
            .map(ValidationIssue::to_form_issue)
            .collect();

        for form in &ordered {
            let id = form.id();
            let links = producers(*form);

            let blocking = links
                .iter()
                .find(|(producer, link)| link.propagates_failure() && failed.contains(producer));
            if let Some(&(producer, _)) = blocking {
                warn!(form = %id, %producer, "skipping form after producer failure");
                failed.insert(id);
                errors.push(FormError {
                    form: id,
                    error: EvaluationError::DependencyFailed { producer },
                });
                continue;
            }
            for (producer, _) in links
                .iter()
                .filter(|(producer, link)| !link.propagates_failure() && failed.contains(producer))
            {
                warnings.push(FormIssue::new(
                    id,
                    format!("{producer} was not evaluated; its lines were read as zero"),
                ));
            }

            let mut ctx = FormContext::new(id, snapshot, params, &store, form.dependencies());
            let outcome = form.evaluate(&mut ctx);
            warnings.extend(
                ctx.into_warnings()
                    .into_iter()
                    .map(|message| FormIssue::new(id, message)),
            );

            match outcome {
                Ok(lines) => {
                    verify_outputs(*form, &lines)?;
                    debug!(form = %id, lines = lines.len(), "form evaluated");
                    store.insert(id, lines)?;
                }
                Err(EvaluationError::Configuration(err)) => return Err(err.into()),
                Err(error) => {
                    warn!(form = %id, %error, "form evaluation failed");
                    failed.insert(id);
                    errors.push(FormError { form: id, error });
                }
            }
        }

        if !store.contains(FormId::Form1040) {
            return Err(EngineError::CalculationFailed { errors });
        }

        let required_forms = activated
            .iter()
            .filter(|form| form.kind() == FormKind::Form && store.contains(form.id()))
            .map(|form| form.id())
            .collect();
        let mut result = assemble(
            params.tax_year,
            store.into_inner(),
            required_forms,
            errors,
            warnings,
        );
        for issue in validator.validate_result(&result).issues {
            if issue.is_error() {
                warn!(code = issue.code, %issue, "calculated return is inconsistent");
                result.errors.push(issue.to_form_issue());
            } else {
                result.warnings.push(issue.to_form_issue());
            }
        }

        info!(
            tax_year = result.tax_year,
            agi = %result.agi,
            total_tax = %result.total_tax,
            refund = %result.refund_amount,
            owed = %result.amount_owed,
            "calculation complete"
        );
        Ok(result)
    }
}

/// Checks that `lines` holds exactly the keys `form` declares.
fn verify_outputs(
    form: &dyn TaxForm,
    lines: &LineItems,
) -> Result<(), ConfigurationError> {
    let declared = form.outputs();
    if let Some(field) = declared.iter().copied().find(|field| !lines.contains(field)) {
        return Err(ConfigurationError::MissingOutput {
            form: form.id(),
            field,
        });
    }
    if let Some(field) = lines.keys().find(|key| !declared.contains(key)) {
        return Err(ConfigurationError::UndeclaredOutput {
            form: form.id(),
            field: field.to_string(),
        });
    }
    Ok(())
}

fn assemble(
    tax_year: i32,
    form_results: BTreeMap<FormId, LineItems>,
    required_forms: Vec<FormId>,
    errors: Vec<FormError>,
    warnings: Vec<FormIssue>,
) -> CalculationResult {
    let line = |form: FormId, key: &str| {
        form_results
            .get(&form)
            .map_or(Decimal::ZERO, |lines| lines.amount(key))
    };
    let itemized_used = form_results
        .get(&FormId::Form1040)
        .is_some_and(|lines| lines.flag("itemized_deduction_used"));

    CalculationResult {
        tax_year,
        total_income: line(FormId::Form1040, "line_9"),
        agi: line(FormId::Form1040, "line_11"),
        taxable_income: line(FormId::Form1040, "line_15"),
        total_tax: line(FormId::Form1040, "line_24"),
        total_credits: line(FormId::Form1040, "line_21"),
        total_payments: line(FormId::Form1040, "line_33"),
        refund_amount: line(FormId::Form1040, "line_34"),
        amount_owed: line(FormId::Form1040, "line_37"),
        effective_tax_rate: line(FormId::Form1040, "effective_rate"),
        marginal_tax_rate: line(FormId::Form1040, "marginal_rate"),
        standard_deduction_amount: line(FormId::TaxComputation, "standard_deduction"),
        itemized_deduction_amount: line(FormId::TaxComputation, "itemized_deduction"),
        deduction_method: if itemized_used {
            DeductionMethod::Itemized
        } else {
            DeductionMethod::Standard
        },
        required_forms,
        errors: errors
            .into_iter()
            .map(|failure| FormIssue::new(failure.form, failure.error.to_string()))
            .collect(),
        warnings,
        form_results,
    }
}
