use std::fmt;

use thiserror::Error;

use crate::calculations::{QualifiedDividendsWorksheetError, TaxScheduleError};
use crate::models::FormId;
use crate::validation::ValidationIssue;

/// A mistake in how forms are declared or wired together.
///
/// Always fatal: no result is produced for a misconfigured engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("form {0} is registered more than once")]
    DuplicateForm(FormId),

    #[error("{consumer} depends on {producer}, which is not registered")]
    UnknownForm { consumer: FormId, producer: FormId },

    #[error("{consumer} depends on {producer}.{field}, which {producer} does not produce")]
    UnknownOutput {
        consumer: FormId,
        producer: FormId,
        field: &'static str,
    },

    #[error("{consumer} requires {producer}, which is not active for this return")]
    UnresolvedDependency { consumer: FormId, producer: FormId },

    #[error("cyclic dependency: {}", format_cycle(.cycle))]
    CyclicDependency { cycle: Vec<FormId> },

    #[error("{consumer} read {producer}.{field} without declaring the dependency")]
    UndeclaredInput {
        consumer: FormId,
        producer: FormId,
        field: String,
    },

    #[error("{consumer} read {producer}.{field} before {producer} was evaluated")]
    UnscheduledRead {
        consumer: FormId,
        producer: FormId,
        field: String,
    },

    #[error("{form} did not produce declared output {field}")]
    MissingOutput { form: FormId, field: &'static str },

    #[error("{form} produced undeclared output {field}")]
    UndeclaredOutput { form: FormId, field: String },
}

fn format_cycle(cycle: &[FormId]) -> String {
    cycle
        .iter()
        .map(FormId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Failure of a single form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("missing required field {field}")]
    MissingRequiredField { field: String },

    #[error("{field} out of range: {message}")]
    OutOfRange { field: String, message: String },

    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// A failure-propagating producer did not evaluate.
    #[error("not evaluated because {producer} failed")]
    DependencyFailed { producer: FormId },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl EvaluationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }
}

impl From<TaxScheduleError> for EvaluationError {
    fn from(err: TaxScheduleError) -> Self {
        Self::Arithmetic(err.to_string())
    }
}

impl From<QualifiedDividendsWorksheetError> for EvaluationError {
    fn from(err: QualifiedDividendsWorksheetError) -> Self {
        Self::Arithmetic(err.to_string())
    }
}

/// An evaluation error attributed to the form that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub form: FormId,
    pub error: EvaluationError,
}

impl fmt::Display for FormError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}: {}", self.form, self.error)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParameterError {
    #[error("tax year {0} is not supported")]
    UnsupportedYear(i32),

    #[error("invalid parameter {name}: {reason}")]
    Invalid { name: String, reason: String },
}

impl ParameterError {
    pub(crate) fn invalid(
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by [`crate::TaxEngine`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Parameters(#[from] ParameterError),

    /// Input validation found errors; no form was evaluated.
    #[error("invalid return: {}", format_errors(.issues))]
    InvalidReturn { issues: Vec<ValidationIssue> },

    #[error("calculation failed: {}", format_errors(.errors))]
    CalculationFailed { errors: Vec<FormError> },
}

fn format_errors<T: fmt::Display>(errors: &[T]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
