//! Form graph evaluation.
//!
//! A run flows through four stages:
//! 1. [`FormRegistry::activated_forms`] picks the forms that apply.
//! 2. [`solver::order`] sorts them so producers precede consumers.
//! 3. [`TaxEngine`] evaluates each form against a [`FormContext`].
//! 4. The 1040 lines are folded into a [`crate::CalculationResult`].

pub mod context;
pub mod error;
pub mod form;
pub mod orchestrator;
pub mod parameters;
pub mod registry;
pub mod solver;

pub use context::{FormContext, ResultStore};
pub use error::{ConfigurationError, EngineError, EvaluationError, FormError, ParameterError};
pub use form::{Dependency, LinkKind, SnapshotField, TaxForm};
pub use orchestrator::TaxEngine;
pub use parameters::{Parameters, SUPPORTED_TAX_YEAR, get_parameters};
pub use registry::{DependencyDescription, FormDescription, FormRegistry};
