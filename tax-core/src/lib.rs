pub mod calculations;
pub mod engine;
pub mod forms;
pub mod models;
pub mod validation;

pub use engine::{
    ConfigurationError, EngineError, EvaluationError, FormRegistry, ParameterError, Parameters,
    SUPPORTED_TAX_YEAR, TaxEngine, get_parameters,
};
pub use models::*;
pub use validation::{
    ReturnValidator, Severity, ValidationIssue, ValidationReport, ValidationSection,
};
