//! Worksheets shared by several forms.
//!
//! Each worksheet takes an input struct and produces a result struct; the
//! form units decide where the inputs come from.

pub mod qualified_dividends;
pub mod social_security;

pub use qualified_dividends::{
    QualifiedDividendsWorksheet, QualifiedDividendsWorksheetError,
    QualifiedDividendsWorksheetInput, QualifiedDividendsWorksheetResult,
};
pub use social_security::{
    SocialSecurityWorksheet, SocialSecurityWorksheetInput, SocialSecurityWorksheetResult,
};
