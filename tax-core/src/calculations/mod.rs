//! Tax calculation building blocks shared by the form units.
//!
//! This module provides the progressive rate schedule, cent rounding and the
//! worksheets that more than one form relies on.

pub mod brackets;
pub mod common;
pub mod worksheets;

pub use brackets::{TaxRateSchedule, TaxScheduleError};
pub use worksheets::{
    QualifiedDividendsWorksheet, QualifiedDividendsWorksheetError,
    QualifiedDividendsWorksheetInput, QualifiedDividendsWorksheetResult, SocialSecurityWorksheet,
    SocialSecurityWorksheetInput, SocialSecurityWorksheetResult,
};
