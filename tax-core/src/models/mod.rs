mod calculation_result;
mod filing_status;
mod form_id;
mod income;
mod line_items;
mod return_snapshot;
mod tax_bracket;

pub use calculation_result::{CalculationResult, DeductionMethod, FormIssue};
pub use filing_status::{ByFilingStatus, FilingStatusCode};
pub use form_id::{FormId, FormKind};
pub use income::{
    CapitalSale, DividendStatement, HoldingPeriod, IncomeItem, InterestStatement, Owner,
    RetirementDistribution, SocialSecurityStatement, UnemploymentCompensation, WageStatement,
};
pub use line_items::{LineItems, LineValue};
pub use return_snapshot::{
    Adjustments, CapitalLossCarryover, Dependent, EducationCreditType, EducationExpense,
    ItemizedDeductions, Person, RetirementContribution, ReturnSnapshot,
};
pub use tax_bracket::TaxBracket;
