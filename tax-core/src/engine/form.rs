use crate::engine::context::FormContext;
use crate::engine::error::EvaluationError;
use crate::engine::parameters::Parameters;
use crate::models::{FormId, FormKind, LineItems, ReturnSnapshot};

/// How a consumer treats a producer that is inactive or failed.
///
/// Ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkKind {
    /// Inactive or failed producer reads as zero; the consumer still runs and
    /// a warning is recorded.
    Optional,
    /// Inactive producer reads as zero; a failed producer fails the consumer.
    Conditional,
    /// Producer must be active; a failed producer fails the consumer.
    Required,
}

impl LinkKind {
    pub fn propagates_failure(&self) -> bool {
        !matches!(self, Self::Optional)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Optional => "optional",
            Self::Conditional => "conditional",
            Self::Required => "required",
        }
    }
}

/// One `(form, field)` a unit reads from another unit's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub form: FormId,
    pub field: &'static str,
    pub link: LinkKind,
}

impl Dependency {
    pub const fn required(
        form: FormId,
        field: &'static str,
    ) -> Self {
        Self {
            form,
            field,
            link: LinkKind::Required,
        }
    }

    pub const fn conditional(
        form: FormId,
        field: &'static str,
    ) -> Self {
        Self {
            form,
            field,
            link: LinkKind::Conditional,
        }
    }

    pub const fn optional(
        form: FormId,
        field: &'static str,
    ) -> Self {
        Self {
            form,
            field,
            link: LinkKind::Optional,
        }
    }
}

/// Raw snapshot data a unit reads. Declared for documentation; creates no
/// graph edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotField {
    FilingStatus,
    Taxpayer,
    Spouse,
    Wages,
    Interest,
    Dividends,
    CapitalSales,
    RetirementDistributions,
    Unemployment,
    SocialSecurity,
    OtherIncome,
    Adjustments,
    ItemizedDeductions,
    Dependents,
    EducationExpenses,
    RetirementContributions,
    EstimatedTaxPayments,
    CapitalLossCarryover,
}

impl SnapshotField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilingStatus => "filing_status",
            Self::Taxpayer => "taxpayer",
            Self::Spouse => "spouse",
            Self::Wages => "income.wage",
            Self::Interest => "income.interest",
            Self::Dividends => "income.dividend",
            Self::CapitalSales => "income.capital_sale",
            Self::RetirementDistributions => "income.retirement",
            Self::Unemployment => "income.unemployment",
            Self::SocialSecurity => "income.social_security",
            Self::OtherIncome => "other_income",
            Self::Adjustments => "adjustments",
            Self::ItemizedDeductions => "itemized_deductions",
            Self::Dependents => "dependents",
            Self::EducationExpenses => "education_expenses",
            Self::RetirementContributions => "retirement_contributions",
            Self::EstimatedTaxPayments => "estimated_tax_payments",
            Self::CapitalLossCarryover => "capital_loss_carryover",
        }
    }
}

/// A form or worksheet the engine can evaluate.
///
/// Implementations are stateless: all per-run data arrives through the
/// [`FormContext`], so one registered instance serves every run and every
/// thread.
pub trait TaxForm: Send + Sync {
    fn id(&self) -> FormId;

    fn title(&self) -> &'static str;

    fn kind(&self) -> FormKind {
        FormKind::Form
    }

    /// Whether the form applies to this return. Reads raw snapshot data and
    /// parameters only, never other forms' outputs.
    fn activates(
        &self,
        snapshot: &ReturnSnapshot,
        params: &Parameters,
    ) -> bool;

    fn inputs(&self) -> &'static [SnapshotField];

    fn dependencies(&self) -> &'static [Dependency];

    /// Exactly the line keys `evaluate` produces.
    fn outputs(&self) -> &'static [&'static str];

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError>;
}

/// Distinct producers `form` depends on, with the strongest link to each,
/// in declaration order.
pub fn producers(form: &dyn TaxForm) -> Vec<(FormId, LinkKind)> {
    let mut producers: Vec<(FormId, LinkKind)> = Vec::new();
    for dependency in form.dependencies() {
        match producers
            .iter_mut()
            .find(|(producer, _)| *producer == dependency.form)
        {
            Some((_, link)) => *link = (*link).max(dependency.link),
            None => producers.push((dependency.form, dependency.link)),
        }
    }
    producers
}
