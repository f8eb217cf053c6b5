use std::collections::BTreeSet;

use serde::Serialize;

use crate::engine::error::ConfigurationError;
use crate::engine::form::TaxForm;
use crate::engine::parameters::Parameters;
use crate::forms;
use crate::models::{FormId, FormKind, ReturnSnapshot};

/// Catalog of form units, in registration order.
///
/// Typical lifetime:
/// 1. Create with `FormRegistry::standard()` (or `new()` plus `register`).
/// 2. Hand it to [`crate::TaxEngine::new`], which validates it once.
/// 3. Share the engine across runs and threads.
pub struct FormRegistry {
    forms: Vec<Box<dyn TaxForm>>,
}

/// Listing entry for one registered unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormDescription {
    pub id: FormId,
    pub title: &'static str,
    pub kind: FormKind,
    pub inputs: Vec<&'static str>,
    pub dependencies: Vec<DependencyDescription>,
    pub outputs: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyDescription {
    pub form: FormId,
    pub field: &'static str,
    pub link: &'static str,
}

impl FormRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { forms: Vec::new() }
    }

    /// The thirteen built-in units of the 2025 individual return.
    pub fn standard() -> Self {
        Self {
            forms: vec![
                Box::new(forms::Form8949),
                Box::new(forms::ScheduleB),
                Box::new(forms::ScheduleD),
                Box::new(forms::Schedule1),
                Box::new(forms::AgiWorksheet),
                Box::new(forms::ScheduleA),
                Box::new(forms::Schedule2),
                Box::new(forms::TaxComputation),
                Box::new(forms::Form8863),
                Box::new(forms::Form8880),
                Box::new(forms::Schedule3),
                Box::new(forms::Schedule8812),
                Box::new(forms::Form1040),
            ],
        }
    }

    /// Register a form unit.
    ///
    /// # Errors
    /// * [`ConfigurationError::DuplicateForm`] if a unit with the same id is
    ///   already registered.
    pub fn register(
        &mut self,
        form: Box<dyn TaxForm>,
    ) -> Result<(), ConfigurationError> {
        if self.get(form.id()).is_some() {
            return Err(ConfigurationError::DuplicateForm(form.id()));
        }
        self.forms.push(form);
        Ok(())
    }

    pub fn get(
        &self,
        id: FormId,
    ) -> Option<&dyn TaxForm> {
        self.forms
            .iter()
            .find(|form| form.id() == id)
            .map(|form| form.as_ref())
    }

    pub fn forms(&self) -> impl Iterator<Item = &dyn TaxForm> {
        self.forms.iter().map(|form| form.as_ref())
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Forms whose activation predicate holds, in registration order.
    pub fn activated_forms(
        &self,
        snapshot: &ReturnSnapshot,
        params: &Parameters,
    ) -> Vec<&dyn TaxForm> {
        self.forms()
            .filter(|form| form.activates(snapshot, params))
            .collect()
    }

    /// Checks that ids are unique and that every declared dependency names a
    /// registered form and one of its declared outputs.
    ///
    /// # Errors
    /// * [`ConfigurationError::DuplicateForm`]
    /// * [`ConfigurationError::UnknownForm`]
    /// * [`ConfigurationError::UnknownOutput`]
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut seen = BTreeSet::new();
        for form in self.forms() {
            if !seen.insert(form.id()) {
                return Err(ConfigurationError::DuplicateForm(form.id()));
            }
        }

        for form in self.forms() {
            for dependency in form.dependencies() {
                let producer =
                    self.get(dependency.form)
                        .ok_or(ConfigurationError::UnknownForm {
                            consumer: form.id(),
                            producer: dependency.form,
                        })?;
                if !producer.outputs().contains(&dependency.field) {
                    return Err(ConfigurationError::UnknownOutput {
                        consumer: form.id(),
                        producer: dependency.form,
                        field: dependency.field,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn describe(&self) -> Vec<FormDescription> {
        self.forms()
            .map(|form| FormDescription {
                id: form.id(),
                title: form.title(),
                kind: form.kind(),
                inputs: form.inputs().iter().map(|input| input.as_str()).collect(),
                dependencies: form
                    .dependencies()
                    .iter()
                    .map(|dependency| DependencyDescription {
                        form: dependency.form,
                        field: dependency.field,
                        link: dependency.link.as_str(),
                    })
                    .collect(),
                outputs: form.outputs().to_vec(),
            })
            .collect()
    }
}

impl Default for FormRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::engine::context::FormContext;
    use crate::engine::error::EvaluationError;
    use crate::engine::form::{Dependency, SnapshotField};
    use crate::models::{FilingStatusCode, LineItems};

    struct Stub {
        id: FormId,
        dependencies: &'static [Dependency],
        outputs: &'static [&'static str],
    }

    impl TaxForm for Stub {
        fn id(&self) -> FormId {
            self.id
        }

        fn title(&self) -> &'static str {
            "Stub"
        }

        fn activates(
            &self,
            snapshot: &ReturnSnapshot,
            _params: &Parameters,
        ) -> bool {
            snapshot.filing_status == FilingStatusCode::Single || self.id == FormId::Form1040
        }

        fn inputs(&self) -> &'static [SnapshotField] {
            &[SnapshotField::FilingStatus]
        }

        fn dependencies(&self) -> &'static [Dependency] {
            self.dependencies
        }

        fn outputs(&self) -> &'static [&'static str] {
            self.outputs
        }

        fn evaluate(
            &self,
            _ctx: &mut FormContext<'_>,
        ) -> Result<LineItems, EvaluationError> {
            Ok(LineItems::new())
        }
    }

    fn stub(
        id: FormId,
        dependencies: &'static [Dependency],
    ) -> Box<dyn TaxForm> {
        Box::new(Stub {
            id,
            dependencies,
            outputs: &["line_1"],
        })
    }

    #[test]
    fn register_rejects_duplicate_id() {
        let mut registry = FormRegistry::new();
        registry.register(stub(FormId::ScheduleB, &[])).unwrap();

        let result = registry.register(stub(FormId::ScheduleB, &[]));

        assert_eq!(result, Err(ConfigurationError::DuplicateForm(FormId::ScheduleB)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn validate_rejects_unregistered_producer() {
        const NEEDS_SCHEDULE_B: &[Dependency] =
            &[Dependency::required(FormId::ScheduleB, "line_1")];
        let mut registry = FormRegistry::new();
        registry
            .register(stub(FormId::Form1040, NEEDS_SCHEDULE_B))
            .unwrap();

        assert_eq!(
            registry.validate(),
            Err(ConfigurationError::UnknownForm {
                consumer: FormId::Form1040,
                producer: FormId::ScheduleB,
            })
        );
    }

    #[test]
    fn validate_rejects_undeclared_output() {
        const NEEDS_LINE_99: &[Dependency] = &[Dependency::required(FormId::ScheduleB, "line_99")];
        let mut registry = FormRegistry::new();
        registry.register(stub(FormId::ScheduleB, &[])).unwrap();
        registry
            .register(stub(FormId::Form1040, NEEDS_LINE_99))
            .unwrap();

        assert_eq!(
            registry.validate(),
            Err(ConfigurationError::UnknownOutput {
                consumer: FormId::Form1040,
                producer: FormId::ScheduleB,
                field: "line_99",
            })
        );
    }

    #[test]
    fn activated_forms_keep_registration_order() {
        let mut registry = FormRegistry::new();
        registry.register(stub(FormId::Form1040, &[])).unwrap();
        registry.register(stub(FormId::ScheduleB, &[])).unwrap();
        let params = Parameters::tax_year_2025();

        let single = ReturnSnapshot::new(FilingStatusCode::Single);
        let joint = ReturnSnapshot::new(FilingStatusCode::MarriedFilingJointly);

        let ids = |snapshot: &ReturnSnapshot| {
            registry
                .activated_forms(snapshot, &params)
                .iter()
                .map(|form| form.id())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&single), vec![FormId::Form1040, FormId::ScheduleB]);
        assert_eq!(ids(&joint), vec![FormId::Form1040]);
    }

    #[test]
    fn standard_registry_is_valid() {
        let registry = FormRegistry::standard();

        assert_eq!(registry.len(), 13);
        assert_eq!(registry.validate(), Ok(()));
    }

    #[test]
    fn standard_registry_ids_follow_declaration_order() {
        let registry = FormRegistry::standard();

        let ids: Vec<FormId> = registry.forms().map(|form| form.id()).collect();

        assert_eq!(ids, FormId::ALL.to_vec());
    }

    #[test]
    fn describe_lists_links_and_outputs() {
        let registry = FormRegistry::standard();

        let descriptions = registry.describe();
        let schedule_a = descriptions
            .iter()
            .find(|description| description.id == FormId::ScheduleA)
            .unwrap();

        assert_eq!(schedule_a.kind, FormKind::Form);
        assert!(schedule_a.inputs.contains(&"itemized_deductions"));
        assert!(schedule_a.outputs.contains(&"line_17"));
        assert!(schedule_a
            .dependencies
            .iter()
            .any(|dependency| dependency.form == FormId::AgiWorksheet
                && dependency.link == "required"));
    }
}
