use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::engine::error::{ConfigurationError, EvaluationError};
use crate::engine::form::{Dependency, LinkKind};
use crate::engine::parameters::Parameters;
use crate::models::{FilingStatusCode, FormId, LineItems, LineValue, ReturnSnapshot};

/// Line items of every form evaluated so far in one run.
///
/// Each form id is written at most once.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    results: BTreeMap<FormId, LineItems>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateForm`] if `form` already has
    /// results in this run.
    pub fn insert(
        &mut self,
        form: FormId,
        lines: LineItems,
    ) -> Result<(), ConfigurationError> {
        if self.results.contains_key(&form) {
            return Err(ConfigurationError::DuplicateForm(form));
        }
        self.results.insert(form, lines);
        Ok(())
    }

    pub fn get(
        &self,
        form: FormId,
    ) -> Option<&LineItems> {
        self.results.get(&form)
    }

    pub fn contains(
        &self,
        form: FormId,
    ) -> bool {
        self.results.contains_key(&form)
    }

    pub fn into_inner(self) -> BTreeMap<FormId, LineItems> {
        self.results
    }
}

/// What one form sees while it evaluates: the snapshot, the parameters, and
/// read access to the outputs it declared.
pub struct FormContext<'a> {
    form: FormId,
    snapshot: &'a ReturnSnapshot,
    params: &'a Parameters,
    store: &'a ResultStore,
    dependencies: &'static [Dependency],
    warnings: Vec<String>,
}

impl<'a> FormContext<'a> {
    pub fn new(
        form: FormId,
        snapshot: &'a ReturnSnapshot,
        params: &'a Parameters,
        store: &'a ResultStore,
        dependencies: &'static [Dependency],
    ) -> Self {
        Self {
            form,
            snapshot,
            params,
            store,
            dependencies,
            warnings: Vec::new(),
        }
    }

    pub fn form(&self) -> FormId {
        self.form
    }

    pub fn snapshot(&self) -> &'a ReturnSnapshot {
        self.snapshot
    }

    pub fn params(&self) -> &'a Parameters {
        self.params
    }

    pub fn filing_status(&self) -> FilingStatusCode {
        self.snapshot.filing_status
    }

    pub fn tax_year(&self) -> i32 {
        self.params.tax_year
    }

    /// Numeric value of `producer.field`.
    ///
    /// An inactive `Conditional` or inactive/failed `Optional` producer reads
    /// as zero.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the read was not declared, or if a
    /// `Required` producer has not been evaluated.
    pub fn amount(
        &self,
        producer: FormId,
        field: &str,
    ) -> Result<Decimal, EvaluationError> {
        Ok(self
            .read(producer, field)?
            .map_or(Decimal::ZERO, |value| value.as_decimal()))
    }

    pub fn flag(
        &self,
        producer: FormId,
        field: &str,
    ) -> Result<bool, EvaluationError> {
        Ok(self
            .read(producer, field)?
            .is_some_and(|value| value.as_flag()))
    }

    /// Whether `producer` has results in this run.
    pub fn has(
        &self,
        producer: FormId,
    ) -> bool {
        self.store.contains(producer)
    }

    pub fn warn(
        &mut self,
        message: impl Into<String>,
    ) {
        self.warnings.push(message.into());
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    fn read(
        &self,
        producer: FormId,
        field: &str,
    ) -> Result<Option<&'a LineValue>, EvaluationError> {
        let dependency = self
            .dependencies
            .iter()
            .find(|dependency| dependency.form == producer && dependency.field == field)
            .ok_or_else(|| ConfigurationError::UndeclaredInput {
                consumer: self.form,
                producer,
                field: field.to_string(),
            })?;

        match self.store.get(producer) {
            Some(lines) => Ok(lines.get(field)),
            None if dependency.link == LinkKind::Required => {
                Err(ConfigurationError::UnscheduledRead {
                    consumer: self.form,
                    producer,
                    field: field.to_string(),
                }
                .into())
            }
            None => Ok(None),
        }
    }
}
