//! Schema declarations and the validation algorithm.
//!
//! A [`DataFrameSchema`] is an ordered list of [`Column`] declarations and
//! validates a whole `RecordBatch`; a [`SeriesSchema`] validates one
//! standalone array. Validation never mutates or copies data: on success the
//! input comes back unchanged, on failure a single combined [`SchemaError`]
//! is raised carrying every offending cell.

use crate::check::{Validator, ValidatorResult};
use crate::error::{DefinitionError, SchemaError};
use crate::value::Value;
use arrow::array::{Array, ArrayRef, RecordBatch};
use arrow::datatypes::DataType;
use std::collections::HashSet;
use tracing::debug;

/// Declaration of one expected column: name, element type, rules.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    dtype: DataType,
    validators: Vec<Validator>,
}

impl Column {
    /// Declare a column with its correctness rules.
    pub fn new(name: impl Into<String>, dtype: DataType, validators: Vec<Validator>) -> Self {
        Self {
            name: name.into(),
            dtype,
            validators,
        }
    }

    /// Declare a column with no rules beyond the type check.
    pub fn typed(name: impl Into<String>, dtype: DataType) -> Self {
        Self::new(name, dtype, Vec::new())
    }

    /// Append one validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared element type.
    pub fn dtype(&self) -> &DataType {
        &self.dtype
    }

    /// Declared validators, in evaluation order.
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    fn validate_series(&self, series: &ArrayRef) -> Vec<SchemaError> {
        validate_values(Some(&self.name), &self.dtype, &self.validators, series)
    }
}

/// Schema for one standalone series (no table context, no name binding).
#[derive(Debug, Clone)]
pub struct SeriesSchema {
    dtype: DataType,
    validators: Vec<Validator>,
}

impl SeriesSchema {
    /// Declare the expected element type and rules for a standalone series.
    pub fn new(dtype: DataType, validators: Vec<Validator>) -> Self {
        Self { dtype, validators }
    }

    /// Append one validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Declared element type.
    pub fn dtype(&self) -> &DataType {
        &self.dtype
    }

    /// Check a series against this schema.
    ///
    /// Returns the series unchanged on success; raises one combined
    /// [`SchemaError`] otherwise.
    pub fn validate(&self, series: ArrayRef) -> Result<ArrayRef, SchemaError> {
        debug!(rows = series.len(), "validating series");
        let errors = validate_values(None, &self.dtype, &self.validators, &series);
        if errors.is_empty() {
            Ok(series)
        } else {
            debug!(errors = errors.len(), "series validation failed");
            Err(SchemaError::combine(errors))
        }
    }
}

/// Schema for a whole dataframe: an ordered collection of [`Column`]s.
///
/// The schema is a subset constraint: table columns it does not declare are
/// ignored. Immutable once constructed and safe to share across threads.
#[derive(Debug, Clone)]
pub struct DataFrameSchema {
    columns: Vec<Column>,
}

impl DataFrameSchema {
    /// Build a schema from ordered column declarations.
    ///
    /// Duplicate column names are rejected here rather than silently
    /// resolved: a schema that declares 'x' twice is a bug, not an intent.
    pub fn new(columns: Vec<Column>) -> Result<Self, DefinitionError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(DefinitionError::DuplicateColumn(column.name().to_string()));
            }
        }
        Ok(Self { columns })
    }

    /// Declared columns, in validation order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Check a record batch against this schema.
    ///
    /// Returns the batch unchanged on success. On failure raises one
    /// [`SchemaError`] combining every violation across every declared
    /// column: all columns are always checked (no fail-fast), except that a
    /// missing column contributes only its presence error since no predicate
    /// can run against an absent column.
    pub fn validate(&self, batch: RecordBatch) -> Result<RecordBatch, SchemaError> {
        debug!(
            columns = self.columns.len(),
            rows = batch.num_rows(),
            "validating dataframe"
        );
        let mut errors = Vec::new();
        for column in &self.columns {
            match batch.column_by_name(column.name()) {
                None => errors.push(SchemaError::missing_column(column.name())),
                Some(series) => errors.extend(column.validate_series(series)),
            }
        }
        if errors.is_empty() {
            Ok(batch)
        } else {
            debug!(errors = errors.len(), "dataframe validation failed");
            Err(SchemaError::combine(errors))
        }
    }
}

/// Shared column-level algorithm for [`Column`] and [`SeriesSchema`].
///
/// Type check first, then every validator in declared order. Errors
/// accumulate; a failing validator never short-circuits its siblings. When
/// the actual type is outside the scalar repertoire no predicate can run, so
/// only the type-level error is reported.
fn validate_values(
    column: Option<&str>,
    dtype: &DataType,
    validators: &[Validator],
    series: &ArrayRef,
) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let actual = series.data_type();
    if actual != dtype {
        errors.push(SchemaError::type_mismatch(
            column,
            &dtype.to_string(),
            &actual.to_string(),
        ));
    }

    let values = match Value::extract(series.as_ref()) {
        Some(values) => values,
        None => {
            if actual == dtype && !validators.is_empty() {
                // Type matches the declaration but predicates cannot run on it.
                errors.push(SchemaError::unsupported_type(column, &actual.to_string()));
            }
            return errors;
        }
    };

    for validator in validators {
        match validator.check(&values) {
            ValidatorResult::AllPass => {}
            ValidatorResult::PartialFail(positions) => {
                errors.push(SchemaError::validator_failure(
                    column,
                    &validator.description(),
                    positions.into_iter().map(|i| (i, values[i].clone())),
                ));
            }
            ValidatorResult::AllFail => {
                errors.push(SchemaError::aggregate_failure(
                    column,
                    &validator.description(),
                    values.iter().cloned().enumerate(),
                ));
            }
            ValidatorResult::ShapeMismatch { expected, got } => {
                errors.push(SchemaError::misaligned_flags(
                    column,
                    &validator.description(),
                    expected,
                    got,
                ));
            }
        }
    }
    errors
}
