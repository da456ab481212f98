//! Structured validation failure reports.
//!
//! Every way a dataset can fail its schema is a [`SchemaError`]: a kind, a
//! message, and the (column, row) -> value map of offending cells. A
//! `validate` call raises exactly one error; when several underlying checks
//! fail, their errors are combined with [`SchemaError::combine`].

use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Declared element type differs from the column's actual type.
    TypeMismatch,
    /// A declared column is absent from the dataframe.
    MissingColumn,
    /// A predicate failed for one or more attributable positions.
    ValidatorFailure,
    /// A whole-column predicate failed with no finer attribution.
    AggregateFailure,
    /// An aggregate predicate returned per-row flags that do not align with
    /// the column, so no position can be attributed.
    MisalignedFlags,
    /// A boundary selector could not resolve its target.
    SelectorFailure,
    /// Two or more underlying errors combined into one report.
    Aggregated,
}

/// Key of one failure case: the column (when validating a dataframe) and the
/// row position of the offending value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CaseKey {
    pub column: Option<String>,
    pub row: usize,
}

impl CaseKey {
    fn new(column: Option<&str>, row: usize) -> Self {
        Self {
            column: column.map(str::to_string),
            row,
        }
    }
}

/// A structured validation failure report.
#[derive(Debug, Clone)]
pub struct SchemaError {
    kind: ErrorKind,
    message: String,
    failure_cases: BTreeMap<CaseKey, Value>,
}

impl SchemaError {
    /// Error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The message, without the failure-case enumeration.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Every offending (column, row) -> value pair.
    pub fn failure_cases(&self) -> &BTreeMap<CaseKey, Value> {
        &self.failure_cases
    }

    /// Declared element type differs from the actual column type. Not
    /// row-attributable, so the case map is empty.
    pub fn type_mismatch(column: Option<&str>, expected: &str, actual: &str) -> Self {
        Self {
            kind: ErrorKind::TypeMismatch,
            message: match column {
                Some(name) => format!(
                    "column '{}': expected type {}, got {}",
                    name, expected, actual
                ),
                None => format!("expected type {}, got {}", expected, actual),
            },
            failure_cases: BTreeMap::new(),
        }
    }

    /// The column's type is outside the engine's scalar repertoire, so no
    /// predicate can be evaluated against it.
    pub fn unsupported_type(column: Option<&str>, dtype: &str) -> Self {
        Self {
            kind: ErrorKind::TypeMismatch,
            message: match column {
                Some(name) => format!(
                    "column '{}': type {} is not supported for validator evaluation",
                    name, dtype
                ),
                None => format!("type {} is not supported for validator evaluation", dtype),
            },
            failure_cases: BTreeMap::new(),
        }
    }

    /// A declared column is absent from the dataframe.
    pub fn missing_column(name: &str) -> Self {
        Self {
            kind: ErrorKind::MissingColumn,
            message: format!("column '{}' not in dataframe", name),
            failure_cases: BTreeMap::new(),
        }
    }

    /// A predicate failed at the given positions.
    pub fn validator_failure(
        column: Option<&str>,
        description: &str,
        cases: impl IntoIterator<Item = (usize, Value)>,
    ) -> Self {
        let failure_cases: BTreeMap<CaseKey, Value> = cases
            .into_iter()
            .map(|(row, value)| (CaseKey::new(column, row), value))
            .collect();
        Self {
            kind: ErrorKind::ValidatorFailure,
            message: match column {
                Some(name) => format!(
                    "column '{}': validator '{}' failed for {} case(s)",
                    name,
                    description,
                    failure_cases.len()
                ),
                None => format!(
                    "validator '{}' failed for {} case(s)",
                    description,
                    failure_cases.len()
                ),
            },
            failure_cases,
        }
    }

    /// A whole-column predicate returned a single fail; every position is
    /// reported as a failure case.
    pub fn aggregate_failure(
        column: Option<&str>,
        description: &str,
        values: impl IntoIterator<Item = (usize, Value)>,
    ) -> Self {
        Self {
            kind: ErrorKind::AggregateFailure,
            message: match column {
                Some(name) => format!(
                    "column '{}': aggregate validator '{}' failed",
                    name, description
                ),
                None => format!("aggregate validator '{}' failed", description),
            },
            failure_cases: values
                .into_iter()
                .map(|(row, value)| (CaseKey::new(column, row), value))
                .collect(),
        }
    }

    /// An aggregate predicate broke its contract: per-row flags that do not
    /// align with the column. No position can be attributed, so unlike
    /// [`ErrorKind::AggregateFailure`] the case map stays empty.
    pub fn misaligned_flags(
        column: Option<&str>,
        description: &str,
        expected: usize,
        got: usize,
    ) -> Self {
        Self {
            kind: ErrorKind::MisalignedFlags,
            message: match column {
                Some(name) => format!(
                    "column '{}': validator '{}' returned {} flags for a column of length {}",
                    name, description, got, expected
                ),
                None => format!(
                    "validator '{}' returned {} flags for a column of length {}",
                    description, got, expected
                ),
            },
            failure_cases: BTreeMap::new(),
        }
    }

    /// A boundary selector could not resolve its target.
    pub fn selector_failure(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::SelectorFailure,
            message: message.into(),
            failure_cases: BTreeMap::new(),
        }
    }

    /// Combine the errors from one `validate` call into the single raised
    /// error. A single underlying error is returned unchanged; two or more
    /// produce an `Aggregated` error whose message concatenates each
    /// underlying description and whose case map is the union.
    ///
    /// Callers must pass a non-empty list; an empty one means validation
    /// succeeded and nothing should be raised.
    pub fn combine(mut errors: Vec<SchemaError>) -> SchemaError {
        debug_assert!(!errors.is_empty());
        if errors.len() == 1 {
            return errors.remove(0);
        }
        let message = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let mut failure_cases = BTreeMap::new();
        for error in errors {
            failure_cases.extend(error.failure_cases);
        }
        SchemaError {
            kind: ErrorKind::Aggregated,
            message,
            failure_cases,
        }
    }

    /// A serializable snapshot of this error for machine consumption.
    pub fn report(&self) -> FailureReport {
        FailureReport {
            kind: self.kind,
            message: self.message.clone(),
            failure_cases: self
                .failure_cases
                .iter()
                .map(|(key, value)| FailureCase {
                    column: key.column.clone(),
                    row: key.row,
                    value: value.clone(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for (key, value) in &self.failure_cases {
            write!(f, "\n  ")?;
            if let Some(column) = &key.column {
                write!(f, "[{}] ", column)?;
            }
            write!(f, "row {}: {}", key.row, value)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Serializable form of a [`SchemaError`].
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub kind: ErrorKind,
    pub message: String,
    pub failure_cases: Vec<FailureCase>,
}

/// One offending cell in a [`FailureReport`].
#[derive(Debug, Clone, Serialize)]
pub struct FailureCase {
    pub column: Option<String>,
    pub row: usize,
    pub value: Value,
}

/// Errors raised while constructing a schema, before any data is seen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("duplicate column '{0}' in schema definition")]
    DuplicateColumn(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message() {
        let err = SchemaError::missing_column("column1");
        assert_eq!(err.kind(), ErrorKind::MissingColumn);
        assert!(err.message().contains("column1"));
        assert!(err.failure_cases().is_empty());
    }

    #[test]
    fn test_validator_failure_cases() {
        let err = SchemaError::validator_failure(
            Some("score"),
            "in_range(0, 10)",
            vec![(0, Value::Int64(-20)), (3, Value::Int64(30))],
        );
        assert_eq!(err.failure_cases().len(), 2);
        assert_eq!(
            err.failure_cases()[&CaseKey::new(Some("score"), 0)],
            Value::Int64(-20)
        );
        assert!(err.message().contains("2 case(s)"));
    }

    #[test]
    fn test_combine_single_keeps_kind() {
        let err = SchemaError::combine(vec![SchemaError::missing_column("a")]);
        assert_eq!(err.kind(), ErrorKind::MissingColumn);
    }

    #[test]
    fn test_combine_unions_cases() {
        let a = SchemaError::validator_failure(Some("a"), "p", vec![(0, Value::Int64(1))]);
        let b = SchemaError::validator_failure(Some("b"), "q", vec![(0, Value::Int64(2))]);
        let combined = SchemaError::combine(vec![a, b]);
        assert_eq!(combined.kind(), ErrorKind::Aggregated);
        assert_eq!(combined.failure_cases().len(), 2);
        assert!(combined.message().contains("'p'"));
        assert!(combined.message().contains("'q'"));
    }

    #[test]
    fn test_display_enumerates_cases() {
        let err = SchemaError::validator_failure(
            Some("x"),
            "positive",
            vec![(2, Value::Int64(-1))],
        );
        let rendered = err.to_string();
        assert!(rendered.contains("positive"));
        assert!(rendered.contains("[x] row 2: -1"));
    }

    #[test]
    fn test_report_serializes() {
        let err = SchemaError::validator_failure(None, "p", vec![(1, Value::Float64(2.5))]);
        let json = serde_json::to_value(err.report()).unwrap();
        assert_eq!(json["kind"], "validator_failure");
        assert_eq!(json["failure_cases"][0]["row"], 1);
        assert_eq!(json["failure_cases"][0]["value"], 2.5);
    }
}
