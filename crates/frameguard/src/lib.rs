//! Schema validation for Arrow record batches.
//!
//! # Philosophy: declare it, then enforce it
//!
//! A schema in frameguard is a declaration of what a dataset must look like:
//! column names, element types, and correctness rules. Validation checks a
//! concrete `RecordBatch` (or a standalone array) against that declaration
//! and either hands the data back untouched or raises one structured error
//! carrying every offending cell.
//!
//! There is no coercion and no repair. If the data does not match the
//! declaration, validation FAILS, and the report says exactly where:
//!
//! - Data quality: every violation is enumerated, none is hidden
//! - Debuggability: failure cases map (column, row) to the offending value
//! - Trust: a passing batch is byte-for-byte the batch you passed in
//!
//! # Modules
//!
//! - [`schema`]: [`DataFrameSchema`], [`SeriesSchema`], [`Column`] and the
//!   validation algorithm
//! - [`check`]: [`Validator`] and the predicate model
//! - [`checks`]: built-in validator constructors (ranges, membership,
//!   string shape)
//! - [`value`]: the dynamic scalar [`Value`] predicates are written against
//! - [`error`]: [`SchemaError`] and the failure-report types
//! - [`boundary`]: [`validate_input`] / [`validate_output`] function
//!   wrappers and the [`Selector`] model
//!
//! # Example
//!
//! ```
//! use arrow::array::{ArrayRef, Int64Array, RecordBatch};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use frameguard::{checks, Column, DataFrameSchema, Value};
//! use std::sync::Arc;
//!
//! let schema = DataFrameSchema::new(vec![Column::new(
//!     "score",
//!     DataType::Int64,
//!     vec![checks::in_range(Value::Int64(0), Value::Int64(10))],
//! )])
//! .unwrap();
//!
//! let batch = RecordBatch::try_new(
//!     Arc::new(Schema::new(vec![Field::new("score", DataType::Int64, false)])),
//!     vec![Arc::new(Int64Array::from(vec![-20, 5, 10, 30])) as ArrayRef],
//! )
//! .unwrap();
//!
//! let err = schema.validate(batch).unwrap_err();
//! assert_eq!(err.failure_cases().len(), 2); // rows 0 and 3
//! ```

pub mod boundary;
pub mod check;
pub mod checks;
pub mod error;
pub mod schema;
pub mod value;

pub use boundary::{validate_input, validate_output, CallContext, Selector, Subject, SubjectSchema};
pub use check::{AggregateVerdict, Predicate, Validator, ValidatorResult};
pub use error::{CaseKey, DefinitionError, ErrorKind, FailureCase, FailureReport, SchemaError};
pub use schema::{Column, DataFrameSchema, SeriesSchema};
pub use value::Value;
