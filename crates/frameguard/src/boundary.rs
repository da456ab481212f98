//! Function-boundary validation.
//!
//! [`validate_input`] and [`validate_output`] wrap an arbitrary function so
//! that a schema is enforced on one of its arguments or on its return value.
//! The target is located by a [`Selector`] resolved against a uniform
//! [`CallContext`]: ordered subjects plus a keyword map, the same shape
//! modeling a call's arguments and a structured return value.

use crate::error::SchemaError;
use crate::schema::{DataFrameSchema, SeriesSchema};
use arrow::array::{ArrayRef, RecordBatch};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A validatable unit located inside a call boundary.
#[derive(Debug, Clone)]
pub enum Subject {
    Frame(RecordBatch),
    Series(ArrayRef),
}

impl Subject {
    fn kind(&self) -> &'static str {
        match self {
            Subject::Frame(_) => "dataframe",
            Subject::Series(_) => "series",
        }
    }
}

impl From<RecordBatch> for Subject {
    fn from(batch: RecordBatch) -> Self {
        Subject::Frame(batch)
    }
}

impl From<ArrayRef> for Subject {
    fn from(series: ArrayRef) -> Self {
        Subject::Series(series)
    }
}

/// Ordered subjects plus a keyword map: a call's arguments, or its
/// structured return value.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    positional: Vec<Subject>,
    keyword: HashMap<String, Subject>,
}

impl CallContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context holding exactly one subject.
    pub fn of(subject: impl Into<Subject>) -> Self {
        Self::new().with_positional(subject)
    }

    /// Append a positional subject.
    pub fn with_positional(mut self, subject: impl Into<Subject>) -> Self {
        self.positional.push(subject.into());
        self
    }

    /// Bind a subject to a keyword name.
    pub fn with_keyword(mut self, name: impl Into<String>, subject: impl Into<Subject>) -> Self {
        self.keyword.insert(name.into(), subject.into());
        self
    }

    /// Subject at a positional index.
    pub fn positional(&self, index: usize) -> Option<&Subject> {
        self.positional.get(index)
    }

    /// Subject bound to a keyword name.
    pub fn keyword(&self, name: &str) -> Option<&Subject> {
        self.keyword.get(name)
    }

    /// Total number of subjects in the context.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    /// Whether the context holds no subjects.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// The sole subject, if the context holds exactly one.
    pub fn sole(&self) -> Option<&Subject> {
        match (self.positional.as_slice(), self.keyword.len()) {
            ([subject], 0) => Some(subject),
            ([], 1) => self.keyword.values().next(),
            _ => None,
        }
    }
}

/// A custom extraction function for arbitrary nested shapes.
pub type ExtractFn = Arc<dyn for<'a> Fn(&'a CallContext) -> Option<&'a Subject> + Send + Sync>;

/// Locates the validation target inside a [`CallContext`].
#[derive(Clone, Default)]
pub enum Selector {
    /// The sole subject is the target. Resolution fails when the context
    /// holds zero or several subjects.
    #[default]
    Identity,
    /// Target is at this positional index.
    ByIndex(usize),
    /// Target is bound to this keyword name.
    ByKey(String),
    /// Target is produced by a caller-supplied extraction function.
    ByFunction(ExtractFn),
}

impl Selector {
    /// Keyword selector.
    pub fn key(name: impl Into<String>) -> Self {
        Selector::ByKey(name.into())
    }

    /// Custom extraction-function selector.
    pub fn function(
        f: impl for<'a> Fn(&'a CallContext) -> Option<&'a Subject> + Send + Sync + 'static,
    ) -> Self {
        Selector::ByFunction(Arc::new(f))
    }

    /// Resolve the target inside `ctx`, or report why it cannot be found.
    pub fn resolve<'a>(&self, ctx: &'a CallContext) -> Result<&'a Subject, SchemaError> {
        match self {
            Selector::Identity => ctx.sole().ok_or_else(|| {
                SchemaError::selector_failure(format!(
                    "default selector expects exactly one subject, found {}",
                    ctx.len()
                ))
            }),
            Selector::ByIndex(index) => ctx.positional(*index).ok_or_else(|| {
                SchemaError::selector_failure(format!(
                    "no subject at position {} ({} positional subject(s))",
                    index,
                    ctx.positional.len()
                ))
            }),
            Selector::ByKey(name) => ctx.keyword(name).ok_or_else(|| {
                SchemaError::selector_failure(format!("no subject bound to keyword '{}'", name))
            }),
            Selector::ByFunction(f) => f(ctx).ok_or_else(|| {
                SchemaError::selector_failure("extraction function returned no subject")
            }),
        }
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Identity => write!(f, "Identity"),
            Selector::ByIndex(i) => write!(f, "ByIndex({})", i),
            Selector::ByKey(k) => write!(f, "ByKey({:?})", k),
            Selector::ByFunction(_) => write!(f, "ByFunction(..)"),
        }
    }
}

/// A schema that can be applied to a [`Subject`] found at a call boundary.
pub trait SubjectSchema {
    /// Validate the subject, rejecting subjects of the wrong kind.
    fn validate_subject(&self, subject: &Subject) -> Result<(), SchemaError>;
}

impl SubjectSchema for DataFrameSchema {
    fn validate_subject(&self, subject: &Subject) -> Result<(), SchemaError> {
        match subject {
            Subject::Frame(batch) => self.validate(batch.clone()).map(|_| ()),
            other => Err(SchemaError::selector_failure(format!(
                "selector resolved to a {}, but the schema validates a dataframe",
                other.kind()
            ))),
        }
    }
}

impl SubjectSchema for SeriesSchema {
    fn validate_subject(&self, subject: &Subject) -> Result<(), SchemaError> {
        match subject {
            Subject::Series(series) => self.validate(series.clone()).map(|_| ()),
            other => Err(SchemaError::selector_failure(format!(
                "selector resolved to a {}, but the schema validates a series",
                other.kind()
            ))),
        }
    }
}

impl<S: SubjectSchema + ?Sized> SubjectSchema for &S {
    fn validate_subject(&self, subject: &Subject) -> Result<(), SchemaError> {
        (**self).validate_subject(subject)
    }
}

impl<S: SubjectSchema + ?Sized> SubjectSchema for Arc<S> {
    fn validate_subject(&self, subject: &Subject) -> Result<(), SchemaError> {
        (**self).validate_subject(subject)
    }
}

/// Wrap `f` so the selected argument is validated before `f` runs.
///
/// On failure `f` is never invoked and the error propagates; on success the
/// unchanged context is forwarded to `f`.
pub fn validate_input<S, F, R>(
    schema: S,
    selector: Selector,
    f: F,
) -> impl Fn(CallContext) -> Result<R, SchemaError>
where
    S: SubjectSchema,
    F: Fn(CallContext) -> R,
{
    move |ctx| {
        let subject = selector.resolve(&ctx)?;
        schema.validate_subject(subject)?;
        Ok(f(ctx))
    }
}

/// Wrap `f` so the selected part of its return value is validated after `f`
/// runs.
///
/// On failure the already-computed result is discarded and the error
/// propagates; on success the unchanged return context comes back.
pub fn validate_output<S, F, A>(
    schema: S,
    selector: Selector,
    f: F,
) -> impl Fn(A) -> Result<CallContext, SchemaError>
where
    S: SubjectSchema,
    F: Fn(A) -> CallContext,
{
    move |args| {
        let out = f(args);
        let subject = selector.resolve(&out)?;
        schema.validate_subject(subject)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::schema::Column;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn int_batch(name: &str, values: Vec<i64>) -> RecordBatch {
        RecordBatch::try_new(
            Arc::new(Schema::new(vec![Field::new(name, DataType::Int64, false)])),
            vec![Arc::new(Int64Array::from(values))],
        )
        .unwrap()
    }

    fn schema() -> DataFrameSchema {
        DataFrameSchema::new(vec![Column::typed("a", DataType::Int64)]).unwrap()
    }

    #[test]
    fn test_identity_requires_sole_subject() {
        let ctx = CallContext::of(int_batch("a", vec![1]));
        assert!(Selector::Identity.resolve(&ctx).is_ok());

        let two = CallContext::new()
            .with_positional(int_batch("a", vec![1]))
            .with_positional(int_batch("a", vec![2]));
        let err = Selector::Identity.resolve(&two).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SelectorFailure);

        let err = Selector::Identity.resolve(&CallContext::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SelectorFailure);
    }

    #[test]
    fn test_identity_finds_sole_keyword() {
        let ctx = CallContext::new().with_keyword("dataframe", int_batch("a", vec![1]));
        assert!(Selector::Identity.resolve(&ctx).is_ok());
    }

    #[test]
    fn test_by_index_out_of_range() {
        let ctx = CallContext::of(int_batch("a", vec![1]));
        let err = Selector::ByIndex(3).resolve(&ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SelectorFailure);
        assert!(err.message().contains("position 3"));
    }

    #[test]
    fn test_by_key_unknown() {
        let ctx = CallContext::new().with_keyword("dataframe", int_batch("a", vec![1]));
        let err = Selector::key("other").resolve(&ctx).unwrap_err();
        assert!(err.message().contains("other"));
    }

    #[test]
    fn test_input_wrapper_skips_body_on_failure() {
        use std::sync::atomic::{AtomicBool, Ordering};
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();

        let schema = DataFrameSchema::new(vec![Column::typed("missing", DataType::Int64)])
            .unwrap();
        let wrapped = validate_input(schema, Selector::key("dataframe"), move |_ctx| {
            ran_clone.store(true, Ordering::SeqCst);
        });

        let ctx = CallContext::new().with_keyword("dataframe", int_batch("a", vec![1]));
        let err = wrapped(ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingColumn);
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_input_wrapper_forwards_on_success() {
        let wrapped = validate_input(schema(), Selector::Identity, |ctx: CallContext| ctx.len());
        assert_eq!(wrapped(CallContext::of(int_batch("a", vec![1]))).unwrap(), 1);
    }

    #[test]
    fn test_output_wrapper_discards_failing_result() {
        let schema = DataFrameSchema::new(vec![Column::typed("wanted", DataType::Int64)])
            .unwrap();
        // Returns a (label, table) pair; the table sits at position 1.
        let wrapped = validate_output(schema, Selector::ByIndex(1), |n: i64| {
            CallContext::new()
                .with_keyword("label", int_batch("ignored", vec![0]))
                .with_positional(int_batch("meta", vec![n]))
                .with_positional(int_batch("a", vec![n]))
        });

        let err = wrapped(7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingColumn);
        assert!(err.message().contains("wanted"));
    }

    #[test]
    fn test_output_wrapper_returns_context_unchanged() {
        let wrapped = validate_output(schema(), Selector::ByIndex(0), |n: i64| {
            CallContext::of(int_batch("a", vec![n]))
        });
        let out = wrapped(5).unwrap();
        assert_eq!(out.len(), 1);
        match out.positional(0).unwrap() {
            Subject::Frame(batch) => assert_eq!(batch.num_rows(), 1),
            Subject::Series(_) => panic!("expected a frame"),
        }
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let series: ArrayRef = Arc::new(Int64Array::from(vec![1]));
        let ctx = CallContext::of(series);
        let err = schema()
            .validate_subject(Selector::Identity.resolve(&ctx).unwrap())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SelectorFailure);
        assert!(err.message().contains("series"));
    }

    #[test]
    fn test_function_selector() {
        let ctx = CallContext::new()
            .with_positional(int_batch("meta", vec![0]))
            .with_positional(int_batch("a", vec![1]));
        let selector = Selector::function(|ctx| ctx.positional(1));
        let wrapped = validate_input(schema(), selector, |_| "ran");
        assert_eq!(wrapped(ctx).unwrap(), "ran");
    }
}
