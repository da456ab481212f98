//! Validators: user-supplied correctness rules for column values.
//!
//! A validator is a predicate plus an optional human-readable error text.
//! Predicates come in two shapes: element-wise (one scalar at a time) and
//! aggregate (the whole column at once). The shape is fixed at construction,
//! and every evaluation reduces to a single tagged [`ValidatorResult`].

use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Element-wise predicate: one scalar in, pass/fail out.
pub type ElementPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Aggregate predicate: the whole column in, a [`AggregateVerdict`] out.
pub type AggregatePredicate = Arc<dyn Fn(&[Value]) -> AggregateVerdict + Send + Sync>;

/// The two predicate shapes a validator can carry.
#[derive(Clone)]
pub enum Predicate {
    Element(ElementPredicate),
    Aggregate(AggregatePredicate),
}

/// What an aggregate predicate reports about a column.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateVerdict {
    /// One pass/fail for the column as a whole.
    Uniform(bool),
    /// One flag per position, aligned with the column.
    PerRow(Vec<bool>),
}

impl From<bool> for AggregateVerdict {
    fn from(pass: bool) -> Self {
        AggregateVerdict::Uniform(pass)
    }
}

impl From<Vec<bool>> for AggregateVerdict {
    fn from(flags: Vec<bool>) -> Self {
        AggregateVerdict::PerRow(flags)
    }
}

/// The outcome of evaluating one validator against one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatorResult {
    /// Every position passed.
    AllPass,
    /// The column failed as a whole; every position counts as a failure case.
    AllFail,
    /// Exactly these positions failed.
    PartialFail(Vec<usize>),
    /// An aggregate predicate returned a per-row vector that does not align
    /// with the column. No position can be attributed.
    ShapeMismatch { expected: usize, got: usize },
}

/// A correctness rule applied to a column's values.
#[derive(Clone)]
pub struct Validator {
    predicate: Predicate,
    error: Option<String>,
}

impl Validator {
    /// Create an element-wise validator from a scalar predicate.
    pub fn element(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Predicate::Element(Arc::new(predicate)),
            error: None,
        }
    }

    /// Create an aggregate validator from a whole-column predicate.
    ///
    /// The predicate may return `AggregateVerdict::Uniform` for a single
    /// pass/fail, or `AggregateVerdict::PerRow` for per-position flags
    /// (both `bool` and `Vec<bool>` convert via `Into`).
    pub fn aggregate<V>(predicate: impl Fn(&[Value]) -> V + Send + Sync + 'static) -> Self
    where
        V: Into<AggregateVerdict>,
    {
        Self {
            predicate: Predicate::Aggregate(Arc::new(move |values| predicate(values).into())),
            error: None,
        }
    }

    /// Attach a human-readable error text reported on failure.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// The attached error text, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the predicate runs one scalar at a time.
    pub fn is_element_wise(&self) -> bool {
        matches!(self.predicate, Predicate::Element(_))
    }

    /// The text used in failure reports: the attached error, else a default
    /// naming the predicate's mode.
    pub fn description(&self) -> String {
        match &self.error {
            Some(text) => text.clone(),
            None if self.is_element_wise() => "<element-wise predicate>".to_string(),
            None => "<aggregate predicate>".to_string(),
        }
    }

    /// Evaluate this validator against a column's extracted values.
    pub fn check(&self, values: &[Value]) -> ValidatorResult {
        match &self.predicate {
            Predicate::Element(pred) => reduce_flags(values.iter().map(|v| pred(v))),
            Predicate::Aggregate(pred) => match pred(values) {
                AggregateVerdict::Uniform(true) => ValidatorResult::AllPass,
                AggregateVerdict::Uniform(false) => ValidatorResult::AllFail,
                AggregateVerdict::PerRow(flags) if flags.len() != values.len() => {
                    ValidatorResult::ShapeMismatch {
                        expected: values.len(),
                        got: flags.len(),
                    }
                }
                AggregateVerdict::PerRow(flags) => reduce_flags(flags.into_iter()),
            },
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("element_wise", &self.is_element_wise())
            .field("error", &self.error)
            .finish()
    }
}

fn reduce_flags(flags: impl Iterator<Item = bool>) -> ValidatorResult {
    let failed: Vec<usize> = flags
        .enumerate()
        .filter_map(|(i, pass)| (!pass).then_some(i))
        .collect();
    if failed.is_empty() {
        ValidatorResult::AllPass
    } else {
        ValidatorResult::PartialFail(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Int64).collect()
    }

    #[test]
    fn test_element_wise_all_pass() {
        let v = Validator::element(|v| *v > Value::Int64(0));
        assert_eq!(v.check(&ints(&[1, 2, 3])), ValidatorResult::AllPass);
    }

    #[test]
    fn test_element_wise_partial_fail() {
        let v = Validator::element(|v| *v >= Value::Int64(0));
        assert_eq!(
            v.check(&ints(&[-1, 0, -3, 4])),
            ValidatorResult::PartialFail(vec![0, 2])
        );
    }

    #[test]
    fn test_aggregate_uniform() {
        let pass = Validator::aggregate(|vals: &[Value]| vals.len() < 10);
        assert_eq!(pass.check(&ints(&[1, 2])), ValidatorResult::AllPass);

        let fail = Validator::aggregate(|_: &[Value]| false);
        assert_eq!(fail.check(&ints(&[1, 2])), ValidatorResult::AllFail);
    }

    #[test]
    fn test_aggregate_per_row() {
        let v = Validator::aggregate(|vals: &[Value]| {
            vals.iter()
                .map(|v| *v != Value::Int64(2))
                .collect::<Vec<bool>>()
        });
        assert_eq!(
            v.check(&ints(&[1, 2, 3])),
            ValidatorResult::PartialFail(vec![1])
        );
    }

    #[test]
    fn test_aggregate_shape_mismatch() {
        let v = Validator::aggregate(|_: &[Value]| vec![true, false]);
        assert_eq!(
            v.check(&ints(&[1, 2, 3])),
            ValidatorResult::ShapeMismatch {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn test_description_defaults() {
        assert_eq!(
            Validator::element(|_| true).description(),
            "<element-wise predicate>"
        );
        assert_eq!(
            Validator::aggregate(|_: &[Value]| true).description(),
            "<aggregate predicate>"
        );
        assert_eq!(
            Validator::element(|_| true).with_error("positive").description(),
            "positive"
        );
    }
}
