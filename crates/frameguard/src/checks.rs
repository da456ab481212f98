//! Built-in validator constructors.
//!
//! Ready-made rules for the common cases: comparisons, ranges, membership,
//! string shape. Each carries a default error text naming the check and its
//! parameters, so reports stay readable without caller effort.
//!
//! Null handling: every built-in passes `Value::Null`. Nullability is a
//! property of the column declaration, not of a value rule; a hand-written
//! [`Validator::element`] can still fail nulls when that is the intent.

use crate::check::Validator;
use crate::value::Value;
use regex::Regex;
use std::cmp::Ordering;

fn ordered(
    name: &str,
    bound: Value,
    accept: impl Fn(Ordering) -> bool + Send + Sync + 'static,
) -> Validator {
    let error = format!("{}({})", name, bound);
    Validator::element(move |v| {
        v.is_null() || v.partial_cmp(&bound).is_some_and(&accept)
    })
    .with_error(error)
}

/// Every element equals `value`.
pub fn equal_to(value: Value) -> Validator {
    let error = format!("equal_to({})", value);
    Validator::element(move |v| v.is_null() || *v == value).with_error(error)
}

/// No element equals `value`.
pub fn not_equal_to(value: Value) -> Validator {
    let error = format!("not_equal_to({})", value);
    Validator::element(move |v| v.is_null() || *v != value).with_error(error)
}

/// Every element is strictly greater than `min`.
pub fn greater_than(min: Value) -> Validator {
    ordered("greater_than", min, |ord| ord == Ordering::Greater)
}

/// Every element is greater than or equal to `min`.
pub fn greater_than_or_equal_to(min: Value) -> Validator {
    ordered("greater_than_or_equal_to", min, |ord| ord != Ordering::Less)
}

/// Every element is strictly less than `max`.
pub fn less_than(max: Value) -> Validator {
    ordered("less_than", max, |ord| ord == Ordering::Less)
}

/// Every element is less than or equal to `max`.
pub fn less_than_or_equal_to(max: Value) -> Validator {
    ordered("less_than_or_equal_to", max, |ord| ord != Ordering::Greater)
}

/// Every element lies in `[min, max]`, both bounds inclusive.
pub fn in_range(min: Value, max: Value) -> Validator {
    let error = format!("in_range({}, {})", min, max);
    Validator::element(move |v| {
        v.is_null()
            || (v.partial_cmp(&min).is_some_and(|o| o != Ordering::Less)
                && v.partial_cmp(&max).is_some_and(|o| o != Ordering::Greater))
    })
    .with_error(error)
}

/// Every element is one of `allowed`.
pub fn isin(allowed: Vec<Value>) -> Validator {
    let error = format!("isin({})", render_values(&allowed));
    Validator::element(move |v| v.is_null() || allowed.contains(v)).with_error(error)
}

/// No element is one of `forbidden`.
pub fn notin(forbidden: Vec<Value>) -> Validator {
    let error = format!("notin({})", render_values(&forbidden));
    Validator::element(move |v| v.is_null() || !forbidden.contains(v)).with_error(error)
}

/// Every string element matches `pattern` from its start.
///
/// The pattern is compiled here, so a malformed one surfaces before any data
/// is validated. Non-string elements fail.
pub fn str_matches(pattern: &str) -> Result<Validator, regex::Error> {
    let regex = Regex::new(&format!("^(?:{})", pattern))?;
    let error = format!("str_matches({})", pattern);
    Ok(string_check(error, move |s| regex.is_match(s)))
}

/// Every string element contains a match of `pattern`.
pub fn str_contains(pattern: &str) -> Result<Validator, regex::Error> {
    let regex = Regex::new(pattern)?;
    let error = format!("str_contains({})", pattern);
    Ok(string_check(error, move |s| regex.is_match(s)))
}

/// Every string element starts with the literal `prefix`.
pub fn str_startswith(prefix: impl Into<String>) -> Validator {
    let prefix = prefix.into();
    let error = format!("str_startswith({:?})", prefix);
    string_check(error, move |s| s.starts_with(&prefix))
}

/// Every string element ends with the literal `suffix`.
pub fn str_endswith(suffix: impl Into<String>) -> Validator {
    let suffix = suffix.into();
    let error = format!("str_endswith({:?})", suffix);
    string_check(error, move |s| s.ends_with(&suffix))
}

/// Every string element's character count lies within the inclusive bounds.
/// Either bound may be omitted.
pub fn str_length(min: Option<usize>, max: Option<usize>) -> Validator {
    let error = format!(
        "str_length({}, {})",
        min.map_or("_".to_string(), |v| v.to_string()),
        max.map_or("_".to_string(), |v| v.to_string()),
    );
    string_check(error, move |s| {
        let len = s.chars().count();
        min.map_or(true, |m| len >= m) && max.map_or(true, |m| len <= m)
    })
}

/// Aggregate: the set of non-null values in the column equals `values`
/// exactly (every expected value present, nothing unexpected).
pub fn unique_values_eq(values: Vec<Value>) -> Validator {
    let error = format!("unique_values_eq({})", render_values(&values));
    Validator::aggregate(move |column: &[Value]| {
        let seen: Vec<&Value> = column.iter().filter(|v| !v.is_null()).collect();
        values.iter().all(|v| seen.contains(&v))
            && seen.iter().all(|v| values.contains(v))
    })
    .with_error(error)
}

fn string_check(error: String, pred: impl Fn(&str) -> bool + Send + Sync + 'static) -> Validator {
    Validator::element(move |v| {
        if v.is_null() {
            return true;
        }
        v.as_str().map(&pred).unwrap_or(false)
    })
    .with_error(error)
}

fn render_values(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
