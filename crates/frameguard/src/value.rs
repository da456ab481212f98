//! Dynamic scalar values extracted from Arrow arrays.
//!
//! Predicates are written against [`Value`] rather than against Arrow's
//! concrete array types, so one validator works across every column type the
//! engine understands. Extraction widens integers to `i64` and floats to
//! `f64`; anything outside the repertoire yields `None` and the caller treats
//! the column as unsupported.

use arrow::array::{
    Array, BinaryArray, BooleanArray, LargeBinaryArray, LargeStringArray, PrimitiveArray,
    StringArray,
};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Date32Type, Float32Type, Float64Type, Int16Type, Int32Type,
    Int64Type, Int8Type, TimeUnit, TimestampMicrosecondType, TimestampNanosecondType, UInt16Type,
    UInt32Type, UInt8Type,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

/// Days from 0001-01-01 (CE) to the Unix epoch.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// A single scalar value from one position of a column.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    Binary(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Whether this is the null scalar.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether the engine can extract scalars from a column of this type.
    pub fn supports(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Null
                | DataType::Boolean
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::Float32
                | DataType::Float64
                | DataType::Utf8
                | DataType::LargeUtf8
                | DataType::Binary
                | DataType::LargeBinary
                | DataType::Date32
                | DataType::Timestamp(TimeUnit::Microsecond | TimeUnit::Nanosecond, _)
        )
    }

    /// Extract every position of `array` as a [`Value`].
    ///
    /// Returns `None` when the array's type is outside the repertoire.
    pub fn extract(array: &dyn Array) -> Option<Vec<Value>> {
        let values = match array.data_type() {
            DataType::Null => vec![Value::Null; array.len()],
            DataType::Boolean => {
                let arr = array.as_any().downcast_ref::<BooleanArray>()?;
                collect(arr.len(), |i| arr.is_null(i), |i| Value::Boolean(arr.value(i)))
            }
            DataType::Int8 => primitive::<Int8Type>(array, |v| Value::Int64(v as i64))?,
            DataType::Int16 => primitive::<Int16Type>(array, |v| Value::Int64(v as i64))?,
            DataType::Int32 => primitive::<Int32Type>(array, |v| Value::Int64(v as i64))?,
            DataType::Int64 => primitive::<Int64Type>(array, Value::Int64)?,
            DataType::UInt8 => primitive::<UInt8Type>(array, |v| Value::Int64(v as i64))?,
            DataType::UInt16 => primitive::<UInt16Type>(array, |v| Value::Int64(v as i64))?,
            DataType::UInt32 => primitive::<UInt32Type>(array, |v| Value::Int64(v as i64))?,
            DataType::Float32 => primitive::<Float32Type>(array, |v| Value::Float64(f64::from(v)))?,
            DataType::Float64 => primitive::<Float64Type>(array, Value::Float64)?,
            DataType::Utf8 => {
                let arr = array.as_any().downcast_ref::<StringArray>()?;
                collect(
                    arr.len(),
                    |i| arr.is_null(i),
                    |i| Value::String(arr.value(i).to_string()),
                )
            }
            DataType::LargeUtf8 => {
                let arr = array.as_any().downcast_ref::<LargeStringArray>()?;
                collect(
                    arr.len(),
                    |i| arr.is_null(i),
                    |i| Value::String(arr.value(i).to_string()),
                )
            }
            DataType::Binary => {
                let arr = array.as_any().downcast_ref::<BinaryArray>()?;
                collect(
                    arr.len(),
                    |i| arr.is_null(i),
                    |i| Value::Binary(arr.value(i).to_vec()),
                )
            }
            DataType::LargeBinary => {
                let arr = array.as_any().downcast_ref::<LargeBinaryArray>()?;
                collect(
                    arr.len(),
                    |i| arr.is_null(i),
                    |i| Value::Binary(arr.value(i).to_vec()),
                )
            }
            DataType::Date32 => primitive::<Date32Type>(array, |days| {
                // Widen before adding: days near i32::MAX would overflow in i32.
                i32::try_from(i64::from(days) + i64::from(UNIX_EPOCH_FROM_CE))
                    .ok()
                    .and_then(NaiveDate::from_num_days_from_ce_opt)
                    .map_or(Value::Null, Value::Date)
            })?,
            DataType::Timestamp(TimeUnit::Microsecond, _) => {
                primitive::<TimestampMicrosecondType>(array, |us| {
                    DateTime::from_timestamp_micros(us).map_or(Value::Null, Value::Timestamp)
                })?
            }
            DataType::Timestamp(TimeUnit::Nanosecond, _) => {
                primitive::<TimestampNanosecondType>(array, |ns| {
                    Value::Timestamp(DateTime::from_timestamp_nanos(ns))
                })?
            }
            _ => return None,
        };
        Some(values)
    }
}

fn collect(
    len: usize,
    is_null: impl Fn(usize) -> bool,
    value_at: impl Fn(usize) -> Value,
) -> Vec<Value> {
    (0..len)
        .map(|i| if is_null(i) { Value::Null } else { value_at(i) })
        .collect()
}

fn primitive<T: ArrowPrimitiveType>(
    array: &dyn Array,
    to_value: impl Fn(T::Native) -> Value,
) -> Option<Vec<Value>> {
    let arr = array.as_any().downcast_ref::<PrimitiveArray<T>>()?;
    Some(collect(
        arr.len(),
        |i| arr.is_null(i),
        |i| to_value(arr.value(i)),
    ))
}

impl PartialEq for Value {
    /// Equality within each kind, plus across the numeric lane so an
    /// `Int64` column can be compared against a `Float64` bound. Consistent
    /// with [`PartialOrd`] below.
    fn eq(&self, other: &Value) -> bool {
        self.partial_cmp(other) == Some(std::cmp::Ordering::Equal)
    }
}

impl PartialOrd for Value {
    /// Comparison across the numeric lane (ints and floats compare to each
    /// other), within strings, dates, timestamps, booleans and binary.
    /// Null-to-non-null and cross-kind pairs are unordered.
    fn partial_cmp(&self, other: &Value) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(std::cmp::Ordering::Equal),
            (Value::Binary(a), Value::Binary(b)) => a.partial_cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.partial_cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::Int64(a), Value::Float64(b)) => (*a as f64).partial_cmp(b),
            (Value::Float64(a), Value::Int64(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.partial_cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Binary(b) => write!(f, "<{} bytes>", b.len()),
            Value::Date(d) => write!(f, "{}", d),
            Value::Timestamp(ts) => write!(f, "{}", ts),
        }
    }
}
