//! The [`Encode`] trait and its impls for std and third-party types.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt::Display;
use std::hash::BuildHasher;
use std::num::{
    NonZeroI8, NonZeroI16, NonZeroI32, NonZeroI64, NonZeroU8, NonZeroU16, NonZeroU32, NonZeroU64,
    NonZeroUsize, Wrapping,
};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Timelike};
use ndarray::{ArrayBase, Data, Ix1, Ix2};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Number, Value};

/// Conversion into a value made only of JSON primitives.
///
/// Implementations must not fail: anything that cannot be represented
/// degrades to a string.
pub trait Encode {
    /// Encode `self`.
    fn encode(&self) -> Value;
}

/// Encode a float, degrading non-finite values to their string form.
pub(crate) fn encode_f64(value: f64) -> Value {
    Number::from_f64(value).map_or_else(|| Value::String(value.to_string()), Value::Number)
}

fn encode_map<'a, K, V, I>(entries: I) -> Value
where
    K: Display + 'a,
    V: Encode + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    Value::Object(entries.into_iter().map(|(k, v)| (k.to_string(), v.encode())).collect())
}

// ---------------------------------------------------------------------------
// Booleans
// ---------------------------------------------------------------------------

// Downstream consumers read these as strings.
impl Encode for bool {
    fn encode(&self) -> Value {
        Value::String(if *self { "true" } else { "false" }.to_string())
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

impl Encode for NaiveDate {
    fn encode(&self) -> Value {
        Value::String(self.format("%Y-%m-%d").to_string())
    }
}

// Sub-second parts are written as six digits, or omitted when zero.
impl Encode for NaiveDateTime {
    fn encode(&self) -> Value {
        let pattern = if self.nanosecond() == 0 {
            "%Y-%m-%dT%H:%M:%S"
        } else {
            "%Y-%m-%dT%H:%M:%S%.6f"
        };
        Value::String(self.format(pattern).to_string())
    }
}

impl<Tz: TimeZone> Encode for DateTime<Tz>
where
    Tz::Offset: Display,
{
    fn encode(&self) -> Value {
        let precision = if self.nanosecond() == 0 {
            SecondsFormat::Secs
        } else {
            SecondsFormat::Micros
        };
        Value::String(self.to_rfc3339_opts(precision, false))
    }
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

impl Encode for Decimal {
    fn encode(&self) -> Value {
        self.to_f64()
            .map_or_else(|| Value::String(self.to_string()), encode_f64)
    }
}

macro_rules! impl_encode_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Encode for $ty {
                fn encode(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

impl_encode_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Encode for f64 {
    fn encode(&self) -> Value {
        encode_f64(*self)
    }
}

impl Encode for f32 {
    fn encode(&self) -> Value {
        encode_f64(f64::from(*self))
    }
}

impl<T: Encode> Encode for OrderedFloat<T> {
    fn encode(&self) -> Value {
        self.0.encode()
    }
}

impl<T: Encode> Encode for Wrapping<T> {
    fn encode(&self) -> Value {
        self.0.encode()
    }
}

macro_rules! impl_encode_nonzero {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Encode for $ty {
                fn encode(&self) -> Value {
                    self.get().encode()
                }
            }
        )*
    };
}

impl_encode_nonzero!(
    NonZeroI8,
    NonZeroI16,
    NonZeroI32,
    NonZeroI64,
    NonZeroU8,
    NonZeroU16,
    NonZeroU32,
    NonZeroU64,
    NonZeroUsize,
);

// ---------------------------------------------------------------------------
// Strings and unit
// ---------------------------------------------------------------------------

impl Encode for str {
    fn encode(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl Encode for String {
    fn encode(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Encode for char {
    fn encode(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl Encode for () {
    fn encode(&self) -> Value {
        Value::Null
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

impl<T: Encode, S: BuildHasher> Encode for HashSet<T, S> {
    fn encode(&self) -> Value {
        Value::Array(self.iter().map(Encode::encode).collect())
    }
}

impl<T: Encode> Encode for BTreeSet<T> {
    fn encode(&self) -> Value {
        Value::Array(self.iter().map(Encode::encode).collect())
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self) -> Value {
        Value::Array(self.iter().map(Encode::encode).collect())
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self) -> Value {
        self.as_slice().encode()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self) -> Value {
        self.as_slice().encode()
    }
}

impl<S, A> Encode for ArrayBase<S, Ix1>
where
    S: Data<Elem = A>,
    A: Encode,
{
    fn encode(&self) -> Value {
        Value::Array(self.iter().map(Encode::encode).collect())
    }
}

impl<S, A> Encode for ArrayBase<S, Ix2>
where
    S: Data<Elem = A>,
    A: Encode,
{
    fn encode(&self) -> Value {
        Value::Array(
            self.outer_iter()
                .map(|row| Value::Array(row.iter().map(Encode::encode).collect()))
                .collect(),
        )
    }
}

impl<K: Display, V: Encode, S: BuildHasher> Encode for HashMap<K, V, S> {
    fn encode(&self) -> Value {
        encode_map(self.iter())
    }
}

impl<K: Display, V: Encode> Encode for BTreeMap<K, V> {
    fn encode(&self) -> Value {
        encode_map(self.iter())
    }
}

// ---------------------------------------------------------------------------
// Wrappers and references
// ---------------------------------------------------------------------------

impl<T: Encode> Encode for Option<T> {
    fn encode(&self) -> Value {
        self.as_ref().map_or(Value::Null, Encode::encode)
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self) -> Value {
        (**self).encode()
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self) -> Value {
        (**self).encode()
    }
}

impl<T: Encode + ?Sized> Encode for Rc<T> {
    fn encode(&self) -> Value {
        (**self).encode()
    }
}

impl<T: Encode + ?Sized> Encode for Arc<T> {
    fn encode(&self) -> Value {
        (**self).encode()
    }
}

// ---------------------------------------------------------------------------
// Already-JSON values
// ---------------------------------------------------------------------------

// Re-encoded so nested booleans follow the same rule as native ones.
impl Encode for Value {
    fn encode(&self) -> Value {
        match self {
            Value::Bool(b) => b.encode(),
            Value::Array(items) => items.encode(),
            Value::Object(map) => map.encode(),
            Value::Null | Value::Number(_) | Value::String(_) => self.clone(),
        }
    }
}

impl Encode for Map<String, Value> {
    fn encode(&self) -> Value {
        Value::Object(self.iter().map(|(k, v)| (k.clone(), v.encode())).collect())
    }
}
