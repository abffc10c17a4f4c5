//! # ktable-encoder
//!
//! Turns heterogeneous values into a [`serde_json::Value`] built only from
//! JSON primitives, ready to be written as an HTTP response body.
//!
//! Every encodable type implements [`Encode`]. Dispatch is resolved at
//! compile time, one impl per type:
//!
//! | Input | Output |
//! |---|---|
//! | `bool` | `"true"` / `"false"` (strings, not JSON booleans) |
//! | `NaiveDate`, `NaiveDateTime`, `DateTime<Tz>` | ISO-8601 string |
//! | `Decimal` | float |
//! | `HashSet`, `BTreeSet` | array |
//! | [`Chunk`](ktable_core::Chunk), [`ChunkMetadata`](ktable_core::ChunkMetadata) | object with explicit fields |
//! | numeric `Vec`, `ndarray` arrays | array of numbers |
//! | `OrderedFloat`, `Wrapping`, `NonZero*`, primitives | number |
//! | [`AsMapping`] over a [`ToMapping`] type | that mapping |
//! | [`Attributes`] over a `Serialize` type | its serialized members, re-encoded |
//!
//! Encoding never fails. A value that cannot be represented (a non-finite
//! float, a failing `Serialize` member) degrades to its string form without
//! taking its siblings with it.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod attributes;
mod domain;
pub mod encode;
pub mod wrappers;

pub use encode::Encode;
pub use wrappers::{AsMapping, Attributes, Displayed, ToMapping};

use serde_json::Value;

/// Encode `value` into JSON primitives.
#[must_use]
pub fn encode<T: Encode + ?Sized>(value: &T) -> Value {
    value.encode()
}

/// Encode `value` and render it as a compact JSON string.
#[must_use]
pub fn to_json_string<T: Encode + ?Sized>(value: &T) -> String {
    value.encode().to_string()
}

/// Encode `value` and render it as JSON bytes.
#[must_use]
pub fn to_json_vec<T: Encode + ?Sized>(value: &T) -> Vec<u8> {
    to_json_string(value).into_bytes()
}
