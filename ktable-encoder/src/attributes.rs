//! A `serde` serializer that builds encoded values member by member.
//!
//! Unlike `serde_json::to_value`, a member that cannot be represented does
//! not fail the whole value: it degrades on its own and its siblings are
//! kept.
//!
//! - non-string map keys are rendered as compact JSON text (`(0, 1)` becomes
//!   `"[0,1]"`)
//! - integers outside the `i64`/`u64` range become decimal strings
//! - a member whose `Serialize` impl errors becomes the error text
//!
//! Output already follows the encoder's rules, so booleans come out as
//! `"true"`/`"false"` and non-finite floats as strings.

use std::fmt;

use serde::ser::{self, Serialize};
use serde_json::{Map, Value};

use crate::encode::encode_f64;

/// Error raised by a member's own `Serialize` impl.
#[derive(Debug)]
pub(crate) struct Unrepresentable(String);

impl fmt::Display for Unrepresentable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Unrepresentable {}

impl ser::Error for Unrepresentable {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

type Result<T> = std::result::Result<T, Unrepresentable>;

/// Serialize one member, degrading it to its error text on failure.
fn member<T: Serialize + ?Sized>(value: &T) -> Value {
    value
        .serialize(AttributeSerializer)
        .unwrap_or_else(|e| Value::String(e.0))
}

/// Render a map key as a string, whatever its type.
fn key_string<T: Serialize + ?Sized>(key: &T) -> String {
    match key.serialize(AttributeSerializer) {
        Ok(Value::String(s)) => s,
        Ok(Value::Null) => "null".to_string(),
        Ok(other) => other.to_string(),
        Err(e) => e.0,
    }
}

/// Serializes into an encoded [`Value`].
pub(crate) struct AttributeSerializer;

impl ser::Serializer for AttributeSerializer {
    type Ok = Value;
    type Error = Unrepresentable;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantBuilder<SeqBuilder>;
    type SerializeMap = ObjectBuilder;
    type SerializeStruct = ObjectBuilder;
    type SerializeStructVariant = VariantBuilder<ObjectBuilder>;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::String(if v { "true" } else { "false" }.to_string()))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(i64::try_from(v).map_or_else(|_| Value::String(v.to_string()), Value::from))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(u64::try_from(v).map_or_else(|_| Value::String(v.to_string()), Value::from))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(encode_f64(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(encode_f64(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().copied().map(Value::from).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        let mut map = Map::new();
        map.insert(variant.to_string(), member(value));
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder> {
        Ok(SeqBuilder::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder> {
        Ok(SeqBuilder::with_capacity(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqBuilder> {
        Ok(SeqBuilder::with_capacity(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantBuilder<SeqBuilder>> {
        Ok(VariantBuilder {
            variant,
            inner: SeqBuilder::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<ObjectBuilder> {
        Ok(ObjectBuilder::default())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<ObjectBuilder> {
        Ok(ObjectBuilder::default())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<VariantBuilder<ObjectBuilder>> {
        Ok(VariantBuilder {
            variant,
            inner: ObjectBuilder::default(),
        })
    }
}

// ---------------------------------------------------------------------------
// Compound builders
// ---------------------------------------------------------------------------

pub(crate) struct SeqBuilder {
    items: Vec<Value>,
}

impl SeqBuilder {
    fn with_capacity(len: usize) -> Self {
        Self {
            items: Vec::with_capacity(len),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) {
        self.items.push(member(value));
    }

    fn finish(self) -> Value {
        Value::Array(self.items)
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = Unrepresentable;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = Unrepresentable;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = Unrepresentable;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

#[derive(Default)]
pub(crate) struct ObjectBuilder {
    map: Map<String, Value>,
    next_key: Option<String>,
}

impl ObjectBuilder {
    fn finish(self) -> Value {
        Value::Object(self.map)
    }
}

impl ser::SerializeMap for ObjectBuilder {
    type Ok = Value;
    type Error = Unrepresentable;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.next_key = Some(key_string(key));
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self.next_key.take().unwrap_or_default();
        self.map.insert(key, member(value));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for ObjectBuilder {
    type Ok = Value;
    type Error = Unrepresentable;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.map.insert(key.to_string(), member(value));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

/// Wraps the output of an enum variant as `{variant: inner}`.
pub(crate) struct VariantBuilder<B> {
    variant: &'static str,
    inner: B,
}

impl<B> VariantBuilder<B> {
    fn wrap(variant: &'static str, value: Value) -> Value {
        let mut map = Map::new();
        map.insert(variant.to_string(), value);
        Value::Object(map)
    }
}

impl ser::SerializeTupleVariant for VariantBuilder<SeqBuilder> {
    type Ok = Value;
    type Error = Unrepresentable;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.inner.push(value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Self::wrap(self.variant, self.inner.finish()))
    }
}

impl ser::SerializeStructVariant for VariantBuilder<ObjectBuilder> {
    type Ok = Value;
    type Error = Unrepresentable;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.inner.map.insert(key.to_string(), member(value));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Self::wrap(self.variant, self.inner.finish()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    enum Shape {
        Point,
        Circle(f64),
        Segment(i32, i32),
        Rect { w: u32, h: u32 },
    }

    #[test]
    fn enums_follow_serde_json_layout() {
        assert_eq!(member(&Shape::Point), json!("Point"));
        assert_eq!(member(&Shape::Circle(1.5)), json!({"Circle": 1.5}));
        assert_eq!(member(&Shape::Segment(1, 2)), json!({"Segment": [1, 2]}));
        assert_eq!(member(&Shape::Rect { w: 2, h: 3 }), json!({"Rect": {"w": 2, "h": 3}}));
    }

    #[test]
    fn map_keys_are_stringified() {
        let mut by_flag = BTreeMap::new();
        by_flag.insert(true, 1);
        by_flag.insert(false, 0);
        assert_eq!(member(&by_flag), json!({"false": 0, "true": 1}));

        let mut by_id = BTreeMap::new();
        by_id.insert(7_u32, "seven");
        assert_eq!(member(&by_id), json!({"7": "seven"}));
    }

    #[test]
    fn wide_integers_degrade_to_strings() {
        assert_eq!(member(&5_u128), json!(5));
        assert_eq!(member(&u128::MAX), json!(u128::MAX.to_string()));
        assert_eq!(member(&i128::MIN), json!(i128::MIN.to_string()));
    }
}
