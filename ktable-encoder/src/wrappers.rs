//! Opt-in encoding paths for types without their own [`Encode`] impl.
//!
//! - [`AsMapping`]: the type knows how to turn itself into a mapping.
//! - [`Attributes`]: the type is `Serialize`; its members are encoded one
//!   by one. A member that fails to serialize degrades to its error text and
//!   non-string map keys are stringified, so the record stays an object. Only
//!   a value that fails at the top level falls back to its `Debug` form.
//! - [`Displayed`]: the type is only printable.

use std::fmt::{self, Debug, Display};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::attributes::AttributeSerializer;
use crate::encode::Encode;

/// A type that can describe itself as a string-keyed mapping.
pub trait ToMapping {
    /// Build the mapping. Values are re-encoded by [`AsMapping`].
    fn to_mapping(&self) -> Map<String, Value>;
}

/// Encode a [`ToMapping`] type through its mapping.
#[derive(Debug, Clone, Copy)]
pub struct AsMapping<'a, T: ?Sized>(pub &'a T);

impl<T: ToMapping + ?Sized> Encode for AsMapping<'_, T> {
    fn encode(&self) -> Value {
        self.0.to_mapping().encode()
    }
}

/// Encode a `Serialize` type member by member.
#[derive(Debug, Clone, Copy)]
pub struct Attributes<'a, T: ?Sized>(pub &'a T);

impl<T: Serialize + Debug + ?Sized> Encode for Attributes<'_, T> {
    fn encode(&self) -> Value {
        match self.0.serialize(AttributeSerializer) {
            Ok(value) => value,
            Err(_) => Value::String(format!("{:?}", self.0)),
        }
    }
}

/// Encode any printable value as its `Display` string.
#[derive(Debug, Clone, Copy)]
pub struct Displayed<'a, T: ?Sized>(pub &'a T);

impl<T: Display + ?Sized> Encode for Displayed<'_, T> {
    fn encode(&self) -> Value {
        Value::String(self.0.to_string())
    }
}

impl<T: Display + ?Sized> Display for Displayed<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::json;
    use std::collections::HashMap;

    struct Invoice {
        number: u32,
        paid: bool,
    }

    impl ToMapping for Invoice {
        fn to_mapping(&self) -> Map<String, Value> {
            let mut map = Map::new();
            map.insert("number".into(), json!(self.number));
            map.insert("paid".into(), json!(self.paid));
            map
        }
    }

    #[derive(Debug, Serialize)]
    struct Address {
        city: String,
        verified: bool,
        tags: Vec<String>,
    }

    #[derive(Debug, Serialize)]
    struct Customer {
        name: String,
        address: Address,
        score: Option<f64>,
    }

    #[derive(Debug)]
    struct Broken;

    impl Serialize for Broken {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("not serializable"))
        }
    }

    #[test]
    fn mapping_values_are_re_encoded() {
        let invoice = Invoice { number: 7, paid: true };
        assert_eq!(AsMapping(&invoice).encode(), json!({"number": 7, "paid": "true"}));
    }

    #[test]
    fn attributes_recurse_into_nested_members() {
        let customer = Customer {
            name: "Acme".into(),
            address: Address {
                city: "Oslo".into(),
                verified: false,
                tags: vec!["hq".into()],
            },
            score: None,
        };
        assert_eq!(
            Attributes(&customer).encode(),
            json!({
                "name": "Acme",
                "address": {"city": "Oslo", "verified": "false", "tags": ["hq"]},
                "score": null,
            })
        );
    }

    #[test]
    fn failing_serialize_falls_back_to_debug_string() {
        assert_eq!(Attributes(&Broken).encode(), json!("Broken"));
    }

    #[test]
    fn non_string_map_keys_are_stringified() {
        let mut grid = HashMap::new();
        grid.insert((0, 1), 5);
        assert_eq!(Attributes(&grid).encode(), json!({"[0,1]": 5}));
    }

    #[derive(Debug, Serialize)]
    struct Ledger {
        name: String,
        active: bool,
        grid: HashMap<(i32, i32), i32>,
        total: u128,
        audit: Broken,
    }

    #[test]
    fn one_bad_member_leaves_the_rest_intact() {
        let mut grid = HashMap::new();
        grid.insert((0, 1), 5);
        let ledger = Ledger {
            name: "Q3".into(),
            active: true,
            grid,
            total: u128::from(u64::MAX) + 1,
            audit: Broken,
        };
        assert_eq!(
            Attributes(&ledger).encode(),
            json!({
                "name": "Q3",
                "active": "true",
                "grid": {"[0,1]": 5},
                "total": "18446744073709551616",
                "audit": "not serializable",
            })
        );
    }

    #[test]
    fn nested_failures_stay_local() {
        let items = vec![Some(Broken), None];
        assert_eq!(Attributes(&items).encode(), json!(["not serializable", null]));
    }

    #[test]
    fn displayed_uses_display_form() {
        let addr: std::net::IpAddr = "127.0.0.1".parse().expect("valid ip");
        assert_eq!(Displayed(&addr).encode(), json!("127.0.0.1"));
        assert_eq!(Displayed(&addr).to_string(), "127.0.0.1");
    }
}
