//! The input value graph consumed by the normalizer.
//!
//! `Value` is a closed sum type: every shape a JSON decoder or a hand-built
//! record can produce maps onto one variant, and anything else is carried as
//! `Unsupported` with a short description so the normalizer can report it.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A scalar leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

/// Comparison class of a primitive. All numeric variants share `Number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Number,
    String,
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Bool(_) => PrimitiveKind::Bool,
            Primitive::Int(_) | Primitive::UInt(_) | Primitive::Float(_) => PrimitiveKind::Number,
            Primitive::Str(_) => PrimitiveKind::String,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Number => "number",
            PrimitiveKind::String => "string",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Bool(b) => write!(f, "{}", b),
            Primitive::Int(i) => write!(f, "{}", i),
            Primitive::UInt(u) => write!(f, "{}", u),
            Primitive::Float(x) => write!(f, "{}", x),
            Primitive::Str(s) => f.write_str(s),
        }
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Primitive::Bool(b) => serializer.serialize_bool(*b),
            Primitive::Int(i) => serializer.serialize_i64(*i),
            Primitive::UInt(u) => serializer.serialize_u64(*u),
            Primitive::Float(x) => serializer.serialize_f64(*x),
            Primitive::Str(s) => serializer.serialize_str(s),
        }
    }
}

macro_rules! primitive_from {
    ($variant:ident as $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Primitive {
                fn from(v: $t) -> Self {
                    Primitive::$variant(v as $target)
                }
            }
        )*
    };
}

primitive_from!(Int as i64: i8, i16, i32, i64, isize);
primitive_from!(UInt as u64: u8, u16, u32, u64, usize);
primitive_from!(Float as f64: f32, f64);

impl From<bool> for Primitive {
    fn from(b: bool) -> Self {
        Primitive::Bool(b)
    }
}

impl From<&str> for Primitive {
    fn from(s: &str) -> Self {
        Primitive::Str(s.to_string())
    }
}

impl From<String> for Primitive {
    fn from(s: String) -> Self {
        Primitive::Str(s)
    }
}

/// A fixed set of named fields in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Record {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
}

/// One node of the input graph
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Primitive(Primitive),
    /// Elements are alternatives at the same path, not distinct fields
    Sequence(Vec<Value>),
    Mapping(Vec<(Primitive, Value)>),
    Record(Record),
    /// A shape the normalizer cannot interpret, e.g. "function" or "channel"
    Unsupported(String),
}

impl Value {
    pub fn unsupported(description: impl Into<String>) -> Self {
        Value::Unsupported(description.into())
    }

    /// Build a mapping from any iterator of key/value pairs
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<Primitive>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

macro_rules! value_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Primitive(v.into())
                }
            }
        )*
    };
}

value_from_primitive!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, &str, String, Primitive
);

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<K: Into<Primitive>, V: Into<Value>> From<HashMap<K, V>> for Value {
    fn from(map: HashMap<K, V>) -> Self {
        Value::mapping(map)
    }
}

impl<K: Into<Primitive>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        Value::mapping(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Primitive(Primitive::Bool(b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Primitive(Primitive::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Primitive(Primitive::UInt(u))
                } else if let Some(x) = n.as_f64() {
                    Value::Primitive(Primitive::Float(x))
                } else {
                    Value::unsupported(format!("number {}", n))
                }
            }
            Json::String(s) => Value::Primitive(Primitive::Str(s)),
            Json::Array(arr) => Value::Sequence(arr.into_iter().map(Value::from).collect()),
            Json::Object(obj) => Value::Mapping(
                obj.into_iter()
                    .map(|(k, v)| (Primitive::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_numbers_prefer_signed() {
        let value = Value::from(json!([1, -1, 18446744073709551615u64, 1.5]));

        assert_eq!(
            value,
            Value::Sequence(vec![
                Value::Primitive(Primitive::Int(1)),
                Value::Primitive(Primitive::Int(-1)),
                Value::Primitive(Primitive::UInt(u64::MAX)),
                Value::Primitive(Primitive::Float(1.5)),
            ])
        );
    }

    #[test]
    fn test_json_object_becomes_mapping() {
        let value = Value::from(json!({"name": "Alice", "tags": null}));

        let Value::Mapping(entries) = value else {
            panic!("Expected mapping");
        };
        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&(Primitive::from("tags"), Value::Null)));
    }

    #[test]
    fn test_record_keeps_declaration_order() {
        let record = Record::new("User")
            .field("zeta", 1)
            .field("alpha", "a");

        let names: Vec<&str> = record.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_option_and_widths() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(7u8), Value::Primitive(Primitive::UInt(7)));
        assert_eq!(Value::from(-7i16), Value::Primitive(Primitive::Int(-7)));
        assert_eq!(Primitive::from(2.5f32).kind(), PrimitiveKind::Number);
    }

    #[test]
    fn test_primitive_display() {
        assert_eq!(Primitive::from("x").to_string(), "x");
        assert_eq!(Primitive::from(true).to_string(), "true");
        assert_eq!(Primitive::from(42u32).to_string(), "42");
    }
}
