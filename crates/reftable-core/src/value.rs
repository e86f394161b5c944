//! The value model: scalars, container references and containers.
//!
//! A [`Value`] is either a [`Scalar`] held inline or a reference to a
//! container owned by an [`ObjectGraph`](crate::graph::ObjectGraph). The
//! container itself is an [`Object`]: an ordered sequence or a keyed record
//! whose keys keep insertion order. Container identity is its [`ObjectId`],
//! so two values holding the same id are the same container.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Identity of a container within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ObjectId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A primitive leaf value.
///
/// Serializes as the bare JSON scalar (`null`, `true`, `1.5`, `"s"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    /// Converts a JSON value to a scalar, returning `None` for arrays and
    /// objects.
    pub fn from_json(value: &serde_json::Value) -> Option<Scalar> {
        match value {
            serde_json::Value::Null => Some(Scalar::Null),
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => Some(Scalar::Number(n.clone())),
            serde_json::Value::String(s) => Some(Scalar::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Converts this scalar into a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Number(n) => serde_json::Value::Number(n.clone()),
            Scalar::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Scalar::Number(n.into())
    }
}

/// Non-finite floats have no number representation and become `Null`.
impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Scalar::Null, Scalar::Number)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

/// A value reachable in an object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    /// Reference to a container in the owning graph.
    Object(ObjectId),
}

impl Value {
    pub const NULL: Value = Value::Scalar(Scalar::Null);

    /// Returns the container id if this value is a container reference.
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            Value::Scalar(_) => None,
        }
    }

    /// Returns the scalar if this value is not a container reference.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Object(_) => None,
        }
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

macro_rules! scalar_into_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

scalar_into_value!(bool, i32, i64, u64, f64, &str, String);

/// A container owned by an object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Ordered sequence of values.
    Sequence(Vec<Value>),
    /// Keyed record in key insertion order.
    Record(IndexMap<String, Value>),
}

impl Object {
    /// Number of direct children.
    pub fn len(&self) -> usize {
        match self {
            Object::Sequence(items) => items.len(),
            Object::Record(fields) => fields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the `n`-th child in traversal order with its key, if any.
    pub fn child(&self, n: usize) -> Option<(Option<&str>, &Value)> {
        match self {
            Object::Sequence(items) => items.get(n).map(|v| (None, v)),
            Object::Record(fields) => fields.get_index(n).map(|(k, v)| (Some(k.as_str()), v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_display() {
        assert_eq!(format!("{}", ObjectId(7)), "7");
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(Scalar::from(f64::NAN), Scalar::Null);
        assert_eq!(Scalar::from(f64::INFINITY), Scalar::Null);
        assert_eq!(Scalar::from(1.5), Scalar::Number(Number::from_f64(1.5).unwrap()));
    }

    #[test]
    fn scalars_serialize_bare() {
        let items = vec![
            Scalar::Null,
            Scalar::from(true),
            Scalar::from(1),
            Scalar::from("hello"),
        ];
        let json = serde_json::to_string(&items).unwrap();
        assert_eq!(json, r#"[null,true,1,"hello"]"#);

        let back: Vec<Scalar> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, items);
    }

    #[test]
    fn scalar_json_conversion_rejects_containers() {
        assert_eq!(Scalar::from_json(&serde_json::json!("x")), Some(Scalar::from("x")));
        assert_eq!(Scalar::from_json(&serde_json::json!([1])), None);
        assert_eq!(Scalar::from_json(&serde_json::json!({"a": 1})), None);
    }

    #[test]
    fn record_children_follow_insertion_order() {
        let mut fields = IndexMap::new();
        fields.insert("z".to_string(), Value::from(1));
        fields.insert("a".to_string(), Value::from(2));
        let obj = Object::Record(fields);

        assert_eq!(obj.child(0), Some((Some("z"), &Value::from(1))));
        assert_eq!(obj.child(1), Some((Some("a"), &Value::from(2))));
        assert_eq!(obj.child(2), None);
        assert_eq!(obj.len(), 2);
    }

    #[test]
    fn value_accessors() {
        let v = Value::from(ObjectId(2));
        assert_eq!(v.as_object(), Some(ObjectId(2)));
        assert!(v.as_scalar().is_none());
        assert_eq!(Value::NULL.as_scalar(), Some(&Scalar::Null));
    }
}
