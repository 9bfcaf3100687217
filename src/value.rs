//! Dynamic representation of compound cell values.
//!
//! A [`Value`] is a recursively nested tree mirroring the shape of a
//! [`CompoundType`](crate::CompoundType). Every node carries its own variant
//! tag, so the value encoder never needs the type threaded alongside it:
//! a value tree is self-describing down to its scalar leaves.
//!
//! ## Usage Patterns
//!
//! ### Building values
//!
//! ```rust
//! use rowtext::{Scalar, Value};
//!
//! let row = Value::Struct(vec![
//!     Value::from(1),
//!     Value::from("duck"),
//!     Value::Null,
//! ]);
//! assert!(row.is_struct());
//! ```
//!
//! ### Maps
//!
//! Map values hold their entries as ordered pairs. Insertion order is
//! significant: the encoder unzips the pairs into two parallel sequences and
//! index correspondence is what the receiver zips back together.
//!
//! ```rust
//! use rowtext::Value;
//!
//! let m = Value::Map(vec![
//!     (Value::from("x"), Value::from(1)),
//!     (Value::from("y"), Value::from(2)),
//! ]);
//! assert_eq!(m.len(), Some(2));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Scalar;

/// A dynamically-typed compound value.
///
/// Variants mirror [`CompoundType`](crate::CompoundType): struct, map, list,
/// and array nodes hold children positionally; enum values hold the ordinal
/// into the declared tag sequence; union values hold the active member's
/// ordinal plus its single child.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Scalar(Scalar),
    /// One child per declared field, in field order.
    Struct(Vec<Value>),
    /// Ordered key/value pairs.
    Map(Vec<(Value, Value)>),
    List(Vec<Value>),
    Array(Vec<Value>),
    /// Ordinal into the enum's tag sequence.
    Enum(u32),
    /// Active member ordinal plus its value.
    Union { tag: u32, value: Box<Value> },
}

impl Value {
    /// Returns `true` if this is `Null`.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if this is a scalar leaf.
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    /// Returns `true` if this is a struct node.
    #[inline]
    #[must_use]
    pub const fn is_struct(&self) -> bool {
        matches!(self, Value::Struct(_))
    }

    /// Borrows the scalar leaf, if this is one.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Child count of a container node (`None` for leaves, enums, unions).
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Struct(children) | Value::List(children) | Value::Array(children) => {
                Some(children.len())
            }
            Value::Map(pairs) => Some(pairs.len()),
            _ => None,
        }
    }

    /// Returns `true` if this is a container with no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Short lowercase name of the variant, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Scalar(_) => "scalar",
            Value::Struct(_) => "struct",
            Value::Map(_) => "map",
            Value::List(_) => "list",
            Value::Array(_) => "array",
            Value::Enum(_) => "enum",
            Value::Union { .. } => "union",
        }
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Value::Scalar(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Scalar(Scalar::Bool(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Scalar(Scalar::Int(v as i64))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Scalar(Scalar::Int(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Scalar(Scalar::UInt(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(Scalar::Float(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Scalar(Scalar::Text(v.to_string()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Scalar(Scalar::Text(v))
    }
}

/// Builds a map value from string-keyed entries, preserving insertion order.
impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Value::from(k), v))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_primitives() {
        assert_eq!(Value::from(1), Value::Scalar(Scalar::Int(1)));
        assert_eq!(
            Value::from("duck"),
            Value::Scalar(Scalar::Text("duck".to_string()))
        );
        assert_eq!(Value::from(true), Value::Scalar(Scalar::Bool(true)));
    }

    #[test]
    fn from_index_map_preserves_insertion_order() {
        let mut entries = IndexMap::new();
        entries.insert("x".to_string(), Value::from(1));
        entries.insert("y".to_string(), Value::from(2));
        assert_eq!(
            Value::from(entries),
            Value::Map(vec![
                (Value::from("x"), Value::from(1)),
                (Value::from("y"), Value::from(2)),
            ])
        );
    }

    #[test]
    fn container_len() {
        assert_eq!(Value::List(vec![]).len(), Some(0));
        assert!(Value::List(vec![]).is_empty());
        assert_eq!(Value::Enum(3).len(), None);
        assert_eq!(
            Value::Map(vec![(Value::from(1), Value::from(2))]).len(),
            Some(1)
        );
    }
}
