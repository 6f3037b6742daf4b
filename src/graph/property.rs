//! Raw property values stored on vertices and edges
//!
//! These are untyped storage values. The retriever decodes them into
//! [`TypedValue`](crate::model::TypedValue)s using the declared attribute type.

use super::types::EdgeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Storage-level property value
///
/// Collection-typed attributes whose elements are structs or entity
/// references store one [`PropertyValue::EdgeRef`] per element, pointing at
/// the per-element edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(i64), // Unix timestamp in milliseconds
    List(Vec<PropertyValue>),
    Map(HashMap<String, PropertyValue>),
    EdgeRef(EdgeId),
    Null,
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Epoch milliseconds, accepting both the datetime and integer encodings
    pub fn as_epoch_millis(&self) -> Option<i64> {
        match self {
            PropertyValue::DateTime(ms) | PropertyValue::Integer(ms) => Some(*ms),
            _ => None,
        }
    }

    /// Array elements, or the keys of a map attribute
    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Edge backing one struct or reference element
    pub fn as_edge_ref(&self) -> Option<EdgeId> {
        match self {
            PropertyValue::EdgeRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Storage kind, used in type-mismatch diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Integer(_) => "Integer",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::DateTime(_) => "DateTime",
            PropertyValue::List(_) => "List",
            PropertyValue::Map(_) => "Map",
            PropertyValue::EdgeRef(_) => "EdgeRef",
            PropertyValue::Null => "Null",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{:?}", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::DateTime(ms) => write!(f, "DateTime({})", ms),
            PropertyValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            PropertyValue::Map(map) => {
                // Sorted so diagnostics are stable
                let mut entries: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                entries.sort();
                write!(f, "{{{}}}", entries.join(", "))
            }
            PropertyValue::EdgeRef(id) => write!(f, "{}", id),
            PropertyValue::Null => f.write_str("null"),
        }
    }
}

macro_rules! impl_from {
    ($($source:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$source> for PropertyValue {
                fn from($v: $source) -> Self {
                    $body
                }
            }
        )*
    };
}

impl_from! {
    String => |s| PropertyValue::String(s),
    &str => |s| PropertyValue::String(s.to_string()),
    i64 => |i| PropertyValue::Integer(i),
    i32 => |i| PropertyValue::Integer(i64::from(i)),
    f64 => |v| PropertyValue::Float(v),
    bool => |b| PropertyValue::Boolean(b),
    EdgeId => |id| PropertyValue::EdgeRef(id),
    Vec<PropertyValue> => |items| PropertyValue::List(items),
}

/// Properties of one vertex or edge, keyed by system key or qualified name
pub type PropertyMap = HashMap<String, PropertyValue>;
