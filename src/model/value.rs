//! Typed attribute values produced by the retriever

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declared-order attribute map
pub type AttributeMap = IndexMap<String, TypedValue>;

/// A scalar tagged with its concrete primitive type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Scalar {
    String(String),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Canonical decimal text
    BigInteger(String),
    /// Canonical decimal text
    BigDecimal(String),
    Boolean(bool),
    Byte(i8),
    Date(DateTime<Utc>),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Value of one mapped attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypedValue {
    Scalar(Scalar),
    Struct(StructValue),
    ObjectId(ObjectId),
    Related(RelatedObjectId),
    List(Vec<TypedValue>),
    Map(IndexMap<String, TypedValue>),
}

impl TypedValue {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            TypedValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            TypedValue::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<&ObjectId> {
        match self {
            TypedValue::ObjectId(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_related(&self) -> Option<&RelatedObjectId> {
        match self {
            TypedValue::Related(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, TypedValue>> {
        match self {
            TypedValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<Scalar> for TypedValue {
    fn from(s: Scalar) -> Self {
        TypedValue::Scalar(s)
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        TypedValue::Scalar(Scalar::String(s.to_string()))
    }
}

/// A nested struct instance. Structs have no identity of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructValue {
    pub type_name: String,
    pub attributes: AttributeMap,
}

/// Lightweight reference to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectId {
    pub guid: Option<String>,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub unique_attributes: AttributeMap,
}

impl ObjectId {
    pub fn new(guid: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            guid: Some(guid.into()),
            type_name: type_name.into(),
            unique_attributes: AttributeMap::new(),
        }
    }

    /// Reference by unique attributes only
    pub fn by_unique_attributes(type_name: impl Into<String>, unique_attributes: AttributeMap) -> Self {
        Self {
            guid: None,
            type_name: type_name.into(),
            unique_attributes,
        }
    }

    /// Neither a guid nor unique attributes to look up by
    pub fn is_resolvable(&self) -> bool {
        self.guid.as_deref().map_or(false, |g| !g.is_empty()) || !self.unique_attributes.is_empty()
    }
}

/// Entity reference reached through a relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedObjectId {
    pub guid: Option<String>,
    pub type_name: String,
    pub entity_status: super::EntityStatus,
    pub relationship_guid: Option<String>,
    pub relationship_type: String,
    pub relationship_status: super::EntityStatus,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub relationship_attributes: AttributeMap,
    pub display_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_resolvable() {
        assert!(ObjectId::new("g-1", "Table").is_resolvable());

        let mut unique = AttributeMap::new();
        unique.insert("qualifiedName".into(), "db.orders".into());
        assert!(ObjectId::by_unique_attributes("Table", unique).is_resolvable());

        let empty = ObjectId {
            guid: Some(String::new()),
            type_name: "Table".into(),
            unique_attributes: AttributeMap::new(),
        };
        assert!(!empty.is_resolvable());
    }

    #[test]
    fn test_scalar_serialization() {
        let value = TypedValue::Scalar(Scalar::Long(42));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({"scalar": {"type": "long", "value": 42}}));
    }
}
