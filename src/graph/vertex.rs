//! Vertices of the property graph
//!
//! Vertices hold entities, structs and classification instances. What a
//! vertex represents is recorded in its system properties, not in a label.
//! Audit times live in the `__timestamp` / `__modificationTimestamp`
//! properties written by the instance writer.

use super::property::{PropertyMap, PropertyValue};
use super::types::VertexId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,

    /// System properties and attribute values, keyed by storage key
    pub properties: PropertyMap,
}

impl Vertex {
    pub fn new(id: VertexId) -> Self {
        Self::new_with_properties(id, PropertyMap::new())
    }

    pub fn new_with_properties(id: VertexId, properties: PropertyMap) -> Self {
        Vertex { id, properties }
    }

    /// Set a property value, returning the previous one
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.properties.remove(key)
    }
}
