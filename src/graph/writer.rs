//! Write-side fixture API
//!
//! [`InstanceWriter`] lays instances out in a [`GraphStore`] following the
//! conventions in [`keys`](super::keys), so the retriever and the propagator
//! can read them back. It is used by tests, benches and embedding callers;
//! the engine itself never writes through it.

use super::keys;
use super::property::{PropertyMap, PropertyValue};
use super::store::{GraphResult, GraphStore};
use super::types::{EdgeId, VertexId};
use crate::model::{PropagateTags, TimeBoundary};
use chrono::{DateTime, Utc};
use uuid::Uuid;

const ACTIVE: &str = "ACTIVE";
const DELETED: &str = "DELETED";

/// Writes entities, structs, relationships and classifications
pub struct InstanceWriter<'a> {
    store: &'a mut GraphStore,
    user: String,
}

impl<'a> InstanceWriter<'a> {
    pub fn new(store: &'a mut GraphStore) -> Self {
        Self::with_user(store, "admin")
    }

    /// Writer recording `user` in the audit fields
    pub fn with_user(store: &'a mut GraphStore, user: impl Into<String>) -> Self {
        Self {
            store,
            user: user.into(),
        }
    }

    pub fn store(&self) -> &GraphStore {
        &*self.store
    }

    fn audit_properties(&self) -> PropertyMap {
        let now = Utc::now().timestamp_millis();
        let mut props = PropertyMap::new();
        props.insert(keys::STATE.to_string(), ACTIVE.into());
        props.insert(keys::CREATED_BY.to_string(), self.user.clone().into());
        props.insert(keys::MODIFIED_BY.to_string(), self.user.clone().into());
        props.insert(keys::CREATE_TIME.to_string(), PropertyValue::DateTime(now));
        props.insert(keys::UPDATE_TIME.to_string(), PropertyValue::DateTime(now));
        props
    }

    /// Create an entity with a generated guid
    pub fn create_entity(&mut self, type_name: &str) -> GraphResult<VertexId> {
        let guid = Uuid::new_v4().to_string();
        self.create_entity_with_guid(type_name, &guid)
    }

    pub fn create_entity_with_guid(&mut self, type_name: &str, guid: &str) -> GraphResult<VertexId> {
        let mut props = self.audit_properties();
        props.insert(keys::GUID.to_string(), guid.into());
        props.insert(keys::TYPE_NAME.to_string(), type_name.into());
        props.insert(keys::VERSION.to_string(), PropertyValue::Integer(1));
        self.store.create_vertex_with_properties(props)
    }

    /// Set a primitive or enum attribute under its qualified name
    pub fn set_attribute(
        &mut self,
        vertex: VertexId,
        qualified_name: &str,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<()> {
        self.store.set_vertex_property(vertex, qualified_name, value)
    }

    pub fn set_date_attribute(
        &mut self,
        vertex: VertexId,
        qualified_name: &str,
        value: DateTime<Utc>,
    ) -> GraphResult<()> {
        self.store
            .set_vertex_property(vertex, qualified_name, PropertyValue::DateTime(value.timestamp_millis()))
    }

    /// Single-valued reference attribute: one edge labeled `__<qualifiedName>`
    pub fn set_reference(&mut self, from: VertexId, qualified_name: &str, to: VertexId) -> GraphResult<EdgeId> {
        let props = self.audit_properties();
        self.store
            .create_edge_with_properties(from, to, keys::attribute_edge_label(qualified_name), props)
    }

    /// Create a struct vertex carrying `attributes` (qualified name -> value)
    pub fn create_struct(
        &mut self,
        type_name: &str,
        attributes: Vec<(&str, PropertyValue)>,
    ) -> GraphResult<VertexId> {
        let mut props = PropertyMap::new();
        props.insert(keys::TYPE_NAME.to_string(), type_name.into());
        for (name, value) in attributes {
            props.insert(name.to_string(), value);
        }
        self.store.create_vertex_with_properties(props)
    }

    /// Single-valued struct attribute
    pub fn set_struct(
        &mut self,
        owner: VertexId,
        qualified_name: &str,
        type_name: &str,
        attributes: Vec<(&str, PropertyValue)>,
    ) -> GraphResult<VertexId> {
        let struct_vertex = self.create_struct(type_name, attributes)?;
        self.store
            .create_edge(owner, struct_vertex, keys::attribute_edge_label(qualified_name))?;
        Ok(struct_vertex)
    }

    /// Array of primitives stored inline
    pub fn set_primitive_array(
        &mut self,
        vertex: VertexId,
        qualified_name: &str,
        values: Vec<PropertyValue>,
    ) -> GraphResult<()> {
        self.store.set_vertex_property(vertex, qualified_name, PropertyValue::List(values))
    }

    /// Array of references or structs: one edge per element, the property
    /// holds the element edges in order
    pub fn set_reference_array(
        &mut self,
        from: VertexId,
        qualified_name: &str,
        targets: &[VertexId],
    ) -> GraphResult<Vec<EdgeId>> {
        let label = keys::attribute_edge_label(qualified_name);
        let mut edges = Vec::with_capacity(targets.len());
        for target in targets {
            let props = self.audit_properties();
            edges.push(self.store.create_edge_with_properties(from, *target, label.as_str(), props)?);
        }
        let elements = edges.iter().map(|e| PropertyValue::EdgeRef(*e)).collect();
        self.store.set_vertex_property(from, qualified_name, PropertyValue::List(elements))?;
        Ok(edges)
    }

    /// Map of primitives: keys list at `qualifiedName`, values at
    /// `qualifiedName.key`
    pub fn set_primitive_map(
        &mut self,
        vertex: VertexId,
        qualified_name: &str,
        entries: Vec<(&str, PropertyValue)>,
    ) -> GraphResult<()> {
        let mut map_keys = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            self.store
                .set_vertex_property(vertex, keys::map_entry_property(qualified_name, key), value)?;
            map_keys.push(PropertyValue::from(key));
        }
        self.store.set_vertex_property(vertex, qualified_name, PropertyValue::List(map_keys))
    }

    /// Map of references or structs: one edge per entry labeled
    /// `__qualifiedName.key`, the entry property holds the edge
    pub fn set_reference_map(
        &mut self,
        from: VertexId,
        qualified_name: &str,
        entries: &[(&str, VertexId)],
    ) -> GraphResult<Vec<EdgeId>> {
        let mut map_keys = Vec::with_capacity(entries.len());
        let mut edges = Vec::with_capacity(entries.len());
        for (key, target) in entries {
            let entry_property = keys::map_entry_property(qualified_name, key);
            let props = self.audit_properties();
            let edge = self.store.create_edge_with_properties(
                from,
                *target,
                keys::attribute_edge_label(&entry_property),
                props,
            )?;
            self.store
                .set_vertex_property(from, entry_property, PropertyValue::EdgeRef(edge))?;
            map_keys.push(PropertyValue::from(*key));
            edges.push(edge);
        }
        self.store.set_vertex_property(from, qualified_name, PropertyValue::List(map_keys))?;
        Ok(edges)
    }

    /// Relationship edge from `end1` to `end2` with a generated guid
    pub fn add_relationship(
        &mut self,
        type_name: &str,
        end1: VertexId,
        end2: VertexId,
        propagate: PropagateTags,
    ) -> GraphResult<EdgeId> {
        let mut props = self.audit_properties();
        props.insert(keys::RELATIONSHIP_GUID.to_string(), Uuid::new_v4().to_string().into());
        props.insert(keys::TYPE_NAME.to_string(), type_name.into());
        props.insert(keys::PROPAGATE_TAGS.to_string(), propagate.as_str().into());
        self.store
            .create_edge_with_properties(end1, end2, keys::relationship_edge_label(type_name), props)
    }

    pub fn set_relationship_attribute(
        &mut self,
        edge: EdgeId,
        qualified_name: &str,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<()> {
        self.store.set_edge_property(edge, qualified_name, value)
    }

    /// Attach a classification to `entity`
    pub fn add_classification(
        &mut self,
        entity: VertexId,
        type_name: &str,
        propagate: bool,
    ) -> GraphResult<VertexId> {
        self.add_classification_with_validity(entity, type_name, propagate, &[])
    }

    pub fn add_classification_with_validity(
        &mut self,
        entity: VertexId,
        type_name: &str,
        propagate: bool,
        validity_periods: &[TimeBoundary],
    ) -> GraphResult<VertexId> {
        let entity_guid = self
            .store
            .get_vertex(entity)
            .and_then(|v| v.get_property(keys::GUID))
            .cloned()
            .unwrap_or(PropertyValue::Null);

        let mut props = PropertyMap::new();
        props.insert(keys::TYPE_NAME.to_string(), type_name.into());
        props.insert(keys::CLASSIFICATION_ENTITY_GUID.to_string(), entity_guid);
        props.insert(keys::CLASSIFICATION_PROPAGATE.to_string(), propagate.into());
        if !validity_periods.is_empty() {
            // Serializing plain string fields cannot fail
            let json = serde_json::to_string(validity_periods).unwrap_or_default();
            props.insert(keys::CLASSIFICATION_VALIDITY_PERIODS.to_string(), json.into());
        }
        let classification = self.store.create_vertex_with_properties(props)?;

        let mut edge_props = PropertyMap::new();
        edge_props.insert(keys::IS_PROPAGATED.to_string(), false.into());
        self.store
            .create_edge_with_properties(entity, classification, keys::CLASSIFICATION_LABEL, edge_props)?;
        Ok(classification)
    }

    pub fn set_classification_attribute(
        &mut self,
        classification: VertexId,
        qualified_name: &str,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<()> {
        self.store.set_vertex_property(classification, qualified_name, value)
    }

    /// Soft-delete an entity
    pub fn mark_deleted(&mut self, vertex: VertexId) -> GraphResult<()> {
        self.store.set_vertex_property(vertex, keys::STATE, DELETED)
    }

    /// Soft-delete a relationship or attribute edge
    pub fn mark_edge_deleted(&mut self, edge: EdgeId) -> GraphResult<()> {
        self.store.set_edge_property(edge, keys::STATE, DELETED)
    }
}
