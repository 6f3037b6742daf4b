//! Entity and relationship materialization
//!
//! [`EntityRetriever`] turns vertices and edges into typed domain objects,
//! consulting a [`TypeOracle`] for what each property means. It holds no
//! mutable state: the only per-call state is the [`ExtendedInfo`]
//! accumulator threaded through owned-reference recursion.
//!
//! [`ExtendedInfo`]: crate::model::ExtendedInfo

mod attribute;
mod entity;
pub mod primitive;
mod relationship;

pub use primitive::{decode_primitive, decode_primitive_named};

use crate::config::MaterializationConfig;
use crate::error::{RepositoryError, RepositoryResult};
use crate::graph::{keys, Direction, Edge, EdgeId, GraphAccessor, PropertyContainer, Vertex, VertexId};
use crate::model::{AttributeMap, Classification, EntityStatus, ObjectId, TimeBoundary, TypedValue};
use crate::typesys::{AttributeDef, TypeDef, TypeOracle};
use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

const NAME: &str = "name";
const QUALIFIED_NAME: &str = "qualifiedName";

/// Read-side materializer over a graph and a type oracle
pub struct EntityRetriever<'a, G: GraphAccessor + ?Sized, T: TypeOracle + ?Sized> {
    graph: &'a G,
    types: &'a T,
    config: MaterializationConfig,
}

impl<'a, G: GraphAccessor + ?Sized, T: TypeOracle + ?Sized> EntityRetriever<'a, G, T> {
    pub fn new(graph: &'a G, types: &'a T) -> Self {
        Self::with_config(graph, types, MaterializationConfig::default())
    }

    pub fn with_config(graph: &'a G, types: &'a T, config: MaterializationConfig) -> Self {
        Self { graph, types, config }
    }

    pub fn config(&self) -> &MaterializationConfig {
        &self.config
    }

    /// Vertex of the entity with `guid`
    pub fn entity_vertex(&self, guid: &str) -> RepositoryResult<&'a Vertex> {
        self.graph
            .find_vertex_by_guid(guid)
            .and_then(|id| self.graph.vertex(id))
            .ok_or_else(|| RepositoryError::NotFound(format!("entity with guid {}", guid)))
    }

    pub(crate) fn vertex(&self, id: VertexId) -> RepositoryResult<&'a Vertex> {
        self.graph
            .vertex(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("vertex {}", id)))
    }

    pub(crate) fn edge(&self, id: EdgeId) -> RepositoryResult<&'a Edge> {
        self.graph
            .edge(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("edge {}", id)))
    }

    /// Vertex for an object id: by guid when assigned, otherwise by the
    /// type's unique attributes
    pub fn resolve_object_id(&self, object_id: &ObjectId) -> RepositoryResult<&'a Vertex> {
        if !object_id.is_resolvable() {
            return Err(RepositoryError::NotFound(format!("invalid object id {:?}", object_id)));
        }

        if let Some(guid) = object_id.guid.as_deref().filter(|g| !g.is_empty()) {
            return self.entity_vertex(guid);
        }

        let unique = self.types.unique_attributes(&object_id.type_name);
        for (name, value) in &object_id.unique_attributes {
            let Some(attribute) = unique.iter().find(|a| &a.name == name) else {
                continue;
            };
            let Some(raw) = to_property_value(value) else {
                continue;
            };
            let candidates = self.graph.find_vertices_by_property(&attribute.qualified_name, &raw);
            for id in candidates {
                let vertex = self.vertex(id)?;
                let type_name = vertex.string_property(keys::TYPE_NAME).unwrap_or_default();
                if self.types.is_type_or_supertype_of(&object_id.type_name, type_name) {
                    return Ok(vertex);
                }
            }
        }

        Err(RepositoryError::NotFound(format!(
            "{} with unique attributes {:?}",
            object_id.type_name, object_id.unique_attributes
        )))
    }

    /// `{guid, typeName, uniqueAttributes}` for an entity vertex
    pub fn to_object_id(&self, vertex: &Vertex) -> RepositoryResult<ObjectId> {
        let mut object_id = self.bare_object_id(vertex)?;
        if matches!(self.types.resolve_type(&object_id.type_name), Some(TypeDef::Entity(_))) {
            for attribute in self.types.unique_attributes(&object_id.type_name) {
                if let Some(value) = self.map_attribute(vertex, attribute, None)? {
                    object_id.unique_attributes.insert(attribute.name.clone(), value);
                }
            }
        }
        Ok(object_id)
    }

    pub(crate) fn bare_object_id(&self, vertex: &Vertex) -> RepositoryResult<ObjectId> {
        Ok(ObjectId::new(self.guid_of(vertex)?, self.type_name_of(vertex)?))
    }

    /// Entity vertex an attribute edge points at, seen from `parent`
    pub fn referenced_entity_vertex(
        &self,
        edge: &Edge,
        direction: Direction,
        parent: VertexId,
    ) -> RepositoryResult<&'a Vertex> {
        let id = match direction {
            Direction::Out => edge.target,
            Direction::In => edge.source,
            Direction::Both => edge.other_end(parent).ok_or_else(|| {
                RepositoryError::NotFound(format!("edge {} does not touch vertex {}", edge.id, parent))
            })?,
        };
        self.vertex(id)
    }

    /// Every classification reaching an entity, authoritative or propagated
    pub fn get_all_classifications(&self, entity: VertexId) -> RepositoryResult<Vec<Classification>> {
        let mut classifications = Vec::new();
        for edge in self.graph.edges_by_label(entity, keys::CLASSIFICATION_LABEL, Direction::Out) {
            let vertex = self.vertex(edge.target)?;
            classifications.push(self.to_classification(vertex)?);
        }
        Ok(classifications)
    }

    /// Distinct classification type names reaching an entity
    pub fn classification_names(&self, entity: VertexId) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for edge in self.graph.edges_by_label(entity, keys::CLASSIFICATION_LABEL, Direction::Out) {
            let name = self
                .graph
                .vertex(edge.target)
                .and_then(|v| v.string_property(keys::TYPE_NAME));
            if let Some(name) = name {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// Classification held by a classification vertex
    pub fn to_classification(&self, vertex: &Vertex) -> RepositoryResult<Classification> {
        let type_name = self.type_name_of(vertex)?;

        let validity_periods = match vertex.string_property(keys::CLASSIFICATION_VALIDITY_PERIODS) {
            Some(json) => serde_json::from_str::<Vec<TimeBoundary>>(json).map_err(|e| {
                RepositoryError::invalid_type(&type_name, vertex.id, format!("malformed validity periods: {}", e))
            })?,
            None => Vec::new(),
        };

        let mut attributes = AttributeMap::new();
        match self.types.all_attributes(&type_name) {
            Some(defs) => {
                for attribute in defs {
                    if let Some(value) = self.map_attribute(vertex, attribute, None)? {
                        attributes.insert(attribute.name.clone(), value);
                    }
                }
            }
            None => debug!("Classification type {} not registered, attributes skipped", type_name),
        }

        Ok(Classification {
            type_name,
            entity_guid: vertex
                .string_property(keys::CLASSIFICATION_ENTITY_GUID)
                .map(String::from),
            propagate: is_propagation_enabled(vertex),
            validity_periods,
            attributes,
        })
    }

    pub(crate) fn guid_of(&self, vertex: &Vertex) -> RepositoryResult<String> {
        vertex
            .string_property(keys::GUID)
            .map(String::from)
            .ok_or_else(|| RepositoryError::NotFound(format!("guid of vertex {}", vertex.id)))
    }

    pub(crate) fn type_name_of<C: PropertyContainer + ?Sized>(&self, element: &C) -> RepositoryResult<String> {
        element
            .string_property(keys::TYPE_NAME)
            .map(String::from)
            .ok_or_else(|| RepositoryError::invalid_type("<unset>", element.element_id(), "no type name stored"))
    }

    /// `name` if set, else `qualifiedName`
    pub(crate) fn display_text(&self, vertex: &Vertex) -> Option<String> {
        let type_name = vertex.string_property(keys::TYPE_NAME)?;
        [NAME, QUALIFIED_NAME].iter().find_map(|attribute| {
            let def = self.types.resolve_attribute(type_name, attribute)?;
            vertex.string_property(&def.qualified_name).map(String::from)
        })
    }

    /// Attribute values keyed by name for the given definitions
    pub(crate) fn attributes_of(
        &self,
        vertex: &Vertex,
        defs: &[&AttributeDef],
    ) -> RepositoryResult<AttributeMap> {
        let mut attributes = AttributeMap::new();
        for attribute in defs {
            if let Some(value) = self.map_attribute(vertex, attribute, None)? {
                attributes.insert(attribute.name.clone(), value);
            }
        }
        Ok(attributes)
    }
}

pub(crate) fn is_propagation_enabled(classification: &Vertex) -> bool {
    classification
        .property(keys::CLASSIFICATION_PROPAGATE)
        .and_then(|v| v.as_boolean())
        .unwrap_or(false)
}

pub(crate) fn status_of<C: PropertyContainer + ?Sized>(element: &C) -> EntityStatus {
    EntityStatus::from_state(element.string_property(keys::STATE))
}

pub(crate) fn time_of<C: PropertyContainer + ?Sized>(element: &C, key: &str) -> Option<DateTime<Utc>> {
    element
        .property(key)
        .and_then(|v| v.as_epoch_millis())
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

/// Storage form of a scalar used to look entities up by unique attribute
fn to_property_value(value: &TypedValue) -> Option<crate::graph::PropertyValue> {
    use crate::graph::PropertyValue;
    use crate::model::Scalar;

    let scalar = value.as_scalar()?;
    Some(match scalar {
        Scalar::String(s) | Scalar::BigInteger(s) | Scalar::BigDecimal(s) => PropertyValue::String(s.clone()),
        Scalar::Short(i) => PropertyValue::Integer(i64::from(*i)),
        Scalar::Int(i) => PropertyValue::Integer(i64::from(*i)),
        Scalar::Long(i) => PropertyValue::Integer(*i),
        Scalar::Byte(i) => PropertyValue::Integer(i64::from(*i)),
        Scalar::Float(f) => PropertyValue::Float(f64::from(*f)),
        Scalar::Double(f) => PropertyValue::Float(*f),
        Scalar::Boolean(b) => PropertyValue::Boolean(*b),
        Scalar::Date(d) => PropertyValue::DateTime(d.timestamp_millis()),
    })
}
