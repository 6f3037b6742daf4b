//! Attribute mapper
//!
//! Closed dispatch over the attribute's declared type. Structs and
//! references are resolved through their backing edges; collections re-enter
//! the same dispatch per element.

use super::primitive::{decode_primitive, decode_value};
use super::EntityRetriever;
use crate::error::{RepositoryError, RepositoryResult};
use crate::graph::{keys, Edge, GraphAccessor, PropertyContainer, PropertyValue, Vertex};
use crate::model::{AttributeMap, ExtendedInfo, ObjectId, Scalar, StructValue, TypedValue};
use crate::typesys::{AttributeDef, AttributeType, TypeOracle};
use indexmap::IndexMap;
use tracing::debug;

impl<'a, G: GraphAccessor + ?Sized, T: TypeOracle + ?Sized> EntityRetriever<'a, G, T> {
    /// Value of one declared attribute of `vertex`, `None` when absent
    pub fn map_attribute(
        &self,
        vertex: &Vertex,
        attribute: &AttributeDef,
        ext: Option<&mut ExtendedInfo>,
    ) -> RepositoryResult<Option<TypedValue>> {
        let property = attribute.qualified_name.as_str();

        match &attribute.attr_type {
            AttributeType::Primitive(kind) => Ok(decode_primitive(vertex, property, *kind)?.map(TypedValue::Scalar)),
            AttributeType::Enum(enum_type) => {
                Ok(decode_enum(vertex, property, enum_type)?.map(TypedValue::Scalar))
            }
            AttributeType::Struct(struct_type) => {
                let edge = self.graph.edge_for_label(vertex.id, &attribute.edge_label(), attribute.direction);
                match edge {
                    Some(edge) => self.map_struct_edge(vertex, edge, attribute, struct_type, ext),
                    None => Ok(None),
                }
            }
            AttributeType::ObjectId(_) => {
                let edge = self.graph.edge_for_label(vertex.id, &attribute.edge_label(), attribute.direction);
                match edge {
                    Some(edge) => self.map_reference_edge(vertex, edge, attribute, ext),
                    None => Ok(None),
                }
            }
            AttributeType::Array(element_type) => self.map_array(vertex, attribute, element_type, ext),
            AttributeType::Map(value_type) => self.map_map(vertex, attribute, value_type, ext),
            // Entity-level facet, see get_all_classifications
            AttributeType::Classification(_) => Ok(None),
        }
    }

    fn map_array(
        &self,
        vertex: &Vertex,
        attribute: &AttributeDef,
        element_type: &AttributeType,
        mut ext: Option<&mut ExtendedInfo>,
    ) -> RepositoryResult<Option<TypedValue>> {
        // Unset and empty both read as absent
        let elements = match vertex.list_property(&attribute.qualified_name) {
            Some(elements) if !elements.is_empty() => elements,
            _ => return Ok(None),
        };

        let edge_label = attribute.edge_label();
        let mut values = Vec::with_capacity(elements.len());
        for raw in elements {
            let value = self.map_collection_entry(
                vertex,
                attribute,
                element_type,
                raw,
                &edge_label,
                ext.as_deref_mut(),
            )?;
            if let Some(value) = value {
                values.push(value);
            }
        }
        Ok(Some(TypedValue::List(values)))
    }

    fn map_map(
        &self,
        vertex: &Vertex,
        attribute: &AttributeDef,
        value_type: &AttributeType,
        mut ext: Option<&mut ExtendedInfo>,
    ) -> RepositoryResult<Option<TypedValue>> {
        let map_keys = match vertex.list_property(&attribute.qualified_name) {
            Some(map_keys) if !map_keys.is_empty() => map_keys,
            _ => return Ok(None),
        };

        let mut entries = IndexMap::with_capacity(map_keys.len());
        for key in map_keys {
            let Some(key) = key.as_string() else {
                return Err(RepositoryError::invalid_type(
                    attribute.attr_type.type_name(),
                    vertex.id,
                    format!("map key of {} is {}", attribute.qualified_name, key.type_name()),
                ));
            };
            let entry_property = keys::map_entry_property(&attribute.qualified_name, key);
            let Some(raw) = vertex.value(&entry_property) else {
                continue;
            };
            let value = self.map_collection_entry(
                vertex,
                attribute,
                value_type,
                raw,
                &keys::attribute_edge_label(&entry_property),
                ext.as_deref_mut(),
            )?;
            if let Some(value) = value {
                entries.insert(key.to_string(), value);
            }
        }
        Ok(Some(TypedValue::Map(entries)))
    }

    /// One array element or map value. Struct and reference entries hold
    /// their edge; anything else falls back to the first edge with the
    /// entry's label.
    fn map_collection_entry(
        &self,
        vertex: &Vertex,
        attribute: &AttributeDef,
        entry_type: &AttributeType,
        raw: &PropertyValue,
        edge_label: &str,
        ext: Option<&mut ExtendedInfo>,
    ) -> RepositoryResult<Option<TypedValue>> {
        match entry_type {
            AttributeType::Struct(struct_type) => match self.entry_edge(vertex, attribute, raw, edge_label) {
                Some(edge) => self.map_struct_edge(vertex, edge, attribute, struct_type, ext),
                None => Ok(None),
            },
            AttributeType::ObjectId(_) => match self.entry_edge(vertex, attribute, raw, edge_label) {
                Some(edge) => self.map_reference_edge(vertex, edge, attribute, ext),
                None => Ok(None),
            },
            AttributeType::Classification(_) => Ok(None),
            inline => self.map_inline_value(vertex, attribute, inline, raw).map(Some),
        }
    }

    fn entry_edge(
        &self,
        vertex: &Vertex,
        attribute: &AttributeDef,
        raw: &PropertyValue,
        edge_label: &str,
    ) -> Option<&'a Edge> {
        match raw.as_edge_ref() {
            Some(edge_id) => self.graph.edge(edge_id),
            None => self.graph.edge_for_label(vertex.id, edge_label, attribute.direction),
        }
    }

    /// Primitive, enum and nested primitive collections stored inline
    fn map_inline_value(
        &self,
        vertex: &Vertex,
        attribute: &AttributeDef,
        value_type: &AttributeType,
        raw: &PropertyValue,
    ) -> RepositoryResult<TypedValue> {
        let mismatch = || {
            RepositoryError::invalid_type(
                value_type.type_name(),
                vertex.id,
                format!("element of {} holds {}", attribute.qualified_name, raw.type_name()),
            )
        };

        match (value_type, raw) {
            (AttributeType::Primitive(kind), _) => {
                Ok(TypedValue::Scalar(decode_value(raw, *kind, vertex.element_id(), &attribute.qualified_name)?))
            }
            (AttributeType::Enum(_), PropertyValue::String(s)) => Ok(TypedValue::Scalar(Scalar::String(s.clone()))),
            (AttributeType::Array(inner), PropertyValue::List(items)) => {
                let values = items
                    .iter()
                    .map(|item| self.map_inline_value(vertex, attribute, inner, item))
                    .collect::<RepositoryResult<Vec<_>>>()?;
                Ok(TypedValue::List(values))
            }
            (AttributeType::Map(inner), PropertyValue::Map(map)) => {
                let mut sorted: Vec<(&String, &PropertyValue)> = map.iter().collect();
                sorted.sort_by(|a, b| a.0.cmp(b.0));
                let mut entries = IndexMap::with_capacity(sorted.len());
                for (key, item) in sorted {
                    entries.insert(key.clone(), self.map_inline_value(vertex, attribute, inner, item)?);
                }
                Ok(TypedValue::Map(entries))
            }
            _ => Err(mismatch()),
        }
    }

    fn map_struct_edge(
        &self,
        vertex: &Vertex,
        edge: &Edge,
        attribute: &AttributeDef,
        struct_type: &str,
        ext: Option<&mut ExtendedInfo>,
    ) -> RepositoryResult<Option<TypedValue>> {
        let struct_vertex = self.referenced_entity_vertex(edge, attribute.direction, vertex.id)?;
        Ok(Some(TypedValue::Struct(self.map_struct(struct_vertex, struct_type, ext)?)))
    }

    /// All attributes of a struct vertex
    pub(crate) fn map_struct(
        &self,
        vertex: &Vertex,
        struct_type: &str,
        mut ext: Option<&mut ExtendedInfo>,
    ) -> RepositoryResult<StructValue> {
        let defs = self.types.all_attributes(struct_type).ok_or_else(|| {
            RepositoryError::invalid_type(struct_type, vertex.id, "struct type not registered")
        })?;

        let mut attributes = AttributeMap::new();
        for attribute in defs {
            if let Some(value) = self.map_attribute(vertex, attribute, ext.as_deref_mut())? {
                attributes.insert(attribute.name.clone(), value);
            }
        }
        Ok(StructValue {
            type_name: struct_type.to_string(),
            attributes,
        })
    }

    fn map_reference_edge(
        &self,
        vertex: &Vertex,
        edge: &Edge,
        attribute: &AttributeDef,
        ext: Option<&mut ExtendedInfo>,
    ) -> RepositoryResult<Option<TypedValue>> {
        let referenced = self.referenced_entity_vertex(edge, attribute.direction, vertex.id)?;
        let object_id = self.map_reference(referenced, attribute.is_owned_ref, ext)?;
        Ok(Some(TypedValue::ObjectId(object_id)))
    }

    /// Owned references with an accumulator are materialized into it once
    /// per guid; everything else is a bare `{guid, typeName}`.
    fn map_reference(
        &self,
        referenced: &Vertex,
        owned: bool,
        ext: Option<&mut ExtendedInfo>,
    ) -> RepositoryResult<ObjectId> {
        let Some(ext) = ext.filter(|_| owned) else {
            return self.bare_object_id(referenced);
        };

        let guid = self.guid_of(referenced)?;
        if !ext.contains(&guid) {
            debug!("Materializing owned reference {}", guid);
            self.map_vertex_to_entity(referenced, Some(&mut *ext))?;
        }

        match ext.get(&guid) {
            Some(entity) => {
                let mut object_id = ObjectId::new(guid.clone(), entity.type_name.clone());
                for attribute in self.types.unique_attributes(&entity.type_name) {
                    if let Some(value) = entity.attributes.get(&attribute.name) {
                        object_id.unique_attributes.insert(attribute.name.clone(), value.clone());
                    }
                }
                Ok(object_id)
            }
            // Still being materialized further up the stack
            None => self.to_object_id(referenced),
        }
    }
}

fn decode_enum(vertex: &Vertex, property: &str, enum_type: &str) -> RepositoryResult<Option<Scalar>> {
    match vertex.value(property) {
        None => Ok(None),
        Some(PropertyValue::String(s)) => Ok(Some(Scalar::String(s.clone()))),
        Some(other) => Err(RepositoryError::invalid_type(
            enum_type,
            vertex.id,
            format!("property {} holds {}", property, other.type_name()),
        )),
    }
}
