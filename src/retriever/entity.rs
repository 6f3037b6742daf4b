//! Entity materializer: full entities, headers and batches

use super::{status_of, time_of, EntityRetriever};
use crate::error::{RepositoryError, RepositoryResult};
use crate::graph::{keys, GraphAccessor, PropertyContainer, Vertex};
use crate::model::{
    AttributeMap, EntitiesWithExtInfo, EntityDetail, EntityHeader, EntityWithExtInfo, ExtendedInfo, TypedValue,
};
use crate::typesys::{TypeCategory, TypeDef, TypeOracle};
use tracing::debug;

impl<'a, G: GraphAccessor + ?Sized, T: TypeOracle + ?Sized> EntityRetriever<'a, G, T> {
    /// Materialize an entity. Owned references become bare object ids.
    pub fn to_entity(&self, vertex: &Vertex) -> RepositoryResult<EntityDetail> {
        self.map_vertex_to_entity(vertex, None)
    }

    pub fn to_entity_by_guid(&self, guid: &str) -> RepositoryResult<EntityDetail> {
        self.to_entity(self.entity_vertex(guid)?)
    }

    /// Materialize an entity into a caller-owned accumulator. Entities
    /// reached through owned references land in `ext` exactly once.
    pub fn to_entity_with_accumulator(
        &self,
        vertex: &Vertex,
        ext: &mut ExtendedInfo,
    ) -> RepositoryResult<EntityDetail> {
        self.map_vertex_to_entity(vertex, Some(ext))
    }

    /// An entity plus every entity it owns, transitively
    pub fn to_entity_with_ext_info(&self, vertex: &Vertex) -> RepositoryResult<EntityWithExtInfo> {
        let mut ext = ExtendedInfo::new();
        let entity = self.map_vertex_to_entity(vertex, Some(&mut ext))?;

        let mut ret = EntityWithExtInfo {
            entity,
            referred_entities: ext.into_entities(),
        };
        ret.compact();
        Ok(ret)
    }

    pub fn to_entity_with_ext_info_by_guid(&self, guid: &str) -> RepositoryResult<EntityWithExtInfo> {
        self.to_entity_with_ext_info(self.entity_vertex(guid)?)
    }

    /// Several entities sharing one accumulator, so an entity owned by more
    /// than one of them (or requested directly) appears once
    pub fn to_entities_with_ext_info(&self, guids: &[&str]) -> RepositoryResult<EntitiesWithExtInfo> {
        let mut ext = ExtendedInfo::new();
        let mut entities = Vec::with_capacity(guids.len());

        for guid in guids {
            let vertex = self.entity_vertex(guid)?;
            entities.push(self.map_vertex_to_entity(vertex, Some(&mut ext))?);
        }

        let mut ret = EntitiesWithExtInfo {
            entities,
            referred_entities: ext.into_entities(),
        };
        ret.compact();
        Ok(ret)
    }

    pub(crate) fn map_vertex_to_entity(
        &self,
        vertex: &Vertex,
        mut ext: Option<&mut ExtendedInfo>,
    ) -> RepositoryResult<EntityDetail> {
        let guid = self.guid_of(vertex)?;

        if let Some(cached) = ext.as_deref().and_then(|e| e.get(&guid)) {
            return Ok(cached.clone());
        }
        if let Some(ext) = ext.as_deref_mut() {
            ext.reserve(&guid);
        }

        let type_name = self.type_name_of(vertex)?;
        if !matches!(self.types.resolve_type(&type_name), Some(TypeDef::Entity(_))) {
            return Err(RepositoryError::invalid_type(
                &type_name,
                vertex.id,
                "not a registered entity type",
            ));
        }
        debug!("Mapping vertex {} to entity {} ({})", vertex.id, guid, type_name);

        let mut attributes = AttributeMap::new();
        for attribute in self.types.all_attributes(&type_name).unwrap_or_default() {
            if attribute.category() == TypeCategory::Classification {
                continue;
            }
            if let Some(value) = self.map_attribute(vertex, attribute, ext.as_deref_mut())? {
                attributes.insert(attribute.name.clone(), value);
            }
        }

        let entity = EntityDetail {
            guid,
            status: status_of(vertex),
            version: vertex
                .property(keys::VERSION)
                .and_then(|v| v.as_integer())
                .unwrap_or(0),
            created_by: vertex.string_property(keys::CREATED_BY).map(String::from),
            updated_by: vertex.string_property(keys::MODIFIED_BY).map(String::from),
            create_time: time_of(vertex, keys::CREATE_TIME),
            update_time: time_of(vertex, keys::UPDATE_TIME),
            attributes,
            relationship_attributes: self.map_relationship_attributes(vertex, &type_name)?,
            classifications: self.get_all_classifications(vertex.id)?,
            type_name,
        };

        if let Some(ext) = ext {
            ext.complete(entity.clone());
        }
        Ok(entity)
    }

    /// Header with unique and convenience attributes
    pub fn to_entity_header(&self, vertex: &Vertex) -> RepositoryResult<EntityHeader> {
        self.map_vertex_to_header(vertex, &[])
    }

    /// Header with additional attributes. Dotted names use their last segment.
    pub fn to_entity_header_with_attributes(
        &self,
        vertex: &Vertex,
        attributes: &[&str],
    ) -> RepositoryResult<EntityHeader> {
        self.map_vertex_to_header(vertex, attributes)
    }

    pub fn to_entity_header_with_classifications(&self, vertex: &Vertex) -> RepositoryResult<EntityHeader> {
        let mut header = self.map_vertex_to_header(vertex, &[])?;
        header.classifications = self.get_all_classifications(vertex.id)?;
        Ok(header)
    }

    pub fn to_entity_header_by_guid(&self, guid: &str) -> RepositoryResult<EntityHeader> {
        self.to_entity_header(self.entity_vertex(guid)?)
    }

    pub fn to_entity_header_with_classifications_by_guid(&self, guid: &str) -> RepositoryResult<EntityHeader> {
        self.to_entity_header_with_classifications(self.entity_vertex(guid)?)
    }

    fn map_vertex_to_header(&self, vertex: &Vertex, extra: &[&str]) -> RepositoryResult<EntityHeader> {
        let type_name = self.type_name_of(vertex)?;
        let mut header = EntityHeader {
            guid: self.guid_of(vertex)?,
            status: status_of(vertex),
            display_text: None,
            attributes: AttributeMap::new(),
            classification_names: self.classification_names(vertex.id),
            classifications: Vec::new(),
            type_name,
        };

        // Unknown types still get the system fields
        if !matches!(self.types.resolve_type(&header.type_name), Some(TypeDef::Entity(_))) {
            debug!("Entity type {} not registered, header without attributes", header.type_name);
            return Ok(header);
        }

        let unique = self.types.unique_attributes(&header.type_name);
        header.attributes = self.attributes_of(vertex, &unique)?;

        // Requested extras never feed the display text
        let display_name = match self.types.resolve_attribute(&header.type_name, "name") {
            Some(attribute) => self.map_attribute(vertex, attribute, None)?,
            None => None,
        };
        header.display_text = display_text_from(display_name.as_ref(), &header.attributes);

        for name in &self.config.header_attributes {
            if let Some(attribute) = self.types.resolve_attribute(&header.type_name, name) {
                if let Some(value) = self.map_attribute(vertex, attribute, None)? {
                    header.attributes.insert(attribute.name.clone(), value);
                }
            }
        }

        for requested in extra {
            let name = non_qualified_name(requested);
            if header.attributes.contains_key(name) {
                continue;
            }
            if let Some(attribute) = self.types.resolve_attribute(&header.type_name, name) {
                if let Some(value) = self.map_attribute(vertex, attribute, None)? {
                    header.attributes.insert(attribute.name.clone(), value);
                }
            }
        }

        Ok(header)
    }

    /// Header for an already materialized entity; `None` if its type is not
    /// a registered entity type
    pub fn header_from_entity(&self, entity: &EntityDetail) -> Option<EntityHeader> {
        if !matches!(self.types.resolve_type(&entity.type_name), Some(TypeDef::Entity(_))) {
            return None;
        }

        let mut attributes = AttributeMap::new();
        for attribute in self.types.unique_attributes(&entity.type_name) {
            if let Some(value) = entity.attributes.get(&attribute.name) {
                attributes.insert(attribute.name.clone(), value.clone());
            }
        }
        let display_text = display_text_from(entity.attributes.get("name"), &attributes);
        for name in &self.config.header_attributes {
            if let Some(value) = entity.attributes.get(name) {
                attributes.insert(name.clone(), value.clone());
            }
        }

        let mut classification_names: Vec<String> = Vec::new();
        for classification in &entity.classifications {
            if !classification_names.contains(&classification.type_name) {
                classification_names.push(classification.type_name.clone());
            }
        }

        Some(EntityHeader {
            guid: entity.guid.clone(),
            type_name: entity.type_name.clone(),
            status: entity.status,
            display_text,
            attributes,
            classification_names,
            classifications: entity.classifications.clone(),
        })
    }
}

/// Last segment of a dotted attribute name
fn non_qualified_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// `name`, else the `qualifiedName` among the unique attributes
fn display_text_from(name: Option<&TypedValue>, unique: &AttributeMap) -> Option<String> {
    name.and_then(TypedValue::as_str)
        .or_else(|| unique.get("qualifiedName").and_then(TypedValue::as_str))
        .map(String::from)
}
