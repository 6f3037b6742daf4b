//! Relationship materializer and relationship-attribute mapper

use super::primitive::decode_primitive;
use super::{status_of, time_of, EntityRetriever};
use crate::error::{RepositoryError, RepositoryResult};
use crate::graph::{keys, Direction, Edge, EdgeId, GraphAccessor, PropertyContainer, Vertex};
use crate::model::{AttributeMap, PropagateTags, RelatedObjectId, Relationship, TypedValue};
use crate::typesys::{
    match_relationship_end, AttributeType, Cardinality, RelationshipEndDef, RelationshipTypeDef, TypeDef,
    TypeOracle,
};
use tracing::{debug, warn};

impl<'a, G: GraphAccessor + ?Sized, T: TypeOracle + ?Sized> EntityRetriever<'a, G, T> {
    /// Every relationship attribute of an entity. An attribute without a
    /// matching relationship end is skipped with a warning unless
    /// `strict_relationship_attributes` is set.
    pub(crate) fn map_relationship_attributes(
        &self,
        vertex: &Vertex,
        entity_type: &str,
    ) -> RepositoryResult<AttributeMap> {
        let mut attributes = AttributeMap::new();

        for name in self.types.relationship_attribute_names(entity_type) {
            match self.map_relationship_attribute(vertex, entity_type, &name) {
                Ok(Some(value)) => {
                    attributes.insert(name, value);
                }
                Ok(None) => {}
                Err(e @ RepositoryError::InvalidRelationshipDefinition { .. })
                    if !self.config.strict_relationship_attributes =>
                {
                    warn!("Skipping relationship attribute {}.{}: {}", entity_type, name, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(attributes)
    }

    /// Value of one relationship attribute: a related object id for a
    /// single-valued end, a list in edge order otherwise
    pub fn map_relationship_attribute(
        &self,
        vertex: &Vertex,
        entity_type: &str,
        attribute: &str,
    ) -> RepositoryResult<Option<TypedValue>> {
        let defs = self.types.relationship_defs_for(entity_type, attribute);
        if defs.is_empty() {
            return Err(RepositoryError::invalid_type(
                entity_type,
                vertex.id,
                format!("no relationship type bound to attribute {}", attribute),
            ));
        }

        let (def, end, direction) = self.select_relationship(vertex, &defs, entity_type, attribute)?;
        let label = keys::relationship_edge_label(&def.name);

        match end.cardinality {
            Cardinality::Single => match self.graph.edge_for_label(vertex.id, &label, direction) {
                Some(edge) => Ok(Some(TypedValue::Related(self.to_related_object_id(edge, direction, vertex)?))),
                None => Ok(None),
            },
            Cardinality::List | Cardinality::Set => {
                let edges = self.graph.edges_by_label(vertex.id, &label, direction);
                if edges.is_empty() {
                    return Ok(None);
                }
                let related = edges
                    .into_iter()
                    .map(|edge| self.to_related_object_id(edge, direction, vertex).map(TypedValue::Related))
                    .collect::<RepositoryResult<Vec<_>>>()?;
                Ok(Some(TypedValue::List(related)))
            }
        }
    }

    /// Pick the relationship type whose end declares the attribute. With
    /// several candidates, one that already has an edge on the vertex wins.
    fn select_relationship<'d>(
        &self,
        vertex: &Vertex,
        defs: &[&'d RelationshipTypeDef],
        entity_type: &str,
        attribute: &str,
    ) -> RepositoryResult<(&'d RelationshipTypeDef, &'d RelationshipEndDef, Direction)> {
        let candidates: Vec<_> = defs
            .iter()
            .filter_map(|def| {
                match_relationship_end(self.types, *def, entity_type, attribute).map(|(end, dir)| (*def, end, dir))
            })
            .collect();

        let Some(first) = candidates.first().copied() else {
            return Err(RepositoryError::InvalidRelationshipDefinition {
                relationship_type: defs.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(","),
                type_name: entity_type.to_string(),
                attribute: attribute.to_string(),
                element: vertex.id.into(),
            });
        };

        if candidates.len() == 1 {
            return Ok(first);
        }

        let with_edge = candidates.iter().copied().find(|(def, _, dir)| {
            !self
                .graph
                .edges_by_label(vertex.id, &keys::relationship_edge_label(&def.name), *dir)
                .is_empty()
        });
        Ok(with_edge.unwrap_or(first))
    }

    fn to_related_object_id(
        &self,
        edge: &Edge,
        direction: Direction,
        parent: &Vertex,
    ) -> RepositoryResult<RelatedObjectId> {
        let referenced = self.referenced_entity_vertex(edge, direction, parent.id)?;
        let relationship_type = self.relationship_type_of(edge);

        Ok(RelatedObjectId {
            guid: referenced.string_property(keys::GUID).map(String::from),
            type_name: self.type_name_of(referenced)?,
            entity_status: status_of(referenced),
            relationship_guid: edge.string_property(keys::RELATIONSHIP_GUID).map(String::from),
            relationship_attributes: self.relationship_edge_attributes(edge, &relationship_type)?,
            relationship_status: status_of(edge),
            relationship_type,
            display_text: self.display_text(referenced),
        })
    }

    fn relationship_type_of(&self, edge: &Edge) -> String {
        match edge.string_property(keys::TYPE_NAME) {
            Some(type_name) => type_name.to_string(),
            None => edge
                .label
                .as_str()
                .strip_prefix("r:")
                .unwrap_or(edge.label.as_str())
                .to_string(),
        }
    }

    /// Primitive and enum attributes stored on a relationship edge
    fn relationship_edge_attributes(&self, edge: &Edge, relationship_type: &str) -> RepositoryResult<AttributeMap> {
        let mut attributes = AttributeMap::new();
        let Some(defs) = self.types.all_attributes(relationship_type) else {
            return Ok(attributes);
        };

        for attribute in defs {
            let value = match &attribute.attr_type {
                AttributeType::Primitive(kind) => decode_primitive(edge, &attribute.qualified_name, *kind)?,
                AttributeType::Enum(_) => edge
                    .string_property(&attribute.qualified_name)
                    .map(|s| crate::model::Scalar::String(s.to_string())),
                _ => {
                    debug!("Relationship attribute {} is not primitive, skipped", attribute.qualified_name);
                    None
                }
            };
            if let Some(value) = value {
                attributes.insert(attribute.name.clone(), TypedValue::Scalar(value));
            }
        }
        Ok(attributes)
    }

    /// Materialize a relationship edge. end1 is the edge's out vertex, end2
    /// its in vertex.
    pub fn to_relationship(&self, edge_id: EdgeId) -> RepositoryResult<Relationship> {
        let edge = self.edge(edge_id)?;
        let type_name = self.type_name_of(edge)?;

        let Some(def) = self.types.resolve_type(&type_name).and_then(TypeDef::as_relationship) else {
            return Err(RepositoryError::invalid_type(
                &type_name,
                edge.id,
                "not a registered relationship type",
            ));
        };

        let propagate_tags = match edge.string_property(keys::PROPAGATE_TAGS) {
            Some(mode) => mode
                .parse::<PropagateTags>()
                .map_err(|reason| RepositoryError::invalid_type(&type_name, edge.id, reason))?,
            None => def.propagate_tags,
        };

        let end1 = self.vertex(edge.source)?;
        let end2 = self.vertex(edge.target)?;

        Ok(Relationship {
            guid: edge.string_property(keys::RELATIONSHIP_GUID).map(String::from),
            label: edge.label.as_str().to_string(),
            status: status_of(edge),
            version: edge.property(keys::VERSION).and_then(|v| v.as_integer()).unwrap_or(1),
            propagate_tags,
            end1: self.bare_object_id(end1)?,
            end2: self.bare_object_id(end2)?,
            created_by: edge.string_property(keys::CREATED_BY).map(String::from),
            updated_by: edge.string_property(keys::MODIFIED_BY).map(String::from),
            create_time: time_of(edge, keys::CREATE_TIME),
            update_time: time_of(edge, keys::UPDATE_TIME),
            attributes: self.relationship_edge_attributes(edge, &type_name)?,
            type_name,
        })
    }
}
