//! Storage conventions shared by the writer, the retriever and the propagator
//!
//! System properties are prefixed with `__` so they can never collide with a
//! qualified attribute name (`<Type>.<attribute>`).

/// Entity / relationship guid
pub const GUID: &str = "__guid";
/// Type name of the instance held by a vertex or edge
pub const TYPE_NAME: &str = "__typeName";
/// Lifecycle state (`ACTIVE` / `DELETED`)
pub const STATE: &str = "__state";
pub const VERSION: &str = "__version";
pub const CREATED_BY: &str = "__createdBy";
pub const MODIFIED_BY: &str = "__modifiedBy";
pub const CREATE_TIME: &str = "__timestamp";
pub const UPDATE_TIME: &str = "__modificationTimestamp";

/// Guid of the entity a classification vertex is authoritatively attached to
pub const CLASSIFICATION_ENTITY_GUID: &str = "__entityGuid";
/// Whether a classification vertex may propagate
pub const CLASSIFICATION_PROPAGATE: &str = "__propagate";
/// JSON array of validity windows on a classification vertex
pub const CLASSIFICATION_VALIDITY_PERIODS: &str = "__validityPeriods";

/// Marks a classification edge as derived by propagation
pub const IS_PROPAGATED: &str = "__isPropagated";
/// Cache of classification type names reaching a vertex by propagation
pub const PROPAGATED_TRAIT_NAMES: &str = "__propagatedTraitNames";

/// Relationship guid stored on relationship edges
pub const RELATIONSHIP_GUID: &str = "__relationshipGuid";
/// Propagation mode stored on relationship edges
pub const PROPAGATE_TAGS: &str = "__propagateTags";

/// Label of both authoritative and propagated classification edges
pub const CLASSIFICATION_LABEL: &str = "classifiedAs";

const ATTRIBUTE_EDGE_PREFIX: &str = "__";
const RELATIONSHIP_EDGE_PREFIX: &str = "r:";

/// Label of the edge backing a struct or reference attribute
pub fn attribute_edge_label(property_name: &str) -> String {
    format!("{}{}", ATTRIBUTE_EDGE_PREFIX, property_name)
}

/// Label of the edges backing a relationship type
pub fn relationship_edge_label(relationship_type: &str) -> String {
    format!("{}{}", RELATIONSHIP_EDGE_PREFIX, relationship_type)
}

/// Property holding the value of one map entry
pub fn map_entry_property(property_name: &str, key: &str) -> String {
    format!("{}.{}", property_name, key)
}
