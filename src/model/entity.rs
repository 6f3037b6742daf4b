//! Entity views and the extended-info accumulator

use super::classification::Classification;
use super::value::AttributeMap;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an entity or relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    #[default]
    Active,
    Deleted,
}

impl EntityStatus {
    /// Decode the stored state. Anything other than `DELETED` is active.
    pub fn from_state(state: Option<&str>) -> Self {
        match state {
            Some("DELETED") => EntityStatus::Deleted,
            _ => EntityStatus::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "ACTIVE",
            EntityStatus::Deleted => "DELETED",
        }
    }
}

/// Lightweight entity summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityHeader {
    pub guid: String,
    pub type_name: String,
    pub status: EntityStatus,
    /// `name` if present, else `qualifiedName`
    pub display_text: Option<String>,
    pub attributes: AttributeMap,
    pub classification_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<Classification>,
}

/// Fully materialized entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetail {
    pub guid: String,
    pub type_name: String,
    pub status: EntityStatus,
    pub version: i64,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    pub attributes: AttributeMap,
    pub relationship_attributes: AttributeMap,
    pub classifications: Vec<Classification>,
}

/// Per-call accumulator of entities reached through owned references
///
/// An entry is reserved (`None`) before the entity's attributes are mapped
/// and completed afterwards, so a cycle back to a guid finds the reservation
/// instead of recursing again.
#[derive(Debug, Clone, Default)]
pub struct ExtendedInfo {
    entries: IndexMap<String, Option<EntityDetail>>,
}

impl ExtendedInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, guid: &str) -> bool {
        self.entries.contains_key(guid)
    }

    /// A completed entry
    pub fn get(&self, guid: &str) -> Option<&EntityDetail> {
        self.entries.get(guid).and_then(Option::as_ref)
    }

    /// Reserve a guid. Returns false if it was already present.
    pub fn reserve(&mut self, guid: &str) -> bool {
        if self.entries.contains_key(guid) {
            return false;
        }
        self.entries.insert(guid.to_string(), None);
        true
    }

    pub fn complete(&mut self, entity: EntityDetail) {
        self.entries.insert(entity.guid.clone(), Some(entity));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Guids in the order they were first reached
    pub fn guids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Completed entries, dropping reservations
    pub fn into_entities(self) -> IndexMap<String, EntityDetail> {
        self.entries
            .into_iter()
            .filter_map(|(guid, entity)| entity.map(|e| (guid, e)))
            .collect()
    }
}

/// An entity together with the entities it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityWithExtInfo {
    pub entity: EntityDetail,
    pub referred_entities: IndexMap<String, EntityDetail>,
}

impl EntityWithExtInfo {
    /// Drop the main entity from the referred set
    pub fn compact(&mut self) {
        self.referred_entities.shift_remove(&self.entity.guid);
    }

    pub fn referred_entity(&self, guid: &str) -> Option<&EntityDetail> {
        self.referred_entities.get(guid)
    }
}

/// A batch of entities sharing one referred set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitiesWithExtInfo {
    pub entities: Vec<EntityDetail>,
    pub referred_entities: IndexMap<String, EntityDetail>,
}

impl EntitiesWithExtInfo {
    /// Drop every top-level entity from the referred set
    pub fn compact(&mut self) {
        for entity in &self.entities {
            self.referred_entities.shift_remove(&entity.guid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(guid: &str) -> EntityDetail {
        EntityDetail {
            guid: guid.to_string(),
            type_name: "Table".to_string(),
            status: EntityStatus::Active,
            version: 0,
            created_by: None,
            updated_by: None,
            create_time: None,
            update_time: None,
            attributes: AttributeMap::new(),
            relationship_attributes: AttributeMap::new(),
            classifications: Vec::new(),
        }
    }

    #[test]
    fn test_ext_info_reservation() {
        let mut ext = ExtendedInfo::new();
        assert!(ext.reserve("a"));
        assert!(!ext.reserve("a"));
        assert!(ext.contains("a"));
        assert!(ext.get("a").is_none());

        ext.complete(detail("a"));
        assert_eq!(ext.get("a").map(|e| e.guid.as_str()), Some("a"));
        assert_eq!(ext.len(), 1);
    }

    #[test]
    fn test_into_entities_drops_reservations() {
        let mut ext = ExtendedInfo::new();
        ext.reserve("a");
        ext.complete(detail("b"));

        let entities = ext.into_entities();
        assert_eq!(entities.keys().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_compact() {
        let mut single = EntityWithExtInfo {
            entity: detail("a"),
            referred_entities: [("a".to_string(), detail("a")), ("b".to_string(), detail("b"))]
                .into_iter()
                .collect(),
        };
        single.compact();
        assert_eq!(single.referred_entities.len(), 1);
        assert!(single.referred_entity("b").is_some());

        let mut batch = EntitiesWithExtInfo {
            entities: vec![detail("a"), detail("b")],
            referred_entities: [("b".to_string(), detail("b")), ("c".to_string(), detail("c"))]
                .into_iter()
                .collect(),
        };
        batch.compact();
        assert_eq!(batch.referred_entities.keys().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn test_status_from_state() {
        assert_eq!(EntityStatus::from_state(Some("DELETED")), EntityStatus::Deleted);
        assert_eq!(EntityStatus::from_state(Some("ACTIVE")), EntityStatus::Active);
        assert_eq!(EntityStatus::from_state(None), EntityStatus::Active);
    }
}
