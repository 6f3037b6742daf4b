//! In-memory type registry

use super::{
    match_relationship_end, AttributeDef, ClassificationTypeDef, EntityTypeDef, EnumTypeDef,
    RelationshipTypeDef, StructTypeDef, TypeDef, TypeOracle,
};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::debug;

/// Registered type definitions
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDef>,

    /// Explicit (entity type, attribute, relationship type) bindings on top
    /// of the ones derived from relationship ends
    relationship_bindings: Vec<(String, String, String)>,
}

fn qualify(type_name: &str, attributes: &mut [AttributeDef]) {
    for attribute in attributes {
        if attribute.qualified_name.is_empty() {
            attribute.qualified_name = format!("{}.{}", type_name, attribute.name);
        }
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_enum(&mut self, def: EnumTypeDef) {
        self.insert(TypeDef::Enum(def));
    }

    pub fn register_struct(&mut self, mut def: StructTypeDef) {
        qualify(&def.name, &mut def.attributes);
        self.insert(TypeDef::Struct(def));
    }

    pub fn register_entity(&mut self, mut def: EntityTypeDef) {
        qualify(&def.name, &mut def.attributes);
        self.insert(TypeDef::Entity(def));
    }

    pub fn register_classification(&mut self, mut def: ClassificationTypeDef) {
        qualify(&def.name, &mut def.attributes);
        self.insert(TypeDef::Classification(def));
    }

    pub fn register_relationship(&mut self, mut def: RelationshipTypeDef) {
        qualify(&def.name, &mut def.attributes);
        self.insert(TypeDef::Relationship(def));
    }

    /// Bind a relationship attribute to a relationship type regardless of the
    /// type's end definitions
    pub fn bind_relationship_attribute(
        &mut self,
        entity_type: impl Into<String>,
        attribute: impl Into<String>,
        relationship_type: impl Into<String>,
    ) {
        self.relationship_bindings
            .push((entity_type.into(), attribute.into(), relationship_type.into()));
    }

    /// Remove a type. Instances of it stay in the graph.
    pub fn unregister(&mut self, name: &str) -> Option<TypeDef> {
        self.types.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn insert(&mut self, def: TypeDef) {
        debug!("Registering type {}", def.name());
        self.types.insert(def.name().to_string(), def);
    }

    fn super_types(&self, name: &str) -> &[String] {
        match self.types.get(name) {
            Some(TypeDef::Entity(def)) => &def.super_types,
            Some(TypeDef::Classification(def)) => &def.super_types,
            _ => &[],
        }
    }

    fn own_attributes(&self, name: &str) -> Option<&[AttributeDef]> {
        match self.types.get(name)? {
            TypeDef::Struct(def) => Some(&def.attributes),
            TypeDef::Entity(def) => Some(&def.attributes),
            TypeDef::Classification(def) => Some(&def.attributes),
            TypeDef::Relationship(def) => Some(&def.attributes),
            TypeDef::Enum(_) => None,
        }
    }

    /// Supertype attributes depth-first, then the type's own
    fn collect_attributes<'a>(
        &'a self,
        name: &str,
        visited: &mut FxHashSet<String>,
        out: &mut Vec<&'a AttributeDef>,
    ) {
        if !visited.insert(name.to_string()) {
            return;
        }
        for super_type in self.super_types(name) {
            self.collect_attributes(super_type, visited, out);
        }
        for attribute in self.own_attributes(name).unwrap_or_default() {
            if !out.iter().any(|a| a.name == attribute.name) {
                out.push(attribute);
            }
        }
    }

    fn relationship_defs(&self) -> impl Iterator<Item = &RelationshipTypeDef> {
        self.types.values().filter_map(TypeDef::as_relationship)
    }
}

impl TypeOracle for TypeRegistry {
    fn resolve_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    fn all_attributes(&self, type_name: &str) -> Option<Vec<&AttributeDef>> {
        self.own_attributes(type_name)?;
        let mut visited = FxHashSet::default();
        let mut out = Vec::new();
        self.collect_attributes(type_name, &mut visited, &mut out);
        Some(out)
    }

    fn is_type_or_supertype_of(&self, candidate: &str, actual: &str) -> bool {
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut queue = VecDeque::new();
        queue.push_back(actual);

        while let Some(current) = queue.pop_front() {
            if current == candidate {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            for super_type in self.super_types(current) {
                queue.push_back(super_type.as_str());
            }
        }
        false
    }

    fn relationship_attribute_names(&self, entity_type: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for def in self.relationship_defs() {
            for end in [&def.end1, &def.end2] {
                if self.is_type_or_supertype_of(&end.type_name, entity_type) && !names.contains(&end.name) {
                    names.push(end.name.clone());
                }
            }
        }
        for (bound_type, attribute, _) in &self.relationship_bindings {
            if self.is_type_or_supertype_of(bound_type, entity_type) && !names.contains(attribute) {
                names.push(attribute.clone());
            }
        }
        names
    }

    fn relationship_defs_for(&self, entity_type: &str, attribute: &str) -> Vec<&RelationshipTypeDef> {
        let mut defs: Vec<&RelationshipTypeDef> = self
            .relationship_defs()
            .filter(|def| match_relationship_end(self, def, entity_type, attribute).is_some())
            .collect();

        for (bound_type, bound_attribute, relationship_type) in &self.relationship_bindings {
            if bound_attribute != attribute || !self.is_type_or_supertype_of(bound_type, entity_type) {
                continue;
            }
            if let Some(def) = self.types.get(relationship_type).and_then(TypeDef::as_relationship) {
                if !defs.iter().any(|d| d.name == def.name) {
                    defs.push(def);
                }
            }
        }
        defs
    }

    fn can_apply_classification(&self, classification_type: &str, entity_type: &str) -> bool {
        // Nearest declared restriction up the supertype chain
        let mut queue = VecDeque::new();
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        queue.push_back(classification_type);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let Some(TypeDef::Classification(def)) = self.types.get(current) else {
                continue;
            };
            if !def.entity_types.is_empty() {
                return def
                    .entity_types
                    .iter()
                    .any(|allowed| self.is_type_or_supertype_of(allowed, entity_type));
            }
            for super_type in &def.super_types {
                queue.push_back(super_type.as_str());
            }
        }
        true
    }
}
