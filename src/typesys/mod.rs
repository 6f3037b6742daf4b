//! Type oracle
//!
//! Read-only answers about declared types: attribute lists, categories,
//! cardinalities, relationship ends and the supertype hierarchy. The engine
//! only depends on the [`TypeOracle`] trait; [`TypeRegistry`] is the
//! in-memory implementation.

pub mod registry;

pub use registry::TypeRegistry;

use crate::graph::{keys, Direction};
use crate::model::PropagateTags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primitive scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    Short,
    Int,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    Boolean,
    Byte,
    Date,
}

impl PrimitiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::BigInteger => "biginteger",
            PrimitiveKind::BigDecimal => "bigdecimal",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Date => "date",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrimitiveKind {
    type Err = String;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(PrimitiveKind::String),
            "short" => Ok(PrimitiveKind::Short),
            "int" => Ok(PrimitiveKind::Int),
            "long" => Ok(PrimitiveKind::Long),
            "float" => Ok(PrimitiveKind::Float),
            "double" => Ok(PrimitiveKind::Double),
            "biginteger" => Ok(PrimitiveKind::BigInteger),
            "bigdecimal" => Ok(PrimitiveKind::BigDecimal),
            "boolean" => Ok(PrimitiveKind::Boolean),
            "byte" => Ok(PrimitiveKind::Byte),
            "date" => Ok(PrimitiveKind::Date),
            other => Err(format!("unknown primitive type: {}", other)),
        }
    }
}

/// Attribute type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCategory {
    Primitive,
    Enum,
    Struct,
    ObjectReference,
    Array,
    Map,
    Classification,
}

/// Declared type of an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    Primitive(PrimitiveKind),
    Enum(String),
    Struct(String),
    /// Reference to an entity of the named type
    ObjectId(String),
    Array(Box<AttributeType>),
    /// Map with string keys
    Map(Box<AttributeType>),
    Classification(String),
}

impl AttributeType {
    pub fn array(element: AttributeType) -> Self {
        AttributeType::Array(Box::new(element))
    }

    pub fn map(value: AttributeType) -> Self {
        AttributeType::Map(Box::new(value))
    }

    pub fn category(&self) -> TypeCategory {
        match self {
            AttributeType::Primitive(_) => TypeCategory::Primitive,
            AttributeType::Enum(_) => TypeCategory::Enum,
            AttributeType::Struct(_) => TypeCategory::Struct,
            AttributeType::ObjectId(_) => TypeCategory::ObjectReference,
            AttributeType::Array(_) => TypeCategory::Array,
            AttributeType::Map(_) => TypeCategory::Map,
            AttributeType::Classification(_) => TypeCategory::Classification,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            AttributeType::Primitive(kind) => kind.name().to_string(),
            AttributeType::Enum(name)
            | AttributeType::Struct(name)
            | AttributeType::ObjectId(name)
            | AttributeType::Classification(name) => name.clone(),
            AttributeType::Array(element) => format!("array<{}>", element.type_name()),
            AttributeType::Map(value) => format!("map<string,{}>", value.type_name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    #[default]
    Single,
    List,
    Set,
}

/// An attribute of a struct, entity, classification or relationship type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    /// Property key the value is stored under: `<DefiningType>.<name>`.
    /// Filled in on registration when left empty.
    pub qualified_name: String,
    pub attr_type: AttributeType,
    pub cardinality: Cardinality,
    /// The referenced entity's content is part of the owner's view
    pub is_owned_ref: bool,
    pub is_unique: bool,
    pub is_optional: bool,
    /// Direction of the backing edge, seen from the owning vertex
    pub direction: Direction,
    /// Set for attributes derived from a relationship end
    pub relationship_type: Option<String>,
}

impl AttributeDef {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            qualified_name: String::new(),
            attr_type,
            cardinality: Cardinality::Single,
            is_owned_ref: false,
            is_unique: false,
            is_optional: true,
            direction: Direction::Out,
            relationship_type: None,
        }
    }

    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, AttributeType::Primitive(kind))
    }

    pub fn owned(mut self) -> Self {
        self.is_owned_ref = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self.is_optional = false;
        self
    }

    pub fn required(mut self) -> Self {
        self.is_optional = false;
        self
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn category(&self) -> TypeCategory {
        self.attr_type.category()
    }

    /// Label of the edge(s) backing this attribute
    pub fn edge_label(&self) -> String {
        match &self.relationship_type {
            Some(relationship) => keys::relationship_edge_label(relationship),
            None => keys::attribute_edge_label(&self.qualified_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumTypeDef {
    pub name: String,
    pub elements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructTypeDef {
    pub name: String,
    pub attributes: Vec<AttributeDef>,
}

impl StructTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeDef {
    pub name: String,
    pub super_types: Vec<String>,
    pub attributes: Vec<AttributeDef>,
}

impl EntityTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_types: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn with_super_type(mut self, super_type: impl Into<String>) -> Self {
        self.super_types.push(super_type.into());
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTypeDef {
    pub name: String,
    pub super_types: Vec<String>,
    /// Entity types the classification may be applied to; empty means any
    pub entity_types: Vec<String>,
    pub attributes: Vec<AttributeDef>,
}

impl ClassificationTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_types: Vec::new(),
            entity_types: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn with_super_type(mut self, super_type: impl Into<String>) -> Self {
        self.super_types.push(super_type.into());
        self
    }

    /// Restrict the classification to an entity type and its subtypes
    pub fn applicable_to(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_types.push(entity_type.into());
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// One end of a relationship type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEndDef {
    /// Entity type at this end
    pub type_name: String,
    /// Name of the relationship attribute this end adds to `type_name`
    pub name: String,
    pub cardinality: Cardinality,
}

impl RelationshipEndDef {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            cardinality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipTypeDef {
    pub name: String,
    pub end1: RelationshipEndDef,
    pub end2: RelationshipEndDef,
    pub attributes: Vec<AttributeDef>,
    /// Mode given to new instances
    pub propagate_tags: PropagateTags,
}

impl RelationshipTypeDef {
    pub fn new(name: impl Into<String>, end1: RelationshipEndDef, end2: RelationshipEndDef) -> Self {
        Self {
            name: name.into(),
            end1,
            end2,
            attributes: Vec::new(),
            propagate_tags: PropagateTags::OneToTwo,
        }
    }

    pub fn with_propagate_tags(mut self, propagate_tags: PropagateTags) -> Self {
        self.propagate_tags = propagate_tags;
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Any registered type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDef {
    Enum(EnumTypeDef),
    Struct(StructTypeDef),
    Entity(EntityTypeDef),
    Classification(ClassificationTypeDef),
    Relationship(RelationshipTypeDef),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Enum(def) => &def.name,
            TypeDef::Struct(def) => &def.name,
            TypeDef::Entity(def) => &def.name,
            TypeDef::Classification(def) => &def.name,
            TypeDef::Relationship(def) => &def.name,
        }
    }

    pub fn as_relationship(&self) -> Option<&RelationshipTypeDef> {
        match self {
            TypeDef::Relationship(def) => Some(def),
            _ => None,
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, TypeDef::Entity(_))
    }
}

/// Read-only type registry
pub trait TypeOracle {
    fn resolve_type(&self, name: &str) -> Option<&TypeDef>;

    /// Attributes of a struct, entity, classification or relationship type.
    /// Supertype attributes come first.
    fn all_attributes(&self, type_name: &str) -> Option<Vec<&AttributeDef>>;

    /// `candidate` is `actual` or one of its (transitive) supertypes
    fn is_type_or_supertype_of(&self, candidate: &str, actual: &str) -> bool;

    /// Names of the relationship attributes of an entity type
    fn relationship_attribute_names(&self, entity_type: &str) -> Vec<String>;

    /// Relationship types bound to a relationship attribute
    fn relationship_defs_for(&self, entity_type: &str, attribute: &str) -> Vec<&RelationshipTypeDef>;

    /// A classification type may be applied to an entity type
    fn can_apply_classification(&self, classification_type: &str, entity_type: &str) -> bool;

    fn resolve_attribute(&self, type_name: &str, attribute: &str) -> Option<&AttributeDef> {
        self.all_attributes(type_name)?
            .into_iter()
            .find(|a| a.name == attribute)
    }

    fn unique_attributes(&self, type_name: &str) -> Vec<&AttributeDef> {
        self.all_attributes(type_name)
            .unwrap_or_default()
            .into_iter()
            .filter(|a| a.is_unique)
            .collect()
    }
}

/// Find the end of `def` that declares `attribute` on `entity_type`.
///
/// An end matches when its type is `entity_type` or a supertype of it and its
/// name is `attribute`. end1's attribute follows outgoing edges, end2's
/// incoming ones, and an attribute matching both ends follows both.
pub fn match_relationship_end<'d, T: TypeOracle + ?Sized>(
    types: &T,
    def: &'d RelationshipTypeDef,
    entity_type: &str,
    attribute: &str,
) -> Option<(&'d RelationshipEndDef, Direction)> {
    let declares = |end: &RelationshipEndDef| {
        end.name == attribute && types.is_type_or_supertype_of(&end.type_name, entity_type)
    };

    match (declares(&def.end1), declares(&def.end2)) {
        (true, true) => Some((&def.end1, Direction::Both)),
        (true, false) => Some((&def.end1, Direction::Out)),
        (false, true) => Some((&def.end2, Direction::In)),
        (false, false) => None,
    }
}
