//! Metagraph
//!
//! Typed entity materialization and classification propagation over a
//! labeled property graph.
//!
//! # Architecture
//!
//! - [`graph`]: the property graph, its storage conventions and the narrow
//!   [`GraphAccessor`] / [`GraphMutator`] seam the engine works through
//! - [`typesys`]: type definitions and the [`TypeOracle`] the engine
//!   consults to interpret stored properties
//! - [`model`]: the domain objects handed to callers (entities, headers,
//!   relationships, classifications, object ids)
//! - [`retriever`]: read side, vertices and edges to domain objects
//! - [`propagation`]: write side, keeps propagated classification edges in
//!   step with relationship changes
//!
//! ## Example Usage
//!
//! ```rust
//! use metagraph::graph::{GraphStore, InstanceWriter};
//! use metagraph::model::PropagateTags;
//! use metagraph::typesys::{AttributeDef, ClassificationTypeDef, EntityTypeDef, PrimitiveKind, TypeRegistry};
//! use metagraph::{ClassificationPropagator, EntityRetriever};
//!
//! let mut types = TypeRegistry::new();
//! types.register_entity(
//!     EntityTypeDef::new("Table")
//!         .with_attribute(AttributeDef::primitive("name", PrimitiveKind::String)),
//! );
//! types.register_classification(ClassificationTypeDef::new("PII"));
//!
//! let mut store = GraphStore::new();
//! let mut writer = InstanceWriter::new(&mut store);
//! let raw = writer.create_entity_with_guid("Table", "t-raw").unwrap();
//! let clean = writer.create_entity_with_guid("Table", "t-clean").unwrap();
//! writer.set_attribute(raw, "Table.name", "raw_orders").unwrap();
//! writer.add_classification(raw, "PII", true).unwrap();
//! let lineage = writer.add_relationship("Lineage", raw, clean, PropagateTags::OneToTwo).unwrap();
//!
//! let propagator = ClassificationPropagator::new(&types);
//! propagator
//!     .on_relationship_added(&mut store, lineage, PropagateTags::OneToTwo)
//!     .unwrap();
//!
//! let retriever = EntityRetriever::new(&store, &types);
//! let header = retriever.to_entity_header_by_guid("t-clean").unwrap();
//! assert_eq!(header.classification_names, vec!["PII"]);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod propagation;
pub mod retriever;
pub mod typesys;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigResult, MaterializationConfig, PropagationConfig, RepositoryConfig};

pub use error::{RepositoryError, RepositoryResult};

pub use graph::{
    Direction, EdgeId, ElementId, GraphAccessor, GraphError, GraphMutator, GraphResult, GraphStore,
    InstanceWriter, PropertyMap, PropertyValue, VertexId,
};

pub use model::{
    Classification, EntitiesWithExtInfo, EntityDetail, EntityHeader, EntityStatus, EntityWithExtInfo,
    ExtendedInfo, ObjectId, PropagateTags, RelatedObjectId, Relationship, TypedValue,
};

pub use propagation::{ClassificationPropagator, PropagationReport};

pub use retriever::EntityRetriever;

pub use typesys::{TypeOracle, TypeRegistry};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
