//! Labeled property graph primitives
//!
//! This module provides:
//! - Vertices and directed, labeled edges carrying untyped properties
//! - The [`GraphAccessor`] / [`GraphMutator`] traits the engine is written against
//! - An in-memory [`GraphStore`] with adjacency lists, a label index and a guid index
//! - The storage conventions in [`keys`] and the [`InstanceWriter`] fixture API

pub mod accessor;
pub mod edge;
pub mod keys;
pub mod property;
pub mod store;
pub mod types;
pub mod vertex;
pub mod writer;

// Re-export main types
pub use accessor::{Direction, GraphAccessor, GraphMutator, PropertyContainer};
pub use edge::Edge;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{EdgeId, EdgeLabel, ElementId, VertexId};
pub use vertex::Vertex;
pub use writer::InstanceWriter;
