//! The narrow graph interface consumed by the retriever and the propagator
//!
//! The engine never reaches into a concrete store: everything it reads goes
//! through [`GraphAccessor`] and everything it writes goes through
//! [`GraphMutator`]. [`GraphStore`](super::GraphStore) is the in-memory
//! implementation.

use super::edge::Edge;
use super::keys;
use super::property::{PropertyMap, PropertyValue};
use super::store::GraphResult;
use super::types::{EdgeId, ElementId, VertexId};
use super::vertex::Vertex;
use serde::{Deserialize, Serialize};

/// Edge direction relative to a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Edges whose target is the vertex
    In,
    /// Edges whose source is the vertex
    Out,
    Both,
}

/// Generic property access shared by vertices and edges
pub trait PropertyContainer {
    fn element_id(&self) -> ElementId;

    fn property(&self, key: &str) -> Option<&PropertyValue>;

    /// A property that is set and not null
    fn value(&self, key: &str) -> Option<&PropertyValue> {
        self.property(key).filter(|v| !v.is_null())
    }

    fn string_property(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(PropertyValue::as_string)
    }

    fn list_property(&self, key: &str) -> Option<&[PropertyValue]> {
        self.property(key).and_then(PropertyValue::as_list)
    }
}

impl PropertyContainer for Vertex {
    fn element_id(&self) -> ElementId {
        ElementId::Vertex(self.id)
    }

    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.get_property(key)
    }
}

impl PropertyContainer for Edge {
    fn element_id(&self) -> ElementId {
        ElementId::Edge(self.id)
    }

    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.get_property(key)
    }
}

/// Read access to a labeled property graph
pub trait GraphAccessor {
    fn vertex(&self, id: VertexId) -> Option<&Vertex>;

    fn edge(&self, id: EdgeId) -> Option<&Edge>;

    /// Edges of `vertex` carrying `label`, in storage order. `Both` yields
    /// outgoing edges before incoming ones.
    fn edges_by_label(&self, vertex: VertexId, label: &str, direction: Direction) -> Vec<&Edge>;

    /// All edges touching `vertex`, outgoing first
    fn incident_edges(&self, vertex: VertexId) -> Vec<&Edge>;

    fn find_vertex_by_guid(&self, guid: &str) -> Option<VertexId>;

    fn find_vertices_by_property(&self, key: &str, value: &PropertyValue) -> Vec<VertexId>;

    /// The single edge backing an attribute. Prefers an edge that is not in
    /// the `DELETED` state, falling back to the first edge found.
    fn edge_for_label(&self, vertex: VertexId, label: &str, direction: Direction) -> Option<&Edge> {
        let edges = self.edges_by_label(vertex, label, direction);
        let active = edges
            .iter()
            .copied()
            .find(|e| e.string_property(keys::STATE) != Some("DELETED"));
        active.or_else(|| edges.first().copied())
    }
}

/// Write access. Every call is a single atomic graph mutation.
pub trait GraphMutator: GraphAccessor {
    fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        label: &str,
        properties: PropertyMap,
    ) -> GraphResult<EdgeId>;

    fn remove_edge(&mut self, id: EdgeId) -> GraphResult<Edge>;

    fn set_vertex_property(&mut self, id: VertexId, key: &str, value: PropertyValue) -> GraphResult<()>;

    fn remove_vertex_property(&mut self, id: VertexId, key: &str) -> GraphResult<Option<PropertyValue>>;
}
