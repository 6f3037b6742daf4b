//! In-memory graph storage implementation
//!
//! Arena-backed vertex and edge storage with adjacency lists and a guid
//! index. This is the reference [`GraphAccessor`] /
//! [`GraphMutator`] implementation.

use super::accessor::{Direction, GraphAccessor, GraphMutator};
use super::edge::Edge;
use super::keys;
use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeId, EdgeLabel, VertexId};
use super::vertex::Vertex;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Vertex {0} not found")]
    VertexNotFound(VertexId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Invalid edge: source vertex {0} does not exist")]
    InvalidEdgeSource(VertexId),

    #[error("Invalid edge: target vertex {0} does not exist")]
    InvalidEdgeTarget(VertexId),

    #[error("Guid {guid} already assigned to vertex {owner}")]
    DuplicateGuid { guid: String, owner: VertexId },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// In-memory graph storage
///
/// - vertices: VertexId -> Vertex (arena slot, `None` once deleted)
/// - edges: EdgeId -> Edge
/// - outgoing / incoming: VertexId -> Vec<EdgeId>, in insertion order
/// - guid_index: guid -> VertexId
#[derive(Debug, Default)]
pub struct GraphStore {
    vertices: Vec<Option<Vertex>>,

    edges: Vec<Option<Edge>>,

    outgoing: Vec<Vec<EdgeId>>,

    incoming: Vec<Vec<EdgeId>>,

    /// Free vertex IDs for reuse
    free_vertex_ids: Vec<u64>,

    /// Free edge IDs for reuse
    free_edge_ids: Vec<u64>,

    guid_index: FxHashMap<String, VertexId>,

    vertex_count: usize,

    edge_count: usize,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        GraphStore {
            vertices: Vec::with_capacity(1024),
            edges: Vec::with_capacity(4096),
            outgoing: Vec::with_capacity(1024),
            incoming: Vec::with_capacity(1024),
            ..Default::default()
        }
    }

    /// Create a vertex without properties
    pub fn create_vertex(&mut self) -> VertexId {
        let id = self.allocate_vertex_id();
        self.vertices[id.index()] = Some(Vertex::new(id));
        self.vertex_count += 1;
        id
    }

    /// Create a vertex with properties. A `__guid` property is indexed.
    pub fn create_vertex_with_properties(&mut self, properties: PropertyMap) -> GraphResult<VertexId> {
        if let Some(guid) = properties.get(keys::GUID).and_then(PropertyValue::as_string) {
            if let Some(owner) = self.guid_index.get(guid) {
                return Err(GraphError::DuplicateGuid {
                    guid: guid.to_string(),
                    owner: *owner,
                });
            }
        }

        let id = self.allocate_vertex_id();
        if let Some(guid) = properties.get(keys::GUID).and_then(PropertyValue::as_string) {
            self.guid_index.insert(guid.to_string(), id);
        }
        self.vertices[id.index()] = Some(Vertex::new_with_properties(id, properties));
        self.vertex_count += 1;
        Ok(id)
    }

    fn allocate_vertex_id(&mut self) -> VertexId {
        let raw = match self.free_vertex_ids.pop() {
            Some(id) => id,
            // Slot 0 is never used so ids start at 1
            None => self.vertices.len().max(1) as u64,
        };
        let idx = raw as usize;
        if idx >= self.vertices.len() {
            self.vertices.resize_with(idx + 1, || None);
            self.outgoing.resize_with(idx + 1, Vec::new);
            self.incoming.resize_with(idx + 1, Vec::new);
        }
        VertexId::new(raw)
    }

    pub fn get_vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index()).and_then(Option::as_ref)
    }

    pub fn has_vertex(&self, id: VertexId) -> bool {
        self.get_vertex(id).is_some()
    }

    /// Set a vertex property, keeping the guid index in sync
    pub fn set_vertex_property(
        &mut self,
        id: VertexId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<()> {
        let key = key.into();
        let value = value.into();

        if key == keys::GUID {
            if let Some(guid) = value.as_string() {
                match self.guid_index.get(guid) {
                    Some(owner) if *owner != id => {
                        return Err(GraphError::DuplicateGuid {
                            guid: guid.to_string(),
                            owner: *owner,
                        });
                    }
                    _ => {}
                }
            }
        }

        let vertex = self
            .vertices
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(GraphError::VertexNotFound(id))?;

        let old = vertex.set_property(key.clone(), value.clone());

        if key == keys::GUID {
            if let Some(old_guid) = old.as_ref().and_then(PropertyValue::as_string) {
                self.guid_index.remove(old_guid);
            }
            if let Some(guid) = value.as_string() {
                self.guid_index.insert(guid.to_string(), id);
            }
        }
        Ok(())
    }

    pub fn remove_vertex_property(&mut self, id: VertexId, key: &str) -> GraphResult<Option<PropertyValue>> {
        let vertex = self
            .vertices
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(GraphError::VertexNotFound(id))?;

        let removed = vertex.remove_property(key);
        if key == keys::GUID {
            if let Some(guid) = removed.as_ref().and_then(PropertyValue::as_string) {
                self.guid_index.remove(guid);
            }
        }
        Ok(removed)
    }

    /// Delete a vertex and every edge touching it
    pub fn delete_vertex(&mut self, id: VertexId) -> GraphResult<Vertex> {
        if !self.has_vertex(id) {
            return Err(GraphError::VertexNotFound(id));
        }

        let idx = id.index();
        let mut touching: Vec<EdgeId> = self.outgoing[idx].clone();
        touching.extend(self.incoming[idx].iter().copied());
        for edge_id in touching {
            // Self-loops appear in both lists
            if self.has_edge(edge_id) {
                self.delete_edge(edge_id)?;
            }
        }

        let vertex = self.vertices[idx].take().ok_or(GraphError::VertexNotFound(id))?;
        if let Some(guid) = vertex.get_property(keys::GUID).and_then(PropertyValue::as_string) {
            self.guid_index.remove(guid);
        }
        self.free_vertex_ids.push(id.0);
        self.vertex_count -= 1;
        Ok(vertex)
    }

    /// Create an edge with auto-generated ID
    pub fn create_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        label: impl Into<EdgeLabel>,
    ) -> GraphResult<EdgeId> {
        self.create_edge_with_properties(source, target, label, PropertyMap::new())
    }

    /// Create an edge with properties
    pub fn create_edge_with_properties(
        &mut self,
        source: VertexId,
        target: VertexId,
        label: impl Into<EdgeLabel>,
        properties: PropertyMap,
    ) -> GraphResult<EdgeId> {
        if !self.has_vertex(source) {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if !self.has_vertex(target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        let raw = match self.free_edge_ids.pop() {
            Some(id) => id,
            None => self.edges.len().max(1) as u64,
        };
        let idx = raw as usize;
        if idx >= self.edges.len() {
            self.edges.resize_with(idx + 1, || None);
        }

        let edge_id = EdgeId::new(raw);
        self.outgoing[source.index()].push(edge_id);
        self.incoming[target.index()].push(edge_id);
        self.edges[idx] = Some(Edge::new_with_properties(edge_id, source, target, label, properties));
        self.edge_count += 1;

        Ok(edge_id)
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    pub fn has_edge(&self, id: EdgeId) -> bool {
        self.get_edge(id).is_some()
    }

    pub fn set_edge_property(
        &mut self,
        id: EdgeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<()> {
        let edge = self
            .edges
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(GraphError::EdgeNotFound(id))?;
        edge.set_property(key, value);
        Ok(())
    }

    /// Delete an edge
    pub fn delete_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self
            .edges
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(GraphError::EdgeNotFound(id))?;

        self.outgoing[edge.source.index()].retain(|e| *e != id);
        self.incoming[edge.target.index()].retain(|e| *e != id);

        self.free_edge_ids.push(id.0);
        self.edge_count -= 1;
        Ok(edge)
    }

    /// Get all outgoing edges from a vertex
    pub fn get_outgoing_edges(&self, id: VertexId) -> Vec<&Edge> {
        self.adjacent(&self.outgoing, id)
    }

    /// Get all incoming edges to a vertex
    pub fn get_incoming_edges(&self, id: VertexId) -> Vec<&Edge> {
        self.adjacent(&self.incoming, id)
    }

    fn adjacent<'a>(&'a self, lists: &'a [Vec<EdgeId>], id: VertexId) -> Vec<&'a Edge> {
        lists
            .get(id.index())
            .map(|ids| ids.iter().filter_map(|e| self.get_edge(*e)).collect())
            .unwrap_or_default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn all_vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter().filter_map(Option::as_ref)
    }
}

impl GraphAccessor for GraphStore {
    fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.get_vertex(id)
    }

    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.get_edge(id)
    }

    fn edges_by_label(&self, vertex: VertexId, label: &str, direction: Direction) -> Vec<&Edge> {
        let matches = |e: &&Edge| e.label.as_str() == label;
        match direction {
            Direction::Out => self.get_outgoing_edges(vertex).into_iter().filter(matches).collect(),
            Direction::In => self.get_incoming_edges(vertex).into_iter().filter(matches).collect(),
            Direction::Both => self
                .get_outgoing_edges(vertex)
                .into_iter()
                .chain(self.get_incoming_edges(vertex))
                .filter(matches)
                .collect(),
        }
    }

    fn incident_edges(&self, vertex: VertexId) -> Vec<&Edge> {
        let mut edges = self.get_outgoing_edges(vertex);
        edges.extend(self.get_incoming_edges(vertex));
        edges
    }

    fn find_vertex_by_guid(&self, guid: &str) -> Option<VertexId> {
        self.guid_index.get(guid).copied()
    }

    fn find_vertices_by_property(&self, key: &str, value: &PropertyValue) -> Vec<VertexId> {
        self.all_vertices()
            .filter(|v| v.get_property(key) == Some(value))
            .map(|v| v.id)
            .collect()
    }
}

impl GraphMutator for GraphStore {
    fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        label: &str,
        properties: PropertyMap,
    ) -> GraphResult<EdgeId> {
        self.create_edge_with_properties(source, target, label, properties)
    }

    fn remove_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        self.delete_edge(id)
    }

    fn set_vertex_property(&mut self, id: VertexId, key: &str, value: PropertyValue) -> GraphResult<()> {
        GraphStore::set_vertex_property(self, id, key, value)
    }

    fn remove_vertex_property(&mut self, id: VertexId, key: &str) -> GraphResult<Option<PropertyValue>> {
        GraphStore::remove_vertex_property(self, id, key)
    }
}
