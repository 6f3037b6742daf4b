//! Reachability over propagation-carrying relationship edges
//!
//! Breadth-first from a start vertex. An edge is followed from its source to
//! its target when its mode lets classifications flow end1 -> end2, and from
//! target to source when they flow end2 -> end1.

use crate::config::PropagationConfig;
use crate::graph::{keys, Edge, GraphAccessor, PropertyContainer, VertexId};
use crate::model::PropagateTags;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraversalError {
    #[error("traversal from {start} exceeded {limit} vertices")]
    BudgetExceeded { start: VertexId, limit: usize },
}

pub type TraversalResult<T> = Result<T, TraversalError>;

/// Propagation mode stored on a relationship edge; `None` for edges that are
/// not relationships
pub fn propagation_mode(edge: &Edge) -> Option<PropagateTags> {
    edge.string_property(keys::RELATIONSHIP_GUID)?;
    let mode = edge.string_property(keys::PROPAGATE_TAGS).unwrap_or("NONE");
    match mode.parse() {
        Ok(mode) => Some(mode),
        Err(reason) => {
            debug!("Edge {} has {}, treated as NONE", edge.id, reason);
            Some(PropagateTags::None)
        }
    }
}

/// Vertices a classification on the far side of `start` flows to, `start`
/// included, in breadth-first order. Relationship edges whose guid equals
/// `excluded_relationship` are not crossed.
pub fn impacted_vertices<G: GraphAccessor + ?Sized>(
    graph: &G,
    start: VertexId,
    excluded_relationship: Option<&str>,
    config: &PropagationConfig,
) -> TraversalResult<Vec<VertexId>> {
    walk(graph, start, excluded_relationship, config, Flow::Downstream)
}

/// Vertices whose classifications flow to `start`, `start` included, in
/// breadth-first order. The reverse of [`impacted_vertices`].
pub fn referring_vertices<G: GraphAccessor + ?Sized>(
    graph: &G,
    start: VertexId,
    excluded_relationship: Option<&str>,
    config: &PropagationConfig,
) -> TraversalResult<Vec<VertexId>> {
    walk(graph, start, excluded_relationship, config, Flow::Upstream)
}

#[derive(Clone, Copy)]
enum Flow {
    Downstream,
    Upstream,
}

fn walk<G: GraphAccessor + ?Sized>(
    graph: &G,
    start: VertexId,
    excluded_relationship: Option<&str>,
    config: &PropagationConfig,
    flow: Flow,
) -> TraversalResult<Vec<VertexId>> {
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();
    let mut order = Vec::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        order.push(current);

        for edge in graph.incident_edges(current) {
            let Some(mode) = propagation_mode(edge) else {
                continue;
            };
            if excluded_relationship.is_some() && edge.string_property(keys::RELATIONSHIP_GUID) == excluded_relationship
            {
                continue;
            }
            if config.skip_deleted_relationships && edge.string_property(keys::STATE) == Some("DELETED") {
                continue;
            }

            let (forward, backward) = match flow {
                Flow::Downstream => (mode.flows_end1_to_end2(), mode.flows_end2_to_end1()),
                Flow::Upstream => (mode.flows_end2_to_end1(), mode.flows_end1_to_end2()),
            };
            let mut next = Vec::with_capacity(2);
            if edge.source == current && forward {
                next.push(edge.target);
            }
            if edge.target == current && backward {
                next.push(edge.source);
            }

            for neighbor in next {
                if visited.insert(neighbor) {
                    if let Some(limit) = config.max_traversal_vertices {
                        if visited.len() > limit {
                            return Err(TraversalError::BudgetExceeded { start, limit });
                        }
                    }
                    queue.push_back(neighbor);
                }
            }
        }
    }

    Ok(order)
}
