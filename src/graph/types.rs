//! Identifiers and labels of the property graph
//!
//! Ids are arena slots in [`GraphStore`](super::GraphStore); slot 0 is never
//! handed out.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(id: u64) -> Self {
                $name(id)
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

arena_id!(VertexId, "v");
arena_id!(EdgeId, "e");

/// A vertex or an edge, for errors that can point at either
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementId {
    Vertex(VertexId),
    Edge(EdgeId),
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Vertex(id) => id.fmt(f),
            ElementId::Edge(id) => id.fmt(f),
        }
    }
}

impl From<VertexId> for ElementId {
    fn from(id: VertexId) -> Self {
        ElementId::Vertex(id)
    }
}

impl From<EdgeId> for ElementId {
    fn from(id: EdgeId) -> Self {
        ElementId::Edge(id)
    }
}

/// `__<qualifiedName>`, `r:<relationshipType>` or `classifiedAs`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeLabel(String);

impl EdgeLabel {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EdgeLabel {
    fn from(label: &str) -> Self {
        EdgeLabel(label.to_string())
    }
}

impl From<String> for EdgeLabel {
    fn from(label: String) -> Self {
        EdgeLabel(label)
    }
}
