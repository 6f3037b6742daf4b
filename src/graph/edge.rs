//! Edges of the property graph
//!
//! An edge goes FROM its source ("out" vertex, relationship end1) TO its
//! target ("in" vertex, relationship end2).

use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeId, EdgeLabel, VertexId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,

    pub source: VertexId,

    pub target: VertexId,

    /// Attribute (`__<qualifiedName>`), relationship (`r:<type>`) or
    /// classification label
    pub label: EdgeLabel,

    pub properties: PropertyMap,
}

impl Edge {
    pub fn new_with_properties(
        id: EdgeId,
        source: VertexId,
        target: VertexId,
        label: impl Into<EdgeLabel>,
        properties: PropertyMap,
    ) -> Self {
        Edge {
            id,
            source,
            target,
            label: label.into(),
            properties,
        }
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// The endpoint opposite to `vertex`, or `None` if the edge does not touch it
    pub fn other_end(&self, vertex: VertexId) -> Option<VertexId> {
        if self.source == vertex {
            Some(self.target)
        } else if self.target == vertex {
            Some(self.source)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineage(id: u64, source: u64, target: u64) -> Edge {
        Edge::new_with_properties(
            EdgeId::new(id),
            VertexId::new(source),
            VertexId::new(target),
            "r:Lineage",
            PropertyMap::new(),
        )
    }

    #[test]
    fn test_edge_properties() {
        let mut edge = lineage(3, 1, 2);

        edge.set_property("Lineage.confidence", 0.95);
        edge.set_property("Lineage.verified", true);

        assert_eq!(edge.get_property("Lineage.confidence").and_then(PropertyValue::as_float), Some(0.95));
        assert_eq!(edge.get_property("Lineage.verified").and_then(PropertyValue::as_boolean), Some(true));
        assert!(edge.get_property("Lineage.missing").is_none());
        assert_eq!(edge.label.as_str(), "r:Lineage");
    }

    #[test]
    fn test_other_end() {
        let edge = lineage(5, 10, 20);

        assert_eq!(edge.other_end(VertexId::new(10)), Some(VertexId::new(20)));
        assert_eq!(edge.other_end(VertexId::new(20)), Some(VertexId::new(10)));
        assert_eq!(edge.other_end(VertexId::new(30)), None);
    }
}
