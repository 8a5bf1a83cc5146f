//! Logical box name -> renderer-generated SVG group id.
//!
//! Graphviz numbers node groups `node1..nodeK` in declaration order, so the mapping is derived
//! from the emitted graph rather than recomputed from a table.

use crate::dot::Graph;
use crate::layout::BoxId;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeIdEntry {
    #[serde(skip)]
    pub box_id: BoxId,
    pub svg_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NodeIdMap(IndexMap<String, NodeIdEntry>);

impl NodeIdMap {
    pub fn from_graph(graph: &Graph) -> Self {
        let mut map = IndexMap::new();
        for (idx, id) in graph.node_order().into_iter().enumerate() {
            let Some(box_id) = BoxId::from_node_id(id) else {
                tracing::warn!(node = id, "node without a box identity");
                continue;
            };
            map.insert(
                box_id.logical_name(),
                NodeIdEntry {
                    box_id,
                    svg_id: format!("node{}", idx + 1),
                },
            );
        }
        Self(map)
    }

    pub fn svg_id(&self, logical_name: &str) -> Option<&str> {
        self.0.get(logical_name).map(|e| e.svg_id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeIdEntry)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
