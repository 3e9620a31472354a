//! Decoding of result rows into graph records

use hashbrown::HashMap;
use serde::Serialize;
use serde_json::{Map, Value};

use super::wire::{WireGraph, WireRecord};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    /// Labels, sorted; empty for a deleted node
    pub categories: Vec<String>,
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub data: Map<String, Value>,
}

/// One result row plus the graph entities it references
///
/// Nodes and edges are unique by id and keep the order in which the server
/// first listed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphRecord {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub rows: Vec<Value>,
}

impl GraphRecord {
    /// Decode one element of `results[0].data`
    pub fn decode(value: Value) -> Result<Self> {
        let record: WireRecord = serde_json::from_value(value).map_err(crate::error::decode)?;
        Ok(Self::from_wire(record))
    }

    #[must_use]
    pub fn from_wire(record: WireRecord) -> Self {
        let WireRecord { row, graph } = record;
        let WireGraph {
            nodes,
            relationships,
        } = graph;

        let mut decoded_nodes = Unique::with_capacity(nodes.len());
        for node in nodes {
            let mut categories = if node.deleted { Vec::new() } else { node.labels };
            categories.sort();
            decoded_nodes.insert(
                node.id.clone(),
                Node {
                    id: node.id,
                    categories,
                    data: node.properties,
                },
            );
        }

        let mut decoded_edges = Unique::with_capacity(relationships.len());
        for edge in relationships {
            decoded_edges.insert(
                edge.id.clone(),
                Edge {
                    id: edge.id,
                    source: edge.start_node,
                    target: edge.end_node,
                    edge_type: edge.rel_type,
                    data: edge.properties,
                },
            );
        }

        Self {
            nodes: decoded_nodes.into_vec(),
            edges: decoded_edges.into_vec(),
            rows: row,
        }
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }
}

/// Insertion-ordered map: a later entry with a known id replaces the value
/// but keeps the first position.
struct Unique<T> {
    index: HashMap<String, usize>,
    items: Vec<T>,
}

impl<T> Unique<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            items: Vec::with_capacity(capacity),
        }
    }

    fn insert(&mut self, id: String, item: T) {
        match self.index.get(&id) {
            Some(&position) => self.items[position] = item,
            None => {
                self.index.insert(id, self.items.len());
                self.items.push(item);
            }
        }
    }

    fn into_vec(self) -> Vec<T> {
        self.items
    }
}
