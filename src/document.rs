// src/document.rs

//! Serde model of the JSON artifacts that flow through the pipeline.
//!
//! - [`RawDocument`]: the e-graph dump as produced by the synthesis tool, with
//!   every numeric field spelled as a string.
//! - [`CanonicalDocument`]: the integer-typed form consumed by extraction tools.
//! - [`GraphView`]: a bare node table plus optional roots, used for pruned and
//!   collapsed results.
//!
//! Node tables are [`IndexMap`]s so that key order survives a read/write cycle
//! and every stage iterates nodes in document order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Node table keyed by the node's textual id.
pub type NodeTable<N> = IndexMap<String, N>;

/// A JSON scalar that may arrive either quoted or as a bare number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(Number),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => write!(f, "{s:?}"),
            Scalar::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Scalar::Number(n.into())
    }
}

// --- Raw (string-typed) e-graph ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub eclass: Scalar,
    #[serde(default)]
    pub children: Vec<String>,
    /// Operator label, cost and anything else the pipeline does not interpret.
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub nodes: NodeTable<RawNode>,
    #[serde(default)]
    pub root_eclasses: Vec<Scalar>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// --- Canonical (integer-typed) e-graph ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub eclass: u64,
    /// Eclass ids of the children; node indices are dropped.
    #[serde(default)]
    pub children: Vec<u64>,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDocument {
    pub nodes: NodeTable<CanonicalNode>,
    #[serde(default)]
    pub root_eclasses: Vec<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// --- Pruned / collapsed views ---

/// A node whose children are still textual references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DottedNode {
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

/// `{"nodes": {...}, "root_eclasses": [...]}` with roots optional.
///
/// Roots are carried verbatim since they are copied from whichever source
/// document the caller names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphView<N> {
    pub nodes: NodeTable<N>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_eclasses: Option<Vec<Value>>,
}

impl<N> GraphView<N> {
    pub fn new(nodes: NodeTable<N>) -> Self {
        GraphView {
            nodes,
            root_eclasses: None,
        }
    }
}

/// Source document for root-eclass injection. Everything but the roots is
/// ignored, so any of the artifacts above can serve.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RootSource {
    #[serde(default)]
    pub root_eclasses: Vec<Value>,
}

/// Existence check against a node table, independent of its node type.
pub trait NodeLookup {
    fn contains_node(&self, key: &str) -> bool;
}

impl<N> NodeLookup for NodeTable<N> {
    fn contains_node(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test_log::test]
    fn test_raw_document_keeps_passthrough_fields() {
        let doc: RawDocument = serde_json::from_value(json!({
            "nodes": {
                "1.0": {"op": "and", "cost": 1.0, "eclass": "1", "children": ["0.0"]},
                "0.0": {"op": "x", "eclass": 0, "children": []}
            },
            "root_eclasses": ["1"],
            "class_data": {}
        }))
        .unwrap();

        let keys: Vec<&str> = doc.nodes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["1.0", "0.0"], "document order is preserved");
        assert_eq!(doc.nodes["1.0"].attrs["op"], json!("and"));
        assert_eq!(doc.nodes["0.0"].eclass, Scalar::from(0u64));
        assert_eq!(doc.root_eclasses, vec![Scalar::from("1")]);
        assert!(doc.extra.contains_key("class_data"));
    }

    #[test_log::test]
    fn test_graph_view_omits_absent_roots() {
        let view: GraphView<DottedNode> = GraphView::new(NodeTable::new());
        let text = serde_json::to_string(&view).unwrap();
        assert_eq!(text, r#"{"nodes":{}}"#);
    }
}
