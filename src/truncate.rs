// src/truncate.rs

//! Collapses a pruned node table to eclass granularity.
//!
//! After projection at most one node per eclass should remain, so each key and
//! each child reference can be reduced to its eclass component. The result is
//! the DAG view the synthesis tool reads back in.

use log::warn;

use crate::document::{DottedNode, GraphView, NodeTable};
use crate::ids;

/// Reduces every key and child of `nodes` to the text before its first `.`.
///
/// When two keys reduce to the same eclass the later one replaces the
/// earlier one's node, and the entry keeps the position of the first.
pub fn truncate(nodes: NodeTable<DottedNode>) -> NodeTable<DottedNode> {
    let mut collapsed = NodeTable::with_capacity(nodes.len());
    for (key, mut node) in nodes {
        let eclass = ids::eclass_prefix(&key).to_string();
        node.children = node
            .children
            .iter()
            .map(|child| ids::eclass_prefix(child).to_string())
            .collect();
        if collapsed.insert(eclass.clone(), node).is_some() {
            warn!("Node {} collapses onto eclass {} already present", key, eclass);
        }
    }
    collapsed
}

/// [`truncate`] applied to a whole view; roots pass through unchanged.
pub fn truncate_view(view: GraphView<DottedNode>) -> GraphView<DottedNode> {
    GraphView {
        nodes: truncate(view.nodes),
        root_eclasses: view.root_eclasses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn nodes(value: Value) -> NodeTable<DottedNode> {
        serde_json::from_value(value).unwrap()
    }

    #[test_log::test]
    fn test_keys_and_children_collapse() {
        let out = truncate(nodes(json!({
            "3.1": {"children": ["4.0", "5.2"]}
        })));
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({"3": {"children": ["4", "5"]}})
        );
    }

    #[test_log::test]
    fn test_attributes_are_kept() {
        let out = truncate(nodes(json!({
            "3.1": {"op": "xor", "cost": 1, "eclass": "3", "children": []}
        })));
        assert_eq!(out["3"].attrs["op"], json!("xor"));
        assert_eq!(out["3"].attrs["eclass"], json!("3"));
    }

    #[test_log::test]
    fn test_collision_last_write_wins() {
        let out = truncate(nodes(json!({
            "3.0": {"op": "first", "children": []},
            "4.0": {"op": "other", "children": []},
            "3.1": {"op": "second", "children": ["4.0"]}
        })));
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["3", "4"]);
        assert_eq!(out["3"].attrs["op"], json!("second"));
        assert_eq!(out["3"].children, vec!["4".to_string()]);
    }

    #[test_log::test]
    fn test_undotted_ids_pass_through() {
        let out = truncate(nodes(json!({"7": {"children": ["2"]}})));
        assert_eq!(out["7"].children, vec!["2".to_string()]);
    }

    #[test_log::test]
    fn test_view_keeps_roots() {
        let view = GraphView {
            nodes: nodes(json!({"1.0": {"children": ["0.0"]}, "0.0": {"children": []}})),
            root_eclasses: Some(vec![json!("1")]),
        };
        let out = truncate_view(view);
        assert_eq!(out.root_eclasses, Some(vec![json!("1")]));
        assert_eq!(out.nodes["1"].children, vec!["0".to_string()]);
    }
}
