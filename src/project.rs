// src/project.rs

//! Prunes a node table down to the nodes a [`ChoiceMap`] selects.
//!
//! The table being pruned usually comes from a different producer than the
//! one the choices were validated against; the two are correlated only by
//! their dotted-id keys. Choices naming nodes the table lacks are dropped.

use std::path::Path;

use log::{debug, info};
use serde_json::Value;

use crate::artifact;
use crate::choices::ChoiceMap;
use crate::document::{GraphView, NodeTable};
use crate::error::Result;

/// Result of [`project`].
#[derive(Debug, Clone)]
pub struct Projection<N> {
    pub nodes: NodeTable<N>,
    /// Choices whose node was absent from the source table.
    pub dropped: Vec<String>,
}

/// Keeps exactly the entries of `source` whose key is one of the chosen
/// nodes, in `source` order.
pub fn project<N: Clone>(choices: &ChoiceMap, source: &NodeTable<N>) -> Projection<N> {
    let chosen = choices.chosen_nodes();
    let nodes: NodeTable<N> = source
        .iter()
        .filter(|(key, _)| chosen.contains(key.as_str()))
        .map(|(key, node)| (key.clone(), node.clone()))
        .collect();

    // Choice order, so the report is stable.
    let dropped: Vec<String> = choices
        .choices
        .values()
        .filter(|node| !source.contains_key(node.as_str()))
        .cloned()
        .collect();
    if !dropped.is_empty() {
        debug!(
            "{} chosen nodes not present in the source table: {:?}",
            dropped.len(),
            dropped
        );
    }

    Projection { nodes, dropped }
}

/// Overwrites the `root_eclasses` of the document at `target` with `roots`,
/// leaving every other key as it was. Applying it twice with the same roots
/// changes nothing.
pub fn inject_roots(target: &Path, roots: &[Value]) -> Result<()> {
    let mut document: serde_json::Map<String, Value> = artifact::read_json(target)?;
    document.insert("root_eclasses".to_string(), Value::Array(roots.to_vec()));
    artifact::write_json(target, &document)?;
    info!(
        "Injected {} root eclasses into {}",
        roots.len(),
        target.display()
    );
    Ok(())
}

/// Attaches `roots` to an in-memory view, for callers that have not written
/// it yet.
pub fn with_roots<N>(mut view: GraphView<N>, roots: &[Value]) -> GraphView<N> {
    view.root_eclasses = Some(roots.to_vec());
    view
}
