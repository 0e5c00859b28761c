// src/canonicalize.rs

//! Converts a raw e-graph dump into its integer-typed canonical form.
//!
//! Node keys are kept exactly as they appear in the input so that later
//! stages can still correlate this table with other tables keyed by the same
//! dotted strings. Everything else that names an eclass becomes an integer:
//! the `eclass` field, each child reference (reduced to its eclass), and every
//! root. Any grammar violation aborts the whole document.

use log::{debug, warn};

use crate::document::{CanonicalDocument, CanonicalNode, NodeTable, RawDocument, RawNode, Scalar};
use crate::error::{Error, Result};
use crate::ids;

/// Canonicalizes `raw`, consuming it. No partial document is produced on
/// error.
pub fn canonicalize(raw: RawDocument) -> Result<CanonicalDocument> {
    let RawDocument {
        nodes,
        root_eclasses,
        extra,
    } = raw;

    let mut canonical = NodeTable::with_capacity(nodes.len());
    for (key, node) in nodes {
        let node = canonicalize_node(&key, node)?;
        canonical.insert(key, node);
    }

    let root_eclasses = root_eclasses
        .iter()
        .map(parse_root)
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Canonicalized {} nodes with {} root eclasses",
        canonical.len(),
        root_eclasses.len()
    );

    Ok(CanonicalDocument {
        nodes: canonical,
        root_eclasses,
        extra,
    })
}

fn canonicalize_node(key: &str, node: RawNode) -> Result<CanonicalNode> {
    let own_id = ids::parse(key)?;

    let children = node
        .children
        .iter()
        .map(|child| {
            ids::parse(child)
                .map(|child_id| child_id.eclass)
                .map_err(|_| Error::MalformedChild {
                    node: key.to_string(),
                    child: child.clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let eclass = parse_scalar(&node.eclass).ok_or_else(|| Error::MalformedEclass {
        node: key.to_string(),
        value: node.eclass.to_string(),
    })?;
    if eclass != own_id.eclass {
        warn!(
            "Node {} declares eclass {} but its id names eclass {}",
            key, eclass, own_id.eclass
        );
    }

    Ok(CanonicalNode {
        id: node.id.map(|_| ids::format(own_id)),
        eclass,
        children,
        attrs: node.attrs,
    })
}

fn parse_root(root: &Scalar) -> Result<u64> {
    parse_scalar(root).ok_or_else(|| Error::MalformedRoot {
        value: root.to_string(),
    })
}

fn parse_scalar(value: &Scalar) -> Option<u64> {
    match value {
        Scalar::Text(s) => ids::parse_unsigned(s),
        Scalar::Number(n) => n.as_u64(),
    }
}
