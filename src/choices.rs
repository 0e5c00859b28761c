// src/choices.rs

//! The solver's selection of one representative node per eclass.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::document::{CanonicalDocument, NodeLookup};
use crate::error::{Error, Result};
use crate::ids;

/// What to do when the solver selects a second node for an eclass that
/// already has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The later selection replaces the earlier one.
    #[default]
    LastWins,
    /// Fail with [`Error::ConflictingChoice`].
    Reject,
}

/// A replaced selection, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overwrite {
    pub eclass: String,
    pub previous: String,
    pub current: String,
}

/// `{"choices": {"<eclass>": "<eclass>.<node>", ...}}`
///
/// Keys are the eclass ids exactly as spelled by the solver; values are keys
/// of the node table the selections were validated against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMap {
    pub choices: IndexMap<String, String>,
}

impl ChoiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn get(&self, eclass: &str) -> Option<&str> {
        self.choices.get(eclass).map(String::as_str)
    }

    /// Every chosen node key, for membership tests over a whole table.
    pub fn chosen_nodes(&self) -> HashSet<&str> {
        self.choices.values().map(String::as_str).collect()
    }

    /// Records `node` as the choice for `eclass`.
    ///
    /// Returns the replaced selection if one existed and differed. Under
    /// [`DuplicatePolicy::Reject`] such a replacement is an error instead, and
    /// the map is left untouched.
    pub fn select(
        &mut self,
        eclass: &str,
        node: &str,
        policy: DuplicatePolicy,
    ) -> Result<Option<Overwrite>> {
        let previous = match self.choices.get(eclass) {
            Some(previous) if previous != node => previous.clone(),
            Some(_) => return Ok(None),
            None => {
                self.choices.insert(eclass.to_string(), node.to_string());
                return Ok(None);
            }
        };

        if policy == DuplicatePolicy::Reject {
            return Err(Error::ConflictingChoice {
                eclass: eclass.to_string(),
                first: previous,
                second: node.to_string(),
            });
        }

        warn!(
            "Eclass {} selected twice: {} replaced by {}",
            eclass, previous, node
        );
        self.choices.insert(eclass.to_string(), node.to_string());
        Ok(Some(Overwrite {
            eclass: eclass.to_string(),
            previous,
            current: node.to_string(),
        }))
    }

    /// Fails with [`Error::MissingNode`] on the first choice whose node is
    /// absent from `table`.
    pub fn verify_against(&self, table: &impl NodeLookup) -> Result<()> {
        match self
            .choices
            .iter()
            .find(|(_, node)| !table.contains_node(node))
        {
            Some((eclass, node)) => Err(Error::MissingNode {
                eclass: eclass.clone(),
                node: node.clone(),
            }),
            None => Ok(()),
        }
    }
}

// --- Integrity check ---

/// Closure problems found by [`check`]. Empty means the choice map describes
/// a closed extraction of the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Root eclasses with no choice.
    pub unchosen_roots: Vec<u64>,
    /// `(node, child eclass)` pairs where the chosen node depends on an
    /// eclass with no choice.
    pub dangling_children: Vec<(String, u64)>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.unchosen_roots.is_empty()
            && self.dangling_children.is_empty()
    }
}

/// Checks that `choices` covers every root and every eclass a chosen node
/// depends on.
///
/// A choice naming a node the graph lacks means the two documents do not
/// belong together, so that fails with [`Error::MissingNode`] before any
/// closure problem is looked at.
pub fn check(choices: &ChoiceMap, graph: &CanonicalDocument) -> Result<CheckReport> {
    choices.verify_against(&graph.nodes)?;

    let mut report = CheckReport::default();

    let chosen_eclasses: HashSet<u64> = choices
        .choices
        .keys()
        .filter_map(|eclass| ids::parse_unsigned(eclass))
        .collect();
    let is_chosen = |eclass: u64| chosen_eclasses.contains(&eclass);

    for node_key in choices.choices.values() {
        let Some(node) = graph.nodes.get(node_key) else {
            continue;
        };
        for &child in &node.children {
            if !is_chosen(child) {
                report.dangling_children.push((node_key.clone(), child));
            }
        }
    }

    report.unchosen_roots = graph
        .root_eclasses
        .iter()
        .copied()
        .filter(|&root| !is_chosen(root))
        .collect();

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeTable;
    use serde_json::json;

    fn choices(pairs: &[(&str, &str)]) -> ChoiceMap {
        let mut map = ChoiceMap::new();
        for (eclass, node) in pairs {
            map.select(eclass, node, DuplicatePolicy::LastWins).unwrap();
        }
        map
    }

    #[test_log::test]
    fn test_last_selection_wins() {
        let mut map = ChoiceMap::new();
        assert_eq!(map.select("3", "3.1", DuplicatePolicy::LastWins).unwrap(), None);
        let overwrite = map
            .select("3", "3.0", DuplicatePolicy::LastWins)
            .unwrap()
            .expect("second selection replaces the first");
        assert_eq!(overwrite.previous, "3.1");
        assert_eq!(map.get("3"), Some("3.0"));
        assert_eq!(map.len(), 1);
    }

    #[test_log::test]
    fn test_reselecting_same_node_is_not_a_conflict() {
        let mut map = ChoiceMap::new();
        map.select("3", "3.1", DuplicatePolicy::Reject).unwrap();
        assert_eq!(map.select("3", "3.1", DuplicatePolicy::Reject).unwrap(), None);
    }

    #[test_log::test]
    fn test_reject_policy() {
        let mut map = ChoiceMap::new();
        map.select("3", "3.1", DuplicatePolicy::Reject).unwrap();
        let err = map.select("3", "3.0", DuplicatePolicy::Reject).unwrap_err();
        assert!(matches!(err, Error::ConflictingChoice { .. }), "{err:?}");
        assert_eq!(map.get("3"), Some("3.1"));
    }

    #[test_log::test]
    fn test_serialized_shape() {
        let map = choices(&[("3", "3.1"), ("0", "0.2")]);
        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            json!({"choices": {"3": "3.1", "0": "0.2"}})
        );
    }

    #[test_log::test]
    fn test_policy_names() {
        let policy: DuplicatePolicy = serde_json::from_value(json!("reject")).unwrap();
        assert_eq!(policy, DuplicatePolicy::Reject);
        let policy: DuplicatePolicy = serde_json::from_value(json!("last-wins")).unwrap();
        assert_eq!(policy, DuplicatePolicy::LastWins);
    }

    #[test_log::test]
    fn test_verify_against() {
        let mut table = NodeTable::new();
        table.insert("3.1".to_string(), ());
        assert!(choices(&[("3", "3.1")]).verify_against(&table).is_ok());

        let err = choices(&[("3", "3.1"), ("4", "4.0")])
            .verify_against(&table)
            .unwrap_err();
        match err {
            Error::MissingNode { eclass, node } => {
                assert_eq!(eclass, "4");
                assert_eq!(node, "4.0");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    fn graph() -> CanonicalDocument {
        serde_json::from_value(json!({
            "nodes": {
                "0.0": {"eclass": 0, "children": []},
                "1.0": {"eclass": 1, "children": [0]},
                "2.0": {"eclass": 2, "children": [0, 1]},
                "2.1": {"eclass": 2, "children": [3]}
            },
            "root_eclasses": [2]
        }))
        .unwrap()
    }

    #[test_log::test]
    fn test_check_clean_extraction() {
        let report = check(&choices(&[("0", "0.0"), ("1", "1.0"), ("2", "2.0")]), &graph()).unwrap();
        assert!(report.is_clean(), "{report:?}");
    }

    #[test_log::test]
    fn test_check_reports_closure_problems() {
        let report = check(&choices(&[("2", "2.1")]), &graph()).unwrap();
        assert_eq!(report.dangling_children, vec![("2.1".to_string(), 3)]);
        assert!(report.unchosen_roots.is_empty());

        let report = check(&choices(&[("0", "0.0")]), &graph()).unwrap();
        assert_eq!(report.unchosen_roots, vec![2]);
        assert!(!report.is_clean());
    }

    #[test_log::test]
    fn test_check_fails_on_choice_outside_the_graph() {
        let err = check(&choices(&[("2", "2.0"), ("7", "7.0")]), &graph()).unwrap_err();
        match err {
            Error::MissingNode { eclass, node } => {
                assert_eq!(eclass, "7");
                assert_eq!(node, "7.0");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test_log::test]
    fn test_chosen_nodes() {
        let binding = choices(&[("3", "3.1"), ("0", "0.2")]);
        let set = binding.chosen_nodes();
        assert!(set.contains("3.1"));
        assert!(set.contains("0.2"));
        assert!(!set.contains("3.0"));
    }
}
