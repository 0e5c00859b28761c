// src/solution.rs

//! Reads a solver assignment (`.sol`) file into a [`ChoiceMap`].
//!
//! The file holds one `<variable> <value>` record per line. Only node
//! variables (`N_<eclass>_<node>[_...]`) set to `1` select anything; every
//! other line, including headers and comments, is skipped and counted.

use indexmap::IndexMap;
use log::{debug, trace};

use crate::choices::{ChoiceMap, DuplicatePolicy, Overwrite};
use crate::document::NodeLookup;
use crate::error::Result;
use crate::ids;

/// Prefix of the per-node binary variables in the ILP formulation.
pub const NODE_VARIABLE_PREFIX: &str = "N_";

/// Why a line contributed nothing to the choice map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    /// Blank, or starts with `#`.
    Comment,
    /// Did not split into exactly two tokens.
    TokenCount,
    /// Value token is not an integer.
    NotInteger,
    /// Variable is not a node variable.
    NotNodeVariable,
    /// Value is not `1`.
    Unselected,
    /// Variable name has fewer than three `_`-separated parts.
    ShortName,
    /// Selected node is not in the node table.
    UnknownNode,
}

/// A line that selects a node: the eclass and the node key it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a> {
    pub eclass: &'a str,
    pub node_key: String,
}

/// Outcome of parsing one assignment file.
#[derive(Debug, Clone, Default)]
pub struct SolutionReport {
    pub choices: ChoiceMap,
    /// Lines whose selection was recorded.
    pub accepted: usize,
    pub skipped: IndexMap<SkipReason, usize>,
    pub overwrites: Vec<Overwrite>,
}

impl SolutionReport {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }
}

#[derive(Debug, Clone)]
pub struct SolutionParser {
    prefix: String,
    policy: DuplicatePolicy,
}

impl Default for SolutionParser {
    fn default() -> Self {
        SolutionParser {
            prefix: NODE_VARIABLE_PREFIX.to_string(),
            policy: DuplicatePolicy::default(),
        }
    }
}

impl SolutionParser {
    pub fn new(prefix: impl Into<String>, policy: DuplicatePolicy) -> Self {
        SolutionParser {
            prefix: prefix.into(),
            policy,
        }
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Parses the whole file. Only [`DuplicatePolicy::Reject`] can make this
    /// fail; malformed lines are skipped.
    pub fn parse(&self, text: &str, table: &impl NodeLookup) -> Result<SolutionReport> {
        let mut report = SolutionReport::default();

        for (index, line) in text.lines().enumerate() {
            let selection = match self.parse_line(line) {
                Ok(selection) => selection,
                Err(reason) => {
                    trace!("line {}: skipped ({:?}): {:?}", index + 1, reason, line);
                    report.skip(reason);
                    continue;
                }
            };

            if !table.contains_node(&selection.node_key) {
                trace!(
                    "line {}: node {} not in table",
                    index + 1,
                    selection.node_key
                );
                report.skip(SkipReason::UnknownNode);
                continue;
            }

            if let Some(overwrite) =
                report
                    .choices
                    .select(selection.eclass, &selection.node_key, self.policy)?
            {
                report.overwrites.push(overwrite);
            }
            report.accepted += 1;
        }

        debug!(
            "Solution parsed: {} accepted, {} skipped, {} eclasses chosen",
            report.accepted,
            report.skipped_total(),
            report.choices.len()
        );
        Ok(report)
    }

    /// Classifies a single line without consulting any node table.
    pub fn parse_line<'a>(&self, line: &'a str) -> std::result::Result<Selection<'a>, SkipReason> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Err(SkipReason::Comment);
        }

        let mut tokens = line.split_whitespace();
        let (Some(name), Some(value), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            return Err(SkipReason::TokenCount);
        };

        if !ids::is_integer(value) {
            return Err(SkipReason::NotInteger);
        }
        if !name.starts_with(self.prefix.as_str()) {
            return Err(SkipReason::NotNodeVariable);
        }
        // Digits-only per is_integer, so a parse failure is overflow: not 1.
        if value.parse::<i64>() != Ok(1) {
            return Err(SkipReason::Unselected);
        }

        let mut parts = name.split('_');
        let (Some(_), Some(eclass), Some(node)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(SkipReason::ShortName);
        };

        Ok(Selection {
            eclass,
            node_key: format!("{}{}{}", eclass, ids::SEPARATOR, node),
        })
    }
}
