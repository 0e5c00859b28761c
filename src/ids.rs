// src/ids.rs

//! Dotted e-node identifiers (`"<eclass>.<node>"`).
//!
//! Every artifact in the pipeline names nodes with this grammar: two
//! non-negative base-10 integers joined by exactly one `.`. Parsing is strict
//! about the shape but tolerant of leading zeros, which disappear when the id
//! is rendered again.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Separator between the eclass and node-index components.
pub const SEPARATOR: char = '.';

/// Identifier of one e-node: the owning eclass plus its index inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub eclass: u64,
    pub node: u64,
}

impl NodeId {
    pub fn new(eclass: u64, node: u64) -> Self {
        NodeId { eclass, node }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.eclass, SEPARATOR, self.node)
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

impl From<(u64, u64)> for NodeId {
    fn from((eclass, node): (u64, u64)) -> Self {
        NodeId { eclass, node }
    }
}

/// Parses `"<eclass>.<node>"`, failing with [`Error::MalformedId`] unless the
/// string has exactly two components that are both non-negative integers.
pub fn parse(s: &str) -> Result<NodeId> {
    let malformed = || Error::MalformedId { id: s.to_string() };

    let mut parts = s.split(SEPARATOR);
    let (Some(eclass), Some(node), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };
    let eclass = parse_component(eclass).ok_or_else(malformed)?;
    let node = parse_component(node).ok_or_else(malformed)?;
    Ok(NodeId { eclass, node })
}

/// Renders an id in its canonical textual form.
pub fn format(id: NodeId) -> String {
    id.to_string()
}

/// True iff `s` is a base-10 integer with an optional leading `-`.
pub fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a non-negative integer field such as an `eclass` value or a root
/// eclass. Returns `None` for anything [`is_integer`] rejects, for negative
/// values, and on overflow.
pub fn parse_unsigned(s: &str) -> Option<u64> {
    if !is_integer(s) {
        return None;
    }
    match s.strip_prefix('-') {
        // "-0" is an integer, and it is not negative.
        Some(digits) if digits.bytes().all(|b| b == b'0') => Some(0),
        Some(_) => None,
        None => s.parse().ok(),
    }
}

/// The text before the first `.` (the whole string if there is none).
pub fn eclass_prefix(s: &str) -> &str {
    s.split(SEPARATOR).next().unwrap_or(s)
}

fn parse_component(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_parse_valid_id() {
        assert_eq!(parse("3.1").unwrap(), NodeId::new(3, 1));
        assert_eq!(parse("0.0").unwrap(), NodeId::new(0, 0));
    }

    #[test_log::test]
    fn test_format_round_trips_canonical_ids() {
        for s in ["0.0", "3.1", "12.40", "18446744073709551615.7"] {
            assert_eq!(format(parse(s).unwrap()), s);
        }
    }

    #[test_log::test]
    fn test_leading_zeros_are_normalized() {
        assert_eq!(format(parse("007.01").unwrap()), "7.1");
    }

    #[test_log::test]
    fn test_parse_rejects_bad_shapes() {
        for s in ["a.1", "1.b", "1.2.3", "1", "", ".", "1.", ".1", "-1.2", "1.-2", " 1.2", "+1.2"] {
            match parse(s) {
                Err(Error::MalformedId { id }) => assert_eq!(id, s),
                other => panic!("{s:?} should be malformed, got {other:?}"),
            }
        }
    }

    #[test_log::test]
    fn test_parse_rejects_overflow() {
        assert!(parse("18446744073709551616.0").is_err());
    }

    #[test_log::test]
    fn test_is_integer() {
        assert!(is_integer("0"));
        assert!(is_integer("42"));
        assert!(is_integer("-7"));
        assert!(!is_integer(""));
        assert!(!is_integer("-"));
        assert!(!is_integer("1.0"));
        assert!(!is_integer("x1"));
        assert!(!is_integer(" 1"));
    }

    #[test_log::test]
    fn test_parse_unsigned() {
        assert_eq!(parse_unsigned("17"), Some(17));
        assert_eq!(parse_unsigned("-0"), Some(0));
        assert_eq!(parse_unsigned("-3"), None);
        assert_eq!(parse_unsigned("abc"), None);
    }

    #[test_log::test]
    fn test_eclass_prefix() {
        assert_eq!(eclass_prefix("3.1"), "3");
        assert_eq!(eclass_prefix("3"), "3");
        assert_eq!(eclass_prefix("3.1.4"), "3");
    }

    #[test_log::test]
    fn test_from_str() {
        let id: NodeId = "9.2".parse().unwrap();
        assert_eq!(id, NodeId::from((9, 2)));
    }
}
