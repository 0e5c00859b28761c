// src/lib.rs

//! Canonicalization and reconstruction of e-graph extraction artifacts.
//!
//! The pipeline moves one e-graph through three representations:
//!
//! ```text
//! raw dump ──canonicalize──▶ canonical document ──▶ [external ILP solver]
//!                                                         │
//!          ┌───────────────── solver assignment ◀─────────┘
//!          ▼
//!   SolutionParser ──▶ ChoiceMap ──project──▶ pruned table ──truncate──▶ eclass DAG
//! ```
//!
//! Each stage is a pure transform over one in-memory document; [`pipeline`]
//! wires them to files and runs batches in parallel.

pub mod artifact;
pub mod canonicalize;
pub mod choices;
pub mod config;
pub mod document;
pub mod error;
pub mod ids;
pub mod pipeline;
pub mod project;
pub mod solution;
pub mod truncate;

pub use canonicalize::canonicalize;
pub use choices::{ChoiceMap, DuplicatePolicy};
pub use config::Config;
pub use document::{CanonicalDocument, DottedNode, GraphView, NodeTable, RawDocument};
pub use error::{Error, Result};
pub use ids::NodeId;
pub use project::{inject_roots, project};
pub use solution::{SolutionParser, SolutionReport};
pub use truncate::truncate;
