// src/config.rs

//! Configuration for a batch pipeline run.
//!
//! All locations are explicit values. Relative paths are resolved against a
//! root directory chosen by the caller (by default the directory holding the
//! config file), never against the process working directory.
//!
//! ```toml
//! [paths]
//! raw_dir = "data/raw"
//! source_graph = "data/my_data/graph.json"
//!
//! [solver]
//! on_duplicate = "reject"
//!
//! [batch]
//! jobs = 8
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::choices::DuplicatePolicy;
use crate::error::{Error, Result};
use crate::solution::{SolutionParser, NODE_VARIABLE_PREFIX};

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Input and output locations for each stage.
    pub paths: PathsConfig,
    /// How solver assignments are interpreted.
    pub solver: SolverConfig,
    /// Parallelism and file selection.
    pub batch: BatchConfig,
}

impl Config {
    /// Loads `path`. The file must exist; every missing key takes its default.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Solution parser configured from the `[solver]` section.
    pub fn solution_parser(&self) -> SolutionParser {
        SolutionParser::new(self.solver.variable_prefix.clone(), self.solver.on_duplicate)
    }
}

// --- Paths ---

/// Stage directories. A stage whose directory is unset is skipped by the batch
/// driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Raw e-graph dumps to canonicalize.
    pub raw_dir: Option<PathBuf>,
    /// Where canonical documents are written.
    pub canonical_dir: PathBuf,
    /// Solver assignment files.
    pub solution_dir: Option<PathBuf>,
    /// Where choice documents are written, and read back for projection.
    pub choices_dir: PathBuf,
    /// Where pruned node tables are written.
    pub pruned_dir: PathBuf,
    /// Where eclass-level DAG views are written.
    pub collapsed_dir: PathBuf,
    /// The e-graph whose nodes are projected and whose roots are injected.
    pub source_graph: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            raw_dir: None,
            canonical_dir: PathBuf::from("canonical"),
            solution_dir: None,
            choices_dir: PathBuf::from("choices"),
            pruned_dir: PathBuf::from("pruned"),
            collapsed_dir: PathBuf::from("collapsed"),
            source_graph: None,
        }
    }
}

impl PathsConfig {
    /// Returns a copy with every relative path joined onto `root`.
    pub fn resolved(&self, root: &Path) -> PathsConfig {
        let join = |p: &PathBuf| root.join(p);
        PathsConfig {
            raw_dir: self.raw_dir.as_ref().map(join),
            canonical_dir: join(&self.canonical_dir),
            solution_dir: self.solution_dir.as_ref().map(join),
            choices_dir: join(&self.choices_dir),
            pruned_dir: join(&self.pruned_dir),
            collapsed_dir: join(&self.collapsed_dir),
            source_graph: self.source_graph.as_ref().map(join),
        }
    }
}

// --- Solver ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// Prefix of node-selection variables.
    pub variable_prefix: String,
    /// `"last-wins"` or `"reject"`.
    pub on_duplicate: DuplicatePolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            variable_prefix: NODE_VARIABLE_PREFIX.to_string(),
            on_duplicate: DuplicatePolicy::LastWins,
        }
    }
}

// --- Batch ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads. 0 lets rayon pick.
    pub jobs: usize,
    /// Extension of solver assignment files.
    pub solution_extension: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            jobs: 0,
            solution_extension: "sol".to_string(),
        }
    }
}
