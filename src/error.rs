// src/error.rs

//! Error types shared by every pipeline stage.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed node id {id:?}: expected \"<eclass>.<node>\"")]
    MalformedId { id: String },
    #[error("node {node:?} has malformed child {child:?}")]
    MalformedChild { node: String, child: String },
    #[error("node {node:?} has malformed eclass {value}")]
    MalformedEclass { node: String, value: String },
    #[error("malformed root eclass {value}")]
    MalformedRoot { value: String },
    #[error("choice for eclass {eclass} references missing node {node:?}")]
    MissingNode { eclass: String, node: String },
    #[error("solver selected both {first:?} and {second:?} for eclass {eclass}")]
    ConflictingChoice {
        eclass: String,
        first: String,
        second: String,
    },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
    #[error("{} would be written by more than one input", .path.display())]
    DuplicateOutput { path: PathBuf },
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}
