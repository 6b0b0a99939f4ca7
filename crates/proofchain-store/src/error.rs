use proofchain_core::ChainError;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} has no identity line")]
    MissingIdentity(PathBuf),
    #[error("line {line} of {path} is not a proof value: {text:?}")]
    MalformedProof {
        path: PathBuf,
        line: usize,
        text: String,
    },
    #[error("{0} has no proof line")]
    MissingProofLine(PathBuf),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("chain has no mined block to compare a collision against")]
    ChainTooShort,
    #[error("no collision file found at {0}")]
    MissingCollisionFile(PathBuf),
    #[error("collision file was faulty: expected identity {expected:?}, found {found:?}")]
    BadAdminIdentity { expected: String, found: String },
    #[error("collision is faulty: hash {actual} does not match tail hash {expected}")]
    CollisionMismatch { expected: String, actual: String },
}

impl PersistenceError {
    /// Whether the workflow should stop. A missing or mismatched collision is
    /// reported and the run carries on.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PersistenceError::MissingCollisionFile(_) | PersistenceError::CollisionMismatch { .. }
        )
    }
}
