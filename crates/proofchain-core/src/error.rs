use std::fmt;

use thiserror::Error;

/// Which append invariant a proposed block broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    /// `previous_hash` does not match the hash of the current tail.
    BrokenLink,
    /// The block hash does not start with the required zeroes.
    InsufficientWork,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::BrokenLink => f.write_str("previous hash does not match the chain tip"),
            InvalidReason::InsufficientWork => f.write_str("hash does not meet the difficulty target"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("proposed block at index {index} is not valid: {reason}")]
    InvalidBlock { index: usize, reason: InvalidReason },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("leading zeroes must be between 1 and {max}, got {got}")]
    DifficultyOutOfRange { got: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum MineError {
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("no proof found for block {index} after {attempts} attempts")]
    Exhausted { index: usize, attempts: u64 },
    #[error("failed to record mined proofs")]
    Store(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum CollisionError {
    #[error("chain needs at least one mined block before searching for a collision")]
    ChainTooShort,
    #[error("collision identity {0:?} must differ from the tail block's identity")]
    SameIdentity(String),
    #[error("no collision found after {attempts} attempts")]
    Exhausted { attempts: u64 },
    #[error("failed to record collision")]
    Store(#[source] anyhow::Error),
}
