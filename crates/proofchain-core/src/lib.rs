use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io;

pub mod chain;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod mine;

pub use chain::{Chain, ChainStore};
pub use config::{Difficulty, SearchLimits};
pub use error::{ChainError, CollisionError, ConfigError, InvalidReason, MineError};

/// A single link of the chain.
///
/// Fields are declared in the canonical hashing order (`ID`, `previous_hash`,
/// `proof`), so the serialized form never depends on how the block was built.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "ID")]
    id: String,
    previous_hash: String,
    proof: u64,
}

impl Block {
    pub fn new(proof: u64, previous_hash: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            previous_hash: previous_hash.into(),
            proof,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn proof(&self) -> u64 {
        self.proof
    }

    /// Bytes fed to the digest: a JSON object with sorted keys, `", "` and
    /// `": "` separators and ASCII-only output.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(48 + self.id.len() + self.previous_hash.len());
        let mut ser = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
        // infallible: writing two strings and an integer into a Vec
        self.serialize(&mut ser).expect("strings and integers always serialize");
        out
    }

    /// Full lowercase hex SHA-256 digest of the canonical bytes.
    pub fn digest_hex(&self) -> String {
        hex::encode(Sha256::digest(self.canonical_bytes()))
    }

    /// Digest truncated to `hash_length` hex characters.
    pub fn hash(&self, hash_length: usize) -> String {
        let mut hash = self.digest_hex();
        hash.truncate(hash_length);
        hash
    }
}

/// `serde_json` formatter matching the classic `json.dumps` layout.
struct CanonicalFormatter;

impl serde_json::ser::Formatter for CanonicalFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.bytes().all(is_literal) {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() && is_literal(ch as u8) {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Printable ASCII passes through; DEL and everything above it is escaped.
fn is_literal(b: u8) -> bool {
    b < 0x7f
}

pub mod pow {
    use super::Block;
    use crate::config::SearchLimits;
    use rayon::prelude::*;

    /// Proofs handed to the thread pool per round of a parallel scan.
    const PARALLEL_WINDOW: u64 = 1 << 16;

    /// Result of a bounded proof search.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum SearchOutcome {
        Found(Block),
        Exhausted { attempts: u64 },
    }

    impl SearchOutcome {
        pub fn found(self) -> Option<Block> {
            match self {
                SearchOutcome::Found(block) => Some(block),
                SearchOutcome::Exhausted { .. } => None,
            }
        }
    }

    /// Walk proof values from `limits.start` and return the first block
    /// `candidate` accepts.
    ///
    /// The parallel path walks consecutive windows and splits each one across
    /// the pool with `find_map_first`, so it settles on the lowest accepted
    /// proof just like the sequential walk does.
    pub fn scan<F>(limits: &SearchLimits, candidate: F) -> SearchOutcome
    where
        F: Fn(u64) -> Option<Block> + Sync + Send,
    {
        let (start, end) = (limits.start, limits.end());
        let found = if limits.parallel {
            let mut lo = start;
            let mut hit = None;
            while hit.is_none() && lo < end {
                let hi = lo.saturating_add(PARALLEL_WINDOW).min(end);
                hit = (lo..hi)
                    .into_par_iter()
                    .find_map_first(|proof| candidate(proof));
                lo = hi;
            }
            hit
        } else {
            (start..end).find_map(|proof| candidate(proof))
        };
        match found {
            Some(block) => SearchOutcome::Found(block),
            None => SearchOutcome::Exhausted {
                attempts: end - start,
            },
        }
    }
}
