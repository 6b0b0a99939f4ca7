use crate::chain::{Chain, ChainStore};
use crate::config::SearchLimits;
use crate::error::CollisionError;
use crate::pow::{scan, SearchOutcome};
use crate::Block;
use tracing::info;

/// Finds a block that links to the same parent as the chain tip and hashes
/// to the same truncated value, under a different identity and proof.
///
/// The match covers the full hash length, one character more than mining
/// requires. The returned block is not appended.
pub fn find_collision(
    chain: &Chain,
    id: &str,
    limits: &SearchLimits,
) -> Result<Block, CollisionError> {
    let parent = chain
        .parent_of_last()
        .ok_or(CollisionError::ChainTooShort)?;
    let tail = chain.last();
    if tail.id() == id {
        return Err(CollisionError::SameIdentity(id.to_string()));
    }

    let previous_hash = chain.hash_of(parent);
    let target = chain.tip_hash();
    let hash_length = chain.difficulty().hash_length();
    let tail_proof = tail.proof();

    let outcome = scan(limits, |proof| {
        if proof == tail_proof {
            return None;
        }
        let block = Block::new(proof, previous_hash.as_str(), id);
        (block.hash(hash_length) == target).then_some(block)
    });
    match outcome {
        SearchOutcome::Found(block) => Ok(block),
        SearchOutcome::Exhausted { attempts } => Err(CollisionError::Exhausted { attempts }),
    }
}

#[derive(Clone, Debug)]
pub struct CollisionFinder {
    id: String,
    limits: SearchLimits,
}

impl CollisionFinder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            limits: SearchLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn find(&self, chain: &Chain) -> Result<Block, CollisionError> {
        let block = find_collision(chain, &self.id, &self.limits)?;
        info!(
            "Found collision for block {}: original proof {}, collision proof {}, hash {}",
            chain.len() - 1,
            chain.last().proof(),
            block.proof(),
            chain.hash_of(&block)
        );
        Ok(block)
    }

    /// Runs the search and writes the result to `store` once.
    pub fn find_and_record<S>(&self, chain: &Chain, store: &S) -> Result<Block, CollisionError>
    where
        S: ChainStore + ?Sized,
    {
        let block = self.find(chain)?;
        store
            .record_collision(&block)
            .map_err(CollisionError::Store)?;
        Ok(block)
    }
}
