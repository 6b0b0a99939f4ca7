use crate::config::Difficulty;
use crate::constants::{GENESIS_ID, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::error::{ChainError, InvalidReason};
use crate::Block;
use anyhow::Result;

/// Where mined proofs and found collisions get written.
/// Declared here so the miner and collision finder do not depend on a storage crate.
pub trait ChainStore {
    fn record_proofs(&self, id: &str, chain: &Chain) -> Result<()>;
    fn record_collision(&self, block: &Block) -> Result<()>;
}

/// Append-only sequence of blocks rooted at the fixed genesis block.
///
/// Each append is validated against the current tail only; earlier entries
/// were validated when they were appended.
#[derive(Clone, Debug)]
pub struct Chain {
    blocks: Vec<Block>,
    difficulty: Difficulty,
}

impl Chain {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            blocks: vec![genesis_block()],
            difficulty,
        }
    }

    /// Pure constructor; no validation happens until `append`.
    pub fn build(proof: u64, previous_hash: impl Into<String>, id: impl Into<String>) -> Block {
        Block::new(proof, previous_hash, id)
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; the genesis block is present from construction.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn last(&self) -> &Block {
        // genesis is never removed
        &self.blocks[self.blocks.len() - 1]
    }

    /// The block the tail links to, if the chain has been extended past genesis.
    pub fn parent_of_last(&self) -> Option<&Block> {
        self.blocks.len().checked_sub(2).map(|i| &self.blocks[i])
    }

    /// Mined proofs in chain order, genesis excluded.
    pub fn proofs(&self) -> impl Iterator<Item = u64> + '_ {
        self.blocks.iter().skip(1).map(Block::proof)
    }

    /// Hash of `block` truncated to this chain's hash length.
    pub fn hash_of(&self, block: &Block) -> String {
        block.hash(self.difficulty.hash_length())
    }

    pub fn tip_hash(&self) -> String {
        self.hash_of(self.last())
    }

    pub fn append(&mut self, block: Block) -> Result<(), ChainError> {
        let index = self.blocks.len();
        if block.previous_hash() != self.tip_hash() {
            return Err(ChainError::InvalidBlock {
                index,
                reason: InvalidReason::BrokenLink,
            });
        }
        if !self.difficulty.is_met_by(&self.hash_of(&block)) {
            return Err(ChainError::InvalidBlock {
                index,
                reason: InvalidReason::InsufficientWork,
            });
        }
        self.blocks.push(block);
        Ok(())
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

pub fn genesis_block() -> Block {
    Block::new(GENESIS_PROOF, GENESIS_PREVIOUS_HASH, GENESIS_ID)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Keeps whatever the miner or collision finder records, for assertions.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub proofs: RefCell<Vec<(String, Vec<u64>)>>,
        pub collisions: RefCell<Vec<Block>>,
    }

    impl ChainStore for MemoryStore {
        fn record_proofs(&self, id: &str, chain: &Chain) -> Result<()> {
            self.proofs
                .borrow_mut()
                .push((id.to_string(), chain.proofs().collect()));
            Ok(())
        }

        fn record_collision(&self, block: &Block) -> Result<()> {
            self.collisions.borrow_mut().push(block.clone());
            Ok(())
        }
    }
}
