use crate::chain::{Chain, ChainStore};
use crate::config::{Difficulty, SearchLimits};
use crate::error::MineError;
use crate::pow::{scan, SearchOutcome};
use crate::Block;
use tracing::info;

/// Searches proof values until the block hash has `difficulty` leading zeroes.
/// Returns the lowest such proof within `limits`.
pub fn mine_block(
    previous_hash: &str,
    id: &str,
    difficulty: Difficulty,
    limits: &SearchLimits,
) -> SearchOutcome {
    let hash_length = difficulty.hash_length();
    scan(limits, |proof| {
        let block = Block::new(proof, previous_hash, id);
        difficulty
            .is_met_by(&block.hash(hash_length))
            .then_some(block)
    })
}

/// Extends a chain with blocks mined under one identity.
#[derive(Clone, Debug)]
pub struct Miner {
    id: String,
    limits: SearchLimits,
}

impl Miner {
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

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Mines one block on top of the chain tip and appends it.
    pub fn mine_next(&self, chain: &mut Chain) -> Result<(), MineError> {
        let index = chain.len();
        let previous_hash = chain.tip_hash();
        let block = match mine_block(&previous_hash, &self.id, chain.difficulty(), &self.limits) {
            SearchOutcome::Found(block) => block,
            SearchOutcome::Exhausted { attempts } => {
                return Err(MineError::Exhausted { index, attempts })
            }
        };
        info!(
            "Mined block {} with proof {} and hash {}",
            index,
            block.proof(),
            chain.hash_of(&block)
        );
        chain.append(block)?;
        Ok(())
    }

    /// Mines `length` blocks, then records the proof sequence in `store`.
    pub fn mine_chain<S>(&self, chain: &mut Chain, length: usize, store: &S) -> Result<(), MineError>
    where
        S: ChainStore + ?Sized,
    {
        for _ in 0..length {
            self.mine_next(chain)?;
        }
        store
            .record_proofs(&self.id, chain)
            .map_err(MineError::Store)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::testing::MemoryStore;

    fn easy() -> Difficulty {
        Difficulty::new(1).unwrap()
    }

    #[test]
    fn mine_block_example() {
        let outcome = mine_block("28", "alice", easy(), &SearchLimits::default());
        let block = outcome.found().expect("proof within range");
        assert_eq!(block.proof(), 8);
        assert_eq!(block.hash(2), "03");
    }

    #[test]
    fn mined_hash_has_leading_zeroes() {
        let difficulty = Difficulty::new(3).unwrap();
        let block = mine_block("28dc", "alice", difficulty, &SearchLimits::default())
            .found()
            .unwrap();
        assert!(block.hash(difficulty.hash_length()).starts_with("000"));
        assert_eq!(block.proof(), 911);
    }

    #[test]
    fn mine_block_parallel_matches_sequential() {
        let difficulty = Difficulty::new(2).unwrap();
        let limits = SearchLimits {
            parallel: true,
            ..SearchLimits::default()
        };
        let par = mine_block("28d", "alice", difficulty, &limits);
        let seq = mine_block("28d", "alice", difficulty, &SearchLimits::default());
        assert_eq!(par, seq);
        assert_eq!(seq.found().unwrap().proof(), 161);
    }

    #[test]
    fn mine_block_honors_start() {
        let limits = SearchLimits {
            start: 9,
            ..SearchLimits::default()
        };
        let block = mine_block("28", "alice", easy(), &limits).found().unwrap();
        assert!(block.proof() >= 9);
        assert!(block.hash(2).starts_with('0'));
    }

    #[test]
    fn mine_chain_records_proofs() {
        let store = MemoryStore::default();
        let mut chain = Chain::new(easy());
        Miner::new("alice")
            .mine_chain(&mut chain, 3, &store)
            .unwrap();
        assert_eq!(chain.len(), 4);
        for block in chain.blocks().iter().skip(1) {
            assert!(chain.hash_of(block).starts_with('0'));
        }
        assert_eq!(
            *store.proofs.borrow(),
            vec![("alice".to_string(), vec![8, 32, 9])]
        );
    }

    #[test]
    fn mine_chain_at_difficulty_two() {
        let store = MemoryStore::default();
        let mut chain = Chain::new(Difficulty::new(2).unwrap());
        Miner::new("alice")
            .mine_chain(&mut chain, 3, &store)
            .unwrap();
        assert_eq!(chain.proofs().collect::<Vec<_>>(), vec![161, 85, 96]);
        assert_eq!(chain.tip_hash(), "003");
    }

    #[test]
    fn mine_chain_stops_when_exhausted() {
        let store = MemoryStore::default();
        let mut chain = Chain::new(easy());
        let err = Miner::new("alice")
            .with_limits(SearchLimits::capped(5))
            .mine_chain(&mut chain, 2, &store)
            .unwrap_err();
        assert!(matches!(
            err,
            MineError::Exhausted {
                index: 1,
                attempts: 5
            }
        ));
        assert_eq!(chain.len(), 1);
        assert!(store.proofs.borrow().is_empty());
    }
}
