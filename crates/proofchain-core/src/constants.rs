pub const HASH_HEX_SIZE: usize = 64;
pub const DEFAULT_LEADING_ZEROES: usize = 5;
pub const DEFAULT_CHAIN_LENGTH: usize = 5;

pub const GENESIS_PROOF: u64 = 1;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const GENESIS_ID: &str = "satoshi";

pub const ADMIN_ID: &str = "admin";

pub const DEFAULT_PROOFS_FILE: &str = "blockchain.txt";
pub const DEFAULT_COLLISION_FILE: &str = "collision.txt";
