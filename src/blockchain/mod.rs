pub mod block;
pub mod error;
pub mod model;
pub mod pow;
pub mod validate;

pub use block::Block;
pub use error::LedgerError;
pub use model::{Ledger, LedgerSnapshot};
pub use pow::ProofOfWork;
pub use validate::is_valid_chain;

/// Default Proof-of-Work difficulty (number of leading hex zeros).
pub const DEFAULT_DIFFICULTY: usize = 4;

/// A SHA-256 hex digest has 64 characters; no proof can beat more zeros.
pub const MAX_DIFFICULTY: usize = 64;

/// Fixed proof carried by the genesis block. Genesis is never proof-checked.
pub const GENESIS_PROOF: u64 = 100;

/// Placeholder `previous_hash` of the genesis block; never a real digest.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Sender used for mining rewards.
pub const REWARD_SENDER: &str = "0";

/// Amount paid to the miner of each block.
pub const MINING_REWARD: f64 = 1.0;

#[cfg(test)]
pub(crate) mod testing {
    use super::{Ledger, MINING_REWARD, REWARD_SENDER};

    /// A ledger of `len` blocks, each after genesis holding one transfer
    /// and one reward, mined at `difficulty`.
    pub(crate) fn mined_ledger(len: usize, difficulty: usize) -> Ledger {
        let mut ledger = Ledger::new(difficulty);
        while ledger.len() < len {
            let n = ledger.len();
            ledger
                .queue_transaction(format!("sender-{n}"), format!("recipient-{n}"), n as f64)
                .unwrap();
            ledger
                .queue_transaction(REWARD_SENDER, "test-miner", MINING_REWARD)
                .unwrap();
            let reference = ledger.last_block().unwrap().canonical_bytes();
            let proof = ledger.pow().find_proof(&reference);
            ledger.seal_block(proof, None).unwrap();
        }
        ledger
    }
}
