use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{Block, LedgerError, ProofOfWork, is_valid_chain};
use crate::transaction::Transaction;

/// In-memory ledger: the chain plus the pool of transactions waiting for
/// the next block. Both are only mutated through the methods below.
#[derive(Debug, Clone)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    pow: ProofOfWork,
}

/// Everything needed to rebuild a ledger. The integrator picks the format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub chain: Vec<Block>,
    pub pending: Vec<Transaction>,
}

impl Ledger {
    /// Initialize a new ledger with the genesis block.
    pub fn new(difficulty: usize) -> Self {
        Self {
            chain: vec![Block::genesis()],
            pending: Vec::new(),
            pow: ProofOfWork::new(difficulty),
        }
    }

    /// Rebuild a ledger from a snapshot taken with [`Ledger::snapshot`].
    /// An empty chain gets a fresh genesis block.
    pub fn from_snapshot(snapshot: LedgerSnapshot, difficulty: usize) -> Result<Self, LedgerError> {
        let pow = ProofOfWork::new(difficulty);
        let LedgerSnapshot { mut chain, pending } = snapshot;

        if chain.is_empty() {
            chain.push(Block::genesis());
        } else if !is_valid_chain(&chain, &pow) {
            return Err(LedgerError::InvalidSnapshot(format!(
                "chain of length {} fails validation",
                chain.len()
            )));
        }

        info!(
            "LEDGER - restored {} blocks, {} pending transactions",
            chain.len(),
            pending.len()
        );
        Ok(Self {
            chain,
            pending,
            pow,
        })
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            chain: self.chain.clone(),
            pending: self.pending.clone(),
        }
    }

    /// Return the tip of the chain.
    pub fn last_block(&self) -> Result<&Block, LedgerError> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Queue a transaction; returns the index of the block that will hold it.
    pub fn queue_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
    ) -> Result<u64, LedgerError> {
        self.pending
            .push(Transaction::new(sender, recipient, amount));
        self.last_block()?;
        Ok(self.next_index())
    }

    /// Index the next sealed block gets: its 1-based position.
    fn next_index(&self) -> u64 {
        self.chain.len() as u64 + 1
    }

    /// Seal the pending pool into a new block and append it.
    /// `previous_hash` defaults to the hash of the current tip.
    pub fn seal_block(
        &mut self,
        proof: u64,
        previous_hash: Option<String>,
    ) -> Result<Block, LedgerError> {
        let previous_hash = match previous_hash {
            Some(hash) => hash,
            None => self.last_block()?.hash(),
        };

        // The pool is moved out, so later queue_transaction calls never
        // touch the sealed block's transactions.
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::new(
            self.next_index(),
            transactions,
            proof,
            previous_hash,
        );

        debug!(
            "LEDGER - sealed block #{} with {} transactions",
            block.index,
            block.transactions.len()
        );
        self.chain.push(block.clone());
        Ok(block)
    }

    /// Compare-and-swap seal: only succeeds if the tip still hashes to
    /// `expected_tip`. The optional reward is queued after the check, so a
    /// stale attempt leaves the pool untouched.
    pub fn seal_on_tip(
        &mut self,
        expected_tip: &str,
        proof: u64,
        reward: Option<Transaction>,
    ) -> Result<Block, LedgerError> {
        let actual = self.last_block()?.hash();
        if actual != expected_tip {
            return Err(LedgerError::StaleTip {
                expected: expected_tip.to_string(),
                actual,
            });
        }

        if let Some(reward) = reward {
            self.pending.push(reward);
        }
        self.seal_block(proof, Some(actual))
    }

    /// Validate our own chain.
    pub fn is_valid(&self) -> bool {
        is_valid_chain(&self.chain, &self.pow)
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    /// Swap in a whole chain. Callers must have validated it.
    pub(crate) fn replace_chain(&mut self, chain: Vec<Block>) {
        debug_assert!(!chain.is_empty());
        info!(
            "LEDGER - chain replaced: {} -> {} blocks",
            self.chain.len(),
            chain.len()
        );
        self.chain = chain;
    }

    /// Append a block already checked against the tip.
    pub(crate) fn append_block(&mut self, block: Block) {
        self.chain.push(block);
    }
}
