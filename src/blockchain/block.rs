use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::transaction::Transaction;

/// A single block in the ledger holding the transactions sealed with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,     // 1-based position in the chain
    pub timestamp: f64, // seconds since the Unix epoch
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// The first block of every chain. All fields are fixed so that
    /// independently started nodes share the same root.
    pub fn genesis() -> Self {
        Self {
            index: 1,
            timestamp: 0.0,
            transactions: Vec::new(),
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        }
    }

    /// Create a block stamped with the current time.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Self {
        Self {
            index,
            timestamp: now_secs(),
            transactions,
            proof,
            previous_hash,
        }
    }

    /// Deterministic JSON encoding of the block.
    ///
    /// Going through `serde_json::Value` sorts object keys at every depth
    /// (its map is a `BTreeMap`), so two structurally equal blocks always
    /// produce the same bytes no matter how they were built.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let value = serde_json::to_value(self).expect("block fields always serialize to JSON");
        value.to_string().into_bytes()
    }

    /// Lowercase hex SHA-256 of the canonical bytes.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes());
        hex::encode(hasher.finalize())
    }
}

fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::Block;
    use crate::transaction::Transaction;
    use serde_json::json;

    fn sample() -> Block {
        Block {
            index: 2,
            timestamp: 1_700_000_000.25,
            transactions: vec![Transaction::new("alice", "bob", 5.0)],
            proof: 35_293,
            previous_hash: "ab".repeat(32),
        }
    }

    #[test]
    fn hash_is_stable_and_hex() {
        let b = sample();
        let h = b.hash();
        assert_eq!(h, b.hash());
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn canonical_bytes_sort_keys() {
        let text = String::from_utf8(sample().canonical_bytes()).unwrap();
        let index = text.find("\"index\"").unwrap();
        let previous = text.find("\"previous_hash\"").unwrap();
        let proof = text.find("\"proof\"").unwrap();
        let timestamp = text.find("\"timestamp\"").unwrap();
        let transactions = text.find("\"transactions\"").unwrap();
        assert!(index < previous && previous < proof && proof < timestamp);
        assert!(timestamp < transactions);
        // nested transaction keys are sorted too
        assert!(text.find("\"amount\"").unwrap() < text.find("\"recipient\"").unwrap());
        assert!(text.find("\"recipient\"").unwrap() < text.find("\"sender\"").unwrap());
    }

    #[test]
    fn hash_independent_of_construction_order() {
        let built = sample();
        let parsed: Block = serde_json::from_value(json!({
            "transactions": [{ "sender": "alice", "amount": 5.0, "recipient": "bob" }],
            "previous_hash": "ab".repeat(32),
            "proof": 35_293,
            "timestamp": 1_700_000_000.25,
            "index": 2,
        }))
        .unwrap();

        assert_eq!(built, parsed);
        assert_eq!(built.canonical_bytes(), parsed.canonical_bytes());
        assert_eq!(built.hash(), parsed.hash());
    }

    #[test]
    fn any_field_change_changes_hash() {
        let b = sample();
        let mut other = b.clone();
        other.transactions[0].amount = 6.0;
        assert_ne!(b.hash(), other.hash());

        let mut other = b.clone();
        other.proof += 1;
        assert_ne!(b.hash(), other.hash());
    }

    #[test]
    fn genesis_is_identical_everywhere() {
        let a = Block::genesis();
        let b = Block::genesis();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.index, 1);
        assert_eq!(a.previous_hash, "1");
        assert!(a.transactions.is_empty());
    }
}
