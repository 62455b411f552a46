use sha2::{Digest, Sha256};

use super::MAX_DIFFICULTY;

/// Proof-of-Work puzzle: find `p` such that
/// `hex(sha256(reference ++ decimal(p)))` starts with `difficulty` zeros.
///
/// `reference` is always the canonical bytes of the block the new block
/// will point at, never the block being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: usize,
}

impl ProofOfWork {
    /// Difficulties above [`MAX_DIFFICULTY`] are clamped, so a search
    /// always has a target it can reach.
    pub fn new(difficulty: usize) -> Self {
        Self {
            difficulty: difficulty.min(MAX_DIFFICULTY),
        }
    }

    /// Exhaustive search from 0 upwards; returns the smallest valid proof.
    pub fn find_proof(&self, reference: &[u8]) -> u64 {
        let prefix = Sha256::new_with_prefix(reference);
        let mut proof: u64 = 0;
        loop {
            let mut hasher = prefix.clone();
            hasher.update(proof.to_string().as_bytes());
            if self.meets_target(&hex::encode(hasher.finalize())) {
                return proof;
            }
            proof = proof.wrapping_add(1);
        }
    }

    pub fn is_valid_proof(&self, reference: &[u8], proof: u64) -> bool {
        self.meets_target(&Self::digest(reference, proof))
    }

    /// Hex digest of `reference ++ decimal(proof)`.
    pub fn digest(reference: &[u8], proof: u64) -> String {
        let mut hasher = Sha256::new_with_prefix(reference);
        hasher.update(proof.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    fn meets_target(&self, digest: &str) -> bool {
        digest.len() >= self.difficulty && digest.bytes().take(self.difficulty).all(|c| c == b'0')
    }
}

#[cfg(test)]
mod tests {
    use super::ProofOfWork;
    use crate::blockchain::{Block, MAX_DIFFICULTY};

    #[test]
    fn found_proof_is_valid() {
        let pow = ProofOfWork::new(2);
        let genesis = Block::genesis().canonical_bytes();
        let references: [&[u8]; 3] = [b"", b"hello", &genesis];
        for reference in references {
            let proof = pow.find_proof(reference);
            assert!(pow.is_valid_proof(reference, proof));
            assert!(ProofOfWork::digest(reference, proof).starts_with("00"));
        }
    }

    #[test]
    fn found_proof_is_the_smallest() {
        let pow = ProofOfWork::new(2);
        let reference = b"smallest";
        let proof = pow.find_proof(reference);
        assert!((0..proof).all(|p| !pow.is_valid_proof(reference, p)));
    }

    #[test]
    fn difficulty_zero_accepts_anything() {
        let pow = ProofOfWork::new(0);
        assert_eq!(pow.find_proof(b"anything"), 0);
        assert!(pow.is_valid_proof(b"anything", 12_345));
    }

    #[test]
    fn proof_is_bound_to_reference() {
        let pow = ProofOfWork::new(3);
        let proof = pow.find_proof(b"block-a");
        assert!(pow.is_valid_proof(b"block-a", proof));
        // a proof for one reference is (overwhelmingly) useless for another
        let digest = ProofOfWork::digest(b"block-b", proof);
        assert_eq!(pow.is_valid_proof(b"block-b", proof), digest.starts_with("000"));
    }

    #[test]
    fn difficulty_is_capped_at_digest_length() {
        assert_eq!(ProofOfWork::new(100), ProofOfWork::new(MAX_DIFFICULTY));
        assert_eq!(ProofOfWork::new(usize::MAX), ProofOfWork::new(64));
        assert_ne!(ProofOfWork::new(63), ProofOfWork::new(64));
    }
}
