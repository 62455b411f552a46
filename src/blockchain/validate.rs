use log::debug;

use super::{Block, ProofOfWork};

/// Validate a candidate chain: every block's index must be its 1-based
/// position, and every block after genesis must link to its predecessor's
/// hash and carry a proof against it. Genesis linkage and proof are never
/// inspected.
///
/// Pure: safe to run on chains received from untrusted peers.
pub fn is_valid_chain(chain: &[Block], pow: &ProofOfWork) -> bool {
    if chain.is_empty() {
        return false;
    }

    // Positions come from the slice, never from peer-supplied indices, so
    // no arithmetic is done on untrusted values.
    for (position, block) in (1u64..).zip(chain) {
        if block.index != position {
            debug!("chain invalid at position {position}: index is {}", block.index);
            return false;
        }
    }

    for pair in chain.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);

        if curr.previous_hash != prev.hash() {
            debug!("chain invalid at #{}: previous_hash mismatch", curr.index);
            return false;
        }

        if !pow.is_valid_proof(&prev.canonical_bytes(), curr.proof) {
            debug!("chain invalid at #{}: proof {} rejected", curr.index, curr.proof);
            return false;
        }
    }

    true
}
