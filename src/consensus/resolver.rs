use std::time::Duration;

use futures_util::future::join_all;
use log::{debug, info, warn};

use super::{ChainSnapshot, PeerClient, PeerError};
use crate::blockchain::{Block, Ledger, LedgerError, ProofOfWork, is_valid_chain};

/// Outcome of a block pushed to us by a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockVerdict {
    /// Appended as the new tip.
    Accepted,
    /// Discarded; the chain is unchanged.
    Rejected(RejectReason),
    /// The block does not extend our tip. Run `resolve_conflicts`.
    NeedsResync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    PreviousHashMismatch,
    InvalidProof,
}

/// Fast path for broadcast blocks: append if it extends our tip with a
/// correct link and proof.
pub fn accept_broadcast_block(
    ledger: &mut Ledger,
    candidate: Block,
) -> Result<BlockVerdict, LedgerError> {
    let tip = ledger.last_block()?;

    if tip.index.checked_add(1) != Some(candidate.index) {
        debug!(
            "RESOLVER - block #{} does not follow tip #{}",
            candidate.index, tip.index
        );
        return Ok(BlockVerdict::NeedsResync);
    }

    if candidate.previous_hash != tip.hash() {
        warn!("RESOLVER - rejected block #{}: previous_hash mismatch", candidate.index);
        return Ok(BlockVerdict::Rejected(RejectReason::PreviousHashMismatch));
    }

    if !ledger.pow().is_valid_proof(&tip.canonical_bytes(), candidate.proof) {
        warn!("RESOLVER - rejected block #{}: invalid proof", candidate.index);
        return Ok(BlockVerdict::Rejected(RejectReason::InvalidProof));
    }

    info!("RESOLVER - accepted broadcast block #{}", candidate.index);
    ledger.append_block(candidate);
    Ok(BlockVerdict::Accepted)
}

/// Fetch every peer's chain concurrently. Each fetch gets its own timeout,
/// so one slow peer never holds up the others.
pub async fn fetch_peer_chains<C: PeerClient>(
    client: &C,
    peers: &[String],
    timeout: Duration,
) -> Vec<(String, Result<ChainSnapshot, PeerError>)> {
    let fetches = peers.iter().map(move |peer| async move {
        let result = match tokio::time::timeout(timeout, client.fetch_chain(peer)).await {
            Ok(result) => result,
            Err(_) => Err(PeerError::Timeout { peer: peer.clone() }),
        };
        (peer.clone(), result)
    });
    join_all(fetches).await
}

/// Longest-valid-chain rule: among the fetched chains, the longest one that
/// is strictly longer than `local_len` and passes validation.
pub fn select_longest_valid(
    local_len: usize,
    fetched: Vec<(String, Result<ChainSnapshot, PeerError>)>,
    pow: &ProofOfWork,
) -> Option<Vec<Block>> {
    let mut best: Option<Vec<Block>> = None;

    for (peer, result) in fetched {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("RESOLVER - excluding {peer}: {e}");
                continue;
            }
        };

        let length = snapshot.chain.len();
        if length != snapshot.length {
            debug!(
                "RESOLVER - {peer} reported length {} but sent {length} blocks",
                snapshot.length
            );
        }

        let best_len = best.as_ref().map_or(local_len, Vec::len);
        if length <= best_len {
            debug!("RESOLVER - {peer} chain of {length} is not longer than {best_len}");
            continue;
        }

        if !is_valid_chain(&snapshot.chain, pow) {
            let e = PeerError::InvalidChain { peer, length };
            warn!("RESOLVER - excluding: {e}");
            continue;
        }

        debug!("RESOLVER - {peer} offers new best chain of {length}");
        best = Some(snapshot.chain);
    }

    best
}
