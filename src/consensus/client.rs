use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::Block;

/// A full chain as exported by a node: the wire format of a chain fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    pub length: usize,
}

impl ChainSnapshot {
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len();
        Self { chain, length }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeerError {
    #[error("peer {peer} unreachable: {reason}")]
    Unreachable { peer: String, reason: String },

    #[error("peer {peer} timed out")]
    Timeout { peer: String },

    #[error("peer {peer} offered an invalid chain of length {length}")]
    InvalidChain { peer: String, length: usize },

    #[error("invalid peer address: {0}")]
    InvalidAddress(String),
}

/// Outbound calls to other nodes. Implementations own the transport; the
/// resolver applies its own per-peer timeout on top.
pub trait PeerClient: Send + Sync {
    /// Fetch the peer's full chain.
    fn fetch_chain(&self, peer: &str)
    -> impl Future<Output = Result<ChainSnapshot, PeerError>> + Send;

    /// Push a freshly sealed block to the peer.
    fn push_block(&self, peer: &str, block: &Block)
    -> impl Future<Output = Result<(), PeerError>> + Send;
}
