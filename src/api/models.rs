use serde::{Deserialize, Serialize};

use super::client::HttpPeerClient;
use crate::blockchain::Block;
use crate::node::Node;
use crate::transaction::Transaction;

/// Shared application state: the node, reaching its peers over HTTP.
pub type AppState = Node<HttpPeerClient>;

/* ---------- TX API Models ---------- */

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub size: usize,
    pub transactions: Vec<Transaction>,
}

/* ---------- Mining API Models ---------- */

#[derive(Deserialize)]
pub struct SubmitProofRequest {
    pub proof: u64,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl From<Block> for MineResponse {
    fn from(block: Block) -> Self {
        Self {
            message: "New Block Forged".to_string(),
            index: block.index,
            transactions: block.transactions,
            proof: block.proof,
            previous_hash: block.previous_hash,
        }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ValidityResponse {
    pub valid_chain: bool,
}

#[derive(Serialize)]
pub struct LastBlockResponse {
    pub last_block: Block,
}

/* ---------- Peer API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct NodesResponse {
    pub message: String,
    pub total_nodes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<String>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub message: String,
    pub replaced: bool,
    pub chain: Vec<Block>,
}

#[derive(Serialize, Deserialize)]
pub struct NewBlockRequest {
    pub block: Block,
}

#[derive(Serialize)]
pub struct BlockReceiptResponse {
    pub message: String,
    pub accepted: bool,
    pub replaced: bool,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
