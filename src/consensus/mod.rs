pub mod client;
pub mod peers;
pub mod resolver;

pub use client::{ChainSnapshot, PeerClient, PeerError};
pub use peers::PeerRegistry;
pub use resolver::{
    BlockVerdict, RejectReason, accept_broadcast_block, fetch_peer_chains, select_longest_valid,
};
