use std::env;
use std::path::PathBuf;
use std::time::Duration;

use uuid::Uuid;

use crate::blockchain::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};

/// Runtime settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    /// Recipient of this node's mining rewards.
    pub node_id: String,
    pub difficulty: usize,
    pub peer_timeout: Duration,
    /// How many times mining retries after losing the race for the tip.
    pub mining_attempts: u32,
    pub broadcast_blocks: bool,
    pub bootstrap_peers: Vec<String>,
    /// Background resolution period; `None` means on demand only.
    pub resolve_interval: Option<Duration>,
    /// Where the ledger is loaded from at startup and saved to on shutdown.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            node_id: random_node_id(),
            difficulty: DEFAULT_DIFFICULTY,
            peer_timeout: Duration::from_millis(3000),
            mining_attempts: 3,
            broadcast_blocks: true,
            bootstrap_peers: Vec::new(),
            resolve_interval: None,
            snapshot_path: None,
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or unparsable values fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            node_id: lookup("NODE_ID")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.node_id),
            difficulty: parsed("DIFFICULTY")
                .map(|v| v.min(MAX_DIFFICULTY as u64) as usize)
                .unwrap_or(defaults.difficulty),
            peer_timeout: parsed("PEER_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.peer_timeout),
            mining_attempts: parsed("MINING_ATTEMPTS")
                .map(|v| v.clamp(1, u32::MAX as u64) as u32)
                .unwrap_or(defaults.mining_attempts),
            broadcast_blocks: lookup("BROADCAST_BLOCKS")
                .map(|v| !matches!(v.trim(), "0" | "false" | "no" | "off"))
                .unwrap_or(defaults.broadcast_blocks),
            bootstrap_peers: lookup("PEERS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            resolve_interval: parsed("RESOLVE_INTERVAL_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            snapshot_path: lookup("SNAPSHOT_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Globally unique node address: a v4 uuid without hyphens.
fn random_node_id() -> String {
    Uuid::new_v4().simple().to_string()
}
