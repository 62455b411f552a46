use std::collections::BTreeSet;

use log::info;
use url::Url;

use super::PeerError;

/// Known peers, stored as bare `host:port` network locations.
#[derive(Debug, Default, Clone)]
pub struct PeerRegistry {
    peers: BTreeSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer from a URL or bare `host:port`. Scheme, path and
    /// query are dropped. Returns `false` if the peer was already known.
    pub fn register(&mut self, address: &str) -> Result<bool, PeerError> {
        let netloc = parse_netloc(address)?;
        let added = self.peers.insert(netloc.clone());
        if added {
            info!("PEERS - registered {netloc} ({} known)", self.peers.len());
        }
        Ok(added)
    }

    #[cfg(test)]
    pub fn contains(&self, netloc: &str) -> bool {
        self.peers.contains(netloc)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }
}

/// Extract the `host[:port]` part of an address.
pub fn parse_netloc(address: &str) -> Result<String, PeerError> {
    let trimmed = address.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| PeerError::InvalidAddress(format!("{address}: {e}")))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| PeerError::InvalidAddress(format!("{address}: no host")))?;

    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
