use std::time::Duration;

use log::debug;
use reqwest::Client;

use super::models::NewBlockRequest;
use crate::blockchain::Block;
use crate::consensus::{ChainSnapshot, PeerClient, PeerError};

/// Talks to other nodes through their `/api/v1` routes.
#[derive(Debug, Clone)]
pub struct HttpPeerClient {
    http: Client,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    fn url(peer: &str, path: &str) -> String {
        format!("http://{peer}/api/v1{path}")
    }
}

fn unreachable(peer: &str, e: reqwest::Error) -> PeerError {
    if e.is_timeout() {
        PeerError::Timeout {
            peer: peer.to_string(),
        }
    } else {
        PeerError::Unreachable {
            peer: peer.to_string(),
            reason: e.to_string(),
        }
    }
}

impl PeerClient for HttpPeerClient {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot, PeerError> {
        let resp = self
            .http
            .get(Self::url(peer, "/chain/"))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| unreachable(peer, e))?;

        let snapshot = resp
            .json::<ChainSnapshot>()
            .await
            .map_err(|e| unreachable(peer, e))?;
        debug!("PEER - {peer} returned {} blocks", snapshot.chain.len());
        Ok(snapshot)
    }

    async fn push_block(&self, peer: &str, block: &Block) -> Result<(), PeerError> {
        let body = NewBlockRequest {
            block: block.clone(),
        };
        let resp = self
            .http
            .post(Self::url(peer, "/block/new/"))
            .json(&body)
            .send()
            .await
            .map_err(|e| unreachable(peer, e))?;

        // 400/409 mean the peer heard us and disagreed; it will resync on its own.
        debug!("PEER - {peer} answered {} to block #{}", resp.status(), block.index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::HttpPeerClient;
    use crate::consensus::{PeerClient, PeerError};
    use std::time::Duration;

    #[test]
    fn urls_target_the_versioned_api() {
        assert_eq!(
            HttpPeerClient::url("10.0.0.2:5000", "/chain/"),
            "http://10.0.0.2:5000/api/v1/chain/"
        );
    }

    #[actix_web::test]
    async fn closed_port_is_reported_as_unreachable() {
        let client = HttpPeerClient::new(Duration::from_millis(500)).unwrap();
        // port 9 (discard) is essentially never served on loopback
        let err = client.fetch_chain("127.0.0.1:9").await.unwrap_err();
        assert!(matches!(
            err,
            PeerError::Unreachable { .. } | PeerError::Timeout { .. }
        ));
    }
}
