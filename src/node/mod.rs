use std::sync::{Mutex, MutexGuard, PoisonError};

use futures_util::future::join_all;
use log::{debug, info, warn};
use thiserror::Error;

use crate::blockchain::{
    Block, Ledger, LedgerError, LedgerSnapshot, MINING_REWARD, REWARD_SENDER,
};
use crate::config::NodeConfig;
use crate::consensus::{
    BlockVerdict, ChainSnapshot, PeerClient, PeerError, PeerRegistry, accept_broadcast_block,
    fetch_peer_chains, select_longest_valid,
};
use crate::transaction::{Transaction, TransactionRequest, ValidationError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("proof does not satisfy the difficulty target for the current tip")]
    InvalidProof,

    #[error("tip kept moving: gave up mining after {attempts} attempts")]
    MiningContended { attempts: u32 },
}

/// A running node: one ledger, its peers and the client used to reach them.
///
/// The ledger sits behind a single mutex. Proof searches run outside of it
/// and re-enter only to seal against the tip they were computed for.
pub struct Node<C> {
    ledger: Mutex<Ledger>,
    peers: Mutex<PeerRegistry>,
    client: C,
    config: NodeConfig,
}

impl<C: PeerClient> Node<C> {
    pub fn new(config: NodeConfig, client: C) -> Self {
        Self::with_ledger(Ledger::new(config.difficulty), config, client)
    }

    /// Start from an existing ledger, e.g. one restored from a snapshot.
    pub fn with_ledger(ledger: Ledger, config: NodeConfig, client: C) -> Self {
        let mut peers = PeerRegistry::new();
        for address in &config.bootstrap_peers {
            if let Err(e) = peers.register(address) {
                warn!("NODE - ignoring bootstrap peer: {e}");
            }
        }

        Self {
            ledger: Mutex::new(ledger),
            peers: Mutex::new(peers),
            client,
            config,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn peers(&self) -> MutexGuard<'_, PeerRegistry> {
        self.peers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /* -------------------- Transactions -------------------- */

    /// Validate and queue a transaction; returns the index of the block that will hold it.
    pub fn submit_transaction(&self, req: TransactionRequest) -> Result<u64, NodeError> {
        let tx = Transaction::try_from(req)?;
        let mut ledger = self.ledger();
        let index = ledger.queue_transaction(tx.sender, tx.recipient, tx.amount)?;
        debug!("NODE - queued transaction for block #{index} (pool={})", ledger.pending().len());
        Ok(index)
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.ledger().pending().to_vec()
    }

    /* -------------------- Mining -------------------- */

    fn reward(&self) -> Transaction {
        Transaction::new(REWARD_SENDER, self.config.node_id.clone(), MINING_REWARD)
    }

    /// Mining trigger: search a proof for the current tip, then seal with
    /// the reward. Retries when another block lands first. Blocking.
    pub fn mine(&self) -> Result<Block, NodeError> {
        for attempt in 1..=self.config.mining_attempts {
            let (tip_hash, reference, pow) = {
                let ledger = self.ledger();
                let tip = ledger.last_block()?;
                (tip.hash(), tip.canonical_bytes(), *ledger.pow())
            };

            let proof = pow.find_proof(&reference);
            debug!("NODE - found proof {proof} (attempt {attempt})");

            match self.ledger().seal_on_tip(&tip_hash, proof, Some(self.reward())) {
                Ok(block) => {
                    info!(
                        "NODE - forged block #{} (proof={}, txs={})",
                        block.index,
                        block.proof,
                        block.transactions.len()
                    );
                    return Ok(block);
                }
                Err(LedgerError::StaleTip { expected, actual }) => {
                    warn!("NODE - stale tip on attempt {attempt}: {expected} -> {actual}");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(NodeError::MiningContended {
            attempts: self.config.mining_attempts,
        })
    }

    /// Seal with a proof found by an external miner for the current tip.
    pub fn submit_proof(&self, proof: u64) -> Result<Block, NodeError> {
        let mut ledger = self.ledger();
        let tip = ledger.last_block()?;
        if !ledger.pow().is_valid_proof(&tip.canonical_bytes(), proof) {
            return Err(NodeError::InvalidProof);
        }

        let tip_hash = tip.hash();
        let block = ledger.seal_on_tip(&tip_hash, proof, Some(self.reward()))?;
        info!("NODE - forged block #{} from submitted proof {proof}", block.index);
        Ok(block)
    }

    /// Push a block to every peer concurrently. Failures are only logged.
    pub async fn broadcast_block(&self, block: &Block) -> usize {
        let peers = self.peers().to_vec();
        let timeout = self.config.peer_timeout;
        let pushes = peers.iter().map(move |peer| async move {
            let result = match tokio::time::timeout(timeout, self.client.push_block(peer, block)).await {
                Ok(result) => result,
                Err(_) => Err(PeerError::Timeout { peer: peer.clone() }),
            };
            if let Err(e) = &result {
                warn!("NODE - broadcast of #{} failed: {e}", block.index);
            }
            result.is_ok()
        });

        let delivered = join_all(pushes).await.into_iter().filter(|ok| *ok).count();
        debug!("NODE - block #{} delivered to {delivered}/{} peers", block.index, peers.len());
        delivered
    }

    /* -------------------- Chain -------------------- */

    pub fn chain(&self) -> ChainSnapshot {
        ChainSnapshot::new(self.ledger().chain().to_vec())
    }

    pub fn last_block(&self) -> Result<Block, NodeError> {
        Ok(self.ledger().last_block()?.clone())
    }

    pub fn is_chain_valid(&self) -> bool {
        self.ledger().is_valid()
    }

    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        self.ledger().snapshot()
    }

    /* -------------------- Peers & consensus -------------------- */

    /// Register several peers; invalid addresses are skipped and returned.
    pub fn register_peers<I, S>(&self, addresses: I) -> Vec<PeerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut peers = self.peers();
        addresses
            .into_iter()
            .filter_map(|address| peers.register(address.as_ref()).err())
            .collect()
    }

    pub fn peer_list(&self) -> Vec<String> {
        self.peers().to_vec()
    }

    /// Longest-valid-chain consensus. Returns `true` if our chain was replaced.
    pub async fn resolve_conflicts(&self) -> bool {
        let peers = self.peers().to_vec();
        if peers.is_empty() {
            debug!("NODE - no peers to resolve against");
            return false;
        }

        let (local_len, pow) = {
            let ledger = self.ledger();
            (ledger.len(), *ledger.pow())
        };

        let fetched = fetch_peer_chains(&self.client, &peers, self.config.peer_timeout).await;
        let Some(candidate) = select_longest_valid(local_len, fetched, &pow) else {
            info!("NODE - our chain is authoritative ({local_len} blocks)");
            return false;
        };

        // The chain may have grown while we were fetching.
        let mut ledger = self.ledger();
        if candidate.len() <= ledger.len() {
            info!(
                "NODE - candidate of {} no longer beats local {}",
                candidate.len(),
                ledger.len()
            );
            return false;
        }
        ledger.replace_chain(candidate);
        true
    }

    /// Block receipt: apply the broadcast fast path, falling back to a
    /// full resolution when the block does not extend our tip.
    pub async fn receive_block(&self, block: Block) -> Result<(BlockVerdict, bool), NodeError> {
        let verdict = {
            let mut ledger = self.ledger();
            accept_broadcast_block(&mut ledger, block)?
        };

        let replaced = match verdict {
            BlockVerdict::NeedsResync => self.resolve_conflicts().await,
            _ => false,
        };
        Ok((verdict, replaced))
    }
}
