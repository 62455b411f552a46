use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The chain lost its genesis block. Never happens after construction.
    #[error("ledger chain is empty")]
    EmptyChain,

    /// The tip moved between the proof search and the seal. Retry against the new tip.
    #[error("stale tip: proof was found for {expected}, tip is now {actual}")]
    StaleTip { expected: String, actual: String },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
