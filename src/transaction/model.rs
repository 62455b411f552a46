use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An opaque transfer record. The ledger never checks balances or signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: f64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }
}

/// Raw transaction intake: every field optional until validated.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

impl TryFrom<TransactionRequest> for Transaction {
    type Error = ValidationError;

    fn try_from(req: TransactionRequest) -> Result<Self, Self::Error> {
        let sender = req.sender.ok_or(ValidationError::MissingField("sender"))?;
        let recipient = req
            .recipient
            .ok_or(ValidationError::MissingField("recipient"))?;
        let amount = req.amount.ok_or(ValidationError::MissingField("amount"))?;
        Ok(Self::new(sender, recipient, amount))
    }
}
