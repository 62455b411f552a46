pub mod model;

pub use model::{Transaction, TransactionRequest, ValidationError};
