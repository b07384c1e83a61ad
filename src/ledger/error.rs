//! Ledger store error types

use std::fmt;

use thiserror::Error;

/// Store operation, used to tag every storage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    CreateWallet,
    FindWallet,
    FindWallets,
    FindAllWallets,
    IncrementBalance,
    DecrementBalance,
    CreateTransfer,
    FindAllTransfers,
    FindTransfer,
}

impl StoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOp::CreateWallet => "create wallet",
            StoreOp::FindWallet => "find wallet by id",
            StoreOp::FindWallets => "find wallets by ids",
            StoreOp::FindAllWallets => "find all wallets",
            StoreOp::IncrementBalance => "increment balance",
            StoreOp::DecrementBalance => "decrement balance",
            StoreOp::CreateTransfer => "create transfer",
            StoreOp::FindAllTransfers => "find all transfers",
            StoreOp::FindTransfer => "find transfer by id",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage failure. "No matching row" is never an error; it is `None`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{op}: database error: {source}")]
    Database {
        op: StoreOp,
        #[source]
        source: sqlx::Error,
    },

    #[error("{op}: malformed row: {reason}")]
    MalformedRow { op: StoreOp, reason: String },

    #[error("{op}: store unavailable: {reason}")]
    Unavailable { op: StoreOp, reason: String },
}

impl StoreError {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreError::Database { op, .. }
            | StoreError::MalformedRow { op, .. }
            | StoreError::Unavailable { op, .. } => *op,
        }
    }

    /// `map_err` adapter for sqlx calls
    pub(crate) fn database(op: StoreOp) -> impl FnOnce(sqlx::Error) -> StoreError {
        move |source| StoreError::Database { op, source }
    }

    pub(crate) fn malformed(op: StoreOp, reason: impl fmt::Display) -> StoreError {
        StoreError::MalformedRow {
            op,
            reason: reason.to_string(),
        }
    }
}
