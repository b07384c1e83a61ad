//! walletdb - Wallet Ledger Service
//!
//! Wallets hold a balance in one currency; a transfer moves an amount between
//! two wallets of the same currency and charges the sender a percentage fee,
//! atomically, inside one database transaction.
//!
//! # Modules
//!
//! - [`money`] - Exact decimal type used for every balance and amount
//! - [`fee`] - Fee calculation
//! - [`ledger`] - Wallet/transfer entities and the `LedgerStore` port
//! - [`transfer`] - The transfer engine
//! - [`service`] - Transaction boundary around the engine
//! - [`db`] - PostgreSQL pool, migrations and seeding
//! - [`gateway`] - HTTP API
//! - [`config`] / [`logging`] - Runtime configuration and tracing setup

pub mod config;
pub mod db;
pub mod fee;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod money;
pub mod service;
pub mod transfer;

// Convenient re-exports at crate root
pub use ledger::{Currency, LedgerStore, MemoryLedger, Transfer, TransferId, Wallet, WalletId};
pub use money::Decimal;
pub use service::{ServiceError, WalletService};
pub use transfer::{RejectReason, TransferError, TransferParams, TransferResult, transfer_funds};
