//! Wallet ledger storage
//!
//! Entities ([`Wallet`], [`Transfer`]), the [`LedgerStore`] port and its two
//! implementations: PostgreSQL (`impl LedgerStore for PgConnection`) and
//! the in-memory [`MemoryLedger`].

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreOp};
pub use memory::{MemoryLedger, MemoryTransaction};
pub use store::LedgerStore;
pub use types::{Currency, CurrencyError, IdError, Transfer, TransferId, Wallet, WalletId};
