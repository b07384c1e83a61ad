//! Ledger store port
//!
//! The implementor *is* the transactional handle: every call runs inside
//! whatever unit of work the caller opened, and the caller alone decides to
//! commit or roll back.
//!
//! Implementations:
//! - `sqlx::PgConnection` (so `&mut *tx` of a Postgres transaction works)
//! - [`MemoryTransaction`](super::memory::MemoryTransaction)

use std::collections::HashMap;

use async_trait::async_trait;

use super::error::StoreError;
use super::types::{Currency, Transfer, TransferId, Wallet, WalletId};
use crate::money::Decimal;

#[async_trait]
pub trait LedgerStore: Send {
    // === Wallets ===

    /// Insert a wallet and return it with its assigned id
    async fn create_wallet(
        &mut self,
        balance: Decimal,
        currency: Currency,
    ) -> Result<Wallet, StoreError>;

    async fn find_wallet_by_id(&mut self, id: WalletId) -> Result<Option<Wallet>, StoreError>;

    /// Batch lookup. Ids with no row are absent from the map.
    async fn find_wallets_by_ids(
        &mut self,
        ids: &[WalletId],
    ) -> Result<HashMap<WalletId, Wallet>, StoreError>;

    /// All wallets, ordered by id
    async fn find_all_wallets(&mut self) -> Result<Vec<Wallet>, StoreError>;

    // === Balance primitives ===

    /// Add `amount` to the balance and return the new row.
    ///
    /// `None` if no wallet has that id.
    async fn increment_balance(
        &mut self,
        id: WalletId,
        amount: Decimal,
    ) -> Result<Option<Wallet>, StoreError>;

    /// Subtract `amount` from the balance and return the new row.
    ///
    /// Fails closed: `None` if no wallet has that id *or* the balance is
    /// below `amount`. A stored balance never goes negative through here.
    async fn decrement_balance(
        &mut self,
        id: WalletId,
        amount: Decimal,
    ) -> Result<Option<Wallet>, StoreError>;

    // === Transfers ===

    /// Insert a transfer record; the store assigns id and timestamp
    async fn create_transfer(
        &mut self,
        from: WalletId,
        to: WalletId,
        amount: Decimal,
        fee_amount: Decimal,
    ) -> Result<Transfer, StoreError>;

    /// All transfers, ordered by id
    async fn find_all_transfers(&mut self) -> Result<Vec<Transfer>, StoreError>;

    async fn find_transfer_by_id(&mut self, id: TransferId)
    -> Result<Option<Transfer>, StoreError>;
}
