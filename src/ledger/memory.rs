//! In-memory Ledger Store
//!
//! A transactional store with no database behind it, used to exercise the
//! transfer engine in tests and local tooling.
//!
//! - [`MemoryLedger::begin`] takes an exclusive lock on the whole ledger and
//!   hands out a [`MemoryTransaction`] working on a private copy.
//! - [`MemoryTransaction::commit`] publishes the copy; dropping the
//!   transaction (or [`MemoryTransaction::rollback`]) discards it.
//!
//! Transactions are therefore fully serialized, which is stricter than the
//! Postgres row locks but yields the same outcomes for overlapping transfers.
//!
//! Store failures can be injected per operation with
//! [`MemoryLedger::fail_on`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashSet;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::{StoreError, StoreOp};
use super::store::LedgerStore;
use super::types::{Currency, Transfer, TransferId, Wallet, WalletId};
use crate::money::Decimal;

#[derive(Debug, Clone, Default)]
struct LedgerState {
    wallets: BTreeMap<WalletId, Wallet>,
    transfers: BTreeMap<TransferId, Transfer>,
    last_wallet_id: i64,
    last_transfer_id: i64,
}

/// Shared handle to one in-memory ledger
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<LedgerState>>,
    faults: Arc<DashSet<StoreOp>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction. Waits while another transaction is open.
    pub async fn begin(&self) -> MemoryTransaction {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        MemoryTransaction {
            guard,
            working,
            faults: self.faults.clone(),
        }
    }

    /// Make every later call of `op` fail with `StoreError::Unavailable`
    pub fn fail_on(&self, op: StoreOp) {
        self.faults.insert(op);
    }

    pub fn clear_faults(&self) {
        self.faults.clear();
    }

    /// Committed state of one wallet.
    ///
    /// Waits for any open [`MemoryTransaction`] to finish, so never call it
    /// while holding one on the same task: that waits forever.
    pub async fn wallet(&self, id: WalletId) -> Option<Wallet> {
        self.state.lock().await.wallets.get(&id).cloned()
    }

    /// Committed transfers, ordered by id. Waits like [`MemoryLedger::wallet`].
    pub async fn transfers(&self) -> Vec<Transfer> {
        self.state.lock().await.transfers.values().cloned().collect()
    }
}

/// Open unit of work on a [`MemoryLedger`]
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<LedgerState>,
    working: LedgerState,
    faults: Arc<DashSet<StoreOp>>,
}

impl MemoryTransaction {
    pub fn commit(self) {
        let MemoryTransaction {
            mut guard, working, ..
        } = self;
        *guard = working;
    }

    pub fn rollback(self) {}

    fn check(&self, op: StoreOp) -> Result<(), StoreError> {
        if self.faults.contains(&op) {
            return Err(StoreError::Unavailable {
                op,
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn apply<F>(&mut self, op: StoreOp, id: WalletId, f: F) -> Result<Option<Wallet>, StoreError>
    where
        F: FnOnce(Decimal) -> Option<Option<Decimal>>,
    {
        let Some(wallet) = self.working.wallets.get_mut(&id) else {
            return Ok(None);
        };
        match f(wallet.balance) {
            Some(Some(balance)) => {
                wallet.balance = balance;
                Ok(Some(wallet.clone()))
            }
            // guard not met: no row matched
            Some(None) => Ok(None),
            None => Err(StoreError::Unavailable {
                op,
                reason: "numeric overflow".to_string(),
            }),
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryTransaction {
    async fn create_wallet(
        &mut self,
        balance: Decimal,
        currency: Currency,
    ) -> Result<Wallet, StoreError> {
        self.check(StoreOp::CreateWallet)?;
        if balance < Decimal::ZERO {
            return Err(StoreError::Unavailable {
                op: StoreOp::CreateWallet,
                reason: "balance must not be negative".to_string(),
            });
        }

        self.working.last_wallet_id += 1;
        let wallet = Wallet {
            id: WalletId::new(self.working.last_wallet_id),
            balance,
            currency,
        };
        self.working.wallets.insert(wallet.id, wallet.clone());
        Ok(wallet)
    }

    async fn find_wallet_by_id(&mut self, id: WalletId) -> Result<Option<Wallet>, StoreError> {
        self.check(StoreOp::FindWallet)?;
        Ok(self.working.wallets.get(&id).cloned())
    }

    async fn find_wallets_by_ids(
        &mut self,
        ids: &[WalletId],
    ) -> Result<HashMap<WalletId, Wallet>, StoreError> {
        self.check(StoreOp::FindWallets)?;
        Ok(ids
            .iter()
            .filter_map(|id| self.working.wallets.get(id))
            .map(|w| (w.id, w.clone()))
            .collect())
    }

    async fn find_all_wallets(&mut self) -> Result<Vec<Wallet>, StoreError> {
        self.check(StoreOp::FindAllWallets)?;
        Ok(self.working.wallets.values().cloned().collect())
    }

    async fn increment_balance(
        &mut self,
        id: WalletId,
        amount: Decimal,
    ) -> Result<Option<Wallet>, StoreError> {
        let op = StoreOp::IncrementBalance;
        self.check(op)?;
        self.apply(op, id, |balance| balance.checked_add(amount).map(Some))
    }

    async fn decrement_balance(
        &mut self,
        id: WalletId,
        amount: Decimal,
    ) -> Result<Option<Wallet>, StoreError> {
        let op = StoreOp::DecrementBalance;
        self.check(op)?;
        self.apply(op, id, |balance| {
            balance
                .checked_sub(amount)
                .map(|next| (next >= Decimal::ZERO).then_some(next))
        })
    }

    async fn create_transfer(
        &mut self,
        from: WalletId,
        to: WalletId,
        amount: Decimal,
        fee_amount: Decimal,
    ) -> Result<Transfer, StoreError> {
        let op = StoreOp::CreateTransfer;
        self.check(op)?;
        if !self.working.wallets.contains_key(&from) || !self.working.wallets.contains_key(&to) {
            return Err(StoreError::Unavailable {
                op,
                reason: "transfer references unknown wallet".to_string(),
            });
        }

        self.working.last_transfer_id += 1;
        let transfer = Transfer {
            id: TransferId::new(self.working.last_transfer_id),
            from,
            to,
            amount,
            fee_amount,
            created_at: Utc::now(),
        };
        self.working.transfers.insert(transfer.id, transfer.clone());
        Ok(transfer)
    }

    async fn find_all_transfers(&mut self) -> Result<Vec<Transfer>, StoreError> {
        self.check(StoreOp::FindAllTransfers)?;
        Ok(self.working.transfers.values().cloned().collect())
    }

    async fn find_transfer_by_id(
        &mut self,
        id: TransferId,
    ) -> Result<Option<Transfer>, StoreError> {
        self.check(StoreOp::FindTransfer)?;
        Ok(self.working.transfers.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_wallets() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin().await;

        let a = tx.create_wallet(dec("100.00"), Currency::Btc).await.unwrap();
        let b = tx.create_wallet(dec("0"), Currency::Eth).await.unwrap();
        assert_eq!(a.id, WalletId::new(1));
        assert_eq!(b.id, WalletId::new(2));

        let found = tx.find_wallet_by_id(a.id).await.unwrap();
        assert_eq!(found, Some(a.clone()));
        assert_eq!(tx.find_wallet_by_id(WalletId::new(99)).await.unwrap(), None);

        let many = tx
            .find_wallets_by_ids(&[a.id, WalletId::new(99), b.id])
            .await
            .unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[&b.id].currency, Currency::Eth);

        let all = tx.find_all_wallets().await.unwrap();
        assert_eq!(all, vec![a, b]);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin().await;
        let a = tx.create_wallet(dec("5"), Currency::Btc).await.unwrap();
        tx.commit();

        let mut tx = ledger.begin().await;
        tx.increment_balance(a.id, dec("1")).await.unwrap();
        tx.rollback();

        assert_eq!(ledger.wallet(a.id).await.unwrap().balance, dec("5"));

        // dropping an open transaction is a rollback too
        {
            let mut tx = ledger.begin().await;
            tx.increment_balance(a.id, dec("1")).await.unwrap();
        }
        assert_eq!(ledger.wallet(a.id).await.unwrap().balance, dec("5"));
    }

    #[tokio::test]
    async fn test_decrement_fails_closed() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin().await;
        let a = tx.create_wallet(dec("10"), Currency::Btc).await.unwrap();

        assert_eq!(tx.decrement_balance(a.id, dec("10.01")).await.unwrap(), None);
        assert_eq!(
            tx.find_wallet_by_id(a.id).await.unwrap().unwrap().balance,
            dec("10")
        );

        let drained = tx.decrement_balance(a.id, dec("10")).await.unwrap().unwrap();
        assert_eq!(drained.balance, Decimal::ZERO);

        assert_eq!(
            tx.decrement_balance(WalletId::new(42), dec("1")).await.unwrap(),
            None
        );
        assert_eq!(
            tx.increment_balance(WalletId::new(42), dec("1")).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_transfers_are_numbered_and_listed() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin().await;
        let a = tx.create_wallet(dec("10"), Currency::Btc).await.unwrap();
        let b = tx.create_wallet(dec("10"), Currency::Btc).await.unwrap();

        let t1 = tx.create_transfer(a.id, b.id, dec("1"), dec("0.015")).await.unwrap();
        let t2 = tx.create_transfer(b.id, a.id, dec("2"), dec("0.03")).await.unwrap();
        assert_eq!(t1.id, TransferId::new(1));
        assert_eq!(t2.id, TransferId::new(2));

        assert_eq!(tx.find_transfer_by_id(t2.id).await.unwrap(), Some(t2.clone()));
        assert_eq!(tx.find_transfer_by_id(TransferId::new(3)).await.unwrap(), None);
        tx.commit();

        assert_eq!(ledger.transfers().await, vec![t1, t2]);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let ledger = MemoryLedger::new();
        ledger.fail_on(StoreOp::FindAllWallets);

        let mut tx = ledger.begin().await;
        let err = tx.find_all_wallets().await.unwrap_err();
        assert_eq!(err.op(), StoreOp::FindAllWallets);
        assert!(matches!(err, StoreError::Unavailable { .. }));

        ledger.clear_faults();
        assert!(tx.find_all_wallets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_committed_reads_wait_for_open_transaction() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin().await;
        let a = tx.create_wallet(dec("1"), Currency::Btc).await.unwrap();

        let blocked =
            tokio::time::timeout(std::time::Duration::from_millis(50), ledger.wallet(a.id)).await;
        assert!(blocked.is_err(), "read must not see an open transaction");

        tx.commit();
        assert_eq!(ledger.wallet(a.id).await, Some(a));
    }
}
