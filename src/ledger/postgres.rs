//! PostgreSQL Ledger Store
//!
//! [`LedgerStore`] for a raw `PgConnection`. Pass `&mut *tx` for a
//! `sqlx::Transaction<'_, Postgres>` so every statement joins the caller's
//! transaction.
//!
//! Concurrency relies on Postgres row locks: the balance `UPDATE`s lock the
//! wallet row until the transaction ends, and the guarded decrement
//! re-checks `balance >= amount` against the latest committed row once the
//! lock is held.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};

use super::error::{StoreError, StoreOp};
use super::store::LedgerStore;
use super::types::{Currency, Transfer, TransferId, Wallet, WalletId};
use crate::money::Decimal;

const CREATE_WALLET: &str = r#"
    INSERT INTO wallets (balance, currency) VALUES ($1, $2)
    RETURNING id, balance, currency
"#;

const FIND_WALLET_BY_ID: &str = "SELECT id, balance, currency FROM wallets WHERE id = $1";

const FIND_WALLETS_BY_IDS: &str = "SELECT id, balance, currency FROM wallets WHERE id = ANY($1)";

const FIND_ALL_WALLETS: &str = "SELECT id, balance, currency FROM wallets ORDER BY id";

const INCREMENT_BALANCE: &str = r#"
    UPDATE wallets SET balance = balance + $1
    WHERE id = $2
    RETURNING id, balance, currency
"#;

const DECREMENT_BALANCE: &str = r#"
    UPDATE wallets SET balance = balance - $1
    WHERE id = $2 AND balance >= $1
    RETURNING id, balance, currency
"#;

const CREATE_TRANSFER: &str = r#"
    INSERT INTO transfers (sender, receiver, amount, fee_amount) VALUES ($1, $2, $3, $4)
    RETURNING id, sender, receiver, amount, fee_amount, created_at
"#;

const FIND_ALL_TRANSFERS: &str = r#"
    SELECT id, sender, receiver, amount, fee_amount, created_at
    FROM transfers ORDER BY id
"#;

const FIND_TRANSFER_BY_ID: &str = r#"
    SELECT id, sender, receiver, amount, fee_amount, created_at
    FROM transfers WHERE id = $1
"#;

fn get<'r, T>(row: &'r PgRow, op: StoreOp, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::malformed(op, format!("column '{}': {}", column, e)))
}

fn wallet_from_row(op: StoreOp, row: &PgRow) -> Result<Wallet, StoreError> {
    let currency: String = get(row, op, "currency")?;
    let currency: Currency = currency
        .parse()
        .map_err(|e| StoreError::malformed(op, e))?;

    Ok(Wallet {
        id: WalletId::new(get(row, op, "id")?),
        balance: get(row, op, "balance")?,
        currency,
    })
}

fn transfer_from_row(op: StoreOp, row: &PgRow) -> Result<Transfer, StoreError> {
    Ok(Transfer {
        id: TransferId::new(get(row, op, "id")?),
        from: WalletId::new(get(row, op, "sender")?),
        to: WalletId::new(get(row, op, "receiver")?),
        amount: get(row, op, "amount")?,
        fee_amount: get(row, op, "fee_amount")?,
        created_at: get(row, op, "created_at")?,
    })
}

#[async_trait]
impl LedgerStore for PgConnection {
    async fn create_wallet(
        &mut self,
        balance: Decimal,
        currency: Currency,
    ) -> Result<Wallet, StoreError> {
        let op = StoreOp::CreateWallet;
        let row = sqlx::query(CREATE_WALLET)
            .bind(balance)
            .bind(currency.code())
            .fetch_one(&mut *self)
            .await
            .map_err(StoreError::database(op))?;

        wallet_from_row(op, &row)
    }

    async fn find_wallet_by_id(&mut self, id: WalletId) -> Result<Option<Wallet>, StoreError> {
        let op = StoreOp::FindWallet;
        let row = sqlx::query(FIND_WALLET_BY_ID)
            .bind(id.value())
            .fetch_optional(&mut *self)
            .await
            .map_err(StoreError::database(op))?;

        row.map(|r| wallet_from_row(op, &r)).transpose()
    }

    async fn find_wallets_by_ids(
        &mut self,
        ids: &[WalletId],
    ) -> Result<HashMap<WalletId, Wallet>, StoreError> {
        let op = StoreOp::FindWallets;
        let raw_ids: Vec<i64> = ids.iter().map(|id| id.value()).collect();
        let rows = sqlx::query(FIND_WALLETS_BY_IDS)
            .bind(raw_ids)
            .fetch_all(&mut *self)
            .await
            .map_err(StoreError::database(op))?;

        let mut wallets = HashMap::with_capacity(rows.len());
        for row in rows {
            let wallet = wallet_from_row(op, &row)?;
            wallets.insert(wallet.id, wallet);
        }
        Ok(wallets)
    }

    async fn find_all_wallets(&mut self) -> Result<Vec<Wallet>, StoreError> {
        let op = StoreOp::FindAllWallets;
        let rows = sqlx::query(FIND_ALL_WALLETS)
            .fetch_all(&mut *self)
            .await
            .map_err(StoreError::database(op))?;

        rows.iter().map(|r| wallet_from_row(op, r)).collect()
    }

    async fn increment_balance(
        &mut self,
        id: WalletId,
        amount: Decimal,
    ) -> Result<Option<Wallet>, StoreError> {
        let op = StoreOp::IncrementBalance;
        let row = sqlx::query(INCREMENT_BALANCE)
            .bind(amount)
            .bind(id.value())
            .fetch_optional(&mut *self)
            .await
            .map_err(StoreError::database(op))?;

        row.map(|r| wallet_from_row(op, &r)).transpose()
    }

    async fn decrement_balance(
        &mut self,
        id: WalletId,
        amount: Decimal,
    ) -> Result<Option<Wallet>, StoreError> {
        let op = StoreOp::DecrementBalance;
        let row = sqlx::query(DECREMENT_BALANCE)
            .bind(amount)
            .bind(id.value())
            .fetch_optional(&mut *self)
            .await
            .map_err(StoreError::database(op))?;

        row.map(|r| wallet_from_row(op, &r)).transpose()
    }

    async fn create_transfer(
        &mut self,
        from: WalletId,
        to: WalletId,
        amount: Decimal,
        fee_amount: Decimal,
    ) -> Result<Transfer, StoreError> {
        let op = StoreOp::CreateTransfer;
        let row = sqlx::query(CREATE_TRANSFER)
            .bind(from.value())
            .bind(to.value())
            .bind(amount)
            .bind(fee_amount)
            .fetch_one(&mut *self)
            .await
            .map_err(StoreError::database(op))?;

        transfer_from_row(op, &row)
    }

    async fn find_all_transfers(&mut self) -> Result<Vec<Transfer>, StoreError> {
        let op = StoreOp::FindAllTransfers;
        let rows = sqlx::query(FIND_ALL_TRANSFERS)
            .fetch_all(&mut *self)
            .await
            .map_err(StoreError::database(op))?;

        rows.iter().map(|r| transfer_from_row(op, r)).collect()
    }

    async fn find_transfer_by_id(
        &mut self,
        id: TransferId,
    ) -> Result<Option<Transfer>, StoreError> {
        let op = StoreOp::FindTransfer;
        let row = sqlx::query(FIND_TRANSFER_BY_ID)
            .bind(id.value())
            .fetch_optional(&mut *self)
            .await
            .map_err(StoreError::database(op))?;

        row.map(|r| transfer_from_row(op, &r)).transpose()
    }
}
