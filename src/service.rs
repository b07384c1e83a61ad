//! Wallet Service
//!
//! Owns the transaction boundary around the transfer engine: begin, run,
//! then commit or roll back. Reads go straight to a pooled connection.

use sqlx::PgPool;
use thiserror::Error;

use crate::ledger::{LedgerStore, StoreError, Transfer, TransferId, Wallet, WalletId};
use crate::money::Decimal;
use crate::transfer::{TransferError, TransferParams, TransferResult, transfer_funds};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct WalletService {
    pool: PgPool,
    fee_rate: Decimal,
}

impl WalletService {
    pub fn new(pool: PgPool, fee_rate: Decimal) -> Self {
        Self { pool, fee_rate }
    }

    pub fn fee_rate(&self) -> Decimal {
        self.fee_rate
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run one transfer in its own database transaction.
    pub async fn transfer(
        &self,
        from: WalletId,
        to: WalletId,
        amount: Decimal,
    ) -> Result<TransferResult, ServiceError> {
        let params = TransferParams {
            from,
            to,
            amount,
            fee_rate: self.fee_rate,
        };

        let mut tx = self.pool.begin().await?;

        match transfer_funds(&mut *tx, &params).await {
            Ok(result) => {
                tx.commit().await?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(
                        from = %from,
                        to = %to,
                        error = %rollback_err,
                        "Rollback failed after transfer error"
                    );
                }
                if !e.is_rejection() {
                    tracing::error!(from = %from, to = %to, error = %e, "Transfer failed");
                }
                Err(e.into())
            }
        }
    }

    pub async fn wallets(&self) -> Result<Vec<Wallet>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(conn.find_all_wallets().await?)
    }

    pub async fn wallet(&self, id: WalletId) -> Result<Option<Wallet>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(conn.find_wallet_by_id(id).await?)
    }

    pub async fn transfers(&self) -> Result<Vec<Transfer>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(conn.find_all_transfers().await?)
    }

    pub async fn transfer_by_id(&self, id: TransferId) -> Result<Option<Transfer>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(conn.find_transfer_by_id(id).await?)
    }
}
