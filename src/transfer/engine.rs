//! Transfer Engine
//!
//! One transfer is one pass through:
//!
//! ```text
//! FETCH → VALIDATE → DEBIT(amount + fee) → CREDIT(amount) → RECORD
//!            ↓          ↓                     ↓               ↓
//!         Rejected   Rejected/Storage      Storage         Storage
//! ```
//!
//! The engine runs entirely on the handle it is given and never begins,
//! commits or rolls back. On `Err` the caller must roll back; the writes
//! done so far are only undone by that rollback.
//!
//! No retries: a storage failure after the debit could otherwise charge the
//! source twice.

use crate::fee;
use crate::ledger::{LedgerStore, Transfer, Wallet, WalletId};
use crate::money::Decimal;

use super::error::{RejectReason, TransferError, TransferStep};

/// One transfer request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferParams {
    pub from: WalletId,
    pub to: WalletId,
    /// Value credited to `to`
    pub amount: Decimal,
    /// Percentage of `amount` retained as fee (`1.5` = 1.5%)
    pub fee_rate: Decimal,
}

/// State produced by a successful transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    /// Source after the debit
    pub from: Wallet,
    /// Destination after the credit
    pub to: Wallet,
    pub transfer: Transfer,
}

/// Debit, credit and record one transfer inside the caller's transaction.
pub async fn transfer_funds<S>(
    store: &mut S,
    params: &TransferParams,
) -> Result<TransferResult, TransferError>
where
    S: LedgerStore + ?Sized,
{
    // 1. Fetch
    let mut wallets = store
        .find_wallets_by_ids(&[params.from, params.to])
        .await
        .map_err(TransferError::storage(TransferStep::FetchWallets))?;

    let from = wallets
        .remove(&params.from)
        .ok_or(TransferError::WalletDoesNotExist(params.from))?;
    let to = if params.to == params.from {
        from.clone()
    } else {
        wallets
            .remove(&params.to)
            .ok_or(TransferError::WalletDoesNotExist(params.to))?
    };

    // 2. Validate
    let (fee_amount, total) = match validate(&from, &to, params) {
        Ok(v) => v,
        Err(reason) => {
            tracing::debug!(
                from = %params.from,
                to = %params.to,
                amount = %params.amount,
                reason = %reason,
                "Transfer rejected"
            );
            return Err(reason.into());
        }
    };

    // 3. Debit. The guarded decrement re-checks the balance under the row
    // lock, so a concurrent drain since step 1 ends up here.
    let from = store
        .decrement_balance(params.from, total)
        .await
        .map_err(TransferError::storage(TransferStep::DebitSource))?
        .ok_or_else(|| {
            tracing::warn!(
                from = %params.from,
                total = %total,
                "Debit refused after validation passed - concurrent balance change"
            );
            TransferError::Rejected(RejectReason::InsufficientFunds)
        })?;

    // 4. Credit
    let to = store
        .increment_balance(params.to, params.amount)
        .await
        .map_err(TransferError::storage(TransferStep::CreditDestination))?
        .ok_or(TransferError::WalletDoesNotExist(params.to))?;

    // 5. Record
    let transfer = store
        .create_transfer(params.from, params.to, params.amount, fee_amount)
        .await
        .map_err(TransferError::storage(TransferStep::RecordTransfer))?;

    tracing::info!(
        transfer_id = %transfer.id,
        from = %transfer.from,
        to = %transfer.to,
        amount = %transfer.amount,
        fee = %transfer.fee_amount,
        "Transfer applied"
    );

    // A self-transfer credits the wallet it debited; report the final row.
    let from = if params.from == params.to {
        to.clone()
    } else {
        from
    };

    Ok(TransferResult { from, to, transfer })
}

/// Business rules, checked in order. Returns `(fee, amount + fee)`.
fn validate(
    from: &Wallet,
    to: &Wallet,
    params: &TransferParams,
) -> Result<(Decimal, Decimal), RejectReason> {
    if !params.amount.is_positive() {
        return Err(RejectReason::NonPositiveAmount(params.amount));
    }

    if from.currency != to.currency {
        return Err(RejectReason::UnsupportedCurrencyConversion {
            from: from.currency,
            to: to.currency,
        });
    }

    // An empty wallet originates nothing, not even a free transfer
    if !from.balance.is_positive() {
        return Err(RejectReason::InsufficientFunds);
    }

    let (fee_amount, total) =
        fee::total_debit(params.amount, params.fee_rate).ok_or(RejectReason::Overflow)?;

    if from.balance < total {
        return Err(RejectReason::InsufficientFunds);
    }

    Ok((fee_amount, total))
}
