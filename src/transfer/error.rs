//! Transfer Error Types
//!
//! Two families, kept apart so the API can answer "bad request" or
//! "internal error":
//! - caller-attributable: [`TransferError::WalletDoesNotExist`] and
//!   [`TransferError::Rejected`]
//! - storage: [`TransferError::Storage`], tagged with the engine step

use std::fmt;

use thiserror::Error;

use crate::ledger::{Currency, StoreError, WalletId};
use crate::money::Decimal;

/// Engine step that was running when a storage call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStep {
    FetchWallets,
    DebitSource,
    CreditDestination,
    RecordTransfer,
}

impl TransferStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStep::FetchWallets => "fetch wallets",
            TransferStep::DebitSource => "debit source",
            TransferStep::CreditDestination => "credit destination",
            TransferStep::RecordTransfer => "record transfer",
        }
    }
}

impl fmt::Display for TransferStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business rule a transfer request violated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Unsupported currency conversion: {from} -> {to}")]
    UnsupportedCurrencyConversion { from: Currency, to: Currency },

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Amount would cause overflow")]
    Overflow,
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::NonPositiveAmount(_) => "INVALID_AMOUNT",
            RejectReason::UnsupportedCurrencyConversion { .. } => {
                "UNSUPPORTED_CURRENCY_CONVERSION"
            }
            RejectReason::InsufficientFunds => "INSUFFICIENT_FUNDS",
            RejectReason::Overflow => "OVERFLOW",
        }
    }
}

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Wallet does not exist: {0}")]
    WalletDoesNotExist(WalletId),

    #[error("Transfer rejected: {0}")]
    Rejected(#[from] RejectReason),

    #[error("Transfer failed at {step}: {source}")]
    Storage {
        step: TransferStep,
        #[source]
        source: StoreError,
    },
}

impl TransferError {
    /// Error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::WalletDoesNotExist(_) => "WALLET_DOES_NOT_EXIST",
            TransferError::Rejected(reason) => reason.code(),
            TransferError::Storage { .. } => "STORAGE_ERROR",
        }
    }

    /// Suggested HTTP status
    pub fn http_status(&self) -> u16 {
        if self.is_rejection() { 400 } else { 500 }
    }

    /// True when the request itself was at fault; never worth retrying
    pub fn is_rejection(&self) -> bool {
        !matches!(self, TransferError::Storage { .. })
    }

    pub fn reason(&self) -> Option<&RejectReason> {
        match self {
            TransferError::Rejected(reason) => Some(reason),
            _ => None,
        }
    }

    pub(crate) fn storage(step: TransferStep) -> impl FnOnce(StoreError) -> TransferError {
        move |source| TransferError::Storage { step, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::StoreOp;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TransferError::WalletDoesNotExist(WalletId::new(3)).code(),
            "WALLET_DOES_NOT_EXIST"
        );
        assert_eq!(
            TransferError::from(RejectReason::InsufficientFunds).code(),
            "INSUFFICIENT_FUNDS"
        );
        assert_eq!(
            TransferError::from(RejectReason::UnsupportedCurrencyConversion {
                from: Currency::Btc,
                to: Currency::Eth,
            })
            .code(),
            "UNSUPPORTED_CURRENCY_CONVERSION"
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(
            TransferError::from(RejectReason::NonPositiveAmount(Decimal::ZERO)).http_status(),
            400
        );
        assert_eq!(
            TransferError::WalletDoesNotExist(WalletId::new(1)).http_status(),
            400
        );

        let storage = TransferError::storage(TransferStep::DebitSource)(StoreError::Unavailable {
            op: StoreOp::DecrementBalance,
            reason: "down".to_string(),
        });
        assert_eq!(storage.http_status(), 500);
        assert!(!storage.is_rejection());
        assert!(storage.reason().is_none());
    }

    #[test]
    fn test_display_chain() {
        let err = TransferError::storage(TransferStep::CreditDestination)(
            StoreError::Unavailable {
                op: StoreOp::IncrementBalance,
                reason: "down".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "Transfer failed at credit destination: increment balance: store unavailable: down"
        );

        let err = TransferError::from(RejectReason::UnsupportedCurrencyConversion {
            from: Currency::Btc,
            to: Currency::Eth,
        });
        assert_eq!(
            err.to_string(),
            "Transfer rejected: Unsupported currency conversion: BTC -> ETH"
        );
    }
}
