//! Ledger Core Types
//!
//! Identities, currencies and the two stored entities: [`Wallet`] and
//! [`Transfer`]. Entities are plain value records; the store builds them
//! from rows and nothing mutates them afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Decimal;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    #[error("Unsupported currency: {0:?}")]
    Unsupported(String),
}

/// Declares a store-assigned numeric identity.
///
/// Text form is the plain decimal integer. Parsing rejects anything that is
/// not a non-negative integer.
macro_rules! ledger_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Raw value as stored in the `BIGINT` column
            #[inline]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(IdError::InvalidIdentifier(s.to_string()));
                }
                s.parse::<i64>()
                    .map(Self)
                    .map_err(|_| IdError::InvalidIdentifier(s.to_string()))
            }
        }
    };
}

ledger_id!(
    /// Wallet identity (`wallets.id`)
    WalletId
);

ledger_id!(
    /// Transfer identity (`transfers.id`)
    TransferId
);

/// Supported currency codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Btc,
    Eth,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Btc, Currency::Eth];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Btc => "BTC",
            Currency::Eth => "ETH",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    /// Exact, case-sensitive match on the code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| CurrencyError::Unsupported(s.to_string()))
    }
}

impl Serialize for Currency {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Stored balance in one currency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    pub id: WalletId,
    /// Never negative once committed; see `LedgerStore::decrement_balance`
    pub balance: Decimal,
    /// Fixed at creation
    pub currency: Currency,
}

/// Completed movement of value between two wallets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub id: TransferId,
    pub from: WalletId,
    pub to: WalletId,
    /// Value credited to `to`
    pub amount: Decimal,
    /// Value debited from `from` on top of `amount` and credited nowhere
    pub fee_amount: Decimal,
    /// Assigned by the store at insert time
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer[{}] {} -> {} amount={} fee={}",
            self.id, self.from, self.to, self.amount, self.fee_amount
        )
    }
}
