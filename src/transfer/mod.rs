//! Atomic fund transfer
//!
//! Validates a transfer request, computes the fee, debits the source,
//! credits the destination and records the transfer, all on one
//! caller-supplied transactional handle.
//!
//! # Safety Invariants
//!
//! 1. **Conservation**: source loses exactly `amount + fee`, destination
//!    gains exactly `amount`; the fee is credited nowhere.
//! 2. **All or nothing**: the three writes share the caller's transaction;
//!    any `Err` means the caller rolls back.
//! 3. **Never negative**: validation checks the balance first, and the
//!    store's guarded decrement refuses to go below zero anyway.
//! 4. **Same currency**: source and destination currencies match exactly.

pub mod engine;
pub mod error;

pub use engine::{TransferParams, TransferResult, transfer_funds};
pub use error::{RejectReason, TransferError, TransferStep};
