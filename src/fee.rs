//! Fee calculation
//!
//! Fee rates are percentages: `1.5` means 1.5% of the transferred amount.

use crate::money::Decimal;

/// Fee rate used when the configuration does not name one (1.5%)
pub const DEFAULT_FEE_RATE: &str = "1.5";

/// Calculate the fee retained on a transfer of `amount`.
///
/// `fee = amount / 100 * rate`, in exactly that order so rounding is
/// reproducible. `None` on overflow.
///
/// # Example
/// ```
/// use walletdb::fee::calculate_fee;
/// use walletdb::money::Decimal;
///
/// let fee = calculate_fee(Decimal::parse("10.00")?, Decimal::parse("1.5")?);
/// assert_eq!(fee, Some(Decimal::parse("0.15")?));
/// # Ok::<(), walletdb::money::MoneyError>(())
/// ```
#[inline]
pub fn calculate_fee(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount
        .checked_div(Decimal::ONE_HUNDRED)?
        .checked_mul(rate)
}

/// `amount + fee`: what the source wallet pays. `None` on overflow.
#[inline]
pub fn total_debit(amount: Decimal, rate: Decimal) -> Option<(Decimal, Decimal)> {
    let fee = calculate_fee(amount, rate)?;
    Some((fee, amount.checked_add(fee)?))
}
