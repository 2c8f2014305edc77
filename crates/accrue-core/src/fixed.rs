// crates/accrue-core/src/fixed.rs
//
// 18-decimal fixed-point math over 256-bit integers.
//
// Token amounts and the rebase index share the same scale: 1 token = 10^18
// wei and an index of 1.0 is 10^18. Every product is computed at 512 bits.
// Conversions that credit a holder truncate; the share cost of a debit
// rounds up, so no conversion ever rounds in the holder's favour.

use crate::error::AccrueError;

pub use primitive_types::{U256, U512};

/// Number of decimals for token amounts and the rebase index.
pub const DECIMALS: usize = 18;

/// Fixed-point 1.0 (10^18). Also the number of wei in one token.
pub const INDEX_ONE: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// Compute `a * b / denom` with a 512-bit intermediate, truncating.
///
/// # Errors
/// Returns `AccrueError::Overflow` if `denom` is zero or the quotient does not
/// fit in 256 bits.
pub fn mul_div(a: U256, b: U256, denom: U256) -> Result<U256, AccrueError> {
    if denom.is_zero() {
        return Err(AccrueError::Overflow("division by zero".to_string()));
    }
    let quotient = a.full_mul(b) / U512::from(denom);
    U256::try_from(quotient)
        .map_err(|_| AccrueError::Overflow(format!("{} * {} / {} exceeds 256 bits", a, b, denom)))
}

/// Compute `ceil(a * b / denom)` with a 512-bit intermediate.
pub fn mul_div_up(a: U256, b: U256, denom: U256) -> Result<U256, AccrueError> {
    if denom.is_zero() {
        return Err(AccrueError::Overflow("division by zero".to_string()));
    }
    let product = a.full_mul(b);
    let denom = U512::from(denom);
    let mut quotient = product / denom;
    if !(product % denom).is_zero() {
        quotient = quotient + U512::one();
    }
    U256::try_from(quotient)
        .map_err(|_| AccrueError::Overflow(format!("{} * {} / {} exceeds 256 bits", a, b, denom)))
}

/// Displayed token amount of `shares` at `index`: `shares * index / 1e18`.
pub fn shares_to_amount(shares: U256, index: U256) -> Result<U256, AccrueError> {
    mul_div(shares, index, INDEX_ONE)
}

/// Shares worth `amount` at `index`: `amount * 1e18 / index`.
pub fn amount_to_shares(amount: U256, index: U256) -> Result<U256, AccrueError> {
    mul_div(amount, INDEX_ONE, index)
}

/// Shares that must be removed to debit `amount` at `index`, rounded up.
pub fn amount_to_shares_up(amount: U256, index: U256) -> Result<U256, AccrueError> {
    mul_div_up(amount, INDEX_ONE, index)
}

/// Checked addition with a labelled overflow error.
pub fn checked_add(a: U256, b: U256, what: &str) -> Result<U256, AccrueError> {
    a.checked_add(b)
        .ok_or_else(|| AccrueError::Overflow(format!("{} overflowed adding {} to {}", what, b, a)))
}

/// Checked subtraction with a labelled underflow error.
pub fn checked_sub(a: U256, b: U256, what: &str) -> Result<U256, AccrueError> {
    a.checked_sub(b)
        .ok_or_else(|| {
            AccrueError::Overflow(format!("{} underflowed subtracting {} from {}", what, b, a))
        })
}

/// Parse a decimal string with up to 18 fractional digits into wei.
///
/// `"1.5"` parses to `1_500_000_000_000_000_000`. The literal `"max"` parses
/// to `U256::MAX`.
///
/// # Example
/// ```
/// use accrue_core::fixed::{parse_units, INDEX_ONE};
/// assert_eq!(parse_units("1").unwrap(), INDEX_ONE);
/// ```
pub fn parse_units(s: &str) -> Result<U256, AccrueError> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("max") {
        return Ok(U256::MAX);
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(AccrueError::Serialization(format!("Invalid decimal amount: {:?}", s)));
    }
    if frac.len() > DECIMALS {
        return Err(AccrueError::Serialization(format!(
            "Amount {} has more than {} decimal places",
            s, DECIMALS
        )));
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(AccrueError::Serialization(format!("Invalid decimal amount: {:?}", s)));
    }

    let whole_part = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole)
            .map_err(|e| AccrueError::Serialization(format!("Invalid amount {}: {:?}", s, e)))?
    };
    let padded = format!("{:0<width$}", frac, width = DECIMALS);
    let frac_part = U256::from_dec_str(&padded)
        .map_err(|e| AccrueError::Serialization(format!("Invalid amount {}: {:?}", s, e)))?;

    let scaled = whole_part
        .checked_mul(INDEX_ONE)
        .ok_or_else(|| AccrueError::Overflow(format!("Amount {} exceeds 256 bits", s)))?;
    checked_add(scaled, frac_part, "amount")
}

/// Format wei as a decimal string, trimming trailing zeros.
///
/// Inverse of [`parse_units`]; `U256::MAX` formats as `"max"`.
pub fn format_units(value: U256) -> String {
    if value == U256::MAX {
        return "max".to_string();
    }
    let whole = value / INDEX_ONE;
    let frac = (value % INDEX_ONE).low_u64();
    if frac == 0 {
        format!("{}", whole)
    } else {
        let frac_str = format!("{:018}", frac);
        let trimmed = frac_str.trim_end_matches('0');
        format!("{}.{}", whole, trimmed)
    }
}

/// Serde adapter that reads and writes `U256` as a decimal unit string
/// (`"1.25"`), for human-edited configuration.
pub mod units {
    use super::{format_units, parse_units, U256};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_units(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_units(&s).map_err(de::Error::custom)
    }
}
