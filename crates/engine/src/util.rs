//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a stored id, labelling the error with the kind of row it belongs to.
pub(crate) fn parse_id(raw: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(raw).map_err(|_| EngineError::InvalidId(format!("invalid {label} id: {raw}")))
}

pub(crate) fn parse_optional_id(raw: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    raw.map(|raw| parse_id(raw, label)).transpose()
}

/// Trim `value` and reject it when nothing is left.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} required")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn out_of_range(what: &str) -> EngineError {
    EngineError::Validation(format!("{what} out of range"))
}

/// Accepts a caller-supplied amount: non-zero, with an opposite in `i64`.
pub(crate) fn check_amount(amount_minor: i64) -> ResultEngine<i64> {
    match amount_minor {
        0 => Err(EngineError::Validation(
            "amount must be non-zero".to_string(),
        )),
        i64::MIN => Err(out_of_range("amount")),
        amount => Ok(amount),
    }
}

pub(crate) fn negate_amount(amount_minor: i64) -> ResultEngine<i64> {
    amount_minor
        .checked_neg()
        .ok_or_else(|| out_of_range("amount"))
}

/// `amount_minor - previous_minor`, the change an edit applies to a balance.
pub(crate) fn amount_delta(amount_minor: i64, previous_minor: i64) -> ResultEngine<i64> {
    amount_minor
        .checked_sub(previous_minor)
        .ok_or_else(|| out_of_range("amount"))
}

pub(crate) fn shifted_balance(balance_minor: i64, delta_minor: i64) -> ResultEngine<i64> {
    balance_minor
        .checked_add(delta_minor)
        .ok_or_else(|| out_of_range("balance"))
}

/// Net amount moved when a bill is settled with a fee.
///
/// The fee reduces the magnitude and keeps the sign: `-1000` with a fee of
/// `150` moves `-850`. A fee equal to the amount moves nothing.
pub(crate) fn net_of_fee(amount_minor: i64, fee_minor: i64) -> ResultEngine<i64> {
    if fee_minor < 0 {
        return Err(EngineError::Validation("fee must be >= 0".to_string()));
    }
    let magnitude = amount_minor.unsigned_abs();
    let fee = fee_minor.unsigned_abs();
    if fee > magnitude {
        return Err(EngineError::Validation(
            "fee exceeds the bill amount".to_string(),
        ));
    }
    let net = i64::try_from(magnitude - fee).map_err(|_| out_of_range("amount"))?;
    Ok(if amount_minor < 0 { -net } else { net })
}
