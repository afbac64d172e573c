//! The module contains the errors the engine can throw.
//!
//! Every failure of a bookkeeping operation is one of the variants of
//! [`EngineError`]. Store errors are wrapped in [`Database`]; "no row" results
//! are turned into [`KeyNotFound`] where the query is issued, so callers never
//! have to inspect driver messages.
//!
//!  [`Database`]: EngineError::Database
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A field failed a business rule (empty description, zero amount, ...).
    #[error("{0}")]
    Validation(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("person not found: {0}")]
    PersonNotFound(String),
    #[error("currency not registered: {0}")]
    CurrencyNotRegistered(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    /// Listing pending bills with both `to_pay` and `to_charge` disabled.
    #[error("at least one of to_pay and to_charge must be requested")]
    EmptyRequest,
    #[error("bill is not pending: {0}")]
    BillNotPending(String),
    #[error("transaction {0} is not the last transaction of its account")]
    NotLastTransaction(String),
    #[error("transaction cannot be reverted: {0}")]
    NotRevertible(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::PersonNotFound(a), Self::PersonNotFound(b)) => a == b,
            (Self::CurrencyNotRegistered(a), Self::CurrencyNotRegistered(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::EmptyRequest, Self::EmptyRequest) => true,
            (Self::BillNotPending(a), Self::BillNotPending(b)) => a == b,
            (Self::NotLastTransaction(a), Self::NotLastTransaction(b)) => a == b,
            (Self::NotRevertible(a), Self::NotRevertible(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
