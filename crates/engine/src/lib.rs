//! Bookkeeping engine: bills, ledger transactions and money accounts.
//!
//! The [`Engine`] owns a database handle and exposes every bookkeeping
//! operation as an async method. Each operation that touches more than one
//! row runs inside a single database transaction.

pub use bills::{Bill, BillFields, BillStatus, ClosedBy, validate_bill_fields};
pub use commands::{CloseBill, LedgerEntry, PendingBillsFilter, TransactionUpdate};
pub use currency::{Currency, CurrencyCode};
pub use error::EngineError;
pub use money_accounts::MoneyAccount;
pub use ops::{Engine, EngineBuilder, PendingBillsPage};
pub use person_accounts::PersonAccount;
pub use persons::Person;
pub use transactions::Transaction;

pub(crate) use util::{parse_id, parse_optional_id};

mod bills;
mod closed_bills;
mod commands;
mod currency;
mod error;
mod money_accounts;
mod ops;
mod pending_bills;
mod person_accounts;
mod persons;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
