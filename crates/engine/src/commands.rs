//! Command structs for engine operations.
//!
//! These types group parameters for write and list operations, keeping call
//! sites readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

/// Append a ledger entry to a money account.
#[derive(Clone, Debug)]
pub struct LedgerEntry {
    pub account_id: Uuid,
    pub person_id: Uuid,
    pub person_account_id: Option<Uuid>,
    pub date: NaiveDate,
    /// Signed amount in minor units; positive increases the balance.
    pub amount_minor: i64,
    pub description: String,
}

impl LedgerEntry {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        person_id: Uuid,
        date: NaiveDate,
        amount_minor: i64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            person_id,
            person_account_id: None,
            date,
            amount_minor,
            description: description.into(),
        }
    }

    #[must_use]
    pub fn person_account_id(mut self, person_account_id: Uuid) -> Self {
        self.person_account_id = Some(person_account_id);
        self
    }
}

/// Edit the last transaction of an account.
#[derive(Clone, Debug)]
pub struct TransactionUpdate {
    pub date: NaiveDate,
    pub amount_minor: i64,
    pub description: String,
}

/// Settle a pending bill against a money account.
#[derive(Clone, Debug)]
pub struct CloseBill {
    pub account_id: Uuid,
    pub person_account_id: Option<Uuid>,
    pub date: NaiveDate,
    /// Fee retained on the movement, in minor units. Must be within
    /// `0..=|amount|`.
    pub fee_minor: i64,
}

impl CloseBill {
    #[must_use]
    pub fn new(account_id: Uuid, date: NaiveDate) -> Self {
        Self {
            account_id,
            person_account_id: None,
            date,
            fee_minor: 0,
        }
    }

    #[must_use]
    pub fn person_account_id(mut self, person_account_id: Uuid) -> Self {
        self.person_account_id = Some(person_account_id);
        self
    }

    #[must_use]
    pub fn fee_minor(mut self, fee_minor: i64) -> Self {
        self.fee_minor = fee_minor;
        self
    }
}

/// Filters for listing pending bills.
///
/// A nil `person_id` lists bills of every person.
#[derive(Clone, Debug)]
pub struct PendingBillsFilter {
    pub person_id: Uuid,
    /// Include negative-amount bills.
    pub to_pay: bool,
    /// Include positive-amount bills.
    pub to_charge: bool,
    pub limit: u64,
    pub offset: u64,
}

impl Default for PendingBillsFilter {
    fn default() -> Self {
        Self {
            person_id: Uuid::nil(),
            to_pay: true,
            to_charge: true,
            limit: 50,
            offset: 0,
        }
    }
}
