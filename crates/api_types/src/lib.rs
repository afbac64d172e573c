use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response body of delete endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub id: Uuid,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Stable machine-readable code, e.g. `VA001`.
    pub code: String,
}

pub mod bill {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BillStatus {
        Pending,
        Closed,
    }

    /// What settled a closed bill.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case", tag = "kind", content = "id")]
    pub enum ClosedBy {
        Transaction(Uuid),
        BillCross(Uuid),
        RevertTransaction(Uuid),
    }

    /// Request body for creating or replacing a pending bill.
    ///
    /// On update the currency must repeat the stored one.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillFields {
        pub person_id: Uuid,
        pub date: NaiveDate,
        pub description: String,
        /// Three uppercase letters, registered beforehand.
        pub currency: String,
        /// Signed, in minor units: positive to charge, negative to pay.
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillView {
        pub id: Uuid,
        pub person_id: Uuid,
        pub person_name: String,
        pub status: BillStatus,
        pub date: NaiveDate,
        pub description: String,
        pub currency: String,
        pub amount_minor: i64,
        pub closed_by: Option<ClosedBy>,
        pub notes: Option<String>,
        pub parent_transaction_id: Option<Uuid>,
        pub parent_bill_cross_id: Option<Uuid>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Query string of the pending bills list. Both flags default to `true`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PendingBillsQuery {
        pub to_pay: Option<bool>,
        pub to_charge: Option<bool>,
        pub limit: Option<u64>,
        pub offset: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingBillsPage {
        pub bills: Vec<BillView>,
        /// Matches ignoring `limit`/`offset`.
        pub count: u64,
        pub filter_person_id: Uuid,
        pub limit: u64,
        pub offset: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillClose {
        pub account_id: Uuid,
        pub person_account_id: Option<Uuid>,
        pub date: NaiveDate,
        /// Optional: defaults to 0. Must not exceed the bill amount.
        pub fee_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillRevert {
        /// Optional: if absent, server uses today.
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillNotes {
        /// `null` or blank clears the notes.
        pub notes: Option<String>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Uuid,
        pub person_id: Uuid,
        pub person_account_id: Option<Uuid>,
        pub date: NaiveDate,
        /// Signed, in minor units; positive increases the account balance.
        pub amount_minor: i64,
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub date: NaiveDate,
        pub amount_minor: i64,
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionRevert {
        /// Optional: if absent, server uses today.
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub person_id: Uuid,
        pub person_name: String,
        pub person_account_id: Option<Uuid>,
        pub date: NaiveDate,
        pub amount_minor: i64,
        pub description: String,
        /// Account balance right after this transaction.
        pub balance_minor: i64,
        pub sequence: i64,
        pub reverted_transaction_id: Option<Uuid>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}
