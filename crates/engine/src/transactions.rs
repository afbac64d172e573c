//! Ledger transaction primitives.
//!
//! A `Transaction` is a signed movement of money against one money account.
//! Each row carries the balance of the account right after it was applied, so
//! the account history can be audited without replaying it.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub person_id: Uuid,
    /// Resolved from the person directory when read; empty if unavailable.
    pub person_name: String,
    pub person_account_id: Option<Uuid>,
    pub date: NaiveDate,
    pub amount_minor: i64,
    pub description: String,
    /// Account balance immediately after this transaction.
    pub balance_minor: i64,
    /// Position of the transaction in its account history, starting at 1.
    pub sequence: i64,
    /// Set on inverse transactions created by a revert.
    pub reverted_transaction_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub person_id: String,
    pub person_account_id: Option<String>,
    pub date: Date,
    pub amount_minor: i64,
    pub description: String,
    pub balance_minor: i64,
    pub sequence: i64,
    pub reverted_transaction_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::money_accounts::Entity",
        from = "Column::AccountId",
        to = "super::money_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    MoneyAccounts,
    #[sea_orm(
        belongs_to = "super::persons::Entity",
        from = "Column::PersonId",
        to = "super::persons::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Persons,
}

impl Related<super::money_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MoneyAccounts.def()
    }
}

impl Related<super::persons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Persons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            person_id: ActiveValue::Set(tx.person_id.to_string()),
            person_account_id: ActiveValue::Set(tx.person_account_id.map(|id| id.to_string())),
            date: ActiveValue::Set(tx.date),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            description: ActiveValue::Set(tx.description.clone()),
            balance_minor: ActiveValue::Set(tx.balance_minor),
            sequence: ActiveValue::Set(tx.sequence),
            reverted_transaction_id: ActiveValue::Set(
                tx.reverted_transaction_id.map(|id| id.to_string()),
            ),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: crate::parse_id(&model.id, "transaction")?,
            account_id: crate::parse_id(&model.account_id, "money account")?,
            person_id: crate::parse_id(&model.person_id, "person")?,
            person_name: String::new(),
            person_account_id: model
                .person_account_id
                .as_deref()
                .map(|id| crate::parse_id(id, "person account"))
                .transpose()?,
            date: model.date,
            amount_minor: model.amount_minor,
            description: model.description,
            balance_minor: model.balance_minor,
            sequence: model.sequence,
            reverted_transaction_id: model
                .reverted_transaction_id
                .as_deref()
                .map(|id| crate::parse_id(id, "transaction"))
                .transpose()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
