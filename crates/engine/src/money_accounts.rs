//! The module contains `MoneyAccount` struct and its implementation.

use chrono::{DateTime, Utc};

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CurrencyCode, EngineError};

/// A money account.
///
/// A money account is a cash box, a bank account or anything else where the
/// business keeps money. Its `balance` is the authoritative running total and
/// only moves through ledger transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyAccount {
    pub id: Uuid,
    pub name: String,
    pub details: String,
    pub currency: CurrencyCode,
    /// Balance in minor units.
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MoneyAccount {
    pub fn new(name: String, details: String, currency: CurrencyCode) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            details,
            currency,
            balance: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "money_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub details: String,
    pub currency: String,
    pub balance: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(
        belongs_to = "super::currency::Entity",
        from = "Column::Currency",
        to = "super::currency::Column::Code",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Currencies,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::currency::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currencies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&MoneyAccount> for ActiveModel {
    fn from(value: &MoneyAccount) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            details: ActiveValue::Set(value.details.clone()),
            currency: ActiveValue::Set(value.currency.to_string()),
            balance: ActiveValue::Set(value.balance),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for MoneyAccount {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: crate::parse_id(&model.id, "money account")?,
            name: model.name,
            details: model.details,
            currency: CurrencyCode::parse(&model.currency)?,
            balance: model.balance,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
