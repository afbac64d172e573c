//! `closed_bills` table.
//!
//! Same columns as `pending_bills`, plus the settlement links, the status and
//! post-closure notes.

use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{Bill, BillStatus, ClosedBy};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "closed_bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub person_id: String,
    pub date: Date,
    pub description: String,
    pub currency: String,
    pub amount_minor: i64,
    pub status: String,
    pub transaction_id: Option<String>,
    pub bill_cross_id: Option<String>,
    pub revert_transaction_id: Option<String>,
    pub notes: Option<String>,
    pub parent_transaction_id: Option<String>,
    pub parent_bill_cross_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::persons::Entity",
        from = "Column::PersonId",
        to = "super::persons::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Persons,
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Transactions,
}

impl Related<super::persons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Persons.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Builds the closed row for `bill` settled by `closed_by`.
pub(crate) fn closed_row(bill: &Bill, closed_by: ClosedBy) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(bill.id.to_string()),
        person_id: ActiveValue::Set(bill.person_id.to_string()),
        date: ActiveValue::Set(bill.date),
        description: ActiveValue::Set(bill.description.clone()),
        currency: ActiveValue::Set(bill.currency.to_string()),
        amount_minor: ActiveValue::Set(bill.amount_minor),
        status: ActiveValue::Set(BillStatus::Closed.as_str().to_string()),
        transaction_id: ActiveValue::Set(closed_by.transaction_id().map(|id| id.to_string())),
        bill_cross_id: ActiveValue::Set(closed_by.bill_cross_id().map(|id| id.to_string())),
        revert_transaction_id: ActiveValue::Set(
            closed_by.revert_transaction_id().map(|id| id.to_string()),
        ),
        notes: ActiveValue::Set(bill.notes.clone()),
        parent_transaction_id: ActiveValue::Set(
            bill.parent_transaction_id.map(|id| id.to_string()),
        ),
        parent_bill_cross_id: ActiveValue::Set(
            bill.parent_bill_cross_id.map(|id| id.to_string()),
        ),
        created_at: ActiveValue::Set(bill.created_at),
        updated_at: ActiveValue::Set(bill.updated_at),
    }
}
