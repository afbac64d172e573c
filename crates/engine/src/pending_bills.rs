//! `pending_bills` table.

use sea_orm::{ActiveValue, entity::prelude::*};

use crate::Bill;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pending_bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub person_id: String,
    pub date: Date,
    pub description: String,
    pub currency: String,
    pub amount_minor: i64,
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
}

impl Related<super::persons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Persons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Bill> for ActiveModel {
    fn from(bill: &Bill) -> Self {
        Self {
            id: ActiveValue::Set(bill.id.to_string()),
            person_id: ActiveValue::Set(bill.person_id.to_string()),
            date: ActiveValue::Set(bill.date),
            description: ActiveValue::Set(bill.description.clone()),
            currency: ActiveValue::Set(bill.currency.to_string()),
            amount_minor: ActiveValue::Set(bill.amount_minor),
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
}
