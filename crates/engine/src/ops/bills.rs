use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use crate::{
    Bill, BillFields, BillStatus, CurrencyCode, EngineError, PendingBillsFilter, ResultEngine,
    closed_bills, pending_bills, persons, util::normalize_optional_text, validate_bill_fields,
};

use super::{Engine, with_tx};

/// One page of pending bills plus the filter that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingBillsPage {
    pub bills: Vec<Bill>,
    /// Number of bills matching the filter, ignoring `limit`/`offset`.
    pub total_count: u64,
    pub person_id_filter: Uuid,
    pub limit: u64,
    pub offset: u64,
}

impl Engine {
    /// Runs the field validator against the currency registry and checks that
    /// the person exists.
    async fn checked_bill_fields<C: ConnectionTrait>(
        &self,
        conn: &C,
        fields: &BillFields,
    ) -> ResultEngine<CurrencyCode> {
        let registered = self.currency_registered(conn, &fields.currency).await?;
        let currency = validate_bill_fields(fields, registered)?;
        self.require_person(conn, fields.person_id).await?;
        Ok(currency)
    }

    pub(super) async fn with_person_name<C: ConnectionTrait>(
        &self,
        conn: &C,
        mut bill: Bill,
    ) -> Bill {
        bill.person_name = self.person_name(conn, bill.person_id).await;
        bill
    }

    /// Looks a bill up in both tables.
    pub(super) async fn find_bill<C: ConnectionTrait>(
        &self,
        conn: &C,
        bill_id: Uuid,
    ) -> ResultEngine<Option<Bill>> {
        if let Some(model) = pending_bills::Entity::find_by_id(bill_id.to_string())
            .one(conn)
            .await?
        {
            return Bill::try_from(model).map(Some);
        }
        closed_bills::Entity::find_by_id(bill_id.to_string())
            .one(conn)
            .await?
            .map(Bill::try_from)
            .transpose()
    }

    pub(super) async fn require_pending_bill<C: ConnectionTrait>(
        &self,
        conn: &C,
        bill_id: Uuid,
    ) -> ResultEngine<Bill> {
        let bill = self
            .find_bill(conn, bill_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("bill not exists".to_string()))?;
        if !bill.is_pending() {
            return Err(EngineError::BillNotPending(bill_id.to_string()));
        }
        Ok(bill)
    }

    /// Creates a pending bill.
    ///
    /// The person display name is attached after the insert; a failure to
    /// resolve it leaves the name empty.
    pub async fn create_pending_bill(&self, fields: BillFields) -> ResultEngine<Bill> {
        with_tx!(self, |db_tx| {
            let currency = self.checked_bill_fields(&db_tx, &fields).await?;
            let now = Utc::now();
            let bill = Bill {
                id: Uuid::new_v4(),
                person_id: fields.person_id,
                person_name: String::new(),
                status: BillStatus::Pending,
                date: fields.date,
                description: fields.description.trim().to_string(),
                currency,
                amount_minor: fields.amount_minor,
                closed_by: None,
                notes: None,
                parent_transaction_id: None,
                parent_bill_cross_id: None,
                created_at: now,
                updated_at: now,
            };
            pending_bills::ActiveModel::from(&bill)
                .insert(&db_tx)
                .await?;
            tracing::debug!(bill_id = %bill.id, amount_minor = bill.amount_minor, "pending bill created");

            Ok(self.with_person_name(&db_tx, bill).await)
        })
    }

    /// Return a bill, pending or closed.
    pub async fn bill(&self, bill_id: Uuid) -> ResultEngine<Bill> {
        let bill = self
            .find_bill(&self.database, bill_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("bill not exists".to_string()))?;
        Ok(self.with_person_name(&self.database, bill).await)
    }

    /// Replaces the mutable fields of a pending bill.
    ///
    /// The currency of a bill never changes: `fields.currency` must repeat the
    /// stored one.
    pub async fn update_pending_bill(&self, bill_id: Uuid, fields: BillFields) -> ResultEngine<Bill> {
        with_tx!(self, |db_tx| {
            let existing = self.require_pending_bill(&db_tx, bill_id).await?;
            let currency = self.checked_bill_fields(&db_tx, &fields).await?;
            if currency != existing.currency {
                return Err(EngineError::Validation(format!(
                    "currency of a bill cannot be changed (is {}, got {currency})",
                    existing.currency
                )));
            }

            let active = pending_bills::ActiveModel {
                id: ActiveValue::Set(bill_id.to_string()),
                person_id: ActiveValue::Set(fields.person_id.to_string()),
                date: ActiveValue::Set(fields.date),
                description: ActiveValue::Set(fields.description.trim().to_string()),
                amount_minor: ActiveValue::Set(fields.amount_minor),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            let bill = Bill::try_from(model)?;
            Ok(self.with_person_name(&db_tx, bill).await)
        })
    }

    /// Deletes a pending bill and returns its id.
    pub async fn delete_pending_bill(&self, bill_id: Uuid) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            let res = pending_bills::Entity::delete_by_id(bill_id.to_string())
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                let closed = closed_bills::Entity::find_by_id(bill_id.to_string())
                    .one(&db_tx)
                    .await?;
                return Err(match closed {
                    Some(_) => EngineError::BillNotPending(bill_id.to_string()),
                    None => EngineError::KeyNotFound("bill not exists".to_string()),
                });
            }
            Ok(bill_id)
        })
    }

    /// Lists pending bills newest first.
    ///
    /// Positive amounts are "to charge", negative ones "to pay"; turning both
    /// off is a caller error. Count and page are read in the same DB
    /// transaction.
    pub async fn list_pending_bills(
        &self,
        filter: &PendingBillsFilter,
    ) -> ResultEngine<PendingBillsPage> {
        if !filter.to_pay && !filter.to_charge {
            return Err(EngineError::EmptyRequest);
        }

        let mut condition = Condition::all();
        if !filter.person_id.is_nil() {
            condition = condition.add(pending_bills::Column::PersonId.eq(filter.person_id.to_string()));
        }
        if !filter.to_pay {
            condition = condition.add(pending_bills::Column::AmountMinor.gt(0));
        }
        if !filter.to_charge {
            condition = condition.add(pending_bills::Column::AmountMinor.lt(0));
        }

        with_tx!(self, |db_tx| {
            let total_count = pending_bills::Entity::find()
                .filter(condition.clone())
                .count(&db_tx)
                .await?;

            let rows = pending_bills::Entity::find()
                .filter(condition)
                .order_by_desc(pending_bills::Column::CreatedAt)
                .order_by_desc(pending_bills::Column::Id)
                .limit(filter.limit)
                .offset(filter.offset)
                .all(&db_tx)
                .await?;

            let mut bills = rows
                .into_iter()
                .map(Bill::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let names = self
                .person_names(&db_tx, bills.iter().map(|b| b.person_id))
                .await;
            for bill in &mut bills {
                bill.person_name = names.get(&bill.person_id).cloned().unwrap_or_default();
            }

            Ok(PendingBillsPage {
                bills,
                total_count,
                person_id_filter: filter.person_id,
                limit: filter.limit,
                offset: filter.offset,
            })
        })
    }

    /// Resolves several display names at once; unknown ids are left out.
    async fn person_names<C: ConnectionTrait>(
        &self,
        conn: &C,
        ids: impl Iterator<Item = Uuid>,
    ) -> HashMap<Uuid, String> {
        let mut ids: Vec<String> = ids.map(|id| id.to_string()).collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return HashMap::new();
        }

        match persons::Entity::find()
            .filter(persons::Column::Id.is_in(ids))
            .all(conn)
            .await
        {
            Ok(rows) => rows
                .into_iter()
                .filter_map(|p| Uuid::parse_str(&p.id).ok().map(|id| (id, p.name)))
                .collect(),
            Err(err) => {
                tracing::warn!("failed to resolve person names: {err}");
                HashMap::new()
            }
        }
    }

    /// Sets or clears the notes of a closed bill, the only field that can
    /// change after closure.
    pub async fn set_closed_bill_notes(
        &self,
        bill_id: Uuid,
        notes: Option<&str>,
    ) -> ResultEngine<Bill> {
        let notes = normalize_optional_text(notes);
        with_tx!(self, |db_tx| {
            let Some(_) = closed_bills::Entity::find_by_id(bill_id.to_string())
                .one(&db_tx)
                .await?
            else {
                let pending = pending_bills::Entity::find_by_id(bill_id.to_string())
                    .one(&db_tx)
                    .await?;
                return Err(match pending {
                    Some(_) => EngineError::Validation(
                        "notes can only be set on closed bills".to_string(),
                    ),
                    None => EngineError::KeyNotFound("bill not exists".to_string()),
                });
            };

            let active = closed_bills::ActiveModel {
                id: ActiveValue::Set(bill_id.to_string()),
                notes: ActiveValue::Set(notes),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            let bill = Bill::try_from(model)?;
            Ok(self.with_person_name(&db_tx, bill).await)
        })
    }

    /// Deletes every pending and closed bill. Returns the number of rows
    /// removed.
    ///
    /// Destructive maintenance operation: it is only reachable from the admin
    /// CLI.
    pub async fn empty_all_bills(&self) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let pending = pending_bills::Entity::delete_many().exec(&db_tx).await?;
            let closed = closed_bills::Entity::delete_many().exec(&db_tx).await?;
            tracing::warn!(
                pending = pending.rows_affected,
                closed = closed.rows_affected,
                "all bills deleted"
            );
            Ok(pending.rows_affected + closed.rows_affected)
        })
    }
}
