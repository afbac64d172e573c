//! Bill closing: moving a bill between the pending and closed tables while the
//! ledger records the money.
//!
//! A bill lives in exactly one of the two tables. Each step below deletes from
//! one table and inserts into the other inside the caller's DB transaction, so
//! a concurrent close of the same bill sees `rows_affected == 0` and fails.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, TransactionTrait};

use crate::{
    Bill, BillStatus, CloseBill, ClosedBy, EngineError, LedgerEntry, ResultEngine,
    closed_bills::{self, closed_row},
    money_accounts, pending_bills,
    util::net_of_fee,
};

use super::{Engine, with_tx};

impl Engine {
    /// Settles a pending bill against a money account.
    ///
    /// The account receives `amount - fee` (sign kept) as a new transaction and
    /// the bill moves to the closed table linked to it. The account currency
    /// must match the bill currency. A person account, when given, must belong
    /// to the bill's person.
    pub async fn close_bill(&self, bill_id: Uuid, cmd: CloseBill) -> ResultEngine<Bill> {
        with_tx!(self, |db_tx| {
            let bill = self.require_pending_bill(&db_tx, bill_id).await?;

            let account = money_accounts::Entity::find_by_id(cmd.account_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("money account not exists".to_string())
                })?;
            if account.currency != bill.currency.as_str() {
                return Err(EngineError::CurrencyMismatch(format!(
                    "bill is in {}, account {} is in {}",
                    bill.currency, cmd.account_id, account.currency
                )));
            }
            let amount_minor = net_of_fee(bill.amount_minor, cmd.fee_minor)?;

            let removed = pending_bills::Entity::delete_by_id(bill_id.to_string())
                .exec(&db_tx)
                .await?;
            if removed.rows_affected == 0 {
                return Err(EngineError::BillNotPending(bill_id.to_string()));
            }

            let mut entry = LedgerEntry::new(
                cmd.account_id,
                bill.person_id,
                cmd.date,
                amount_minor,
                bill.description.clone(),
            );
            entry.person_account_id = cmd.person_account_id;
            let tx = self.append_in_tx(&db_tx, &entry, None).await?;

            let mut closed = bill;
            closed.status = BillStatus::Closed;
            closed.closed_by = Some(ClosedBy::Transaction(tx.id));
            closed.updated_at = Utc::now();
            let model = closed_row(&closed, ClosedBy::Transaction(tx.id))
                .insert(&db_tx)
                .await?;

            tracing::info!(
                %bill_id,
                transaction_id = %tx.id,
                amount_minor,
                fee_minor = cmd.fee_minor,
                "bill closed"
            );
            let bill = Bill::try_from(model)?;
            Ok(self.with_person_name(&db_tx, bill).await)
        })
    }

    /// Reverts the settlement of a closed bill.
    ///
    /// The settling transaction gets its inverse and a new pending bill, child
    /// of that transaction, is returned. The closed bill stays as history.
    pub async fn revert_closed_bill(&self, bill_id: Uuid, date: NaiveDate) -> ResultEngine<Bill> {
        with_tx!(self, |db_tx| {
            let bill = self
                .find_bill(&db_tx, bill_id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("bill not exists".to_string()))?;
            let Some(transaction_id) = bill.closed_by.and_then(ClosedBy::transaction_id)
            else {
                return Err(match bill.status {
                    BillStatus::Pending => EngineError::Validation(
                        "only closed bills can be reverted".to_string(),
                    ),
                    BillStatus::Closed => EngineError::NotRevertible(format!(
                        "bill {bill_id} was not settled by a transaction"
                    )),
                });
            };

            let (_inverse, reopened) = self.revert_in_tx(&db_tx, transaction_id, date).await?;
            let reopened = reopened.ok_or_else(|| {
                EngineError::NotRevertible(format!("bill {bill_id} has no settlement to revert"))
            })?;
            Ok(self.with_person_name(&db_tx, reopened).await)
        })
    }

    /// Moves a closed bill back to the pending table under the same id.
    ///
    /// Used when its settling transaction is deleted; the notes are dropped
    /// with the closure.
    pub(super) async fn reopen_closed_bill(
        &self,
        db_tx: &DatabaseTransaction,
        closed: closed_bills::Model,
    ) -> ResultEngine<Bill> {
        let mut bill = Bill::try_from(closed)?;
        closed_bills::Entity::delete_by_id(bill.id.to_string())
            .exec(db_tx)
            .await?;

        bill.status = BillStatus::Pending;
        bill.closed_by = None;
        bill.notes = None;
        bill.updated_at = Utc::now();
        pending_bills::ActiveModel::from(&bill).insert(db_tx).await?;

        tracing::info!(bill_id = %bill.id, "closed bill reopened");
        Ok(bill)
    }

    /// Opens the pending bill that replaces `closed` after its settlement
    /// `transaction_id` was reverted.
    pub(super) async fn open_follow_up_bill(
        &self,
        db_tx: &DatabaseTransaction,
        closed: closed_bills::Model,
        transaction_id: Uuid,
    ) -> ResultEngine<Bill> {
        let closed = Bill::try_from(closed)?;
        let now = Utc::now();
        let bill = Bill {
            id: Uuid::new_v4(),
            person_id: closed.person_id,
            person_name: String::new(),
            status: BillStatus::Pending,
            date: closed.date,
            description: closed.description,
            currency: closed.currency,
            amount_minor: closed.amount_minor,
            closed_by: None,
            notes: None,
            parent_transaction_id: Some(transaction_id),
            parent_bill_cross_id: None,
            created_at: now,
            updated_at: now,
        };
        pending_bills::ActiveModel::from(&bill).insert(db_tx).await?;

        tracing::debug!(bill_id = %bill.id, parent_bill_id = %closed.id, "follow-up bill opened");
        Ok(bill)
    }
}
