//! Ledger: signed transactions against money accounts.
//!
//! Every write keeps two values in step inside one DB transaction: the
//! account `balance` and the `balance_minor` snapshot of the transaction row.
//! Only the last transaction of an account (highest `sequence`) may be edited
//! or deleted; older history is corrected with a revert.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};

use crate::{
    EngineError, LedgerEntry, ResultEngine, Transaction, TransactionUpdate, closed_bills,
    money_accounts, pending_bills, person_accounts, transactions,
    util::{amount_delta, check_amount, negate_amount, normalize_required_text, shifted_balance},
};

use super::{Engine, with_tx};

impl Engine {
    async fn last_transaction_model<C: ConnectionTrait>(
        &self,
        conn: &C,
        account_id: &str,
    ) -> ResultEngine<Option<transactions::Model>> {
        Ok(transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id))
            .order_by_desc(transactions::Column::Sequence)
            .one(conn)
            .await?)
    }

    async fn require_transaction<C: ConnectionTrait>(
        &self,
        conn: &C,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id.to_string())
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
    }

    /// Fails with `NotLastTransaction` unless `model` is the newest row of its
    /// account.
    async fn require_last<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: &transactions::Model,
    ) -> ResultEngine<()> {
        let last = self.last_transaction_model(conn, &model.account_id).await?;
        match last {
            Some(last) if last.id == model.id => Ok(()),
            _ => Err(EngineError::NotLastTransaction(model.id.clone())),
        }
    }

    /// Adds `delta_minor` to the account balance and returns the new balance.
    ///
    /// A balance that would leave the `i64` range is refused before the
    /// update: SQLite would otherwise store it as a REAL.
    async fn shift_account_balance(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        delta_minor: i64,
    ) -> ResultEngine<i64> {
        let account = money_accounts::Entity::find_by_id(account_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("money account not exists".to_string()))?;
        shifted_balance(account.balance, delta_minor)?;

        let res = money_accounts::Entity::update_many()
            .col_expr(
                money_accounts::Column::Balance,
                Expr::col(money_accounts::Column::Balance).add(delta_minor),
            )
            .col_expr(money_accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(money_accounts::Column::Id.eq(account_id.to_string()))
            .exec(db_tx)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "money account not exists".to_string(),
            ));
        }

        let account = money_accounts::Entity::find_by_id(account_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("money account not exists".to_string()))?;
        Ok(account.balance)
    }

    /// Inserts a transaction and moves the account balance by its amount.
    ///
    /// The balance update runs first so the account row is locked before the
    /// snapshot and the sequence number are computed. Zero amounts are
    /// accepted here (fully offset bill closures still leave a row).
    pub(super) async fn append_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        entry: &LedgerEntry,
        reverted_transaction_id: Option<Uuid>,
    ) -> ResultEngine<Transaction> {
        if entry.person_id.is_nil() {
            return Err(EngineError::Validation("person id required".to_string()));
        }
        let description = normalize_required_text(&entry.description, "description")?;
        self.require_person(db_tx, entry.person_id).await?;

        if let Some(person_account_id) = entry.person_account_id {
            let person_account = person_accounts::Entity::find_by_id(person_account_id.to_string())
                .one(db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("person account not exists".to_string())
                })?;
            if person_account.person_id != entry.person_id.to_string() {
                return Err(EngineError::Validation(format!(
                    "person account {person_account_id} does not belong to person {}",
                    entry.person_id
                )));
            }
        }

        let balance_minor = self
            .shift_account_balance(db_tx, entry.account_id, entry.amount_minor)
            .await?;
        let sequence = self
            .last_transaction_model(db_tx, &entry.account_id.to_string())
            .await?
            .map_or(1, |last| last.sequence + 1);

        let now = Utc::now();
        let tx = Transaction {
            id: Uuid::new_v4(),
            account_id: entry.account_id,
            person_id: entry.person_id,
            person_name: String::new(),
            person_account_id: entry.person_account_id,
            date: entry.date,
            amount_minor: entry.amount_minor,
            description,
            balance_minor,
            sequence,
            reverted_transaction_id,
            created_at: now,
            updated_at: now,
        };
        transactions::ActiveModel::from(&tx).insert(db_tx).await?;

        tracing::debug!(
            transaction_id = %tx.id,
            account_id = %tx.account_id,
            amount_minor = tx.amount_minor,
            balance_minor = tx.balance_minor,
            "transaction appended"
        );
        Ok(tx)
    }

    pub(super) async fn with_transaction_person_name<C: ConnectionTrait>(
        &self,
        conn: &C,
        mut tx: Transaction,
    ) -> Transaction {
        tx.person_name = self.person_name(conn, tx.person_id).await;
        tx
    }

    /// Appends a ledger entry to a money account.
    pub async fn append_transaction(&self, entry: LedgerEntry) -> ResultEngine<Transaction> {
        check_amount(entry.amount_minor)?;
        with_tx!(self, |db_tx| {
            let tx = self.append_in_tx(&db_tx, &entry, None).await?;
            Ok(self.with_transaction_person_name(&db_tx, tx).await)
        })
    }

    /// Return a transaction.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let model = self
            .require_transaction(&self.database, transaction_id)
            .await?;
        let tx = Transaction::try_from(model)?;
        Ok(self.with_transaction_person_name(&self.database, tx).await)
    }

    /// Return the newest transaction of a money account.
    pub async fn last_transaction(&self, account_id: Uuid) -> ResultEngine<Transaction> {
        let model = self
            .last_transaction_model(&self.database, &account_id.to_string())
            .await?
            .ok_or_else(|| {
                EngineError::KeyNotFound(format!("no transactions for account {account_id}"))
            })?;
        let tx = Transaction::try_from(model)?;
        Ok(self.with_transaction_person_name(&self.database, tx).await)
    }

    /// Hard-deletes the last transaction of its account and rolls the balance
    /// back.
    ///
    /// If the transaction closed a bill, that bill becomes pending again. If it
    /// was the inverse of a revert, the pending bill created by that revert is
    /// removed.
    pub async fn delete_last_transaction(&self, transaction_id: Uuid) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            self.require_last(&db_tx, &model).await?;

            if let Some(closed) = closed_bills::Entity::find()
                .filter(closed_bills::Column::TransactionId.eq(model.id.clone()))
                .one(&db_tx)
                .await?
            {
                self.reopen_closed_bill(&db_tx, closed).await?;
            }

            if let Some(original_id) = &model.reverted_transaction_id {
                self.discard_reverted_bills(&db_tx, original_id).await?;
            }

            transactions::Entity::delete_by_id(model.id.clone())
                .exec(&db_tx)
                .await?;
            let account_id = crate::parse_id(&model.account_id, "money account")?;
            self.shift_account_balance(&db_tx, account_id, negate_amount(model.amount_minor)?)
                .await?;

            tracing::info!(%transaction_id, amount_minor = model.amount_minor, "last transaction deleted");
            Ok(transaction_id)
        })
    }

    /// Removes the pending bills a revert of `original_id` created.
    async fn discard_reverted_bills(
        &self,
        db_tx: &DatabaseTransaction,
        original_id: &str,
    ) -> ResultEngine<()> {
        let already_closed = closed_bills::Entity::find()
            .filter(closed_bills::Column::ParentTransactionId.eq(original_id))
            .one(db_tx)
            .await?;
        if let Some(closed) = already_closed {
            return Err(EngineError::BillNotPending(closed.id));
        }
        pending_bills::Entity::delete_many()
            .filter(pending_bills::Column::ParentTransactionId.eq(original_id))
            .exec(db_tx)
            .await?;
        Ok(())
    }

    /// Edits the last transaction of its account.
    ///
    /// The amount of a transaction that settled a bill cannot change: the bill
    /// would no longer match the money that moved.
    pub async fn update_last_transaction(
        &self,
        transaction_id: Uuid,
        update: TransactionUpdate,
    ) -> ResultEngine<Transaction> {
        let description = normalize_required_text(&update.description, "description")?;
        // The edited row must stay revertible.
        negate_amount(update.amount_minor)?;
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            self.require_last(&db_tx, &model).await?;

            let delta = amount_delta(update.amount_minor, model.amount_minor)?;
            if delta != 0 {
                if model.reverted_transaction_id.is_some() {
                    return Err(EngineError::NotRevertible(
                        "the amount of a revert cannot change".to_string(),
                    ));
                }
                let settles_bill = closed_bills::Entity::find()
                    .filter(closed_bills::Column::TransactionId.eq(model.id.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if settles_bill {
                    return Err(EngineError::Validation(
                        "the amount of a bill settlement cannot change".to_string(),
                    ));
                }
                if update.amount_minor == 0 {
                    return Err(EngineError::Validation(
                        "amount must be non-zero".to_string(),
                    ));
                }
            }

            let account_id = crate::parse_id(&model.account_id, "money account")?;
            let balance_minor = self
                .shift_account_balance(&db_tx, account_id, delta)
                .await?;

            let active = transactions::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                date: ActiveValue::Set(update.date),
                amount_minor: ActiveValue::Set(update.amount_minor),
                description: ActiveValue::Set(description),
                balance_minor: ActiveValue::Set(balance_minor),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            let tx = Transaction::try_from(model)?;
            Ok(self.with_transaction_person_name(&db_tx, tx).await)
        })
    }

    /// Reverts a transaction by appending its inverse.
    ///
    /// History is kept: the original row stays, and the inverse references it
    /// through `reverted_transaction_id`. A transaction is reverted at most
    /// once and an inverse cannot be reverted. If the original settled a bill,
    /// a new pending bill is opened for the same amount.
    pub async fn revert_transaction(
        &self,
        transaction_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let (inverse, _reopened) = self.revert_in_tx(&db_tx, transaction_id, date).await?;
            Ok(self.with_transaction_person_name(&db_tx, inverse).await)
        })
    }

    /// Appends the inverse of `transaction_id` and, when it settled a bill,
    /// opens the follow-up pending bill.
    pub(super) async fn revert_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<(Transaction, Option<crate::Bill>)> {
        let model = self.require_transaction(db_tx, transaction_id).await?;
        if model.reverted_transaction_id.is_some() {
            return Err(EngineError::NotRevertible(format!(
                "{transaction_id} is itself a revert"
            )));
        }
        let already = transactions::Entity::find()
            .filter(transactions::Column::RevertedTransactionId.eq(model.id.clone()))
            .one(db_tx)
            .await?;
        if already.is_some() {
            return Err(EngineError::NotRevertible(format!(
                "{transaction_id} already reverted"
            )));
        }

        let original = Transaction::try_from(model)?;
        let entry = LedgerEntry {
            account_id: original.account_id,
            person_id: original.person_id,
            person_account_id: original.person_account_id,
            date,
            amount_minor: negate_amount(original.amount_minor)?,
            description: format!("Revert: {}", original.description),
        };
        let inverse = self.append_in_tx(db_tx, &entry, Some(original.id)).await?;

        let settled = closed_bills::Entity::find()
            .filter(closed_bills::Column::TransactionId.eq(original.id.to_string()))
            .one(db_tx)
            .await?;
        let reopened = match settled {
            Some(closed) => Some(self.open_follow_up_bill(db_tx, closed, original.id).await?),
            None => None,
        };

        tracing::info!(%transaction_id, inverse_id = %inverse.id, "transaction reverted");
        Ok((inverse, reopened))
    }
}
