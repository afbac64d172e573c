//! Transactions API endpoints

use api_types::{
    Deleted,
    transaction::{TransactionNew, TransactionRevert, TransactionUpdate, TransactionView},
};
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{ApiJson, ApiPath},
    server::ServerState,
};

fn transaction_view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        account_id: tx.account_id,
        person_id: tx.person_id,
        person_name: tx.person_name,
        person_account_id: tx.person_account_id,
        date: tx.date,
        amount_minor: tx.amount_minor,
        description: tx.description,
        balance_minor: tx.balance_minor,
        sequence: tx.sequence,
        reverted_transaction_id: tx.reverted_transaction_id,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut entry = engine::LedgerEntry::new(
        payload.account_id,
        payload.person_id,
        payload.date,
        payload.amount_minor,
        payload.description,
    );
    entry.person_account_id = payload.person_account_id;

    let tx = state.engine.append_transaction(entry).await?;
    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

pub async fn get(
    State(state): State<ServerState>,
    ApiPath(transaction_id): ApiPath<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(transaction_id).await?;
    Ok(Json(transaction_view(tx)))
}

/// Returns the newest transaction of a money account.
pub async fn last(
    State(state): State<ServerState>,
    ApiPath(account_id): ApiPath<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.last_transaction(account_id).await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn update(
    State(state): State<ServerState>,
    ApiPath(transaction_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let update = engine::TransactionUpdate {
        date: payload.date,
        amount_minor: payload.amount_minor,
        description: payload.description,
    };
    let tx = state
        .engine
        .update_last_transaction(transaction_id, update)
        .await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn delete(
    State(state): State<ServerState>,
    ApiPath(transaction_id): ApiPath<Uuid>,
) -> Result<Json<Deleted>, ServerError> {
    let id = state.engine.delete_last_transaction(transaction_id).await?;
    Ok(Json(Deleted { id }))
}

pub async fn revert(
    State(state): State<ServerState>,
    ApiPath(transaction_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<TransactionRevert>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let date = payload.date.unwrap_or_else(|| Utc::now().date_naive());
    let tx = state
        .engine
        .revert_transaction(transaction_id, date)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}
