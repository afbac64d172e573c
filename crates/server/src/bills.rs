//! Bills API endpoints

use api_types::{
    Deleted,
    bill::{
        BillClose, BillFields, BillNotes, BillRevert, BillStatus, BillView, ClosedBy,
        PendingBillsPage, PendingBillsQuery,
    },
};
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{ApiJson, ApiPath, ApiQuery},
    server::ServerState,
};

fn map_status(status: engine::BillStatus) -> BillStatus {
    match status {
        engine::BillStatus::Pending => BillStatus::Pending,
        engine::BillStatus::Closed => BillStatus::Closed,
    }
}

fn map_closed_by(closed_by: engine::ClosedBy) -> ClosedBy {
    match closed_by {
        engine::ClosedBy::Transaction(id) => ClosedBy::Transaction(id),
        engine::ClosedBy::BillCross(id) => ClosedBy::BillCross(id),
        engine::ClosedBy::RevertTransaction(id) => ClosedBy::RevertTransaction(id),
    }
}

fn bill_view(bill: engine::Bill) -> BillView {
    BillView {
        id: bill.id,
        person_id: bill.person_id,
        person_name: bill.person_name,
        status: map_status(bill.status),
        date: bill.date,
        description: bill.description,
        currency: bill.currency.to_string(),
        amount_minor: bill.amount_minor,
        closed_by: bill.closed_by.map(map_closed_by),
        notes: bill.notes,
        parent_transaction_id: bill.parent_transaction_id,
        parent_bill_cross_id: bill.parent_bill_cross_id,
        created_at: bill.created_at,
        updated_at: bill.updated_at,
    }
}

fn bill_fields(payload: BillFields) -> engine::BillFields {
    engine::BillFields {
        person_id: payload.person_id,
        date: payload.date,
        description: payload.description,
        currency: payload.currency,
        amount_minor: payload.amount_minor,
    }
}

/// Lists pending bills of a person; the nil UUID lists every person.
pub async fn list_pending(
    State(state): State<ServerState>,
    ApiPath(person_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PendingBillsQuery>,
) -> Result<Json<PendingBillsPage>, ServerError> {
    let filter = engine::PendingBillsFilter {
        person_id,
        to_pay: query.to_pay.unwrap_or(true),
        to_charge: query.to_charge.unwrap_or(true),
        limit: state.config.page_limit(query.limit),
        offset: query.offset.unwrap_or(0),
    };
    let page = state.engine.list_pending_bills(&filter).await?;

    Ok(Json(PendingBillsPage {
        bills: page.bills.into_iter().map(bill_view).collect(),
        count: page.total_count,
        filter_person_id: page.person_id_filter,
        limit: page.limit,
        offset: page.offset,
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<BillFields>,
) -> Result<(StatusCode, Json<BillView>), ServerError> {
    let bill = state
        .engine
        .create_pending_bill(bill_fields(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(bill_view(bill))))
}

pub async fn get(
    State(state): State<ServerState>,
    ApiPath(bill_id): ApiPath<Uuid>,
) -> Result<Json<BillView>, ServerError> {
    let bill = state.engine.bill(bill_id).await?;
    Ok(Json(bill_view(bill)))
}

pub async fn update(
    State(state): State<ServerState>,
    ApiPath(bill_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BillFields>,
) -> Result<Json<BillView>, ServerError> {
    let bill = state
        .engine
        .update_pending_bill(bill_id, bill_fields(payload))
        .await?;
    Ok(Json(bill_view(bill)))
}

pub async fn delete(
    State(state): State<ServerState>,
    ApiPath(bill_id): ApiPath<Uuid>,
) -> Result<Json<Deleted>, ServerError> {
    let id = state.engine.delete_pending_bill(bill_id).await?;
    Ok(Json(Deleted { id }))
}

pub async fn close(
    State(state): State<ServerState>,
    ApiPath(bill_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BillClose>,
) -> Result<Json<BillView>, ServerError> {
    let mut cmd = engine::CloseBill::new(payload.account_id, payload.date)
        .fee_minor(payload.fee_minor.unwrap_or(0));
    cmd.person_account_id = payload.person_account_id;

    let bill = state.engine.close_bill(bill_id, cmd).await?;
    Ok(Json(bill_view(bill)))
}

pub async fn revert(
    State(state): State<ServerState>,
    ApiPath(bill_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BillRevert>,
) -> Result<(StatusCode, Json<BillView>), ServerError> {
    let date = payload.date.unwrap_or_else(|| Utc::now().date_naive());
    let bill = state.engine.revert_closed_bill(bill_id, date).await?;
    Ok((StatusCode::CREATED, Json(bill_view(bill))))
}

pub async fn set_notes(
    State(state): State<ServerState>,
    ApiPath(bill_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BillNotes>,
) -> Result<Json<BillView>, ServerError> {
    let bill = state
        .engine
        .set_closed_bill_notes(bill_id, payload.notes.as_deref())
        .await?;
    Ok(Json(bill_view(bill)))
}
