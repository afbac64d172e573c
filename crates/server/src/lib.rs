use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerConfig, app, run_with_listener, spawn_with_listener};

mod bills;
mod extract;
mod server;
mod transactions;

pub mod types {
    pub use api_types::{Deleted, ErrorBody};

    pub mod bill {
        pub use api_types::bill::{
            BillClose, BillFields, BillNotes, BillRevert, BillStatus, BillView, ClosedBy,
            PendingBillsPage, PendingBillsQuery,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionNew, TransactionRevert, TransactionUpdate, TransactionView,
        };
    }
}

/// Every failure a handler can return.
///
/// Rejections of the request extractors are kept apart from engine errors so
/// each gets its own stable code.
#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// A path segment is not a valid UUID.
    InvalidPath(String),
    InvalidQuery(String),
    /// The body could not be read or deserialized.
    InvalidBody(String),
}

fn status_for_engine_error(err: &EngineError) -> (StatusCode, &'static str) {
    match err {
        EngineError::Validation(_) | EngineError::ExistingKey(_) => {
            (StatusCode::BAD_REQUEST, "VA001")
        }
        EngineError::KeyNotFound(_) => (StatusCode::BAD_REQUEST, "DB001"),
        EngineError::EmptyRequest => (StatusCode::BAD_REQUEST, "BL001"),
        EngineError::CurrencyNotRegistered(_) => (StatusCode::BAD_REQUEST, "BL002"),
        EngineError::BillNotPending(_) => (StatusCode::BAD_REQUEST, "BL003"),
        EngineError::CurrencyMismatch(_) => (StatusCode::BAD_REQUEST, "BL004"),
        EngineError::PersonNotFound(_) => (StatusCode::BAD_REQUEST, "PE001"),
        EngineError::NotLastTransaction(_) => (StatusCode::BAD_REQUEST, "TR001"),
        EngineError::NotRevertible(_) => (StatusCode::BAD_REQUEST, "TR002"),
        // A stored id that does not parse is a corrupted row, not a bad request.
        EngineError::InvalidId(_) | EngineError::Database(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "DB002")
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::InvalidId(msg) => {
            tracing::error!("corrupted row: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, error) = match self {
            ServerError::Engine(err) => {
                let (status, code) = status_for_engine_error(&err);
                (status, code, message_for_engine_error(err))
            }
            ServerError::InvalidPath(err) => (StatusCode::BAD_REQUEST, "UI001", err),
            ServerError::InvalidQuery(err) => (StatusCode::BAD_REQUEST, "QS001", err),
            ServerError::InvalidBody(err) => (StatusCode::BAD_REQUEST, "UM001", err),
        };

        (
            status,
            Json(ErrorBody {
                error,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
