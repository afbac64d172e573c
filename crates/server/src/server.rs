use axum::{
    Router,
    routing::{get, patch, post},
};

use std::sync::Arc;

use crate::{bills, transactions};
use engine::Engine;

/// HTTP-level knobs that do not belong to the engine.
#[derive(Clone, Copy, Debug)]
pub struct ServerConfig {
    /// Page size used when the list query omits `limit`.
    pub default_page_limit: u64,
    /// Upper bound applied to any requested `limit`.
    pub max_page_limit: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_page_limit: 50,
            max_page_limit: 500,
        }
    }
}

impl ServerConfig {
    pub(crate) fn page_limit(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_page_limit)
            .min(self.max_page_limit)
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub config: ServerConfig,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/pending_bills", post(bills::create))
        .route(
            "/pending_bills/{id}",
            get(bills::list_pending)
                .patch(bills::update)
                .delete(bills::delete),
        )
        .route("/pending_bills/{id}/close", post(bills::close))
        .route("/bills/{id}", get(bills::get))
        .route("/closed_bills/{id}/revert", post(bills::revert))
        .route("/closed_bills/{id}/notes", patch(bills::set_notes))
        .route("/transactions", post(transactions::create))
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        .route("/transactions/{id}/revert", post(transactions::revert))
        .route(
            "/money_accounts/{id}/transactions/last",
            get(transactions::last),
        )
        .with_state(state)
}

/// Build the application router around `engine`.
pub fn app(engine: Engine, config: ServerConfig) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        config,
    })
}

pub async fn run_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, config)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_limit_defaults_and_clamps() {
        let config = ServerConfig {
            default_page_limit: 20,
            max_page_limit: 100,
        };
        assert_eq!(config.page_limit(None), 20);
        assert_eq!(config.page_limit(Some(7)), 7);
        assert_eq!(config.page_limit(Some(1_000)), 100);
    }
}
