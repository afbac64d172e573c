use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::{CurrencyCode, EngineError, ResultEngine, currency, persons};

mod bills;
mod closing;
mod ledger;
mod registry;

pub use bills::PendingBillsPage;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Name of `person_id`, or an empty string when it cannot be resolved.
    ///
    /// Name lookup never fails the surrounding read.
    async fn person_name<C: ConnectionTrait>(&self, conn: &C, person_id: Uuid) -> String {
        match persons::Entity::find_by_id(person_id.to_string())
            .one(conn)
            .await
        {
            Ok(Some(person)) => person.name,
            Ok(None) => {
                tracing::warn!(%person_id, "person not found while resolving name");
                String::new()
            }
            Err(err) => {
                tracing::warn!(%person_id, "failed to resolve person name: {err}");
                String::new()
            }
        }
    }

    async fn require_person<C: ConnectionTrait>(
        &self,
        conn: &C,
        person_id: Uuid,
    ) -> ResultEngine<persons::Model> {
        persons::Entity::find_by_id(person_id.to_string())
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::PersonNotFound(person_id.to_string()))
    }

    async fn currency_registered<C: ConnectionTrait>(
        &self,
        conn: &C,
        raw: &str,
    ) -> ResultEngine<bool> {
        // Malformed codes are reported by the field validator.
        let Ok(code) = CurrencyCode::parse(raw) else {
            return Ok(false);
        };
        Ok(currency::Entity::find_by_id(code.to_string())
            .one(conn)
            .await?
            .is_some())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
