#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{BillFields, Engine, MoneyAccount, Person};
use migration::MigratorTrait;

pub struct Fixture {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub person: Person,
    /// EUR account.
    pub account: MoneyAccount,
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Engine with EUR and USD registered, one person and one EUR account.
pub async fn fixture() -> Fixture {
    let (engine, db) = engine_with_db().await;
    engine.register_currency("EUR", "Euro").await.unwrap();
    engine.register_currency("USD", "US Dollar").await.unwrap();
    let person = engine.new_person("Rossi Trasporti").await.unwrap();
    let account = engine
        .new_money_account("Main bank", "IT60X0542811101000000123456", "EUR")
        .await
        .unwrap();
    Fixture {
        engine,
        db,
        person,
        account,
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

pub fn bill_fields(person_id: Uuid, amount_minor: i64) -> BillFields {
    BillFields {
        person_id,
        date: day(1),
        description: "Milano - Torino".to_string(),
        currency: "EUR".to_string(),
        amount_minor,
    }
}
