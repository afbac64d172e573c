//! Reference data the bookkeeping core depends on: currencies, persons,
//! person accounts and money accounts.
//!
//! Only creation and lookup live here; balances are never written outside the
//! ledger.

use uuid::Uuid;

use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, TransactionTrait};

use crate::{
    Currency, CurrencyCode, EngineError, MoneyAccount, Person, PersonAccount, ResultEngine,
    currency, money_accounts, person_accounts, persons, util::normalize_required_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Registers a currency code so bills and accounts can use it.
    pub async fn register_currency(&self, code: &str, name: &str) -> ResultEngine<Currency> {
        let code = CurrencyCode::parse(code)?;
        let name = normalize_required_text(name, "currency name")?;
        with_tx!(self, |db_tx| {
            if currency::Entity::find_by_id(code.to_string())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(code.to_string()));
            }

            let currency = Currency { code, name };
            currency::ActiveModel::from(&currency).insert(&db_tx).await?;
            Ok(currency)
        })
    }

    /// Lists registered currencies ordered by code.
    pub async fn currencies(&self) -> ResultEngine<Vec<Currency>> {
        currency::Entity::find()
            .order_by_asc(currency::Column::Code)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Currency::try_from)
            .collect()
    }

    pub async fn new_person(&self, name: &str) -> ResultEngine<Person> {
        let name = normalize_required_text(name, "person name")?;
        let person = Person::new(name);
        persons::ActiveModel::from(&person)
            .insert(&self.database)
            .await?;
        Ok(person)
    }

    pub async fn person(&self, person_id: Uuid) -> ResultEngine<Person> {
        let model = self.require_person(&self.database, person_id).await?;
        Person::try_from(model)
    }

    /// Adds a named sub-account to an existing person.
    pub async fn new_person_account(
        &self,
        person_id: Uuid,
        name: &str,
    ) -> ResultEngine<PersonAccount> {
        let name = normalize_required_text(name, "person account name")?;
        with_tx!(self, |db_tx| {
            self.require_person(&db_tx, person_id).await?;
            let account = PersonAccount::new(person_id, name);
            person_accounts::ActiveModel::from(&account)
                .insert(&db_tx)
                .await?;
            Ok(account)
        })
    }

    pub async fn person_account(&self, person_account_id: Uuid) -> ResultEngine<PersonAccount> {
        let model = person_accounts::Entity::find_by_id(person_account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("person account not exists".to_string()))?;
        PersonAccount::try_from(model)
    }

    /// Opens a money account with a zero balance.
    pub async fn new_money_account(
        &self,
        name: &str,
        details: &str,
        currency: &str,
    ) -> ResultEngine<MoneyAccount> {
        let name = normalize_required_text(name, "money account name")?;
        let code = CurrencyCode::parse(currency)?;
        with_tx!(self, |db_tx| {
            if !self.currency_registered(&db_tx, code.as_str()).await? {
                return Err(EngineError::CurrencyNotRegistered(code.to_string()));
            }
            let account = MoneyAccount::new(name, details.trim().to_string(), code);
            money_accounts::ActiveModel::from(&account)
                .insert(&db_tx)
                .await?;
            Ok(account)
        })
    }

    /// Return a money account snapshot from DB.
    pub async fn money_account(&self, account_id: Uuid) -> ResultEngine<MoneyAccount> {
        let model = money_accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("money account not exists".to_string()))?;
        MoneyAccount::try_from(model)
    }
}
