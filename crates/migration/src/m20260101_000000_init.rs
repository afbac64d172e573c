//! Initial schema.
//!
//! - `currencies`: registry of ISO-style currency codes
//! - `persons`: counterparties bills and transactions refer to
//! - `person_accounts`: named sub-accounts of a person
//! - `money_accounts`: where money is held, with a running balance
//! - `transactions`: signed ledger rows, ordered per account by `sequence`
//! - `pending_bills`: bills waiting to be settled
//! - `closed_bills`: settled bills and the link to what settled them

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Currencies {
    Table,
    Code,
    Name,
}

#[derive(Iden)]
enum Persons {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PersonAccounts {
    Table,
    Id,
    PersonId,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum MoneyAccounts {
    Table,
    Id,
    Name,
    Details,
    Currency,
    Balance,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    AccountId,
    PersonId,
    PersonAccountId,
    Date,
    AmountMinor,
    Description,
    BalanceMinor,
    Sequence,
    RevertedTransactionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PendingBills {
    Table,
    Id,
    PersonId,
    Date,
    Description,
    Currency,
    AmountMinor,
    ParentTransactionId,
    ParentBillCrossId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ClosedBills {
    Table,
    Id,
    PersonId,
    Date,
    Description,
    Currency,
    AmountMinor,
    Status,
    TransactionId,
    BillCrossId,
    RevertTransactionId,
    Notes,
    ParentTransactionId,
    ParentBillCrossId,
    CreatedAt,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Currencies
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Currencies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Currencies::Code)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Currencies::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Persons
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Persons::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Persons::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Persons::Name).string().not_null())
                    .col(
                        ColumnDef::new(Persons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Persons::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Person accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PersonAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PersonAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PersonAccounts::PersonId).string().not_null())
                    .col(ColumnDef::new(PersonAccounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(PersonAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonAccounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-person_accounts-person_id")
                            .from(PersonAccounts::Table, PersonAccounts::PersonId)
                            .to(Persons::Table, Persons::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-person_accounts-person_id")
                    .table(PersonAccounts::Table)
                    .col(PersonAccounts::PersonId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Money accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MoneyAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MoneyAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MoneyAccounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(MoneyAccounts::Details)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(MoneyAccounts::Currency).string().not_null())
                    .col(
                        ColumnDef::new(MoneyAccounts::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MoneyAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MoneyAccounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-money_accounts-currency")
                            .from(MoneyAccounts::Table, MoneyAccounts::Currency)
                            .to(Currencies::Table, Currencies::Code),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::AccountId).string().not_null())
                    .col(ColumnDef::new(Transactions::PersonId).string().not_null())
                    .col(ColumnDef::new(Transactions::PersonAccountId).string())
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Sequence).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::RevertedTransactionId).string())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-account_id")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(MoneyAccounts::Table, MoneyAccounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-person_id")
                            .from(Transactions::Table, Transactions::PersonId)
                            .to(Persons::Table, Persons::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-person_account_id")
                            .from(Transactions::Table, Transactions::PersonAccountId)
                            .to(PersonAccounts::Table, PersonAccounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-reverted_transaction_id")
                            .from(Transactions::Table, Transactions::RevertedTransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-account_id-sequence-unique")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .col(Transactions::Sequence)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-reverted_transaction_id")
                    .table(Transactions::Table)
                    .col(Transactions::RevertedTransactionId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Pending bills
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PendingBills::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingBills::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PendingBills::PersonId).string().not_null())
                    .col(ColumnDef::new(PendingBills::Date).date().not_null())
                    .col(ColumnDef::new(PendingBills::Description).string().not_null())
                    .col(ColumnDef::new(PendingBills::Currency).string().not_null())
                    .col(
                        ColumnDef::new(PendingBills::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PendingBills::ParentTransactionId).string())
                    .col(ColumnDef::new(PendingBills::ParentBillCrossId).string())
                    .col(
                        ColumnDef::new(PendingBills::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingBills::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pending_bills-person_id")
                            .from(PendingBills::Table, PendingBills::PersonId)
                            .to(Persons::Table, Persons::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pending_bills-parent_transaction_id")
                            .from(PendingBills::Table, PendingBills::ParentTransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pending_bills-person_id")
                    .table(PendingBills::Table)
                    .col(PendingBills::PersonId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pending_bills-created_at")
                    .table(PendingBills::Table)
                    .col(PendingBills::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Closed bills
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ClosedBills::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClosedBills::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClosedBills::PersonId).string().not_null())
                    .col(ColumnDef::new(ClosedBills::Date).date().not_null())
                    .col(ColumnDef::new(ClosedBills::Description).string().not_null())
                    .col(ColumnDef::new(ClosedBills::Currency).string().not_null())
                    .col(
                        ColumnDef::new(ClosedBills::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClosedBills::Status)
                            .string()
                            .not_null()
                            .default("closed"),
                    )
                    .col(ColumnDef::new(ClosedBills::TransactionId).string())
                    .col(ColumnDef::new(ClosedBills::BillCrossId).string())
                    .col(ColumnDef::new(ClosedBills::RevertTransactionId).string())
                    .col(ColumnDef::new(ClosedBills::Notes).string())
                    .col(ColumnDef::new(ClosedBills::ParentTransactionId).string())
                    .col(ColumnDef::new(ClosedBills::ParentBillCrossId).string())
                    .col(
                        ColumnDef::new(ClosedBills::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClosedBills::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-closed_bills-person_id")
                            .from(ClosedBills::Table, ClosedBills::PersonId)
                            .to(Persons::Table, Persons::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-closed_bills-transaction_id")
                            .from(ClosedBills::Table, ClosedBills::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-closed_bills-person_id")
                    .table(ClosedBills::Table)
                    .col(ClosedBills::PersonId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-closed_bills-transaction_id")
                    .table(ClosedBills::Table)
                    .col(ClosedBills::TransactionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse creation order so foreign keys never dangle.
        manager
            .drop_table(Table::drop().table(ClosedBills::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PendingBills::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MoneyAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PersonAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Persons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Currencies::Table).to_owned())
            .await?;
        Ok(())
    }
}
