use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

/// Word the operator has to type before a destructive command runs.
const CONFIRMATION_WORD: &str = "delete";

#[derive(Parser, Debug)]
#[command(name = "freightbook_admin")]
#[command(about = "Admin utilities for Freightbook (reference data, maintenance)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./freightbook.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Currency(CurrencyArgs),
    Person(PersonArgs),
    PersonAccount(PersonAccountArgs),
    Account(AccountArgs),
    Bills(BillsArgs),
}

#[derive(Args, Debug)]
struct CurrencyArgs {
    #[command(subcommand)]
    command: CurrencyCommand,
}

#[derive(Subcommand, Debug)]
enum CurrencyCommand {
    /// Register a currency code.
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
    },
    /// List registered currencies.
    List,
}

#[derive(Args, Debug)]
struct PersonArgs {
    #[command(subcommand)]
    command: PersonCommand,
}

#[derive(Subcommand, Debug)]
enum PersonCommand {
    Add {
        #[arg(long)]
        name: String,
    },
}

#[derive(Args, Debug)]
struct PersonAccountArgs {
    #[command(subcommand)]
    command: PersonAccountCommand,
}

#[derive(Subcommand, Debug)]
enum PersonAccountCommand {
    Add {
        #[arg(long)]
        person_id: Uuid,
        #[arg(long)]
        name: String,
    },
}

#[derive(Args, Debug)]
struct AccountArgs {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// Open a money account with a zero balance.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        details: String,
        #[arg(long, default_value = "EUR")]
        currency: String,
    },
    /// Show an account and its balance.
    Show {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct BillsArgs {
    #[command(subcommand)]
    command: BillsCommand,
}

#[derive(Subcommand, Debug)]
enum BillsCommand {
    /// Delete every pending and closed bill.
    Empty {
        /// Skip the interactive confirmation.
        #[arg(long)]
        yes: bool,
    },
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_line(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print(ch))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn confirmed(answer: &str) -> bool {
    answer.trim() == CONFIRMATION_WORD
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Currency(CurrencyArgs { command }) => match command {
            CurrencyCommand::Add { code, name } => {
                let currency = engine.register_currency(&code, &name).await?;
                println!("registered currency: {} ({})", currency.code, currency.name);
            }
            CurrencyCommand::List => {
                for currency in engine.currencies().await? {
                    println!("{}\t{}", currency.code, currency.name);
                }
            }
        },
        Command::Person(PersonArgs {
            command: PersonCommand::Add { name },
        }) => {
            let person = engine.new_person(&name).await?;
            println!("created person: {} ({})", person.name, person.id);
        }
        Command::PersonAccount(PersonAccountArgs {
            command: PersonAccountCommand::Add { person_id, name },
        }) => {
            let account = engine.new_person_account(person_id, &name).await?;
            println!("created person account: {} ({})", account.name, account.id);
        }
        Command::Account(AccountArgs { command }) => match command {
            AccountCommand::Add {
                name,
                details,
                currency,
            } => {
                let account = engine
                    .new_money_account(&name, &details, &currency)
                    .await?;
                println!(
                    "created money account: {} [{}] ({})",
                    account.name, account.currency, account.id
                );
            }
            AccountCommand::Show { id } => {
                let account = engine.money_account(id).await?;
                println!(
                    "{} [{}] balance {} ({})",
                    account.name, account.currency, account.balance, account.id
                );
            }
        },
        Command::Bills(BillsArgs {
            command: BillsCommand::Empty { yes },
        }) => {
            if !yes {
                let answer = prompt_line(&format!(
                    "This deletes ALL bills. Type \"{CONFIRMATION_WORD}\" to continue: "
                ))?;
                if !confirmed(&answer) {
                    eprintln!("aborted");
                    std::process::exit(1);
                }
            }

            let removed = engine.empty_all_bills().await?;
            println!("deleted {removed} bills");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_exact_word_confirms() {
        assert!(confirmed("delete"));
        assert!(confirmed("  delete "));
        assert!(!confirmed("yes"));
        assert!(!confirmed("DELETE"));
        assert!(!confirmed(""));
    }

    #[test]
    fn cli_parses_bills_empty() {
        let cli = Cli::try_parse_from(["freightbook_admin", "bills", "empty", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Bills(BillsArgs {
                command: BillsCommand::Empty { yes: true }
            })
        ));
    }
}
