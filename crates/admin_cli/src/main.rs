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
use engine::{Engine, FeeAccount, Money, NewUser};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "edufinance_admin")]
#[command(about = "Admin utilities for EduFinance (bootstrap users, correct fee accounts)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./edufinance.db?mode=rwc"
    )]
    database_url: String,

    /// Total fee, in minor units, of accounts created on first access.
    #[arg(
        long,
        env = "EDUFINANCE__LEDGER__DEFAULT_TOTAL_FEE",
        default_value_t = engine::DEFAULT_TOTAL_FEE_MINOR
    )]
    default_total_fee: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Fees(Fees),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long, default_value = "student")]
    role: String,
}

#[derive(Args, Debug)]
struct Fees {
    #[command(subcommand)]
    command: FeesCommand,
}

#[derive(Subcommand, Debug)]
enum FeesCommand {
    /// Print the fee account of a user (created with the default total if missing).
    Show(FeesShowArgs),
    /// Overwrite total and paid amount; the remaining fee is recomputed.
    Set(FeesSetArgs),
}

#[derive(Args, Debug)]
struct FeesShowArgs {
    #[arg(long)]
    user_id: String,
}

#[derive(Args, Debug)]
struct FeesSetArgs {
    #[arg(long)]
    user_id: String,
    /// Total fee, e.g. `100000.00`.
    #[arg(long)]
    total: Money,
    /// Amount already paid, e.g. `25000`.
    #[arg(long, default_value = "0")]
    paid: Money,
}

fn print_account(account: &FeeAccount) {
    println!("user:      {}", account.user_id);
    println!("total:     {}", Money::new(account.total_fee_minor));
    println!("paid:      {}", Money::new(account.paid_amount_minor));
    println!("remaining: {}", Money::new(account.remaining_fee_minor));
    println!("updated:   {}", account.last_updated.to_rfc3339());
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

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
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
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
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
    let engine = Engine::builder()
        .database(db)
        .default_total_fee(cli.default_total_fee)
        .build()
        .await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            let (user, _token) = engine
                .register_user(NewUser {
                    first_name: args.first_name,
                    last_name: args.last_name,
                    email: args.email,
                    phone: args.phone,
                    password,
                    role: args.role,
                })
                .await?;

            println!("created user: {} ({})", user.email, user.id);
        }
        Command::Fees(Fees {
            command: FeesCommand::Show(args),
        }) => {
            engine.user(&args.user_id).await?;
            let account = engine.fee_account(&args.user_id).await?;
            print_account(&account);
        }
        Command::Fees(Fees {
            command: FeesCommand::Set(args),
        }) => {
            if args.total.is_negative() || args.paid.is_negative() {
                eprintln!("amounts must not be negative");
                std::process::exit(2);
            }
            engine.user(&args.user_id).await?;

            let account = engine
                .update_fee_structure(&args.user_id, args.total.minor(), args.paid.minor())
                .await?;
            if account.remaining_fee_minor < 0 {
                eprintln!("warning: paid amount exceeds the total fee");
            }
            print_account(&account);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_total_fee_can_be_set() {
        let cli = Cli::try_parse_from([
            "edufinance_admin",
            "--default-total-fee",
            "5000000",
            "fees",
            "show",
            "--user-id",
            "u1",
        ])
        .unwrap();
        assert_eq!(cli.default_total_fee, 5_000_000);
        assert!(matches!(
            cli.command,
            Command::Fees(Fees {
                command: FeesCommand::Show(ref args)
            }) if args.user_id == "u1"
        ));
    }
}
