use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use n26api::{Client, Credentials, N26Error, Timestamp};
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "n26-cli", about = "your N26 bank account on the command line")]
struct Cli {
    /// Login email; falls back to N26_USERNAME env var
    #[arg(long, env = "N26_USERNAME")]
    username: String,

    /// Login password; falls back to N26_PASSWORD env var
    #[arg(long, env = "N26_PASSWORD", hide_env_values = true)]
    password: String,

    /// Stable per-installation device identifier (uuid format);
    /// falls back to N26_DEVICE_TOKEN env var
    #[arg(long, env = "N26_DEVICE_TOKEN")]
    device_token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Your balance information
    Balance,
    /// Personal information
    Info,
    /// General status of your account
    Status,
    /// Addresses linked to your account
    Addresses,
    /// List your cards
    Cards,
    /// Your account limits
    Limits,
    /// Your saved contacts
    Contacts,
    /// Your past transactions
    Transactions {
        /// Retrieve transactions from this date (yyyy-mm-dd); needs --to
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Retrieve transactions until this date (yyyy-mm-dd); needs --from
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        /// Retrieve the last N transactions
        #[arg(long, default_value = "10")]
        limit: u32,
    },
    /// Your statements
    Statements,
    /// Download a statement PDF to the current directory
    DownloadStatement {
        /// Statement id, e.g. statement-2018-03
        id: String,
        /// Output file; defaults to <id>.pdf
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Dump the CSV transaction report for a date range to a file
    SmartCsv {
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,
        #[arg(long)]
        output: PathBuf,
    },
    /// Your spaces
    Spaces,
    /// Block a card
    Block { card_id: String },
    /// Unblock a card
    Unblock { card_id: String },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| e.to_string())
}

fn bound(date: Option<NaiveDate>) -> Result<Timestamp, N26Error> {
    match date {
        Some(date) => Timestamp::from_local_date(date),
        None => Ok(Timestamp::UNSET),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let credentials = Credentials {
        username: cli.username,
        password: cli.password,
        device_token: cli.device_token,
    };

    eprintln!("Waiting for approval on your paired device...");
    let client = Client::login(credentials).await?;

    match cli.command {
        Commands::Balance => print_json(&client.balance().await?)?,
        Commands::Info => print_json(&client.personal_info().await?)?,
        Commands::Status => print_json(&client.statuses().await?)?,
        Commands::Addresses => print_json(&client.addresses().await?)?,
        Commands::Cards => print_json(&client.cards().await?)?,
        Commands::Limits => print_json(&client.limits().await?)?,
        Commands::Contacts => print_json(&client.contacts().await?)?,
        Commands::Transactions { from, to, limit } => {
            let transactions = client
                .transactions(bound(from)?, bound(to)?, Some(limit))
                .await?;
            for txn in &transactions {
                println!(
                    "{} | {} {} | {} | {}",
                    txn.visible_ts,
                    txn.amount,
                    txn.currency_code,
                    txn.partner_name.as_deref().unwrap_or("-"),
                    txn.merchant_name.as_deref().unwrap_or("-"),
                );
            }
        }
        Commands::Statements => print_json(&client.statements().await?)?,
        Commands::DownloadStatement { id, output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(format!("{id}.pdf")));
            let mut file = File::create(&path)?;
            client
                .statement_pdf(&id, |chunk| file.write_all(chunk).map_err(N26Error::from))
                .await?;
            println!("Wrote statement to {}", path.display());
        }
        Commands::SmartCsv { from, to, output } => {
            let mut file = File::create(&output)?;
            client
                .smart_statement_csv(
                    Timestamp::from_local_date(from)?,
                    Timestamp::from_local_date(to)?,
                    |chunk| file.write_all(chunk).map_err(N26Error::from),
                )
                .await?;
            println!("Wrote report to {}", output.display());
        }
        Commands::Spaces => print_json(&client.spaces().await?)?,
        Commands::Block { card_id } => {
            client.block_card(&card_id).await?;
            println!("Blocked card {card_id}");
        }
        Commands::Unblock { card_id } => {
            client.unblock_card(&card_id).await?;
            println!("Unblocked card {card_id}");
        }
    }

    Ok(())
}
