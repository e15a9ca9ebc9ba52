use n26api::{Client, Credentials};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let credentials = Credentials {
        username: env::var("N26_USERNAME")
            .map_err(|_| "Set N26_USERNAME in your environment or .env file")?,
        password: env::var("N26_PASSWORD")
            .map_err(|_| "Set N26_PASSWORD in your environment or .env file")?,
        device_token: env::var("N26_DEVICE_TOKEN")
            .map_err(|_| "Set N26_DEVICE_TOKEN in your environment or .env file")?,
    };

    // Login blocks until the prompt on the paired device is approved.
    let client = Client::login(credentials).await?;

    let transactions = client
        .transactions(Default::default(), Default::default(), Some(10))
        .await?;

    println!("Last {} transactions:", transactions.len());
    for txn in &transactions {
        println!(
            "{} | {} {} | {}",
            txn.visible_ts,
            txn.amount,
            txn.currency_code,
            txn.merchant_name
                .as_deref()
                .or(txn.partner_name.as_deref())
                .unwrap_or("-")
        );
    }

    Ok(())
}
