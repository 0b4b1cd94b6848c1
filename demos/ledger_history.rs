//! Ledger example: prints the balances and recent operations of an account.
//!
//! ```sh
//! LEDGER_HOST=http://localhost:4100 RUST_LOG=info cargo run --example ledger_history --features ledger,tracing -- keeta_aabc...
//! ```

use std::time::Duration;

use keeta_rfq_client::ledger::types::ChainRequest;
use keeta_rfq_client::ledger::{Client, Config};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let host =
        std::env::var("LEDGER_HOST").unwrap_or_else(|_| "http://localhost:4100".to_owned());
    let Some(public_key) = std::env::args().nth(1) else {
        anyhow::bail!("usage: ledger_history <public key>");
    };

    let config = Config::builder()
        .history_timeout(Duration::from_secs(30))
        .build();
    let client = Client::new(&host, config)?;

    match client.balance(&public_key).await {
        Ok(response) => {
            for balance in &response.balances {
                info!(endpoint = "balance", token = %balance.token, balance = %balance.balance);
            }
        }
        Err(e) => debug!(endpoint = "balance", error = %e),
    }

    match client.history(&public_key).await {
        Ok(response) => {
            info!(endpoint = "history", staples = response.history.len());
            for operation in response.operations() {
                info!(
                    endpoint = "history",
                    kind = %operation.kind,
                    to = ?operation.to,
                    token = ?operation.token,
                    amount = ?operation.amount
                );
            }
        }
        Err(e) => debug!(endpoint = "history", error = %e),
    }

    let request = ChainRequest::builder().limit(10).build();
    match client.chain(&public_key, &request).await {
        Ok(response) => {
            for block in &response.blocks {
                info!(endpoint = "chain", hash = %block.hash, date = %block.date, operations = block.operations.len());
            }
            info!(endpoint = "chain", next_cursor = ?response.next_cursor);
        }
        Err(e) => debug!(endpoint = "chain", error = %e),
    }

    Ok(())
}
