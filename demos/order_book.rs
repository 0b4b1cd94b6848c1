//! Order book example: loads the book for a pair and prints it bucket by bucket.
//!
//! The wallet here is watch-only, so fills and quotes are refused by the wallet before any
//! backend call. Plug in a real wallet adapter to trade.
//!
//! ```sh
//! RFQ_HOST=http://localhost:4000 RUST_LOG=info,hyper_util=off,hyper=off,reqwest=off cargo run --example order_book --features rfq,tracing
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use keeta_rfq_client::error::Error;
use keeta_rfq_client::rfq::{Client, Config, OrderBook};
use keeta_rfq_client::storage::types::{
    AccountInfo, AclEntry, PendingAccount, PermissionUpdate, PublishReceipt, SendOperation,
    StorageAccountState,
};
use keeta_rfq_client::storage::wallet::{
    AccountInfoWriter, BlockComputer, FillIntent, PermissionGranter, SignedFill,
    StorageAccountFactory, TokenSender, Wallet,
};
use keeta_rfq_client::{NETWORK_VAR, Network, Result};
use tracing::{info, warn};

const WATCH_ONLY: &str = "watch-only wallet";

struct WatchOnlyBuilder;

impl StorageAccountFactory for WatchOnlyBuilder {
    fn generate_storage_account(&mut self) -> Result<PendingAccount> {
        Err(Error::wallet(WATCH_ONLY))
    }
}

#[async_trait]
impl BlockComputer for WatchOnlyBuilder {
    async fn compute_blocks(&mut self) -> Result<()> {
        Ok(())
    }
}

impl AccountInfoWriter for WatchOnlyBuilder {
    fn set_info(&mut self, _account: &str, _info: &AccountInfo) -> Result<()> {
        Err(Error::wallet(WATCH_ONLY))
    }
}

impl PermissionGranter for WatchOnlyBuilder {
    fn update_permissions(&mut self, _entry: &AclEntry, _update: PermissionUpdate) -> Result<()> {
        Err(Error::wallet(WATCH_ONLY))
    }
}

impl TokenSender for WatchOnlyBuilder {
    fn send(&mut self, _operation: &SendOperation) -> Result<()> {
        Err(Error::wallet(WATCH_ONLY))
    }
}

struct WatchOnlyWallet {
    address: String,
}

#[async_trait]
impl Wallet for WatchOnlyWallet {
    type Builder = WatchOnlyBuilder;

    fn address(&self) -> &str {
        &self.address
    }

    async fn init_builder(&self) -> Result<WatchOnlyBuilder> {
        Ok(WatchOnlyBuilder)
    }

    async fn publish_builder(&self, _builder: WatchOnlyBuilder) -> Result<PublishReceipt> {
        Err(Error::wallet(WATCH_ONLY))
    }

    async fn storage_account_state(&self, _address: &str) -> Result<StorageAccountState> {
        Err(Error::wallet(WATCH_ONLY))
    }

    async fn co_sign_fill(&self, _intent: &FillIntent) -> Result<SignedFill> {
        Err(Error::wallet(WATCH_ONLY))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let host = std::env::var("RFQ_HOST").unwrap_or_else(|_| "http://localhost:4000".to_owned());
    let pair = std::env::var("RFQ_PAIR").unwrap_or_else(|_| "ETH-USDC".to_owned());
    let network: Network = std::env::var(NETWORK_VAR)
        .ok()
        .map(|name| name.parse())
        .transpose()?
        .unwrap_or_default();
    let address = std::env::var("WALLET_ADDRESS")
        .unwrap_or_else(|_| "keeta_aabwatchonlywallet".to_owned());

    let config = Config::builder().pair(pair).network(network).build();
    let book = OrderBook::new(
        Client::new(&host)?,
        Arc::new(WatchOnlyWallet { address }),
        config,
    );

    book.refresh_orders().await;

    let buckets = book.buckets().await;
    for (name, orders) in [
        ("open", &buckets.open),
        ("pending_fill", &buckets.pending_fill),
        ("filled", &buckets.filled),
        ("expired", &buckets.expired),
    ] {
        info!(bucket = name, count = orders.len());
        for order in orders {
            let maker = book
                .maker(&order.maker_id)
                .await
                .map_or_else(|| order.maker_id.clone(), |maker| maker.display_name);
            info!(
                bucket = name,
                id = %order.id,
                side = %order.side,
                price = %order.price,
                size = %order.size,
                remaining = %order.remaining_size(),
                maker = %maker,
                expiry = %order.expiry
            );
        }
    }

    if let Some(order) = book.selected().await {
        info!(selected = %order.id, fill_amount = ?book.fill_amount().await);

        if book.verify_escrow().await.is_none() {
            warn!(escrow_error = ?book.escrow_error().await);
        }

        match book
            .request_fill(&order.id, order.default_fill_amount(), None)
            .await
        {
            Ok(result) => info!(status = %result.order.status, latency = ?result.latency),
            Err(e) => warn!(error = %e, is_filling = book.is_filling(), "fill refused"),
        }
    }

    Ok(())
}
