//! Order-state context for one trading pair.
//!
//! [`OrderBook`] holds the visible orders and makers, the taker's selection and fill draft, and
//! the outcome of the last fill. Every mutation that talks to the outside world (backend or
//! wallet) does so without holding the state lock, so reads stay responsive while a fill is in
//! flight. Operations are not serialized against each other: the backend arbitrates conflicting
//! fills and the book accepts whatever state it reports afterwards.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use bon::Builder;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::RwLock;

use super::client::Client;
use super::types::{
    ConfirmFillRequest, ConfirmFillResponse, CreateOrderRequest, ExpiryPreset,
    FillRequestRequest, FillRequestResponse, OrderBuckets, OrderStatus, OrdersRequest,
    QuoteSubmission, RfqDeclaration, RfqMakerMeta, RfqOrder,
};
use crate::error::Error;
use crate::storage::StorageAccountManager;
use crate::storage::types::{
    SelfWithdrawRequest, SelfWithdrawResponse, StorageAccountState, to_base_units,
};
use crate::storage::wallet::{FillIntent, Wallet};
use crate::types::Decimal;
use crate::{Network, Result, is_placeholder_address, validate_address};

const DEFAULT_ESCROW_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration for [`OrderBook`]
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
pub struct Config {
    /// Trading pair shown by the book, e.g. `ETH-USDC`
    #[builder(into)]
    pub pair: String,
    #[builder(default)]
    pub network: Network,
    /// Minimum time between two reads of the same storage account. The default is ten (10)
    /// seconds.
    #[builder(default = DEFAULT_ESCROW_REFRESH_INTERVAL)]
    pub escrow_refresh_interval: Duration,
    /// Token symbol to on-chain token. Escrow is only released on cancellation for symbols
    /// found here.
    #[builder(default)]
    pub tokens: HashMap<String, TokenInfo>,
}

/// An on-chain token known to the book.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct TokenInfo {
    pub address: String,
    pub decimals: u32,
}

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FillOutcome {
    Accepted,
    /// The fill failed; `reason` is the error that was returned to the caller.
    Rejected { reason: String },
}

/// Outcome of [`OrderBook::request_fill`].
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct FillResult {
    /// The order as last reported by the backend, or the local copy when it could not be reached
    pub order: RfqOrder,
    pub declaration: Option<RfqDeclaration>,
    /// Backend-reported settlement time, or the measured round trip when it reports none
    pub latency: Duration,
    pub outcome: FillOutcome,
}

impl FillResult {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.outcome == FillOutcome::Accepted
    }
}

#[derive(Clone, Debug)]
struct CachedEscrow {
    state: StorageAccountState,
    fetched_at: Instant,
}

#[derive(Debug, Default)]
struct BookState {
    orders: Vec<RfqOrder>,
    makers: Vec<RfqMakerMeta>,
    buckets: OrderBuckets,
    selected: Option<String>,
    fill_amount: Option<Decimal>,
    last_latency: Option<Duration>,
    last_fill: Option<FillResult>,
    escrow: Option<StorageAccountState>,
    escrow_error: Option<String>,
}

impl BookState {
    fn find(&self, order_id: &str) -> Option<&RfqOrder> {
        self.orders.iter().find(|order| order.id == order_id)
    }

    fn selected_order(&self) -> Option<&RfqOrder> {
        self.selected.as_deref().and_then(|id| self.find(id))
    }

    fn orders_changed(&mut self) {
        self.buckets = OrderBuckets::partition(&self.orders);
    }

    /// Selects `order_id` and seeds the fill draft, or clears both when the id is unknown.
    fn select(&mut self, order_id: Option<&str>) -> bool {
        let seed = order_id
            .and_then(|id| self.find(id))
            .map(|order| (order.id.clone(), order.default_fill_amount()));

        match seed {
            Some((id, amount)) => {
                self.selected = Some(id);
                self.fill_amount = Some(amount);
                true
            }
            None => {
                self.selected = None;
                self.fill_amount = None;
                false
            }
        }
    }

    /// First open order, else the first order, else nothing.
    fn select_default(&mut self) {
        let id = self
            .orders
            .iter()
            .find(|order| order.status == OrderStatus::Open)
            .or_else(|| self.orders.first())
            .map(|order| order.id.clone());

        self.select(id.as_deref());
    }

    fn remove(&mut self, order_id: &str) -> Option<RfqOrder> {
        let index = self.orders.iter().position(|order| order.id == order_id)?;
        let removed = self.orders.remove(index);
        self.orders_changed();

        if self.selected.as_deref() == Some(order_id) {
            self.select(None);
        }
        Some(removed)
    }

    /// Applies an order reported by the backend. Unknown orders are prepended; known orders are
    /// replaced only along lifecycle edges.
    fn merge(&mut self, incoming: RfqOrder) {
        if incoming.status == OrderStatus::Cancelled {
            self.remove(&incoming.id);
            return;
        }

        match self.orders.iter_mut().find(|order| order.id == incoming.id) {
            Some(local)
                if local.status == incoming.status
                    || local.status == OrderStatus::Unknown
                    || local.status.can_reach(incoming.status) =>
            {
                *local = incoming;
            }
            Some(local) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    order_id = %local.id,
                    local = %local.status,
                    remote = %incoming.status,
                    "ignoring order update outside the order lifecycle"
                );
                #[cfg(not(feature = "tracing"))]
                let _: &RfqOrder = local;
            }
            None => self.orders.insert(0, incoming),
        }

        self.orders_changed();
    }
}

fn validate_fill(order: &RfqOrder, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation("fill amount must be positive"));
    }
    if order.status.is_terminal() || order.status == OrderStatus::Unknown {
        return Err(Error::validation(format!(
            "order {} is {} and cannot be filled",
            order.id, order.status
        )));
    }

    let remaining = order.remaining_size();
    if amount > remaining {
        return Err(Error::validation(format!(
            "fill amount {amount} exceeds the {remaining} remaining on order {}",
            order.id
        )));
    }
    if let Some(min_fill) = order.min_fill.filter(|min_fill| amount < *min_fill) {
        return Err(Error::validation(format!(
            "fill amount {amount} is below the minimum fill of {min_fill}"
        )));
    }

    Ok(())
}

fn validate_submission(submission: &QuoteSubmission) -> Result<()> {
    let well_formed_pair = submission
        .pair
        .split_once('-')
        .is_some_and(|(base, quote)| !base.is_empty() && !quote.is_empty());
    if !well_formed_pair {
        return Err(Error::validation(format!(
            "pair {:?} must look like BASE-QUOTE",
            submission.pair
        )));
    }
    if submission.maker_id.trim().is_empty() {
        return Err(Error::validation("maker id is required"));
    }
    if submission.price <= Decimal::ZERO {
        return Err(Error::validation("price must be positive"));
    }
    if submission.size <= Decimal::ZERO {
        return Err(Error::validation("size must be positive"));
    }
    let min_fill_out_of_range = submission
        .min_fill
        .is_some_and(|min_fill| min_fill <= Decimal::ZERO || min_fill > submission.size);
    if min_fill_out_of_range {
        return Err(Error::validation(format!(
            "minimum fill must be positive and at most the size {}",
            submission.size
        )));
    }

    Ok(())
}

/// Resets the in-flight flag when dropped, whichever way the fill ends.
struct FillingGuard<'flag>(&'flag AtomicBool);

impl<'flag> FillingGuard<'flag> {
    fn enter(flag: &'flag AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for FillingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The order book for one pair, as seen by one connected wallet.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use keeta_rfq_client::rfq::{Client, Config, OrderBook};
/// use keeta_rfq_client::storage::wallet::Wallet;
///
/// # async fn example<W: Wallet>(wallet: Arc<W>) -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("https://wallet.example.net")?;
/// let book = OrderBook::new(client, wallet, Config::builder().pair("ETH-USDC").build());
///
/// book.refresh_orders().await;
/// if let Some(order) = book.selected().await {
///     let result = book.request_fill(&order.id, order.default_fill_amount(), None).await?;
///     println!("filled in {:?}", result.latency);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OrderBook<W: Wallet> {
    client: Client,
    storage: StorageAccountManager<W>,
    config: Config,
    state: RwLock<BookState>,
    filling: AtomicBool,
    escrow_cache: DashMap<String, CachedEscrow>,
}

impl<W: Wallet> OrderBook<W> {
    #[must_use]
    pub fn new(client: Client, wallet: Arc<W>, config: Config) -> Self {
        Self {
            client,
            storage: StorageAccountManager::new(wallet, config.network),
            config,
            state: RwLock::new(BookState::default()),
            filling: AtomicBool::new(false),
            escrow_cache: DashMap::new(),
        }
    }

    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    #[must_use]
    pub fn storage(&self) -> &StorageAccountManager<W> {
        &self.storage
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn wallet(&self) -> &W {
        self.storage.wallet()
    }

    /// Reloads orders and makers for the configured pair.
    ///
    /// Both lists are fetched concurrently and replaced together. If either request fails the
    /// previous lists are kept and the failure is only logged. The current selection survives
    /// when its order is still listed; otherwise the default order is selected.
    ///
    /// A kept selection keeps its fill draft; only a newly selected default order is reseeded.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(pair = %self.config.pair))
    )]
    pub async fn refresh_orders(&self) {
        let request = OrdersRequest::builder()
            .pair(self.config.pair.clone())
            .build();

        let (orders, makers) =
            match futures::try_join!(self.client.orders(&request), self.client.makers()) {
                Ok(fetched) => fetched,
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %e, "unable to refresh orders, keeping last known state");
                    #[cfg(not(feature = "tracing"))]
                    let _: &Error = &e;
                    return;
                }
            };

        let mut state = self.state.write().await;
        state.orders = orders
            .into_iter()
            .filter(|order| order.status != OrderStatus::Cancelled)
            .collect();
        state.makers = makers;
        state.orders_changed();

        let keep_selection = state
            .selected
            .as_deref()
            .is_some_and(|id| state.find(id).is_some());
        if !keep_selection {
            state.select_default();
        }
    }

    /// Selects an order and seeds the fill draft with its default fill amount. `None`, or an
    /// id that is not in the book, clears the selection and the draft.
    ///
    /// Returns whether an order is selected afterwards.
    pub async fn select_order(&self, order_id: Option<&str>) -> bool {
        self.state.write().await.select(order_id)
    }

    pub async fn set_fill_amount(&self, amount: Decimal) {
        self.state.write().await.fill_amount = Some(amount);
    }

    /// Co-signs and declares a fill of `amount` against `order_id`.
    ///
    /// The order is looked up locally, falling back to the selected order. The taker defaults
    /// to the connected wallet. The wallet signs first; the backend is only called once a
    /// signature exists.
    ///
    /// On failure the order is re-fetched and merged so the book reflects whatever the backend
    /// settled on, a rejected [`FillResult`] is stored as [`OrderBook::last_fill`], and the
    /// original error is returned.
    ///
    /// # Errors
    ///
    /// Returns a validation error, before any wallet or network call, for a non-positive
    /// amount, an amount outside `[min_fill, remaining size]`, an unknown order or an order
    /// that can no longer be filled. Wallet and backend failures are returned as is.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(amount = %amount))
    )]
    pub async fn request_fill(
        &self,
        order_id: &str,
        amount: Decimal,
        taker_address: Option<&str>,
    ) -> Result<FillResult> {
        let _filling = FillingGuard::enter(&self.filling);
        let started = Instant::now();

        let order = {
            let state = self.state.read().await;
            state
                .find(order_id)
                .or_else(|| state.selected_order())
                .cloned()
        }
        .ok_or_else(|| Error::validation(format!("order {order_id} is not in the book")))?;

        let taker_address = taker_address.unwrap_or_else(|| self.wallet().address());
        validate_fill(&order, amount)?;
        validate_address(taker_address, self.config.network)?;

        match self.submit_fill(&order, amount, taker_address).await {
            Ok(response) => Ok(self
                .record_fill(response, amount, taker_address, started)
                .await),
            Err(e) => {
                self.reconcile_failed_fill(&order, &e, started).await;
                Err(e)
            }
        }
    }

    async fn submit_fill(
        &self,
        order: &RfqOrder,
        amount: Decimal,
        taker_address: &str,
    ) -> Result<FillRequestResponse> {
        let intent = FillIntent::builder()
            .order_id(order.id.clone())
            .pair(order.pair.clone())
            .price(order.price)
            .amount(amount)
            .taker_address(taker_address)
            .maybe_unsigned_block(order.unsigned_block.clone())
            .maybe_maker_signature(order.maker_signature.clone())
            .maybe_storage_account(order.storage_account.clone())
            .build();
        let signed = self.wallet().co_sign_fill(&intent).await?;

        let request = FillRequestRequest::builder()
            .fill_amount(amount)
            .taker_address(taker_address)
            .signed_block(signed.signed_block)
            .build();

        self.client
            .fill_request(&order.id, &request)
            .await
            .inspect_err(|e| {
                // The swap is signed but undeclared; the refetch that follows shows whether the
                // backend picked it up anyway.
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    order_id = %order.id,
                    signed_hash = ?signed.hash,
                    error = %e,
                    "fill was signed but the backend did not accept it"
                );
                #[cfg(not(feature = "tracing"))]
                let _: (&Error, &Option<String>) = (e, &signed.hash);
            })
    }

    async fn record_fill(
        &self,
        response: FillRequestResponse,
        amount: Decimal,
        taker_address: &str,
        started: Instant,
    ) -> FillResult {
        let mut order = response.order;
        order.taker_fill_amount.get_or_insert(amount);
        if order.taker_address.is_none() {
            order.taker_address = Some(taker_address.to_owned());
        }
        if order.is_expired_at(Utc::now()) {
            order.status = OrderStatus::Expired;
        }

        let latency = response
            .latency_ms
            .map_or_else(|| started.elapsed(), Duration::from_millis);
        let result = FillResult {
            order: order.clone(),
            declaration: response.declaration,
            latency,
            outcome: FillOutcome::Accepted,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(order_id = %order.id, status = %order.status, ?latency, "fill accepted");

        let mut state = self.state.write().await;
        state.merge(order);
        state.last_latency = Some(latency);
        state.last_fill = Some(result.clone());
        result
    }

    async fn reconcile_failed_fill(&self, order: &RfqOrder, error: &Error, started: Instant) {
        let remote = match self.client.order(&order.id).await {
            Ok(remote) => Some(remote),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(order_id = %order.id, error = %e, "unable to reconcile order after failed fill");
                #[cfg(not(feature = "tracing"))]
                let _: &Error = &e;
                None
            }
        };

        let mut state = self.state.write().await;
        let order = match remote {
            Some(remote) => {
                state.merge(remote.clone());
                remote
            }
            None => order.clone(),
        };
        state.last_fill = Some(FillResult {
            order,
            declaration: None,
            latency: started.elapsed(),
            outcome: FillOutcome::Rejected {
                reason: error.to_string(),
            },
        });
    }

    /// Publishes a maker quote escrowed by `storage_account` and selects it.
    ///
    /// # Errors
    ///
    /// Returns a validation error, before anything else is checked, when `storage_account` is
    /// missing or not an address on the configured network. Also rejects a malformed pair, a
    /// non-positive price or size, and a minimum fill outside `(0, size]`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self, submission), fields(
            pair = %submission.pair,
            side = %submission.side
        ))
    )]
    pub async fn create_quote(
        &self,
        submission: &QuoteSubmission,
        storage_account: Option<&str>,
    ) -> Result<RfqOrder> {
        let storage_account = storage_account
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .ok_or_else(|| Error::validation("a storage account is required to publish a quote"))?;
        validate_address(storage_account, self.config.network)?;
        if is_placeholder_address(storage_account) {
            return Err(Error::validation(format!(
                "storage account {storage_account:?} is a placeholder"
            )));
        }

        validate_submission(submission)?;

        let expiry = ExpiryPreset::parse_or_default(&submission.expiry_preset).expiry_from(Utc::now());
        let request = CreateOrderRequest::builder()
            .pair(submission.pair.clone())
            .side(submission.side)
            .price(submission.price)
            .size(submission.size)
            .maybe_min_fill(submission.min_fill)
            .expiry(expiry)
            .maker_id(submission.maker_id.clone())
            .maybe_unsigned_block(submission.unsigned_block.clone())
            .maybe_maker_signature(submission.maker_signature.clone())
            .storage_account(storage_account)
            .allowlisted(submission.allowlisted)
            .build();

        let order = self.client.create_order(&request).await?;

        let mut state = self.state.write().await;
        state.orders.retain(|existing| existing.id != order.id);
        state.orders.insert(0, order.clone());
        state.orders_changed();
        state.select(Some(&order.id));

        Ok(order)
    }

    /// Withdraws a quote.
    ///
    /// The unfilled remainder is first sent back from the order's storage account to the
    /// wallet, when the maker token resolves through [`Config::tokens`]; a failed withdrawal is
    /// logged and does not stop the cancellation. The order leaves the book only once the
    /// backend confirms the delete.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an order that is not in the book, and the backend error
    /// when the delete fails, in which case the order stays in the book.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self))
    )]
    pub async fn cancel_quote(&self, order_id: &str) -> Result<()> {
        let order = self
            .state
            .read()
            .await
            .find(order_id)
            .cloned()
            .ok_or_else(|| Error::validation(format!("order {order_id} is not in the book")))?;

        self.release_escrow(&order).await;

        self.client.delete_order(&order.id).await?;

        self.state.write().await.remove(&order.id);
        Ok(())
    }

    async fn release_escrow(&self, order: &RfqOrder) -> Option<SelfWithdrawResponse> {
        let storage_account = order.storage_account.as_deref()?;
        let remaining = order.remaining_size();
        if remaining <= Decimal::ZERO {
            return None;
        }

        let Some(token) = order
            .maker_token_symbol()
            .and_then(|symbol| self.config.tokens.get(symbol))
        else {
            #[cfg(feature = "tracing")]
            tracing::debug!(order_id = %order.id, pair = %order.pair, "maker token unknown, leaving escrow in place");
            return None;
        };

        let amount = order
            .maker_token_amount(remaining)
            .and_then(|amount| to_base_units(amount, token.decimals))
            .filter(|amount| *amount > 0)?;

        let request = SelfWithdrawRequest::builder()
            .storage_account(storage_account)
            .destination(self.wallet().address())
            .token(token.address.clone())
            .amount(amount)
            .build();

        match self.storage.self_withdraw(&request).await {
            Ok(response) => {
                self.escrow_cache.remove(storage_account);
                Some(response)
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(order_id = %order.id, error = %e, "unable to release escrow, cancelling anyway");
                #[cfg(not(feature = "tracing"))]
                let _: &Error = &e;
                None
            }
        }
    }

    /// Maker-side approval or rejection of a declaration. The returned order is merged into
    /// the book.
    pub async fn confirm_fill(
        &self,
        order_id: &str,
        request: &ConfirmFillRequest,
    ) -> Result<ConfirmFillResponse> {
        let response = self.client.confirm_fill(order_id, request).await?;
        self.state.write().await.merge(response.order.clone());
        Ok(response)
    }

    /// Declarations against `maker_id`'s orders.
    pub async fn fill_requests(&self, maker_id: &str) -> Result<Vec<RfqDeclaration>> {
        self.client.fill_requests(maker_id).await
    }

    /// Reads the storage account escrowing the selected order.
    ///
    /// Reads of the same account are throttled to one per
    /// [`Config::escrow_refresh_interval`]; inside that window the cached state is returned.
    /// A failed read is advisory: it sets [`OrderBook::escrow_error`] and returns `None`.
    pub async fn verify_escrow(&self) -> Option<StorageAccountState> {
        let storage_account = {
            let mut state = self.state.write().await;
            match state
                .selected_order()
                .and_then(|order| order.storage_account.clone())
            {
                Some(address) => address,
                None => {
                    state.escrow = None;
                    state.escrow_error = None;
                    return None;
                }
            }
        };

        let cached = self
            .escrow_cache
            .get(&storage_account)
            .filter(|cached| cached.fetched_at.elapsed() < self.config.escrow_refresh_interval)
            .map(|cached| cached.state.clone());
        if let Some(escrow) = cached {
            let mut state = self.state.write().await;
            state.escrow = Some(escrow.clone());
            state.escrow_error = None;
            return Some(escrow);
        }

        match self.wallet().storage_account_state(&storage_account).await {
            Ok(escrow) => {
                self.escrow_cache.insert(
                    storage_account,
                    CachedEscrow {
                        state: escrow.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                let mut state = self.state.write().await;
                state.escrow = Some(escrow.clone());
                state.escrow_error = None;
                Some(escrow)
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(storage_account = %storage_account, error = %e, "unable to verify escrow");

                let mut state = self.state.write().await;
                state.escrow = None;
                state.escrow_error = Some(format!("Unable to verify escrow: {e}"));
                None
            }
        }
    }

    pub async fn orders(&self) -> Vec<RfqOrder> {
        self.state.read().await.orders.clone()
    }

    pub async fn order(&self, order_id: &str) -> Option<RfqOrder> {
        self.state.read().await.find(order_id).cloned()
    }

    pub async fn makers(&self) -> Vec<RfqMakerMeta> {
        self.state.read().await.makers.clone()
    }

    pub async fn maker(&self, maker_id: &str) -> Option<RfqMakerMeta> {
        self.state
            .read()
            .await
            .makers
            .iter()
            .find(|maker| maker.id == maker_id)
            .cloned()
    }

    pub async fn selected(&self) -> Option<RfqOrder> {
        self.state.read().await.selected_order().cloned()
    }

    /// The taker's draft fill amount for the selected order.
    pub async fn fill_amount(&self) -> Option<Decimal> {
        self.state.read().await.fill_amount
    }

    pub async fn buckets(&self) -> OrderBuckets {
        self.state.read().await.buckets.clone()
    }

    /// Whether a [`OrderBook::request_fill`] is in flight.
    #[must_use]
    pub fn is_filling(&self) -> bool {
        self.filling.load(Ordering::SeqCst)
    }

    pub async fn last_latency(&self) -> Option<Duration> {
        self.state.read().await.last_latency
    }

    pub async fn last_fill(&self) -> Option<FillResult> {
        self.state.read().await.last_fill.clone()
    }

    pub async fn escrow(&self) -> Option<StorageAccountState> {
        self.state.read().await.escrow.clone()
    }

    pub async fn escrow_error(&self) -> Option<String> {
        self.state.read().await.escrow_error.clone()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::rfq::types::Side;

    fn order(id: &str, status: OrderStatus) -> RfqOrder {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        RfqOrder::builder()
            .id(id)
            .pair("ETH-USDC")
            .side(Side::Sell)
            .price(dec!(3450))
            .size(dec!(12))
            .min_fill(dec!(1))
            .expiry(at)
            .maker_id("maker-1")
            .status(status)
            .created_at(at)
            .updated_at(at)
            .build()
    }

    fn state(orders: Vec<RfqOrder>) -> BookState {
        let mut state = BookState {
            orders,
            ..BookState::default()
        };
        state.orders_changed();
        state
    }

    #[test]
    fn default_selection_prefers_first_open_order() {
        let mut state = state(vec![
            order("a", OrderStatus::Filled),
            order("b", OrderStatus::Open),
        ]);
        state.select_default();
        assert_eq!(state.selected.as_deref(), Some("b"));
        assert_eq!(state.fill_amount, Some(dec!(1)));

        let mut state = self::state(vec![order("a", OrderStatus::Expired)]);
        state.select_default();
        assert_eq!(state.selected.as_deref(), Some("a"));

        let mut state = self::state(Vec::new());
        state.select_default();
        assert_eq!(state.selected, None);
        assert_eq!(state.fill_amount, None);
    }

    #[test]
    fn merge_follows_lifecycle_edges() {
        let mut state = state(vec![order("a", OrderStatus::Open), order("b", OrderStatus::Filled)]);

        state.merge(order("a", OrderStatus::Filled));
        state.merge(order("b", OrderStatus::Open));
        state.merge(order("c", OrderStatus::Open));

        assert_eq!(state.find("a").unwrap().status, OrderStatus::Filled);
        assert_eq!(state.find("b").unwrap().status, OrderStatus::Filled);
        assert_eq!(state.orders[0].id, "c");
        assert_eq!(state.buckets.filled.len(), 2);
        assert_eq!(state.buckets.open.len(), 1);
    }

    #[test]
    fn cancelled_orders_leave_the_book() {
        let mut state = state(vec![order("a", OrderStatus::Open)]);
        state.select(Some("a"));

        state.merge(order("a", OrderStatus::Cancelled));

        assert!(state.orders.is_empty(), "cancelled order is removed");
        assert!(state.buckets.is_empty(), "buckets are recomputed");
        assert_eq!(state.selected, None);
        assert_eq!(state.fill_amount, None);
    }

    #[test]
    fn validate_fill_should_reject_out_of_range_amounts() {
        let mut open = order("a", OrderStatus::Open);
        open.taker_fill_amount = Some(dec!(4));

        validate_fill(&open, dec!(8)).unwrap();
        for amount in [dec!(0), dec!(-1), dec!(0.5), dec!(9)] {
            let err = validate_fill(&open, amount).unwrap_err();
            assert_eq!(err.kind(), crate::error::Kind::Validation);
        }

        let filled = order("b", OrderStatus::Filled);
        validate_fill(&filled, dec!(1)).unwrap_err();
    }

    #[test]
    fn filling_guard_resets_flag() {
        let flag = AtomicBool::new(false);
        {
            let _guard = FillingGuard::enter(&flag);
            assert!(flag.load(Ordering::SeqCst), "set while the guard lives");
        }
        assert!(!flag.load(Ordering::SeqCst), "reset on drop");
    }
}
