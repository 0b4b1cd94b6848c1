#![allow(
    clippy::module_name_repetitions,
    reason = "Request suffix is intentional for clarity"
)]

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_with::skip_serializing_none;
use uuid::Uuid;

use super::Side;
use crate::types::Decimal;

/// Query parameters for listing orders.
#[non_exhaustive]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Builder)]
#[builder(on(String, into))]
pub struct OrdersRequest {
    /// Only orders for this pair, e.g. `ETH-USDC`
    pub pair: Option<String>,
}

/// Body for publishing a new quote.
#[non_exhaustive]
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct CreateOrderRequest {
    /// Client-generated order identifier
    #[builder(default = Uuid::new_v4())]
    pub id: Uuid,
    pub pair: String,
    pub side: Side,
    pub price: Decimal,
    pub size: Decimal,
    pub min_fill: Option<Decimal>,
    pub expiry: DateTime<Utc>,
    pub maker_id: String,
    pub unsigned_block: Option<String>,
    pub maker_signature: Option<String>,
    pub storage_account: String,
    #[builder(default)]
    pub allowlisted: bool,
}

/// Body for a taker's fill request.
#[non_exhaustive]
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct FillRequestRequest {
    pub fill_amount: Decimal,
    pub taker_address: String,
    /// Taker-signed swap block
    pub signed_block: Option<String>,
    /// Ask the backend to publish the swap as soon as the maker side is signed.
    #[builder(default = true)]
    pub auto_publish: bool,
}

/// Body for a maker approving or rejecting a declaration.
#[non_exhaustive]
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct ConfirmFillRequest {
    pub declaration_id: String,
    pub approved: bool,
    /// Maker-signed swap block, required by the backend when approving
    pub signed_block: Option<String>,
}

/// A new quote as entered by a maker, before validation and expiry computation.
#[non_exhaustive]
#[derive(Debug, Clone, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct QuoteSubmission {
    pub pair: String,
    pub side: Side,
    pub price: Decimal,
    pub size: Decimal,
    pub min_fill: Option<Decimal>,
    /// One of `5m`, `15m`, `1h`, `4h`, `24h`; anything else means `1h`
    #[builder(default = "1h".to_owned())]
    pub expiry_preset: String,
    pub maker_id: String,
    #[builder(default)]
    pub allowlisted: bool,
    pub unsigned_block: Option<String>,
    pub maker_signature: Option<String>,
}
