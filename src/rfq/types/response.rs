use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, TimestampMilliSeconds, serde_as};

use super::{DeclarationStatus, OrderStatus, Side};
use crate::serde_helpers::IdString;
use crate::types::Decimal;

/// A quote published by a maker.
#[non_exhaustive]
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct RfqOrder {
    #[serde_as(as = "IdString")]
    pub id: String,
    /// Trading pair as `BASE-QUOTE`, e.g. `ETH-USDC`
    pub pair: String,
    pub side: Side,
    pub price: Decimal,
    pub size: Decimal,
    #[serde(default)]
    pub min_fill: Option<Decimal>,
    #[serde_as(as = "PickFirst<(_, TimestampMilliSeconds<i64>)>")]
    pub expiry: DateTime<Utc>,
    #[serde_as(as = "IdString")]
    pub maker_id: String,
    /// Maker's unsigned swap block
    #[serde(default)]
    pub unsigned_block: Option<String>,
    #[serde(default)]
    pub maker_signature: Option<String>,
    /// Storage account escrowing the maker's side
    #[serde(default)]
    pub storage_account: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub allowlisted: bool,
    #[serde(default)]
    #[builder(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub taker_fill_amount: Option<Decimal>,
    #[serde(default)]
    pub taker_address: Option<String>,
    #[serde_as(as = "PickFirst<(_, TimestampMilliSeconds<i64>)>")]
    pub created_at: DateTime<Utc>,
    #[serde_as(as = "PickFirst<(_, TimestampMilliSeconds<i64>)>")]
    pub updated_at: DateTime<Utc>,
}

impl RfqOrder {
    /// Size not yet taken by a taker, never negative.
    #[must_use]
    pub fn remaining_size(&self) -> Decimal {
        let filled = self.taker_fill_amount.unwrap_or_default();
        self.size
            .checked_sub(filled)
            .map_or(Decimal::ZERO, |remaining| remaining.max(Decimal::ZERO))
    }

    /// Amount a fill form starts with: the minimum fill when set, else the full size.
    #[must_use]
    pub fn default_fill_amount(&self) -> Decimal {
        self.min_fill.unwrap_or(self.size)
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }

    #[must_use]
    pub fn base_symbol(&self) -> &str {
        self.pair.split_once('-').map_or(&self.pair, |(base, _)| base)
    }

    #[must_use]
    pub fn quote_symbol(&self) -> Option<&str> {
        self.pair.split_once('-').map(|(_, quote)| quote)
    }

    /// Symbol of the token the maker gives up: the base when selling, the quote when buying.
    #[must_use]
    pub fn maker_token_symbol(&self) -> Option<&str> {
        match self.side {
            Side::Sell => Some(self.base_symbol()),
            Side::Buy => self.quote_symbol(),
        }
    }

    /// Amount of [`RfqOrder::maker_token_symbol`] backing `size` of this order.
    #[must_use]
    pub fn maker_token_amount(&self, size: Decimal) -> Option<Decimal> {
        match self.side {
            Side::Sell => Some(size),
            Side::Buy => size.checked_mul(self.price),
        }
    }
}

/// A market maker's public profile. Refreshed wholesale, never patched.
#[non_exhaustive]
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct RfqMakerMeta {
    #[serde_as(as = "IdString")]
    pub id: String,
    #[serde(default)]
    #[builder(default)]
    pub display_name: String,
    #[serde(default)]
    #[builder(default)]
    pub verified: bool,
    #[serde(default)]
    #[builder(default)]
    pub reputation_score: Decimal,
    /// Service level for automatic approval of declarations, in milliseconds
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    #[builder(default)]
    pub auto_sign_sla_ms: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    #[builder(default)]
    pub fills_completed: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    #[builder(default)]
    pub fills_failed: u64,
    #[serde(default)]
    pub allowlist_label: Option<String>,
}

/// A taker's claim against an order, awaiting the maker's approval.
#[non_exhaustive]
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct RfqDeclaration {
    #[serde_as(as = "IdString")]
    pub id: String,
    #[serde_as(as = "IdString")]
    pub order_id: String,
    pub fill_amount: Decimal,
    pub taker_address: String,
    /// Unsigned or partially signed swap block
    #[serde(default)]
    pub swap_block: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub status: DeclarationStatus,
    #[serde_as(as = "PickFirst<(_, TimestampMilliSeconds<i64>)>")]
    pub declared_at: DateTime<Utc>,
}

/// Backend reply to a fill request.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
pub struct FillRequestResponse {
    pub order: RfqOrder,
    #[serde(default)]
    pub declaration: Option<RfqDeclaration>,
    /// Backend-measured time to settle the fill
    #[serde(default)]
    pub latency_ms: Option<u64>,
}

/// Backend reply to a maker confirming or rejecting a declaration.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
pub struct ConfirmFillResponse {
    pub order: RfqOrder,
    #[serde(default)]
    pub declaration: Option<RfqDeclaration>,
}

/// List endpoints answer with either a bare array or a named envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Bare(Vec<T>),
    Orders { orders: Vec<T> },
    Makers { makers: Vec<T> },
    FillRequests { fill_requests: Vec<T> },
}

impl<T> Listing<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items)
            | Listing::Orders { orders: items }
            | Listing::Makers { makers: items }
            | Listing::FillRequests {
                fill_requests: items,
            } => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn order_json() -> serde_json::Value {
        json!({
            "id": 17,
            "pair": "ETH-USDC",
            "side": "sell",
            "price": "3450",
            "size": 12,
            "min_fill": "1",
            "expiry": "2026-10-19T13:00:00Z",
            "maker_id": "maker-1",
            "storage_account": "keeta_aqstorage2x",
            "status": "open",
            "taker_fill_amount": null,
            "created_at": 1_792_400_000_000_i64,
            "updated_at": "2026-10-19T12:00:00Z"
        })
    }

    #[test]
    fn order_coerces_numeric_strings_and_ids() {
        let order: RfqOrder = serde_json::from_value(order_json()).expect("order");

        assert_eq!(order.id, "17");
        assert_eq!(order.price, dec!(3450));
        assert_eq!(order.size, dec!(12));
        assert_eq!(order.min_fill, Some(dec!(1)));
        assert_eq!(order.status, OrderStatus::Open);
        assert!(!order.allowlisted, "allowlisted defaults to false");
        assert_eq!(order.created_at.timestamp_millis(), 1_792_400_000_000);
    }

    #[test]
    fn order_helpers_should_succeed() {
        let mut order: RfqOrder = serde_json::from_value(order_json()).expect("order");
        order.taker_fill_amount = Some(dec!(5));

        assert_eq!(order.remaining_size(), dec!(7));
        assert_eq!(order.default_fill_amount(), dec!(1));
        assert_eq!(order.base_symbol(), "ETH");
        assert_eq!(order.quote_symbol(), Some("USDC"));
        assert_eq!(order.maker_token_symbol(), Some("ETH"));

        order.side = Side::Buy;
        order.taker_fill_amount = Some(dec!(20));
        assert_eq!(order.remaining_size(), Decimal::ZERO);
        assert_eq!(order.maker_token_symbol(), Some("USDC"));
        assert_eq!(order.maker_token_amount(dec!(2)), Some(dec!(6900)));
    }

    #[test]
    fn remaining_size_should_not_overflow() {
        let mut order: RfqOrder = serde_json::from_value(order_json()).expect("order");
        order.size = Decimal::MAX;
        order.taker_fill_amount = Some(Decimal::MIN);

        assert_eq!(order.remaining_size(), Decimal::ZERO);
        assert_eq!(order.default_fill_amount(), dec!(1));
    }

    #[test]
    fn maker_defaults_should_succeed() {
        let maker: RfqMakerMeta = serde_json::from_value(json!({
            "id": "maker-1",
            "display_name": "Northwind",
            "auto_sign_sla_ms": "1500",
            "fills_completed": 42
        }))
        .expect("maker");

        assert_eq!(maker.auto_sign_sla_ms, 1500);
        assert_eq!(maker.fills_completed, 42);
        assert_eq!(maker.fills_failed, 0);
        assert!(!maker.verified, "verified defaults to false");
        assert_eq!(maker.allowlist_label, None);
    }

    #[test]
    fn listing_accepts_bare_and_enveloped_arrays() {
        let bare: Listing<u32> = serde_json::from_value(json!([1, 2])).expect("bare");
        let orders: Listing<u32> =
            serde_json::from_value(json!({ "orders": [3], "total": 1 })).expect("orders");
        let makers: Listing<u32> =
            serde_json::from_value(json!({ "makers": [4] })).expect("makers");

        assert_eq!(bare.into_vec(), vec![1, 2]);
        assert_eq!(orders.into_vec(), vec![3]);
        assert_eq!(makers.into_vec(), vec![4]);
    }
}
