//! Types for the RFQ desk: wire DTOs, status enums and the quote form.
//!
//! Wire payloads are snake_case JSON. Numeric fields accept strings or numbers, identifiers
//! accept strings or integers, and optional fields default when absent.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::Result;
use crate::error::Error;

pub mod request;
pub mod response;

pub use request::{
    ConfirmFillRequest, CreateOrderRequest, FillRequestRequest, OrdersRequest, QuoteSubmission,
};
pub use response::{
    ConfirmFillResponse, FillRequestResponse, RfqDeclaration, RfqMakerMeta, RfqOrder,
};

#[non_exhaustive]
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    #[serde(alias = "BUY")]
    Buy,
    #[serde(alias = "SELL")]
    Sell,
}

/// Lifecycle of an [`RfqOrder`].
///
/// ```text
/// open ──▶ pending_fill ──▶ filled
///   │            │
///   └────────────┴──▶ expired
/// ```
///
/// `cancelled` is what the backend reports for a withdrawn quote; such orders are dropped from
/// local state rather than kept.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Open,
    PendingFill,
    Filled,
    Expired,
    Cancelled,
    /// Status value this client does not know about
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Whether `next` is a single allowed edge from `self`.
    #[must_use]
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::{Cancelled, Expired, Filled, Open, PendingFill};

        matches!(
            (self, next),
            (Open, PendingFill | Expired | Cancelled) | (PendingFill, Filled | Expired | Cancelled)
        )
    }

    /// Whether `next` can be reached from `self` through allowed edges (e.g. `open → filled`
    /// through `pending_fill`).
    #[must_use]
    pub fn can_reach(self, next: OrderStatus) -> bool {
        self.can_transition_to(next)
            || (self.can_transition_to(OrderStatus::PendingFill)
                && OrderStatus::PendingFill.can_transition_to(next))
    }

    /// `filled`, `expired` and `cancelled` have no outgoing edges.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Expired | OrderStatus::Cancelled
        )
    }
}

/// Resolution of an [`RfqDeclaration`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeclarationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl DeclarationStatus {
    #[must_use]
    pub fn is_resolved(self) -> bool {
        !matches!(self, DeclarationStatus::Pending)
    }
}

/// How long a new quote stays open.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ExpiryPreset {
    #[serde(rename = "5m")]
    #[strum(serialize = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    #[strum(serialize = "15m")]
    FifteenMinutes,
    #[default]
    #[serde(rename = "1h")]
    #[strum(serialize = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    #[strum(serialize = "4h")]
    FourHours,
    #[serde(rename = "24h")]
    #[strum(serialize = "24h")]
    OneDay,
}

impl ExpiryPreset {
    /// Parses a preset, falling back to [`ExpiryPreset::OneHour`] for anything unrecognized.
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    #[must_use]
    pub fn duration(self) -> Duration {
        const MINUTE: u64 = 60;

        Duration::from_secs(match self {
            ExpiryPreset::FiveMinutes => 5 * MINUTE,
            ExpiryPreset::FifteenMinutes => 15 * MINUTE,
            ExpiryPreset::OneHour => 60 * MINUTE,
            ExpiryPreset::FourHours => 4 * 60 * MINUTE,
            ExpiryPreset::OneDay => 24 * 60 * MINUTE,
        })
    }

    #[must_use]
    pub fn expiry_from(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let minutes = i64::try_from(self.duration().as_secs() / 60).unwrap_or(i64::MAX);
        now + chrono::Duration::minutes(minutes)
    }
}

impl FromStr for ExpiryPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "5m" => Ok(ExpiryPreset::FiveMinutes),
            "15m" => Ok(ExpiryPreset::FifteenMinutes),
            "1h" => Ok(ExpiryPreset::OneHour),
            "4h" => Ok(ExpiryPreset::FourHours),
            "24h" => Ok(ExpiryPreset::OneDay),
            other => Err(Error::validation(format!("unknown expiry preset {other:?}"))),
        }
    }
}

/// Orders partitioned by status. Orders in any other status belong to no bucket.
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderBuckets {
    pub open: Vec<RfqOrder>,
    pub pending_fill: Vec<RfqOrder>,
    pub filled: Vec<RfqOrder>,
    pub expired: Vec<RfqOrder>,
}

impl OrderBuckets {
    #[must_use]
    pub fn partition(orders: &[RfqOrder]) -> Self {
        let mut buckets = Self::default();
        for order in orders {
            let bucket = match order.status {
                OrderStatus::Open => &mut buckets.open,
                OrderStatus::PendingFill => &mut buckets.pending_fill,
                OrderStatus::Filled => &mut buckets.filled,
                OrderStatus::Expired => &mut buckets.expired,
                OrderStatus::Cancelled | OrderStatus::Unknown => continue,
            };
            bucket.push(order.clone());
        }
        buckets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len() + self.pending_fill.len() + self.filled.len() + self.expired.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
