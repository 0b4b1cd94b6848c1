//! RFQ (request-for-quote) desk client and order book.
//!
//! **Feature flag:** `rfq` (implies `storage`)
//!
//! Makers publish quotes backed by a storage account that escrows the side they give up. Takers
//! co-sign a swap against a quote and declare the fill to the backend, which publishes the swap
//! once the maker side is signed.
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/api/rfq/orders` | GET | Orders, optionally filtered by `pair` |
//! | `/api/rfq/orders/:id` | GET | A single order |
//! | `/api/rfq/orders` | POST | Publish a quote |
//! | `/api/rfq/orders/:id` | DELETE | Withdraw a quote |
//! | `/api/rfq/makers` | GET | Maker profiles |
//! | `/api/rfq/orders/:id/fill-request` | POST | Declare a fill |
//! | `/api/rfq/orders/:id/confirm` | POST | Approve or reject a declaration |
//! | `/api/rfq/makers/:id/fill-requests` | GET | Declarations against a maker |
//!
//! [`Client`] is a thin typed wrapper over these endpoints. [`OrderBook`] keeps the visible
//! order list for one pair and sequences the wallet and backend calls of fills, quotes and
//! cancellations.

pub mod book;
pub mod client;
pub mod types;

pub use book::{Config, FillOutcome, FillResult, OrderBook, TokenInfo};
pub use client::Client;
