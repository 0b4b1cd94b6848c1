//! Client for the ledger history service.
//!
//! **Feature flag:** `ledger`
//!
//! The service exposes read-only views of an account's chain, keyed by public key:
//!
//! | Endpoint | Description |
//! |----------|-------------|
//! | `/ledger/v1/accounts/:pk/history` | Vote-staple history touching the account |
//! | `/ledger/v1/accounts/:pk/chain` | Blocks authored by the account |
//! | `/ledger/v1/accounts/:pk/operations` | Flattened operations of those blocks |
//! | `/ledger/v1/accounts/:pk/balance` | Current token balances |
//!
//! The service answers with empty arrays rather than an error status when its own SDK call
//! fails, so every list in the response types defaults to empty. History lookups can be slow;
//! [`Config::history_timeout`] bounds them.

pub mod client;
pub mod types;

pub use client::{Client, Config};
