//! Re-exported types from external crates for convenience.
//!
//! These types are commonly used in this SDK and are re-exported here
//! so users don't need to add these dependencies to their `Cargo.toml`.

/// Date and time types for order expiry and record timestamps.
pub use chrono::{DateTime, Duration as TimeDelta, Utc};
/// Arbitrary precision decimal type for prices, sizes, and amounts.
pub use rust_decimal::Decimal;
/// Macro for creating [`Decimal`] literals at compile time.
///
/// # Example
/// ```
/// use keeta_rfq_client::types::dec;
/// let price = dec!(3450.25);
/// ```
pub use rust_decimal_macros::dec;
