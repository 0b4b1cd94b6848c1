//! Capability traits for the wallet SDK.
//!
//! Each SDK operation this crate relies on is its own trait, so an adapter states exactly what
//! its SDK version supports and a missing capability is a compile error rather than a runtime
//! surprise. The transaction builder implements the builder capabilities; [`Wallet`] ties a
//! builder type to the account that signs and publishes it.

use async_trait::async_trait;
use bon::Builder;

use super::types::{
    AccountInfo, AclEntry, PendingAccount, PermissionUpdate, PublishReceipt, SendOperation,
    StorageAccountState,
};
use crate::Result;
use crate::types::Decimal;

/// Generates a new storage account identifier on a builder.
pub trait StorageAccountFactory {
    fn generate_storage_account(&mut self) -> Result<PendingAccount>;
}

/// Finalizes the builder's pending blocks. SDKs without an explicit compute step implement
/// this as a no-op.
#[async_trait]
pub trait BlockComputer {
    async fn compute_blocks(&mut self) -> Result<()>;
}

/// Writes name, description, metadata and default permissions of an account.
pub trait AccountInfoWriter {
    /// `account` is a public key or the handle of a [`PendingAccount`] on the same builder.
    fn set_info(&mut self, account: &str, info: &AccountInfo) -> Result<()>;
}

/// Adds, removes or replaces a principal's permissions over an account.
pub trait PermissionGranter {
    fn update_permissions(&mut self, entry: &AclEntry, update: PermissionUpdate) -> Result<()>;
}

/// Adds a token transfer to the builder.
pub trait TokenSender {
    fn send(&mut self, operation: &SendOperation) -> Result<()>;
}

/// What the taker's wallet needs to co-sign a fill against a maker's quote.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct FillIntent {
    pub order_id: String,
    pub pair: String,
    pub price: Decimal,
    pub amount: Decimal,
    pub taker_address: String,
    /// The maker's unsigned swap block, when the quote carries one
    pub unsigned_block: Option<String>,
    pub maker_signature: Option<String>,
    pub storage_account: Option<String>,
}

/// The taker's signature over a fill.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct SignedFill {
    /// Serialized, taker-signed swap block
    pub signed_block: String,
    /// Block hash, when the wallet already published its half
    pub hash: Option<String>,
}

/// A connected wallet identity.
#[async_trait]
pub trait Wallet: Send + Sync {
    type Builder: StorageAccountFactory
        + BlockComputer
        + AccountInfoWriter
        + PermissionGranter
        + TokenSender
        + Send;

    /// Public key of the connected account.
    fn address(&self) -> &str;

    async fn init_builder(&self) -> Result<Self::Builder>;

    async fn publish_builder(&self, builder: Self::Builder) -> Result<PublishReceipt>;

    /// Fresh read of a storage account's balances and ACL.
    async fn storage_account_state(&self, address: &str) -> Result<StorageAccountState>;

    async fn co_sign_fill(&self, intent: &FillIntent) -> Result<SignedFill>;
}
