//! Request, response and ACL types for storage account operations.

use bitflags::bitflags;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Decimal;

bitflags! {
    /// Account permission flags as understood by the Keeta ledger.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct Permissions: u32 {
        const ACCESS = 1;
        const OWNER = 1 << 1;
        const ADMIN = 1 << 2;
        const UPDATE_INFO = 1 << 3;
        const SEND_ON_BEHALF = 1 << 4;
        const STORAGE_CREATE = 1 << 5;
        const STORAGE_DEPOSIT = 1 << 6;
        const STORAGE_CAN_HOLD = 1 << 7;
        const TOKEN_ADMIN_SUPPLY = 1 << 8;
    }
}

impl Permissions {
    /// Permissions every new storage account grants by default: anyone may deposit, and the
    /// account may hold any token.
    pub const STORAGE_DEFAULTS: Self = Self::STORAGE_DEPOSIT.union(Self::STORAGE_CAN_HOLD);

    /// Flag names in the ledger's spelling, for SDKs that take permissions as strings.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

/// How a permission update combines with what the principal already holds.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PermissionUpdate {
    Add,
    Remove,
    Set,
}

/// An access-control entry: `principal` holds `permissions` over `entity`, optionally scoped to
/// a single `target` token.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct AclEntry {
    pub principal: String,
    pub entity: String,
    pub target: Option<String>,
    pub permissions: Permissions,
}

/// A storage account generated on a builder but not yet published.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct PendingAccount {
    /// Builder-local handle used to address the account in later operations on the same builder
    pub handle: String,
    /// Public key, when the SDK can derive it before publishing
    pub public_key: Option<String>,
}

/// Account info written with `set_info`.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct AccountInfo {
    pub name: String,
    pub description: String,
    /// Base64-encoded JSON blob, see [`StorageMetadata`]
    pub metadata: String,
    pub default_permissions: Permissions,
}

/// JSON document stored (base64-encoded) in a storage account's metadata.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct StorageMetadata {
    #[builder(default = "rfq-storage".to_owned())]
    pub kind: String,
    pub operator: Option<String>,
    #[builder(default)]
    pub allowed_tokens: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A token transfer added to a builder.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct SendOperation {
    pub to: String,
    /// Amount in the token's base units
    pub amount: u128,
    pub token: String,
    /// Source account when sending on behalf of an account other than the signer
    pub from: Option<String>,
}

/// Account reference inside a publish receipt. SDK versions disagree on whether this is a bare
/// public key or an object carrying one.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum AccountRef {
    Key(String),
    Object {
        #[serde(alias = "publicKey", alias = "public_key")]
        #[serde(rename = "publicKeyString")]
        public_key_string: String,
    },
}

impl AccountRef {
    #[must_use]
    pub fn public_key(&self) -> &str {
        match self {
            Self::Key(key) => key,
            Self::Object { public_key_string } => public_key_string,
        }
    }
}

/// A block included in a publish.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct PublishedBlock {
    #[serde(alias = "blockHash")]
    pub hash: String,
}

/// What the wallet reports after publishing a builder.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Builder)]
pub struct PublishReceipt {
    /// Account created by the publish, if any
    #[serde(default)]
    pub account: Option<AccountRef>,
    #[serde(default)]
    #[builder(default)]
    pub blocks: Vec<PublishedBlock>,
}

impl PublishReceipt {
    /// Hash of the last non-empty block, which carries the operations added last.
    #[must_use]
    pub fn last_hash(&self) -> Option<&str> {
        self.blocks
            .iter()
            .rev()
            .map(|block| block.hash.trim())
            .find(|hash| !hash.is_empty())
    }
}

/// Balance of one token held by an account.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct TokenBalance {
    pub token: String,
    pub balance: u128,
}

/// On-chain state of a storage account as read through the wallet. Never cached
/// authoritatively; readers display it and re-read when they need it again.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct StorageAccountState {
    pub address: String,
    pub owner: Option<String>,
    #[builder(default)]
    pub balances: Vec<TokenBalance>,
    #[builder(default)]
    pub acl: Vec<AclEntry>,
}

impl StorageAccountState {
    #[must_use]
    pub fn balance_of(&self, token: &str) -> u128 {
        self.balances
            .iter()
            .find(|balance| balance.token == token)
            .map_or(0, |balance| balance.balance)
    }

    /// Permissions `principal` holds over this account for `token` (entries without a target
    /// apply to every token).
    #[must_use]
    pub fn permissions_of(&self, principal: &str, token: Option<&str>) -> Permissions {
        self.acl
            .iter()
            .filter(|entry| entry.principal == principal)
            .filter(|entry| entry.target.is_none() || entry.target.as_deref() == token)
            .fold(Permissions::empty(), |acc, entry| acc | entry.permissions)
    }
}

/// Request to create a storage account.
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
#[builder(on(String, into))]
pub struct CreateStorageAccountRequest {
    /// Operator to receive `SEND_ON_BEHALF` for each allowed token
    pub operator: Option<String>,
    #[builder(default)]
    pub allowed_tokens: Vec<String>,
    #[builder(default = "RFQ Storage".to_owned())]
    pub name: String,
    #[builder(default = "Escrow account for RFQ quotes".to_owned())]
    pub description: String,
}

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct CreateStorageAccountResponse {
    /// Public key of the new storage account
    pub address: String,
    /// Tokens the operator was granted `SEND_ON_BEHALF` for
    #[builder(default)]
    pub granted_tokens: Vec<String>,
    /// Tokens skipped because they were placeholders, malformed, or the grant failed
    #[builder(default)]
    pub skipped_tokens: Vec<String>,
    pub receipt: PublishReceipt,
}

/// Request to grant an operator `SEND_ON_BEHALF` for one token of a storage account.
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
#[builder(on(String, into))]
pub struct GrantPermissionRequest {
    pub storage_account: String,
    pub operator: String,
    pub token: String,
}

/// Request to remove every permission an operator holds over a storage account.
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
#[builder(on(String, into))]
pub struct RevokePermissionsRequest {
    pub storage_account: String,
    pub operator: String,
}

/// Request to move funds out of a storage account owned by the wallet.
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
#[builder(on(String, into))]
pub struct SelfWithdrawRequest {
    pub storage_account: String,
    pub destination: String,
    pub token: String,
    /// Amount in the token's base units
    pub amount: u128,
}

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct SelfWithdrawResponse {
    pub transaction_hash: String,
}

/// Converts a human-readable token amount to base units, truncating below the token's
/// precision. Returns `None` for negative amounts or on overflow.
#[must_use]
pub fn to_base_units(amount: Decimal, decimals: u32) -> Option<u128> {
    if amount.is_sign_negative() {
        return None;
    }

    let scale = Decimal::from(10_u64.checked_pow(decimals)?);
    let scaled = amount.checked_mul(scale)?.trunc();
    u128::try_from(scaled).ok()
}
