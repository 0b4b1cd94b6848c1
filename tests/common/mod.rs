#![cfg(feature = "storage")]
#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]
#![allow(
    unused,
    reason = "Deeply nested uses in sub-modules are falsely flagged as being unused"
)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use keeta_rfq_client::Result;
use keeta_rfq_client::error::Error;
use keeta_rfq_client::storage::types::{
    AccountInfo, AclEntry, PendingAccount, PermissionUpdate, PublishReceipt, SendOperation,
    StorageAccountState,
};
use keeta_rfq_client::storage::wallet::{
    AccountInfoWriter, BlockComputer, FillIntent, PermissionGranter, SignedFill,
    StorageAccountFactory, TokenSender, Wallet,
};
use serde_json::json;

pub const WALLET: &str = "keeta_aabtakerwallet";
pub const MAKER: &str = "keeta_aabmakerwallet";
pub const OPERATOR: &str = "keeta_abdeskoperator";
pub const STORAGE: &str = "keeta_aqstorageescrow";
pub const NEW_STORAGE: &str = "keeta_aqnewstorage";
pub const ETH_TOKEN: &str = "keeta_anethtoken";
pub const USDC_TOKEN: &str = "keeta_anusdctoken";

pub const PENDING_HANDLE: &str = "pending-storage-0";

/// Everything the wallet and its builders were asked to do, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    InitBuilder,
    GenerateStorageAccount,
    ComputeBlocks,
    SetInfo { account: String, info: AccountInfo },
    UpdatePermissions { entry: AclEntry, update: PermissionUpdate },
    Send(SendOperation),
    Publish,
    StorageAccountState(String),
    CoSignFill(FillIntent),
}

/// How the mock wallet answers.
#[derive(Clone, Debug, Default)]
pub struct Script {
    /// Key the builder reports for a freshly generated storage account
    pub pending_public_key: Option<String>,
    /// Tokens whose permission grant the builder refuses
    pub refused_grants: Vec<String>,
    pub receipt: PublishReceipt,
    pub fail_publish: bool,
    pub fail_co_sign: bool,
    /// `None` makes storage account reads fail
    pub state: Option<StorageAccountState>,
}

#[derive(Debug)]
pub struct MockWallet {
    address: String,
    script: Script,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockWallet {
    #[must_use]
    pub fn new(script: Script) -> Self {
        Self::with_address(WALLET, script)
    }

    #[must_use]
    pub fn with_address(address: &str, script: Script) -> Self {
        Self {
            address: address.to_owned(),
            script,
            calls: Arc::default(),
        }
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|call| matches(call)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[derive(Debug)]
pub struct MockBuilder {
    pending_public_key: Option<String>,
    refused_grants: Vec<String>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockBuilder {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl StorageAccountFactory for MockBuilder {
    fn generate_storage_account(&mut self) -> Result<PendingAccount> {
        self.record(Call::GenerateStorageAccount);
        Ok(PendingAccount::builder()
            .handle(PENDING_HANDLE)
            .maybe_public_key(self.pending_public_key.clone())
            .build())
    }
}

#[async_trait]
impl BlockComputer for MockBuilder {
    async fn compute_blocks(&mut self) -> Result<()> {
        self.record(Call::ComputeBlocks);
        Ok(())
    }
}

impl AccountInfoWriter for MockBuilder {
    fn set_info(&mut self, account: &str, info: &AccountInfo) -> Result<()> {
        self.record(Call::SetInfo {
            account: account.to_owned(),
            info: info.clone(),
        });
        Ok(())
    }
}

impl PermissionGranter for MockBuilder {
    fn update_permissions(&mut self, entry: &AclEntry, update: PermissionUpdate) -> Result<()> {
        let refused = entry
            .target
            .as_ref()
            .is_some_and(|token| self.refused_grants.contains(token));
        if refused {
            return Err(Error::wallet("grant refused by builder"));
        }

        self.record(Call::UpdatePermissions {
            entry: entry.clone(),
            update,
        });
        Ok(())
    }
}

impl TokenSender for MockBuilder {
    fn send(&mut self, operation: &SendOperation) -> Result<()> {
        self.record(Call::Send(operation.clone()));
        Ok(())
    }
}

#[async_trait]
impl Wallet for MockWallet {
    type Builder = MockBuilder;

    fn address(&self) -> &str {
        &self.address
    }

    async fn init_builder(&self) -> Result<MockBuilder> {
        self.record(Call::InitBuilder);
        Ok(MockBuilder {
            pending_public_key: self.script.pending_public_key.clone(),
            refused_grants: self.script.refused_grants.clone(),
            calls: Arc::clone(&self.calls),
        })
    }

    async fn publish_builder(&self, _builder: MockBuilder) -> Result<PublishReceipt> {
        self.record(Call::Publish);
        if self.script.fail_publish {
            return Err(Error::wallet("publish rejected by node"));
        }
        Ok(self.script.receipt.clone())
    }

    async fn storage_account_state(&self, address: &str) -> Result<StorageAccountState> {
        self.record(Call::StorageAccountState(address.to_owned()));
        self.script
            .state
            .clone()
            .ok_or_else(|| Error::wallet("account not found"))
    }

    async fn co_sign_fill(&self, intent: &FillIntent) -> Result<SignedFill> {
        self.record(Call::CoSignFill(intent.clone()));
        if self.script.fail_co_sign {
            return Err(Error::wallet("user rejected the signature"));
        }
        Ok(SignedFill::builder()
            .signed_block(format!("signed:{}:{}", intent.order_id, intent.amount))
            .hash("BFILL")
            .build())
    }
}

/// A receipt with the given blocks and an object-shaped account reference.
#[must_use]
pub fn receipt(account: Option<&str>, hashes: &[&str]) -> PublishReceipt {
    let blocks: Vec<_> = hashes.iter().map(|hash| json!({ "hash": hash })).collect();
    let value = match account {
        Some(key) => json!({ "account": { "publicKeyString": key }, "blocks": blocks }),
        None => json!({ "blocks": blocks }),
    };
    serde_json::from_value(value).unwrap()
}
