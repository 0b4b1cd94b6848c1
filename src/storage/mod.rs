//! Storage account management through a connected Keeta wallet.
//!
//! **Feature flag:** `storage` (required to use this module)
//!
//! A storage account is an on-chain account used as escrow for RFQ quotes: the maker funds it,
//! and an operator is granted `SEND_ON_BEHALF` for the tokens it may settle. Every state change
//! is a wallet-signed transaction assembled on a builder and then published.
//!
//! The wallet SDK is reached only through the capability traits in [`wallet`]; an application
//! implements them once for the SDK it ships with.
//!
//! # Operations
//!
//! - **Create**: generate a storage account, set its info and default permissions, and grant
//!   the operator per-token send permission, all in one publish
//! - **Grant / Revoke**: update a single operator permission
//! - **Self-withdraw**: send funds out of a storage account owned by the wallet
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use keeta_rfq_client::Network;
//! use keeta_rfq_client::storage::{StorageAccountManager, types::CreateStorageAccountRequest};
//!
//! # async fn example(wallet: Arc<impl keeta_rfq_client::storage::wallet::Wallet>) -> keeta_rfq_client::Result<()> {
//! let manager = StorageAccountManager::new(wallet, Network::Main);
//!
//! let request = CreateStorageAccountRequest::builder()
//!     .operator("keeta_aabz4ysh6nm3xv5qltwgcpdj7rkfe2uo")
//!     .allowed_tokens(vec!["keeta_anqdilpazdekdu4acw65fj7smltcp26wbrildkqtszqvverljpwpezmd44ssg".to_owned()])
//!     .build();
//!
//! let created = manager.create_storage_account(&request).await?;
//! println!("storage account: {}", created.address);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod manager;
pub mod types;
pub mod wallet;

pub use error::StorageError;
pub use manager::StorageAccountManager;
