//! Storage-specific error types.

use std::error::Error as StdError;
use std::fmt;

/// Failures that mean the wallet SDK did not return what a published transaction should have.
#[non_exhaustive]
#[derive(Debug)]
pub enum StorageError {
    /// Neither the receipt nor the builder produced the new account's public key
    MissingPublicKey,
    /// The SDK handed back a placeholder instead of a real account
    PlaceholderAddress(String),
    /// The send was published but no block hash came back, so it cannot be proven
    MissingBlockHash,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPublicKey => {
                write!(f, "storage account public key could not be resolved")
            }
            Self::PlaceholderAddress(address) => {
                write!(f, "wallet returned placeholder address {address:?}")
            }
            Self::MissingBlockHash => {
                write!(f, "publish receipt contains no block hash")
            }
        }
    }
}

impl StdError for StorageError {}

impl From<StorageError> for crate::error::Error {
    fn from(err: StorageError) -> Self {
        crate::error::Error::with_source(crate::error::Kind::Wallet, err)
    }
}
