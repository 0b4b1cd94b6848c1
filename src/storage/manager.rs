//! Sequences storage account transactions on a [`Wallet`].

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;

use super::error::StorageError;
use super::types::{
    AccountInfo, AclEntry, CreateStorageAccountRequest, CreateStorageAccountResponse,
    GrantPermissionRequest, PermissionUpdate, Permissions, PublishReceipt,
    RevokePermissionsRequest, SelfWithdrawRequest, SelfWithdrawResponse, SendOperation,
    StorageMetadata,
};
use super::wallet::{
    AccountInfoWriter as _, BlockComputer as _, PermissionGranter as _,
    StorageAccountFactory as _, TokenSender as _, Wallet,
};
use crate::error::Error;
use crate::{Network, Result, is_placeholder_address, validate_address};

/// Builds and publishes storage account transactions for the connected wallet.
#[derive(Debug)]
pub struct StorageAccountManager<W: Wallet> {
    wallet: Arc<W>,
    network: Network,
}

impl<W: Wallet> Clone for StorageAccountManager<W> {
    fn clone(&self) -> Self {
        Self {
            wallet: Arc::clone(&self.wallet),
            network: self.network,
        }
    }
}

impl<W: Wallet> StorageAccountManager<W> {
    #[must_use]
    pub fn new(wallet: Arc<W>, network: Network) -> Self {
        Self { wallet, network }
    }

    #[must_use]
    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    #[must_use]
    pub fn network(&self) -> Network {
        self.network
    }

    /// Creates a storage account owned by the wallet in a single publish.
    ///
    /// The account gets default info and [`Permissions::STORAGE_DEFAULTS`]; when an operator
    /// is given it receives `SEND_ON_BEHALF` for every allowed token. Placeholder or malformed
    /// tokens, and tokens whose grant the builder refuses, are skipped with a warning and
    /// reported in [`CreateStorageAccountResponse::skipped_tokens`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed operator, and a wallet error if the new
    /// account's public key cannot be resolved or is a placeholder.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self, request), fields(
            operator = ?request.operator,
            tokens = request.allowed_tokens.len()
        ))
    )]
    pub async fn create_storage_account(
        &self,
        request: &CreateStorageAccountRequest,
    ) -> Result<CreateStorageAccountResponse> {
        if let Some(operator) = &request.operator {
            validate_address(operator, self.network)?;
        }

        let mut builder = self.wallet.init_builder().await?;
        let pending = builder.generate_storage_account()?;
        builder.compute_blocks().await?;

        let metadata = StorageMetadata::builder()
            .maybe_operator(request.operator.clone())
            .allowed_tokens(request.allowed_tokens.clone())
            .created_at(Utc::now())
            .build();
        let info = AccountInfo::builder()
            .name(request.name.clone())
            .description(request.description.clone())
            .metadata(STANDARD.encode(serde_json::to_vec(&metadata)?))
            .default_permissions(Permissions::STORAGE_DEFAULTS)
            .build();
        builder.set_info(&pending.handle, &info)?;

        let mut granted_tokens = Vec::new();
        let mut skipped_tokens = Vec::new();
        if let Some(operator) = &request.operator {
            for token in &request.allowed_tokens {
                if is_placeholder_address(token) || validate_address(token, self.network).is_err()
                {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(token = %token, "skipping invalid allowed token");
                    skipped_tokens.push(token.clone());
                    continue;
                }

                let entry = AclEntry::builder()
                    .principal(operator.clone())
                    .entity(pending.handle.clone())
                    .target(token.clone())
                    .permissions(Permissions::SEND_ON_BEHALF)
                    .build();
                match builder.update_permissions(&entry, PermissionUpdate::Add) {
                    Ok(()) => granted_tokens.push(token.clone()),
                    Err(e) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(token = %token, error = %e, "failed to grant token permission");
                        #[cfg(not(feature = "tracing"))]
                        let _: &Error = &e;
                        skipped_tokens.push(token.clone());
                    }
                }
            }
        }

        let receipt = self.wallet.publish_builder(builder).await?;

        let non_empty = |key: &String| !key.trim().is_empty();
        let address = receipt
            .account
            .as_ref()
            .map(|account| account.public_key().to_owned())
            .filter(non_empty)
            .or_else(|| pending.public_key.filter(non_empty))
            .ok_or(StorageError::MissingPublicKey)?;
        if is_placeholder_address(&address) {
            return Err(StorageError::PlaceholderAddress(address).into());
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(address = %address, granted = granted_tokens.len(), "storage account created");

        Ok(CreateStorageAccountResponse {
            address,
            granted_tokens,
            skipped_tokens,
            receipt,
        })
    }

    /// Grants `operator` `SEND_ON_BEHALF` over `storage_account`, scoped to `token`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            storage_account = %request.storage_account,
            operator = %request.operator,
            token = %request.token
        ))
    )]
    pub async fn grant_token_permission(
        &self,
        request: &GrantPermissionRequest,
    ) -> Result<PublishReceipt> {
        validate_address(&request.storage_account, self.network)?;
        validate_address(&request.operator, self.network)?;
        validate_address(&request.token, self.network)?;

        let entry = AclEntry::builder()
            .principal(request.operator.clone())
            .entity(request.storage_account.clone())
            .target(request.token.clone())
            .permissions(Permissions::SEND_ON_BEHALF)
            .build();

        self.publish_permission_update(&entry, PermissionUpdate::Add)
            .await
    }

    /// Removes every permission `operator` holds over `storage_account`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            storage_account = %request.storage_account,
            operator = %request.operator
        ))
    )]
    pub async fn revoke_operator_permissions(
        &self,
        request: &RevokePermissionsRequest,
    ) -> Result<PublishReceipt> {
        validate_address(&request.storage_account, self.network)?;
        validate_address(&request.operator, self.network)?;

        let entry = AclEntry::builder()
            .principal(request.operator.clone())
            .entity(request.storage_account.clone())
            .permissions(Permissions::empty())
            .build();

        self.publish_permission_update(&entry, PermissionUpdate::Set)
            .await
    }

    /// Sends `amount` of `token` out of a storage account owned by the wallet.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero amount or malformed address, and a wallet error if
    /// the receipt carries no block hash: the send may have gone through, but without a hash
    /// it cannot be reported as a success.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            storage_account = %request.storage_account,
            destination = %request.destination,
            token = %request.token,
            amount = %request.amount
        ))
    )]
    pub async fn self_withdraw(&self, request: &SelfWithdrawRequest) -> Result<SelfWithdrawResponse> {
        if request.amount == 0 {
            return Err(Error::validation("withdraw amount must be positive"));
        }
        validate_address(&request.storage_account, self.network)?;
        validate_address(&request.destination, self.network)?;
        validate_address(&request.token, self.network)?;

        let mut builder = self.wallet.init_builder().await?;
        builder.send(
            &SendOperation::builder()
                .to(request.destination.clone())
                .amount(request.amount)
                .token(request.token.clone())
                .from(request.storage_account.clone())
                .build(),
        )?;

        let receipt = self.wallet.publish_builder(builder).await?;
        let transaction_hash = receipt
            .last_hash()
            .ok_or(StorageError::MissingBlockHash)?
            .to_owned();

        Ok(SelfWithdrawResponse { transaction_hash })
    }

    async fn publish_permission_update(
        &self,
        entry: &AclEntry,
        update: PermissionUpdate,
    ) -> Result<PublishReceipt> {
        let mut builder = self.wallet.init_builder().await?;
        builder.update_permissions(entry, update)?;
        self.wallet.publish_builder(builder).await
    }
}
