//! User Directory port
//!
//! Contract for the registration backend. The HTTP implementation lives in
//! the infrastructure layer; tests and the coordinator only ever see this
//! trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ids::WalletAddress;
use crate::ports::errors::DirectoryError;
use crate::user::{ReferralSummary, UserRecord};

/// Result of registering a wallet. `is_new` is false when the wallet was
/// already on file; the call is an upsert either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    pub is_new: bool,
    pub user: Option<UserRecord>,
    pub message: Option<String>,
}

/// Answer to an invite-code check. An invalid code is a verdict, not an
/// error; `DirectoryError` is reserved for transport failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteVerdict {
    pub valid: bool,
    pub message: Option<String>,
}

/// Generic acknowledgement for the social-link and accept-terms calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryAck {
    pub success: bool,
    pub message: Option<String>,
}

#[async_trait]
pub trait UserDirectoryPort: Send + Sync {
    /// Fetch the record for `address`. `Ok(None)` means the wallet has never
    /// registered.
    async fn lookup_user(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<UserRecord>, DirectoryError>;

    /// Register `address`, optionally crediting `invite_code` as referrer.
    /// Registers are upserts; re-registering an existing wallet is safe.
    async fn register_user(
        &self,
        address: &WalletAddress,
        invite_code: Option<&str>,
    ) -> Result<RegistrationReceipt, DirectoryError>;

    /// Check whether `code` belongs to a registered wallet.
    async fn verify_invite(&self, code: &str) -> Result<InviteVerdict, DirectoryError>;

    /// Attach a social handle to the wallet's record.
    async fn link_social(
        &self,
        address: &WalletAddress,
        handle: &str,
    ) -> Result<DirectoryAck, DirectoryError>;

    /// Record terms acceptance for the wallet.
    async fn accept_terms(&self, address: &WalletAddress) -> Result<DirectoryAck, DirectoryError>;

    /// The wallet's own invite code and the wallets it brought in.
    async fn referral_summary(
        &self,
        address: &WalletAddress,
    ) -> Result<ReferralSummary, DirectoryError>;
}
