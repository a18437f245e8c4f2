//! Server-held user profile types.
//!
//! These are the wire shapes of the User Directory API. The coordinator keeps
//! a read-through cached copy of the record for the currently active address
//! only; the cache is discarded whenever the active address changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::WalletAddress;

/// Registration profile for one wallet address, as stored by the Directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub wallet_address: String,

    /// The user's own invite code, handed out to people they refer.
    #[serde(default)]
    pub invite_code: String,

    /// Invite code used during registration, if any.
    #[serde(default)]
    pub referred_by: Option<String>,

    #[serde(default)]
    pub twitter_username: Option<String>,

    #[serde(default)]
    pub twitter_verified: bool,

    #[serde(default)]
    pub terms_accepted: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Minimal local record for a wallet the Directory has confirmed but
    /// never described to us (e.g. terms accepted after a failed lookup).
    pub fn sparse(address: &WalletAddress) -> Self {
        Self {
            wallet_address: address.as_str().to_string(),
            invite_code: String::new(),
            referred_by: None,
            twitter_username: None,
            twitter_verified: false,
            terms_accepted: false,
            created_at: None,
        }
    }
}

/// One wallet referred by the user's invite code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralEntry {
    pub wallet_address: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Referral statistics for the connected view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralSummary {
    pub invite_code: String,
    pub referral_count: u32,
    #[serde(default)]
    pub referrals: Vec<ReferralEntry>,
}
