use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub schema_version: u32,

    #[serde(default)]
    pub directory: DirectorySettings,

    #[serde(default)]
    pub wallet: WalletSettings,
}

/// Where and how to reach the user directory backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorySettings {
    pub base_url: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSettings {
    /// Pause between the disconnect settling and the provider chooser
    /// reopening during a change-wallet flow. Reopening in the same tick
    /// makes some providers silently resume the old session.
    pub reconnect_delay: Duration,
}
