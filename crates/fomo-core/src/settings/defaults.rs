use std::time::Duration;

use super::model::*;

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            directory: DirectorySettings::default(),
            wallet: WalletSettings::default(),
        }
    }
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_millis(100),
        }
    }
}
