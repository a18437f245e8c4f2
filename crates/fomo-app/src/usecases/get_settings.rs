//! Use case for getting client settings

use anyhow::Result;
use tracing::{info, info_span, Instrument};

use fomo_core::ports::SettingsPort;
use fomo_core::settings::ClientSettings;

/// Use case for retrieving client settings.
///
/// Loads the current settings from the configured settings repository
/// and returns them to the caller.
pub struct GetSettings {
    settings: std::sync::Arc<dyn SettingsPort>,
}

impl GetSettings {
    pub fn new(settings: std::sync::Arc<dyn SettingsPort>) -> Self {
        Self { settings }
    }

    /// Execute the use case.
    ///
    /// # Returns
    /// - `Ok(ClientSettings)` - The current client settings
    /// - `Err(e)` if loading settings fails
    pub async fn execute(&self) -> Result<ClientSettings> {
        let span = info_span!("usecase.get_settings.execute");

        async {
            info!("Retrieving client settings");

            let result = self.settings.load().await?;

            info!("Settings retrieved successfully");
            Ok(result)
        }
        .instrument(span)
        .await
    }
}
