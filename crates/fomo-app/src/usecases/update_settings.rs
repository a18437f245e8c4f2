//! Use case for updating client settings

use std::time::Duration;

use anyhow::Result;
use tracing::{info, info_span, Instrument};

use fomo_core::ports::SettingsPort;
use fomo_core::settings::{ClientSettings, DirectorySettings, WalletSettings};

/// Use case for updating client settings.
///
/// Loads the current settings for comparison, validates the schema
/// version, logs changed fields with old/new values, and persists the
/// settings through the settings port.
pub struct UpdateSettings {
    settings: std::sync::Arc<dyn SettingsPort>,
}

impl UpdateSettings {
    pub fn new(settings: std::sync::Arc<dyn SettingsPort>) -> Self {
        Self { settings }
    }

    /// Execute the use case.
    ///
    /// # Parameters
    /// - `settings`: The settings to persist
    ///
    /// # Returns
    /// - `Ok(())` if settings are saved successfully
    /// - `Err(e)` if validation or save fails
    pub async fn execute(&self, settings: ClientSettings) -> Result<()> {
        let span = info_span!("usecase.update_settings.execute");

        async {
            // Load what is on disk so the change set can be logged
            let old_settings = self.settings.load().await?;

            let changes = SettingsDiff::diff(&old_settings, &settings);
            if !changes.is_empty() {
                info!(
                    changed_fields = %changes.to_log_string(),
                    "Updating client settings"
                );
            } else {
                info!("Updating client settings (no changes detected)");
            }

            // Settings written by a different schema generation are refused
            let current_version = fomo_core::settings::CURRENT_SCHEMA_VERSION;
            if settings.schema_version != current_version {
                return Err(anyhow::anyhow!(
                    "Invalid schema version: expected {}, got {}",
                    current_version,
                    settings.schema_version
                ));
            }

            self.settings.save(&settings).await?;

            info!(
                changed_fields = %changes.to_log_string(),
                "Settings updated successfully"
            );
            Ok(())
        }
        .instrument(span)
        .await
    }
}

/// Represents the difference between two ClientSettings
struct SettingsDiff {
    directory: Option<DirectorySettingsDiff>,
    wallet: Option<WalletSettingsDiff>,
}

impl SettingsDiff {
    fn diff(old: &ClientSettings, new: &ClientSettings) -> Self {
        Self {
            directory: DirectorySettingsDiff::diff(&old.directory, &new.directory),
            wallet: WalletSettingsDiff::diff(&old.wallet, &new.wallet),
        }
    }

    fn is_empty(&self) -> bool {
        self.directory.is_none() && self.wallet.is_none()
    }

    fn to_log_string(&self) -> String {
        let mut parts = Vec::new();

        if let Some(ref diff) = self.directory {
            parts.push(diff.to_log_string("directory"));
        }
        if let Some(ref diff) = self.wallet {
            parts.push(diff.to_log_string("wallet"));
        }

        if parts.is_empty() {
            "(no changes)".to_string()
        } else {
            parts.join(", ")
        }
    }
}

struct DirectorySettingsDiff {
    base_url: Option<(String, String)>,
    request_timeout: Option<(Duration, Duration)>,
}

impl DirectorySettingsDiff {
    fn diff(old: &DirectorySettings, new: &DirectorySettings) -> Option<Self> {
        let base_url = (old.base_url != new.base_url)
            .then_some((old.base_url.clone(), new.base_url.clone()));
        let request_timeout = (old.request_timeout != new.request_timeout)
            .then_some((old.request_timeout, new.request_timeout));

        if base_url.is_none() && request_timeout.is_none() {
            None
        } else {
            Some(Self {
                base_url,
                request_timeout,
            })
        }
    }

    fn to_log_string(&self, prefix: &str) -> String {
        let mut parts = Vec::new();

        if let Some((old, new)) = &self.base_url {
            parts.push(format!("{}.base_url: {} → {}", prefix, old, new));
        }
        if let Some((old, new)) = &self.request_timeout {
            parts.push(format!("{}.request_timeout: {:?} → {:?}", prefix, old, new));
        }

        parts.join(", ")
    }
}

struct WalletSettingsDiff {
    reconnect_delay: Option<(Duration, Duration)>,
}

impl WalletSettingsDiff {
    fn diff(old: &WalletSettings, new: &WalletSettings) -> Option<Self> {
        let reconnect_delay = (old.reconnect_delay != new.reconnect_delay)
            .then_some((old.reconnect_delay, new.reconnect_delay));

        reconnect_delay.map(|reconnect_delay| Self {
            reconnect_delay: Some(reconnect_delay),
        })
    }

    fn to_log_string(&self, prefix: &str) -> String {
        let mut parts = Vec::new();

        if let Some((old, new)) = &self.reconnect_delay {
            parts.push(format!("{}.reconnect_delay: {:?} → {:?}", prefix, old, new));
        }

        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct MockSettingsPort {
        stored: Mutex<ClientSettings>,
        load_count: AtomicUsize,
        save_count: AtomicUsize,
    }

    impl MockSettingsPort {
        fn new(initial: ClientSettings) -> Self {
            Self {
                stored: Mutex::new(initial),
                load_count: AtomicUsize::new(0),
                save_count: AtomicUsize::new(0),
            }
        }

        fn load_count(&self) -> usize {
            self.load_count.load(Ordering::SeqCst)
        }

        fn save_count(&self) -> usize {
            self.save_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SettingsPort for MockSettingsPort {
        async fn load(&self) -> anyhow::Result<ClientSettings> {
            self.load_count.fetch_add(1, Ordering::SeqCst);
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn save(&self, settings: &ClientSettings) -> anyhow::Result<()> {
            self.save_count.fetch_add(1, Ordering::SeqCst);
            *self.stored.lock().unwrap() = settings.clone();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_update_settings_loads_before_save() {
        let repo = Arc::new(MockSettingsPort::new(ClientSettings::default()));

        let mut updated = ClientSettings::default();
        updated.directory.base_url = "https://directory.fomo.example".to_string();

        let usecase = UpdateSettings::new(repo.clone());
        usecase.execute(updated.clone()).await.unwrap();

        assert_eq!(repo.load_count(), 1);
        assert_eq!(repo.save_count(), 1);
        assert_eq!(
            repo.stored.lock().unwrap().directory.base_url,
            updated.directory.base_url
        );
    }

    #[tokio::test]
    async fn test_update_settings_rejects_unknown_schema_version() {
        let repo = Arc::new(MockSettingsPort::new(ClientSettings::default()));

        let mut updated = ClientSettings::default();
        updated.schema_version = 99;

        let usecase = UpdateSettings::new(repo.clone());
        let result = usecase.execute(updated).await;

        assert!(result.is_err());
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn test_settings_diff_empty_when_no_changes() {
        let settings = ClientSettings::default();
        let diff = SettingsDiff::diff(&settings, &settings);

        assert!(diff.is_empty());
        assert_eq!(diff.to_log_string(), "(no changes)");
    }

    #[test]
    fn test_settings_diff_logs_changes_across_sections() {
        let old = ClientSettings::default();
        let mut new = old.clone();
        new.directory.base_url = "https://directory.fomo.example".to_string();
        new.wallet.reconnect_delay = Duration::from_millis(250);

        let diff = SettingsDiff::diff(&old, &new);
        let log = diff.to_log_string();

        assert!(!diff.is_empty());
        assert!(log.contains("directory.base_url:"));
        assert!(log.contains("wallet.reconnect_delay:"));
    }
}
