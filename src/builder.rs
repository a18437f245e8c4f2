//! Client composition root
//!
//! Builds the adapters, wires them into the onboarding coordinator and
//! the one-shot use cases, and hands the host a ready [`FomoClient`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use fomo_app::{
    GetReferralSummary, GetSettings, OnboardingConfig, OnboardingCoordinator, UpdateSettings,
};
use fomo_core::ports::{SettingsPort, UserDirectoryPort, WalletPort};
use fomo_core::settings::ClientSettings;
use fomo_core::user::ReferralSummary;
use fomo_core::WalletAddress;
use fomo_infra::{BridgedWalletAdapter, FileSettingsRepository, HttpUserDirectory};

pub struct FomoClientBuilder {
    settings_path: Option<PathBuf>,
    settings: Option<ClientSettings>,
}

impl FomoClientBuilder {
    pub fn new() -> Self {
        Self {
            settings_path: None,
            settings: None,
        }
    }

    /// Use a specific settings file instead of the platform default.
    pub fn settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Use these settings for this run without touching the settings file.
    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub async fn build(self) -> Result<FomoClient> {
        let settings_path = match self.settings_path {
            Some(path) => path,
            None => default_settings_path()?,
        };
        let settings_repo: Arc<dyn SettingsPort> =
            Arc::new(FileSettingsRepository::new(settings_path));

        let settings = match self.settings {
            Some(settings) => settings,
            None => settings_repo.load().await?,
        };

        let directory: Arc<dyn UserDirectoryPort> = Arc::new(
            HttpUserDirectory::new(&settings.directory)
                .context("build Directory client failed")?,
        );
        let wallet = Arc::new(BridgedWalletAdapter::new());

        let coordinator = OnboardingCoordinator::new(
            OnboardingConfig::from_settings(&settings),
            Arc::clone(&directory),
            Arc::clone(&wallet) as Arc<dyn WalletPort>,
        );
        coordinator.start().await?;

        info!(
            directory = %settings.directory.base_url,
            "fomo client assembled"
        );

        Ok(FomoClient {
            coordinator,
            wallet,
            get_settings: GetSettings::new(Arc::clone(&settings_repo)),
            update_settings: UpdateSettings::new(Arc::clone(&settings_repo)),
            referrals: GetReferralSummary::new(directory),
        })
    }
}

impl Default for FomoClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembled client. One per embedding host.
pub struct FomoClient {
    coordinator: OnboardingCoordinator,
    wallet: Arc<BridgedWalletAdapter>,
    get_settings: GetSettings,
    update_settings: UpdateSettings,
    referrals: GetReferralSummary,
}

impl FomoClient {
    pub fn builder() -> FomoClientBuilder {
        FomoClientBuilder::new()
    }

    /// The onboarding session. Implements both the facade and the event
    /// port, so hosts drive and observe the modal through this handle.
    pub fn onboarding(&self) -> &OnboardingCoordinator {
        &self.coordinator
    }

    /// The wallet side of the bridge. Hosts push provider account changes
    /// in here and consume the command stream.
    pub fn wallet_bridge(&self) -> Arc<BridgedWalletAdapter> {
        Arc::clone(&self.wallet)
    }

    pub async fn settings(&self) -> Result<ClientSettings> {
        self.get_settings.execute().await
    }

    pub async fn update_settings(&self, settings: ClientSettings) -> Result<()> {
        self.update_settings.execute(settings).await
    }

    pub async fn referral_summary(&self, address: &WalletAddress) -> Result<ReferralSummary> {
        self.referrals.execute(address).await
    }
}

fn default_settings_path() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to get platform data directory")?;
    Ok(base_dir.join("FomoClient").join("settings.json"))
}
