//! # fomo-client
//!
//! Embeddable wallet onboarding client for the FOMO Strategy web app.
//!
//! The host owns the wallet provider and the rendering; this crate owns
//! the session. Wire it up through [`FomoClientBuilder`], feed provider
//! account changes into the wallet bridge, subscribe to session events,
//! and render from the [`ModalView`] snapshots.
//!
//! ```no_run
//! use fomo_client::FomoClient;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = FomoClient::builder().build().await?;
//! client.onboarding().open_modal(None).await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;

pub use builder::{FomoClient, FomoClientBuilder};

// Re-export the types hosts interact with.
pub use fomo_app::{OnboardingDomainEvent, OnboardingEventPort, OnboardingFacade};
pub use fomo_core::onboarding::ModalView;
pub use fomo_core::settings::ClientSettings;
pub use fomo_core::user::{ReferralSummary, UserRecord};
pub use fomo_core::WalletAddress;
pub use fomo_infra::{BridgedWalletAdapter, WalletBridgeCommand};
