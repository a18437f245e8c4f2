use async_trait::async_trait;
use tokio::sync::mpsc;

use fomo_core::onboarding::ModalView;
use fomo_core::user::UserRecord;
use fomo_core::WalletAddress;

#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingDomainEvent {
    /// The session changed; `view` is the fresh projection to render.
    SessionChanged { view: ModalView },

    /// The session reached the returning-user view, either by accepting
    /// terms or by a registered wallet reconnecting.
    RegistrationCompleted {
        address: WalletAddress,
        user: UserRecord,
    },
}

#[async_trait]
pub trait OnboardingEventPort: Send + Sync {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<OnboardingDomainEvent>>;
}
