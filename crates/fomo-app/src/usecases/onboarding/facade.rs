use async_trait::async_trait;

use fomo_core::onboarding::ModalView;

/// Host-facing surface of the onboarding session.
///
/// One method per user intent; every call funnels into the session state
/// machine, so out-of-step calls are safe no-ops rather than errors.
#[async_trait]
pub trait OnboardingFacade: Send + Sync {
    /// Open the modal. `invite_from_url` is the referral code read from the
    /// page URL, if the user arrived through a share link.
    async fn open_modal(&self, invite_from_url: Option<String>) -> anyhow::Result<()>;

    /// Close the modal and discard the session. The wallet connection
    /// itself is left alone.
    async fn close_modal(&self) -> anyhow::Result<()>;

    /// "Connect wallet" pressed on step 1.
    async fn request_wallet_connect(&self) -> anyhow::Result<()>;

    /// Invite input edited.
    async fn set_invite_draft(&self, input: String) -> anyhow::Result<()>;

    /// "Verify" pressed on the invite step.
    async fn submit_invite(&self) -> anyhow::Result<()>;

    /// Invite step skipped.
    async fn skip_invite(&self) -> anyhow::Result<()>;

    /// "Link" pressed on the social step; `handle` when the host knows a
    /// real account.
    async fn link_social(&self, handle: Option<String>) -> anyhow::Result<()>;

    /// Social step skipped.
    async fn skip_social(&self) -> anyhow::Result<()>;

    /// Terms agree checkbox toggled.
    async fn set_terms_agreement(&self, agreed: bool) -> anyhow::Result<()>;

    /// "Complete registration" pressed on the terms step.
    async fn accept_terms(&self) -> anyhow::Result<()>;

    /// "Disconnect" pressed.
    async fn disconnect(&self) -> anyhow::Result<()>;

    /// "Change wallet" pressed on the returning-user view.
    async fn change_wallet(&self) -> anyhow::Result<()>;

    /// Current render snapshot.
    async fn view(&self) -> ModalView;
}
