//! Onboarding session coordinator
//!
//! Drives the session state machine: facade calls and wallet account
//! changes are converted into session events, and the actions the machine
//! returns are executed here.
//!
//! # Architecture
//!
//! ```text
//! Host input / wallet account changes
//!   ↓
//! OnboardingCoordinator (converts to SessionEvents)
//!   ↓
//! OnboardingStateMachine (pure state transitions)
//!   ↓
//! SessionActions (executed by coordinator)
//!   ↓
//! Directory calls / wallet commands / domain events
//! ```
//!
//! Directory calls run on spawned tasks and settle back in as epoch-tagged
//! events, so a slow response never blocks the session and a stale one is
//! discarded by the machine.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, Mutex};
use tracing::{info_span, Instrument};

use fomo_core::onboarding::{
    InviteOutcome, LookupOutcome, ModalView, OnboardingStateMachine, RegisterOutcome,
    SessionAction, SessionEvent, SessionState, SocialOutcome, TermsOutcome,
};
use fomo_core::ports::{DirectoryError, UserDirectoryPort, WalletPort};
use fomo_core::settings::ClientSettings;
use fomo_core::WalletAddress;

use super::{OnboardingDomainEvent, OnboardingEventPort, OnboardingFacade};

/// Coordinator tuning derived from client settings.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Pause between disconnect and reopening the provider chooser during
    /// a change-wallet flow.
    pub reconnect_delay: Duration,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self::from_settings(&ClientSettings::default())
    }
}

impl OnboardingConfig {
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            reconnect_delay: settings.wallet.reconnect_delay,
        }
    }
}

/// Runs one onboarding session against the injected wallet and Directory
/// ports.
#[derive(Clone)]
pub struct OnboardingCoordinator {
    config: OnboardingConfig,
    machine: Arc<Mutex<OnboardingStateMachine>>,
    directory: Arc<dyn UserDirectoryPort>,
    wallet: Arc<dyn WalletPort>,
    event_senders: Arc<Mutex<Vec<mpsc::Sender<OnboardingDomainEvent>>>>,
}

impl OnboardingCoordinator {
    pub fn new(
        config: OnboardingConfig,
        directory: Arc<dyn UserDirectoryPort>,
        wallet: Arc<dyn WalletPort>,
    ) -> Self {
        Self {
            config,
            machine: Arc::new(Mutex::new(OnboardingStateMachine::new())),
            directory,
            wallet,
            event_senders: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start forwarding wallet account changes into the session. Without
    /// this the session only ever sees the accounts it queries itself.
    pub async fn start(&self) -> Result<()> {
        let mut changes = self.wallet.subscribe_changes().await?;
        let coordinator = self.clone();
        spawn_task(async move {
            while let Some(address) = changes.recv().await {
                if let Err(error) = coordinator.wallet_changed(address).await {
                    tracing::error!(error = ?error, "wallet change handling failed");
                }
            }
            tracing::debug!("wallet change stream closed");
        });
        Ok(())
    }

    pub async fn open_modal(&self, invite_from_url: Option<String>) -> Result<()> {
        let span = info_span!(
            "onboarding.open_modal",
            has_url_code = invite_from_url.is_some()
        );
        self.dispatch(SessionEvent::ModalOpened { invite_from_url })
            .instrument(span)
            .await
    }

    pub async fn close_modal(&self) -> Result<()> {
        let span = info_span!("onboarding.close_modal");
        self.dispatch(SessionEvent::ModalClosed)
            .instrument(span)
            .await
    }

    /// Feed an account change reported by the wallet provider.
    pub async fn wallet_changed(&self, address: Option<WalletAddress>) -> Result<()> {
        let span = info_span!(
            "onboarding.wallet_changed",
            connected = address.is_some()
        );
        self.dispatch(SessionEvent::WalletChanged { address })
            .instrument(span)
            .await
    }

    pub async fn request_wallet_connect(&self) -> Result<()> {
        let span = info_span!("onboarding.request_wallet_connect");
        self.dispatch(SessionEvent::ConnectRequested)
            .instrument(span)
            .await
    }

    pub async fn set_invite_draft(&self, input: String) -> Result<()> {
        self.dispatch(SessionEvent::InviteDraftChanged { input })
            .await
    }

    pub async fn submit_invite(&self) -> Result<()> {
        let span = info_span!("onboarding.submit_invite");
        self.dispatch(SessionEvent::InviteSubmitted)
            .instrument(span)
            .await
    }

    pub async fn skip_invite(&self) -> Result<()> {
        let span = info_span!("onboarding.skip_invite");
        self.dispatch(SessionEvent::InviteSkipped)
            .instrument(span)
            .await
    }

    pub async fn link_social(&self, handle: Option<String>) -> Result<()> {
        let span = info_span!("onboarding.link_social");
        self.dispatch(SessionEvent::SocialLinkRequested { handle })
            .instrument(span)
            .await
    }

    pub async fn skip_social(&self) -> Result<()> {
        let span = info_span!("onboarding.skip_social");
        self.dispatch(SessionEvent::SocialSkipped)
            .instrument(span)
            .await
    }

    pub async fn set_terms_agreement(&self, agreed: bool) -> Result<()> {
        self.dispatch(SessionEvent::TermsAgreementSet { agreed })
            .await
    }

    pub async fn accept_terms(&self) -> Result<()> {
        let span = info_span!("onboarding.accept_terms");
        self.dispatch(SessionEvent::TermsAccepted)
            .instrument(span)
            .await
    }

    pub async fn disconnect(&self) -> Result<()> {
        let span = info_span!("onboarding.disconnect");
        self.dispatch(SessionEvent::DisconnectRequested)
            .instrument(span)
            .await
    }

    pub async fn change_wallet(&self) -> Result<()> {
        let span = info_span!("onboarding.change_wallet");
        self.dispatch(SessionEvent::ChangeWalletRequested)
            .instrument(span)
            .await
    }

    /// Current render snapshot.
    pub async fn view(&self) -> ModalView {
        let machine = self.machine.lock().await;
        ModalView::project(&machine)
    }

    /// Run one event through the machine, publish the new view, then
    /// execute the actions. The machine lock is held only for the
    /// transition itself.
    ///
    /// Returns a boxed future: the settle path recurses into `dispatch`
    /// from spawned tasks, and the explicit `dyn Future + Send` type is
    /// what lets the compiler prove those tasks `Send`.
    fn dispatch(
        &self,
        event: SessionEvent,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let (state, actions, view, was_active) = {
                let mut machine = self.machine.lock().await;
                let was_active = machine.state().is_active();
                let (state, actions) = machine.handle_event(event);
                let view = ModalView::project(&machine);
                (state, actions, view, was_active)
            };

            self.emit_event(OnboardingDomainEvent::SessionChanged { view })
                .await;

            if let SessionState::Active { address, user } = &state {
                if !was_active {
                    self.emit_event(OnboardingDomainEvent::RegistrationCompleted {
                        address: address.clone(),
                        user: user.clone(),
                    })
                    .await;
                }
            }

            for action in actions {
                self.execute_action(action).await?;
            }

            Ok(())
        })
    }

    async fn execute_action(&self, action: SessionAction) -> Result<()> {
        match action {
            SessionAction::LogTransition {
                epoch,
                old_state,
                event,
                new_state,
            } => {
                tracing::debug!(
                    epoch,
                    old_state = %old_state,
                    event = %event,
                    new_state = %new_state,
                    "session transition"
                );
            }

            SessionAction::QueryWallet => {
                let wallet = self.wallet.clone();
                let coordinator = self.clone();
                spawn_task(async move {
                    match wallet.current_address().await {
                        Ok(address) => {
                            if let Err(error) = coordinator.wallet_changed(address).await {
                                tracing::error!(
                                    error = ?error,
                                    "wallet query follow-up failed"
                                );
                            }
                        }
                        Err(error) => {
                            tracing::warn!(error = ?error, "wallet query failed");
                        }
                    }
                });
            }

            SessionAction::RequestWalletConnect => {
                let wallet = self.wallet.clone();
                spawn_task(async move {
                    if let Err(error) = wallet.request_connect().await {
                        tracing::warn!(error = ?error, "wallet connect request failed");
                    }
                });
            }

            SessionAction::DisconnectWallet => {
                let wallet = self.wallet.clone();
                spawn_task(async move {
                    if let Err(error) = wallet.disconnect().await {
                        tracing::warn!(error = ?error, "wallet disconnect failed");
                    }
                });
            }

            SessionAction::ScheduleWalletReconnect => {
                let wallet = self.wallet.clone();
                let delay = self.config.reconnect_delay;
                spawn_task(async move {
                    // Reopening in the same tick as the disconnect makes some
                    // providers silently resume the old session.
                    tokio::time::sleep(delay).await;
                    if let Err(error) = wallet.request_connect().await {
                        tracing::warn!(error = ?error, "wallet reconnect request failed");
                    }
                });
            }

            SessionAction::LookupUser { address, epoch } => {
                let directory = self.directory.clone();
                let coordinator = self.clone();
                spawn_task(async move {
                    let outcome = match directory.lookup_user(&address).await {
                        Ok(Some(user)) => LookupOutcome::Found { user },
                        Ok(None) => LookupOutcome::NotFound,
                        Err(error) => {
                            tracing::warn!(
                                address = %address,
                                error = %error,
                                "wallet lookup failed"
                            );
                            LookupOutcome::Failed
                        }
                    };
                    coordinator
                        .settle(SessionEvent::LookupSettled { epoch, outcome })
                        .await;
                });
            }

            SessionAction::RegisterUser {
                address,
                invite_code,
                epoch,
            } => {
                let directory = self.directory.clone();
                let coordinator = self.clone();
                spawn_task(async move {
                    let outcome = match directory
                        .register_user(&address, invite_code.as_deref())
                        .await
                    {
                        Ok(receipt) => {
                            if !receipt.is_new {
                                tracing::debug!(
                                    address = %address,
                                    "wallet was already registered"
                                );
                            }
                            RegisterOutcome::Registered { user: receipt.user }
                        }
                        Err(error) => {
                            tracing::warn!(
                                address = %address,
                                error = %error,
                                "wallet registration failed"
                            );
                            RegisterOutcome::Failed
                        }
                    };
                    coordinator
                        .settle(SessionEvent::RegisterSettled { epoch, outcome })
                        .await;
                });
            }

            SessionAction::SubmitInvite {
                address,
                code,
                epoch,
            } => {
                let directory = self.directory.clone();
                let coordinator = self.clone();
                spawn_task(async move {
                    let outcome =
                        submit_invite_outcome(directory.as_ref(), &address, &code).await;
                    coordinator
                        .settle(SessionEvent::InviteSettled { epoch, outcome })
                        .await;
                });
            }

            SessionAction::LinkSocial {
                address,
                handle,
                epoch,
            } => {
                let directory = self.directory.clone();
                let coordinator = self.clone();
                spawn_task(async move {
                    let outcome = match directory.link_social(&address, &handle).await {
                        Ok(ack) if ack.success => SocialOutcome::Linked { username: handle },
                        Ok(ack) => SocialOutcome::Rejected {
                            message: ack.message,
                        },
                        Err(DirectoryError::Rejected { message }) => {
                            SocialOutcome::Rejected { message }
                        }
                        Err(error) => {
                            tracing::warn!(
                                address = %address,
                                error = %error,
                                "social link failed"
                            );
                            SocialOutcome::Failed
                        }
                    };
                    coordinator
                        .settle(SessionEvent::SocialSettled { epoch, outcome })
                        .await;
                });
            }

            SessionAction::AcceptTerms { address, epoch } => {
                let directory = self.directory.clone();
                let coordinator = self.clone();
                spawn_task(async move {
                    let outcome = match directory.accept_terms(&address).await {
                        Ok(ack) if ack.success => TermsOutcome::Accepted,
                        Ok(ack) => TermsOutcome::Rejected {
                            message: ack.message,
                        },
                        Err(DirectoryError::Rejected { message }) => {
                            TermsOutcome::Rejected { message }
                        }
                        Err(error) => {
                            tracing::warn!(
                                address = %address,
                                error = %error,
                                "terms acceptance failed"
                            );
                            TermsOutcome::Failed
                        }
                    };
                    coordinator
                        .settle(SessionEvent::TermsSettled { epoch, outcome })
                        .await;
                });
            }
        }

        Ok(())
    }

    /// Feed a settled Directory call back into the machine. Failures here
    /// only affect the session, so they are logged rather than propagated
    /// into the task that happened to carry them.
    async fn settle(&self, event: SessionEvent) {
        if let Err(error) = self.dispatch(event).await {
            tracing::error!(error = ?error, "settle dispatch failed");
        }
    }

    async fn emit_event(&self, event: OnboardingDomainEvent) {
        let senders = { self.event_senders.lock().await.clone() };
        for sender in senders {
            if sender.send(event.clone()).await.is_err() {
                tracing::debug!("onboarding event receiver dropped");
            }
        }
    }
}

/// Verify the code, then re-register the wallet with it as referrer. The
/// two round-trips settle as a single outcome.
async fn submit_invite_outcome(
    directory: &dyn UserDirectoryPort,
    address: &WalletAddress,
    code: &str,
) -> InviteOutcome {
    let verdict = match directory.verify_invite(code).await {
        Ok(verdict) => verdict,
        Err(error) => {
            tracing::warn!(error = %error, "invite verification failed");
            return InviteOutcome::Failed;
        }
    };

    if !verdict.valid {
        return InviteOutcome::Rejected {
            message: verdict.message,
        };
    }

    match directory.register_user(address, Some(code)).await {
        Ok(receipt) => InviteOutcome::Accepted { user: receipt.user },
        Err(error) => {
            tracing::warn!(error = %error, "invite registration failed");
            InviteOutcome::Failed
        }
    }
}

fn spawn_task(future: impl Future<Output = ()> + Send + 'static) {
    let future: Pin<Box<dyn Future<Output = ()> + Send>> = Box::pin(future);
    tokio::spawn(future);
}

#[async_trait::async_trait]
impl OnboardingFacade for OnboardingCoordinator {
    async fn open_modal(&self, invite_from_url: Option<String>) -> anyhow::Result<()> {
        Self::open_modal(self, invite_from_url).await
    }

    async fn close_modal(&self) -> anyhow::Result<()> {
        Self::close_modal(self).await
    }

    async fn request_wallet_connect(&self) -> anyhow::Result<()> {
        Self::request_wallet_connect(self).await
    }

    async fn set_invite_draft(&self, input: String) -> anyhow::Result<()> {
        Self::set_invite_draft(self, input).await
    }

    async fn submit_invite(&self) -> anyhow::Result<()> {
        Self::submit_invite(self).await
    }

    async fn skip_invite(&self) -> anyhow::Result<()> {
        Self::skip_invite(self).await
    }

    async fn link_social(&self, handle: Option<String>) -> anyhow::Result<()> {
        Self::link_social(self, handle).await
    }

    async fn skip_social(&self) -> anyhow::Result<()> {
        Self::skip_social(self).await
    }

    async fn set_terms_agreement(&self, agreed: bool) -> anyhow::Result<()> {
        Self::set_terms_agreement(self, agreed).await
    }

    async fn accept_terms(&self) -> anyhow::Result<()> {
        Self::accept_terms(self).await
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        Self::disconnect(self).await
    }

    async fn change_wallet(&self) -> anyhow::Result<()> {
        Self::change_wallet(self).await
    }

    async fn view(&self) -> ModalView {
        Self::view(self).await
    }
}

#[async_trait::async_trait]
impl OnboardingEventPort for OnboardingCoordinator {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<OnboardingDomainEvent>> {
        let (event_tx, event_rx) = mpsc::channel(100);
        let mut senders = self.event_senders.lock().await;
        senders.push(event_tx);
        Ok(event_rx)
    }
}
