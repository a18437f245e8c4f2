//! Onboarding session state machine
//!
//! This module implements the explicit state machine behind the wallet
//! connect modal: wallet events and user actions go in, the next session
//! state plus a list of side-effect actions come out.
//!
//! # Design Principles
//!
//! - **Single entry point**: every transition goes through
//!   `handle_event(state, event) -> (new_state, actions[])`; nothing else
//!   mutates the session.
//! - **Identity epochs**: each Directory call is tagged with the epoch
//!   current at send time. A settle event whose epoch no longer matches is
//!   discarded unapplied, which is how responses for a previous wallet are
//!   dropped after a switch.
//! - **Audit friendly**: every handled event yields a `LogTransition`
//!   action recording old state, event and new state.
//! - **Testable**: the machine is pure; all network and wallet effects are
//!   returned as actions for the coordinator to execute.
//!
//! # Architecture
//!
//! ```text
//! OnboardingStateMachine (fomo-core)
//!   ├── SessionState: where the session currently stands
//!   ├── SessionEvent: wallet reports, user actions, settled Directory calls
//!   └── SessionAction: Directory calls / wallet commands to execute
//!
//! Coordinator (fomo-app)
//!   ├── receives wallet / host / user input
//!   ├── converts it into SessionEvents
//!   ├── runs the machine to get actions
//!   └── executes actions (HTTP calls, wallet connect/disconnect, logging)
//! ```

use serde::{Deserialize, Serialize};

use crate::ids::WalletAddress;
use crate::onboarding::invite;
use crate::onboarding::state::{
    Epoch, OnboardingFlow, OnboardingStep, SessionState, SyncPhase,
};
use crate::user::UserRecord;

/// Result of the initial `GET /api/user/{address}` round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LookupOutcome {
    Found { user: UserRecord },
    NotFound,
    /// Transport or server failure; no retry is scheduled.
    Failed,
}

/// Result of registering an unknown wallet during sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegisterOutcome {
    Registered { user: Option<UserRecord> },
    Failed,
}

/// Result of the submit-invite sequence (verify, then register with code).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InviteOutcome {
    Accepted { user: Option<UserRecord> },
    /// The Directory said no; `message` is its reason when it gave one.
    Rejected { message: Option<String> },
    Failed,
}

/// Result of the link-social call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SocialOutcome {
    Linked { username: String },
    Rejected { message: Option<String> },
    Failed,
}

/// Result of the accept-terms call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TermsOutcome {
    Accepted,
    Rejected { message: Option<String> },
    Failed,
}

/// Everything that can happen to an onboarding session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Host opened the modal, optionally passing a referral code read from
    /// the page URL.
    ModalOpened { invite_from_url: Option<String> },

    /// Host closed the modal; the session is discarded, the wallet stays
    /// connected.
    ModalClosed,

    /// The wallet adapter reported a (possibly unchanged) current account.
    WalletChanged { address: Option<WalletAddress> },

    /// User pressed "connect wallet" on step 1.
    ConnectRequested,

    /// Lookup issued for `epoch` settled.
    LookupSettled { epoch: Epoch, outcome: LookupOutcome },

    /// Registration issued for `epoch` settled.
    RegisterSettled { epoch: Epoch, outcome: RegisterOutcome },

    /// User edited the invite input field.
    InviteDraftChanged { input: String },

    /// User pressed "verify" on the invite step.
    InviteSubmitted,

    /// Submit-invite sequence issued for `epoch` settled.
    InviteSettled { epoch: Epoch, outcome: InviteOutcome },

    /// User skipped the invite step.
    InviteSkipped,

    /// User pressed "link" on the social step. `handle` comes from the host
    /// when it has a real account; otherwise a placeholder handle is used.
    SocialLinkRequested { handle: Option<String> },

    /// Link-social call issued for `epoch` settled.
    SocialSettled { epoch: Epoch, outcome: SocialOutcome },

    /// User skipped the social step.
    SocialSkipped,

    /// User toggled the terms agree checkbox.
    TermsAgreementSet { agreed: bool },

    /// User pressed "complete registration" on the terms step.
    TermsAccepted,

    /// Accept-terms call issued for `epoch` settled.
    TermsSettled { epoch: Epoch, outcome: TermsOutcome },

    /// User pressed "disconnect".
    DisconnectRequested,

    /// User pressed "change wallet" on the returning-user view.
    ChangeWalletRequested,
}

/// Side effects for the coordinator to carry out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionAction {
    /// Ask the wallet adapter for its current account and feed the answer
    /// back as `WalletChanged`.
    QueryWallet,

    /// Open the wallet provider UI. The result is only ever observed
    /// through a later `WalletChanged`.
    RequestWalletConnect,

    /// Log the wallet out.
    DisconnectWallet,

    /// Re-open the provider chooser after the disconnect has settled.
    ScheduleWalletReconnect,

    /// `GET /api/user/{address}`, reported back as `LookupSettled`.
    LookupUser { address: WalletAddress, epoch: Epoch },

    /// `POST /api/user/register`, reported back as `RegisterSettled`.
    RegisterUser {
        address: WalletAddress,
        invite_code: Option<String>,
        epoch: Epoch,
    },

    /// Verify `code` and, if valid, re-register with it. Reported back as
    /// `InviteSettled`.
    SubmitInvite {
        address: WalletAddress,
        code: String,
        epoch: Epoch,
    },

    /// `POST /api/twitter/connect`, reported back as `SocialSettled`.
    LinkSocial {
        address: WalletAddress,
        handle: String,
        epoch: Epoch,
    },

    /// `POST /api/user/accept-terms`, reported back as `TermsSettled`.
    AcceptTerms { address: WalletAddress, epoch: Epoch },

    /// Transition audit record.
    LogTransition {
        epoch: Epoch,
        old_state: String,
        event: String,
        new_state: String,
    },
}

// User-facing failure strings. Remote rejections carry the server message
// instead whenever one is present.
pub const MSG_INVALID_CODE_FORMAT: &str = "Please enter a valid 6-character code";
pub const MSG_INVALID_INVITE: &str = "Invalid invite code";
pub const MSG_VERIFY_FAILED: &str = "Failed to verify code";
pub const MSG_SOCIAL_FAILED: &str = "Failed to connect Twitter";
pub const MSG_TERMS_FAILED: &str = "Failed to accept terms";
pub const MSG_TERMS_REQUIRED: &str = "Please accept the terms to continue";
pub const MSG_SYNC_FAILED: &str = "Failed to check wallet status";

/// Modal-scoped context that survives address changes but not a close.
#[derive(Debug, Clone, Default)]
struct SessionContext {
    modal_open: bool,
    epoch: Epoch,
    /// Referral code captured at open time, already normalized.
    url_invite: Option<String>,
    /// Current invite input, already normalized.
    draft_invite: String,
}

/// The onboarding session state machine.
///
/// Holds the current state plus modal-scoped context and turns events into
/// `(new_state, actions)` pairs. All Directory and wallet side effects are
/// expressed as actions; the machine itself never performs I/O.
#[derive(Debug, Clone)]
pub struct OnboardingStateMachine {
    state: SessionState,
    context: SessionContext,
}

impl OnboardingStateMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            context: SessionContext::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current invite input, kept at modal scope so it survives an address
    /// switch the way the rest of the session context does.
    pub fn draft_invite(&self) -> &str {
        &self.context.draft_invite
    }

    pub fn is_modal_open(&self) -> bool {
        self.context.modal_open
    }

    /// The identity epoch currently in effect.
    pub fn epoch(&self) -> Epoch {
        self.context.epoch
    }

    /// Process one event and return the new state plus actions.
    ///
    /// This is the machine's single entry point.
    pub fn handle_event(&mut self, event: SessionEvent) -> (SessionState, Vec<SessionAction>) {
        let old_state = self.state.clone();
        let event_debug = format!("{:?}", event);

        let (new_state, actions) = self.transition(event);

        let log_action = SessionAction::LogTransition {
            epoch: self.context.epoch,
            old_state: format!("{:?}", old_state),
            event: event_debug,
            new_state: format!("{:?}", new_state),
        };

        let mut all_actions = vec![log_action];
        all_actions.extend(actions);

        self.state = new_state.clone();
        (new_state, all_actions)
    }

    /// Transition logic. Unmatched `(state, event)` pairs are deliberate
    /// no-ops: stale settles, duplicate clicks and out-of-step input are all
    /// discarded without touching the session.
    fn transition(&mut self, event: SessionEvent) -> (SessionState, Vec<SessionAction>) {
        match (self.state.clone(), event) {
            // ----- modal lifecycle -------------------------------------------------
            (_, SessionEvent::ModalOpened { invite_from_url }) => {
                self.bump_epoch();
                self.context.modal_open = true;
                self.context.url_invite = invite_from_url
                    .as_deref()
                    .map(invite::normalize)
                    .filter(|code| !code.is_empty());
                self.context.draft_invite =
                    self.context.url_invite.clone().unwrap_or_default();

                (
                    SessionState::Onboarding(OnboardingFlow::at_connect_step()),
                    vec![SessionAction::QueryWallet],
                )
            }

            (_, SessionEvent::ModalClosed) => {
                self.bump_epoch();
                self.context.modal_open = false;
                self.context.url_invite = None;
                self.context.draft_invite.clear();

                (SessionState::Uninitialized, vec![])
            }

            // ----- wallet identity -------------------------------------------------
            (state, SessionEvent::WalletChanged { address: Some(address) }) => {
                if !self.context.modal_open {
                    return (state, vec![]);
                }
                if state.active_address() == Some(&address) {
                    // Same identity reported again; the session stands.
                    return (state, vec![]);
                }

                self.bump_epoch();
                let epoch = self.context.epoch;
                (
                    SessionState::Syncing {
                        address: address.clone(),
                        epoch,
                        phase: SyncPhase::Lookup,
                    },
                    vec![SessionAction::LookupUser { address, epoch }],
                )
            }

            (state, SessionEvent::WalletChanged { address: None }) => {
                if state.active_address().is_none() {
                    return (state, vec![]);
                }
                (self.identity_lost(), vec![])
            }

            (SessionState::Onboarding(flow), SessionEvent::ConnectRequested)
                if flow.step == OnboardingStep::ConnectWallet =>
            {
                (
                    SessionState::Onboarding(flow),
                    vec![SessionAction::RequestWalletConnect],
                )
            }

            // ----- sync round-trip -------------------------------------------------
            (
                SessionState::Syncing {
                    address,
                    epoch,
                    phase: SyncPhase::Lookup,
                },
                SessionEvent::LookupSettled { epoch: seen, outcome },
            ) if seen == epoch => match outcome {
                LookupOutcome::Found { user } if user.terms_accepted => {
                    (SessionState::Active { address, user }, vec![])
                }
                LookupOutcome::Found { user } => {
                    let step = if user.twitter_verified {
                        OnboardingStep::Terms
                    } else if user.referred_by.is_some() {
                        OnboardingStep::SocialLink
                    } else {
                        OnboardingStep::InviteCode
                    };
                    let mut flow = OnboardingFlow::at_step(address, step);
                    if user.twitter_verified {
                        flow.twitter_username = user.twitter_username.clone();
                    }
                    flow.user = Some(user);
                    (SessionState::Onboarding(flow), vec![])
                }
                LookupOutcome::NotFound => {
                    let invite_code = self.pending_invite();
                    (
                        SessionState::Syncing {
                            address: address.clone(),
                            epoch,
                            phase: SyncPhase::Register {
                                invite: invite_code.clone(),
                            },
                        },
                        vec![SessionAction::RegisterUser {
                            address,
                            invite_code,
                            epoch,
                        }],
                    )
                }
                LookupOutcome::Failed => {
                    let mut flow =
                        OnboardingFlow::at_step(address, OnboardingStep::InviteCode);
                    flow.error = Some(MSG_SYNC_FAILED.to_string());
                    (SessionState::Onboarding(flow), vec![])
                }
            },

            (
                SessionState::Syncing {
                    address,
                    epoch,
                    phase: SyncPhase::Register { invite },
                },
                SessionEvent::RegisterSettled { epoch: seen, outcome },
            ) if seen == epoch => match outcome {
                RegisterOutcome::Registered { user } => {
                    let supplied_valid_code = invite
                        .as_deref()
                        .map(invite::is_well_formed)
                        .unwrap_or(false);
                    let step = if supplied_valid_code {
                        OnboardingStep::SocialLink
                    } else {
                        OnboardingStep::InviteCode
                    };
                    let mut flow = OnboardingFlow::at_step(address, step);
                    flow.user = user;
                    (SessionState::Onboarding(flow), vec![])
                }
                RegisterOutcome::Failed => {
                    let mut flow =
                        OnboardingFlow::at_step(address, OnboardingStep::InviteCode);
                    flow.error = Some(MSG_SYNC_FAILED.to_string());
                    (SessionState::Onboarding(flow), vec![])
                }
            },

            // ----- invite step -----------------------------------------------------
            (SessionState::Onboarding(flow), SessionEvent::InviteDraftChanged { input })
                if flow.step == OnboardingStep::InviteCode =>
            {
                self.context.draft_invite = invite::normalize_draft(&input);
                (SessionState::Onboarding(flow), vec![])
            }

            (SessionState::Onboarding(mut flow), SessionEvent::InviteSubmitted)
                if flow.step == OnboardingStep::InviteCode =>
            {
                if flow.invite_pending {
                    return (SessionState::Onboarding(flow), vec![]);
                }
                let address = match flow.address.clone() {
                    Some(address) => address,
                    None => return (SessionState::Onboarding(flow), vec![]),
                };

                let code = self.context.draft_invite.clone();
                if !invite::is_well_formed(&code) {
                    flow.error = Some(MSG_INVALID_CODE_FORMAT.to_string());
                    return (SessionState::Onboarding(flow), vec![]);
                }

                flow.error = None;
                flow.invite_pending = true;
                let epoch = self.context.epoch;
                (
                    SessionState::Onboarding(flow),
                    vec![SessionAction::SubmitInvite {
                        address,
                        code,
                        epoch,
                    }],
                )
            }

            (SessionState::Onboarding(mut flow), SessionEvent::InviteSettled { epoch, outcome })
                if epoch == self.context.epoch
                    && flow.step == OnboardingStep::InviteCode
                    && flow.invite_pending =>
            {
                flow.invite_pending = false;
                match outcome {
                    InviteOutcome::Accepted { user } => {
                        flow.step = OnboardingStep::SocialLink;
                        flow.error = None;
                        flow.user = user.or(flow.user.take());
                    }
                    InviteOutcome::Rejected { message } => {
                        flow.error =
                            Some(message.unwrap_or_else(|| MSG_INVALID_INVITE.to_string()));
                    }
                    InviteOutcome::Failed => {
                        flow.error = Some(MSG_VERIFY_FAILED.to_string());
                    }
                }
                (SessionState::Onboarding(flow), vec![])
            }

            (SessionState::Onboarding(mut flow), SessionEvent::InviteSkipped)
                if flow.step == OnboardingStep::InviteCode =>
            {
                flow.step = OnboardingStep::SocialLink;
                flow.error = None;
                flow.invite_pending = false;
                (SessionState::Onboarding(flow), vec![])
            }

            // ----- social step -----------------------------------------------------
            (SessionState::Onboarding(mut flow), SessionEvent::SocialLinkRequested { handle })
                if flow.step == OnboardingStep::SocialLink =>
            {
                if flow.social_pending {
                    return (SessionState::Onboarding(flow), vec![]);
                }
                let address = match flow.address.clone() {
                    Some(address) => address,
                    None => return (SessionState::Onboarding(flow), vec![]),
                };

                let handle = handle
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
                    .unwrap_or_else(placeholder_handle);

                flow.error = None;
                flow.social_pending = true;
                let epoch = self.context.epoch;
                (
                    SessionState::Onboarding(flow),
                    vec![SessionAction::LinkSocial {
                        address,
                        handle,
                        epoch,
                    }],
                )
            }

            (SessionState::Onboarding(mut flow), SessionEvent::SocialSettled { epoch, outcome })
                if epoch == self.context.epoch
                    && flow.step == OnboardingStep::SocialLink
                    && flow.social_pending =>
            {
                flow.social_pending = false;
                match outcome {
                    SocialOutcome::Linked { username } => {
                        flow.step = OnboardingStep::Terms;
                        flow.error = None;
                        flow.twitter_username = Some(username.clone());
                        if let Some(user) = flow.user.as_mut() {
                            user.twitter_username = Some(username);
                            user.twitter_verified = true;
                        }
                    }
                    SocialOutcome::Rejected { message } => {
                        flow.error =
                            Some(message.unwrap_or_else(|| MSG_SOCIAL_FAILED.to_string()));
                    }
                    SocialOutcome::Failed => {
                        flow.error = Some(MSG_SOCIAL_FAILED.to_string());
                    }
                }
                (SessionState::Onboarding(flow), vec![])
            }

            (SessionState::Onboarding(mut flow), SessionEvent::SocialSkipped)
                if flow.step == OnboardingStep::SocialLink =>
            {
                flow.step = OnboardingStep::Terms;
                flow.error = None;
                flow.social_pending = false;
                (SessionState::Onboarding(flow), vec![])
            }

            // ----- terms step ------------------------------------------------------
            (SessionState::Onboarding(mut flow), SessionEvent::TermsAgreementSet { agreed })
                if flow.step == OnboardingStep::Terms =>
            {
                flow.terms_agreed = agreed;
                (SessionState::Onboarding(flow), vec![])
            }

            (SessionState::Onboarding(mut flow), SessionEvent::TermsAccepted)
                if flow.step == OnboardingStep::Terms =>
            {
                if flow.terms_pending {
                    return (SessionState::Onboarding(flow), vec![]);
                }
                if !flow.terms_agreed {
                    flow.error = Some(MSG_TERMS_REQUIRED.to_string());
                    return (SessionState::Onboarding(flow), vec![]);
                }
                let address = match flow.address.clone() {
                    Some(address) => address,
                    None => return (SessionState::Onboarding(flow), vec![]),
                };

                flow.error = None;
                flow.terms_pending = true;
                let epoch = self.context.epoch;
                (
                    SessionState::Onboarding(flow),
                    vec![SessionAction::AcceptTerms { address, epoch }],
                )
            }

            (SessionState::Onboarding(mut flow), SessionEvent::TermsSettled { epoch, outcome })
                if epoch == self.context.epoch
                    && flow.step == OnboardingStep::Terms
                    && flow.terms_pending =>
            {
                flow.terms_pending = false;
                match outcome {
                    TermsOutcome::Accepted => {
                        let address = match flow.address.clone() {
                            Some(address) => address,
                            None => return (SessionState::Onboarding(flow), vec![]),
                        };
                        let user = match flow.user.take() {
                            Some(mut record) => {
                                record.terms_accepted = true;
                                record
                            }
                            None => {
                                // Terms can settle for a wallet whose record we
                                // never saw (lookup failed earlier); keep what
                                // the session knows.
                                let mut record = UserRecord::sparse(&address);
                                record.terms_accepted = true;
                                record.twitter_username = flow.twitter_username.clone();
                                record.twitter_verified = flow.twitter_username.is_some();
                                record
                            }
                        };
                        (SessionState::Active { address, user }, vec![])
                    }
                    TermsOutcome::Rejected { message } => {
                        flow.error =
                            Some(message.unwrap_or_else(|| MSG_TERMS_FAILED.to_string()));
                        (SessionState::Onboarding(flow), vec![])
                    }
                    TermsOutcome::Failed => {
                        flow.error = Some(MSG_TERMS_FAILED.to_string());
                        (SessionState::Onboarding(flow), vec![])
                    }
                }
            }

            // ----- disconnect / change wallet --------------------------------------
            (state, SessionEvent::DisconnectRequested) => {
                if state.active_address().is_none() {
                    return (state, vec![]);
                }
                (self.identity_lost(), vec![SessionAction::DisconnectWallet])
            }

            (SessionState::Active { .. }, SessionEvent::ChangeWalletRequested) => (
                self.identity_lost(),
                vec![
                    SessionAction::DisconnectWallet,
                    SessionAction::ScheduleWalletReconnect,
                ],
            ),

            // Everything else: out-of-step input or a stale settle. Discard.
            (state, event) => {
                tracing::debug!(?event, epoch = self.context.epoch, "event discarded");
                (state, vec![])
            }
        }
    }

    /// The invite code a registration should carry: the URL referral code
    /// wins, then a non-empty typed draft.
    fn pending_invite(&self) -> Option<String> {
        self.context
            .url_invite
            .clone()
            .or_else(|| {
                let draft = self.context.draft_invite.clone();
                if draft.is_empty() {
                    None
                } else {
                    Some(draft)
                }
            })
    }

    /// Invalidate the current identity. Every in-flight Directory call is
    /// orphaned by the epoch bump.
    fn bump_epoch(&mut self) {
        self.context.epoch += 1;
    }

    /// Shared tail of disconnect-style transitions: bump the epoch and reset
    /// the session to its addressless shape.
    fn identity_lost(&mut self) -> SessionState {
        self.bump_epoch();
        self.context.draft_invite = self.context.url_invite.clone().unwrap_or_default();
        if self.context.modal_open {
            SessionState::Onboarding(OnboardingFlow::at_connect_step())
        } else {
            SessionState::Uninitialized
        }
    }
}

impl Default for OnboardingStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

const HANDLE_SUFFIX_LEN: usize = 6;

/// Stand-in social handle until a real account flow exists.
fn placeholder_handle() -> String {
    use rand::Rng;

    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    let suffix: String = (0..HANDLE_SUFFIX_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("@user_{}", suffix)
}
