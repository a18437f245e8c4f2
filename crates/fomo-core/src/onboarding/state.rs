use serde::{Deserialize, Serialize};

use crate::ids::WalletAddress;
use crate::user::UserRecord;

/// Monotonic identity-epoch token.
///
/// Bumped on every active-address change (connect, switch, disconnect, modal
/// close). Directory calls are tagged with the epoch current at send time and
/// their results are applied only if the epoch still matches, which is how
/// stale responses are discarded without cancelling the underlying request.
pub type Epoch = u64;

/// Onboarding session state machine
///
/// Design principle: one tagged union transitioned through a single reducer
/// entry point. Per-state data lives in the variant that needs it, so
/// combinations like "a step number while the user is already active" cannot
/// be represented.
///
/// State transitions:
/// ```text
///   Uninitialized
///    │ ModalOpened
///    ▼
///   Onboarding(step=ConnectWallet)
///    │ WalletChanged{Some(addr)}
///    ▼
///   Syncing{addr, epoch}
///    ├── lookup: not found ── register ──► Onboarding(step=InviteCode|SocialLink)
///    ├── lookup: found, terms pending ──► Onboarding(step by profile)
///    ├── lookup: found, terms accepted ─► Active{addr, user}
///    └── lookup/register failed ────────► Onboarding(step=InviteCode, error)
///
///   Onboarding(InviteCode)  ── submit ok / skip ──► Onboarding(SocialLink)
///   Onboarding(SocialLink)  ── link ok / skip ────► Onboarding(Terms)
///   Onboarding(Terms)       ── accept ok ─────────► Active{addr, user}
///
///   any state + WalletChanged{None}:
///     modal open  ──► Onboarding(step=ConnectWallet)
///     modal closed ─► Uninitialized
///   any state + ModalClosed ──► Uninitialized
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionState {
    /// No modal open, no session.
    Uninitialized,

    /// A wallet address just became active; the Directory round-trip
    /// (lookup, then registration for unknown wallets) is in flight.
    Syncing {
        address: WalletAddress,
        epoch: Epoch,
        phase: SyncPhase,
    },

    /// Wallet flow in progress; which controls are shown depends on `step`.
    Onboarding(OnboardingFlow),

    /// Registration complete: terms accepted, returning-user view.
    Active {
        address: WalletAddress,
        user: UserRecord,
    },
}

/// Which Directory call the `Syncing` state is waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    /// `GET /api/user/{address}` outstanding.
    Lookup,

    /// The address was unknown; registration outstanding. `invite` is the
    /// code sent along, kept so the landing step can be chosen once the
    /// registration settles.
    Register { invite: Option<String> },
}

/// Position inside the stepped registration flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnboardingStep {
    /// Step 1: no wallet yet, show the connect prompt.
    ConnectWallet,
    /// Step 2: optional invite code entry.
    InviteCode,
    /// Step 3: optional social account link.
    SocialLink,
    /// Step 4: terms acceptance.
    Terms,
}

impl OnboardingStep {
    /// 1-based position shown by the step indicator.
    pub fn number(self) -> u8 {
        match self {
            Self::ConnectWallet => 1,
            Self::InviteCode => 2,
            Self::SocialLink => 3,
            Self::Terms => 4,
        }
    }
}

/// Mutable contents of the `Onboarding` state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingFlow {
    /// Connected address; `None` exactly while `step` is `ConnectWallet`.
    pub address: Option<WalletAddress>,

    pub step: OnboardingStep,

    /// Last validation or network failure, cleared on every new attempt.
    pub error: Option<String>,

    /// Local agree-checkbox state gating terms acceptance.
    pub terms_agreed: bool,

    /// In-flight guards; block duplicate submissions of the same action.
    pub invite_pending: bool,
    pub social_pending: bool,
    pub terms_pending: bool,

    /// Handle shown once the social step has linked an account.
    pub twitter_username: Option<String>,

    /// Read-through cache of the Directory record for `address`.
    pub user: Option<UserRecord>,
}

impl OnboardingFlow {
    /// Fresh flow at the connect-wallet step, as produced by opening the
    /// modal or by a disconnect while it stays open.
    pub fn at_connect_step() -> Self {
        Self {
            address: None,
            step: OnboardingStep::ConnectWallet,
            error: None,
            terms_agreed: false,
            invite_pending: false,
            social_pending: false,
            terms_pending: false,
            twitter_username: None,
            user: None,
        }
    }

    /// Flow for a known address landing on `step` after sync.
    pub fn at_step(address: WalletAddress, step: OnboardingStep) -> Self {
        Self {
            address: Some(address),
            ..Self::at_connect_step().with_step(step)
        }
    }

    fn with_step(mut self, step: OnboardingStep) -> Self {
        self.step = step;
        self
    }

    /// Whether any Directory call for this flow is outstanding.
    pub fn any_pending(&self) -> bool {
        self.invite_pending || self.social_pending || self.terms_pending
    }
}

impl SessionState {
    /// The address the session currently considers its identity, if any.
    pub fn active_address(&self) -> Option<&WalletAddress> {
        match self {
            Self::Uninitialized => None,
            Self::Syncing { address, .. } => Some(address),
            Self::Onboarding(flow) => flow.address.as_ref(),
            Self::Active { address, .. } => Some(address),
        }
    }

    /// Whether a Directory sync round-trip is in flight.
    pub fn is_syncing(&self) -> bool {
        matches!(self, Self::Syncing { .. })
    }

    /// Whether the returning-user view is showing.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// The current step number (1..4), while onboarding.
    pub fn step_number(&self) -> Option<u8> {
        match self {
            Self::Onboarding(flow) => Some(flow.step.number()),
            _ => None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // State Classification Tests
    // =========================================================================

    #[test]
    fn test_active_address_per_state() {
        assert!(SessionState::Uninitialized.active_address().is_none());

        let syncing = SessionState::Syncing {
            address: WalletAddress::from("0xaaa"),
            epoch: 1,
            phase: SyncPhase::Lookup,
        };
        assert_eq!(syncing.active_address().unwrap().as_str(), "0xaaa");

        let connect = SessionState::Onboarding(OnboardingFlow::at_connect_step());
        assert!(connect.active_address().is_none());

        let invite = SessionState::Onboarding(OnboardingFlow::at_step(
            WalletAddress::from("0xbbb"),
            OnboardingStep::InviteCode,
        ));
        assert_eq!(invite.active_address().unwrap().as_str(), "0xbbb");
    }

    #[test]
    fn test_step_numbers_match_indicator() {
        assert_eq!(OnboardingStep::ConnectWallet.number(), 1);
        assert_eq!(OnboardingStep::InviteCode.number(), 2);
        assert_eq!(OnboardingStep::SocialLink.number(), 3);
        assert_eq!(OnboardingStep::Terms.number(), 4);
    }

    #[test]
    fn test_step_number_only_while_onboarding() {
        let flow = SessionState::Onboarding(OnboardingFlow::at_step(
            WalletAddress::from("0xccc"),
            OnboardingStep::Terms,
        ));
        assert_eq!(flow.step_number(), Some(4));
        assert_eq!(SessionState::Uninitialized.step_number(), None);
    }

    // =========================================================================
    // Flow Constructor Tests
    // =========================================================================

    #[test]
    fn test_connect_step_flow_is_blank() {
        let flow = OnboardingFlow::at_connect_step();
        assert!(flow.address.is_none());
        assert_eq!(flow.step, OnboardingStep::ConnectWallet);
        assert!(flow.error.is_none());
        assert!(!flow.terms_agreed);
        assert!(!flow.any_pending());
        assert!(flow.user.is_none());
    }

    #[test]
    fn test_at_step_binds_address() {
        let flow =
            OnboardingFlow::at_step(WalletAddress::from("0xddd"), OnboardingStep::SocialLink);
        assert_eq!(flow.address.as_ref().unwrap().as_str(), "0xddd");
        assert_eq!(flow.step, OnboardingStep::SocialLink);
    }
}
