//! Host-facing projection of the session state.
//!
//! Hosts render from this flattened snapshot instead of matching on
//! `SessionState` themselves, so the state shape can evolve without
//! breaking embedders.

use serde::{Deserialize, Serialize};

use crate::onboarding::machine::OnboardingStateMachine;
use crate::onboarding::state::SessionState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalView {
    pub open: bool,

    /// 1-based step indicator; `None` outside the stepped flow.
    pub step: Option<u8>,

    /// The sync spinner between wallet connect and the landing step.
    pub syncing: bool,

    /// Returning-user view: registration complete.
    pub active: bool,

    pub address: Option<String>,

    /// Abbreviated address for display, `0x1234...abcd` style.
    pub short_address: Option<String>,

    pub invite_draft: String,

    pub error: Option<String>,

    pub terms_agreed: bool,

    /// A Directory call for the current step is outstanding; submit
    /// controls should be disabled.
    pub busy: bool,

    pub twitter_handle: Option<String>,

    /// The user's own invite code, for the share card on the active view.
    pub own_invite_code: Option<String>,
}

impl ModalView {
    pub fn project(machine: &OnboardingStateMachine) -> Self {
        let mut view = Self {
            open: machine.is_modal_open(),
            step: machine.state().step_number(),
            syncing: machine.state().is_syncing(),
            active: machine.state().is_active(),
            address: None,
            short_address: None,
            invite_draft: machine.draft_invite().to_string(),
            error: None,
            terms_agreed: false,
            busy: false,
            twitter_handle: None,
            own_invite_code: None,
        };

        if let Some(address) = machine.state().active_address() {
            view.address = Some(address.as_str().to_string());
            view.short_address = Some(address.short_form());
        }

        match machine.state() {
            SessionState::Onboarding(flow) => {
                view.error = flow.error.clone();
                view.terms_agreed = flow.terms_agreed;
                view.busy = flow.any_pending();
                view.twitter_handle = flow.twitter_username.clone();
            }
            SessionState::Active { user, .. } => {
                view.twitter_handle = user.twitter_username.clone();
                if !user.invite_code.is_empty() {
                    view.own_invite_code = Some(user.invite_code.clone());
                }
            }
            _ => {}
        }

        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::machine::{LookupOutcome, SessionEvent};
    use crate::user::UserRecord;

    fn registered_user() -> UserRecord {
        UserRecord {
            wallet_address: "0x1234567890abcdef1234567890abcdef12345678".to_string(),
            invite_code: "SHARE1".to_string(),
            referred_by: None,
            twitter_username: Some("@user_f0m0aa".to_string()),
            twitter_verified: true,
            terms_accepted: true,
            created_at: None,
        }
    }

    #[test]
    fn closed_machine_projects_a_closed_view() {
        let machine = OnboardingStateMachine::new();
        let view = ModalView::project(&machine);

        assert!(!view.open);
        assert_eq!(view.step, None);
        assert!(!view.active);
    }

    #[test]
    fn connect_step_projects_step_one() {
        let mut machine = OnboardingStateMachine::new();
        machine.handle_event(SessionEvent::ModalOpened {
            invite_from_url: Some("code42".to_string()),
        });

        let view = ModalView::project(&machine);
        assert!(view.open);
        assert_eq!(view.step, Some(1));
        assert_eq!(view.invite_draft, "CODE42");
        assert!(view.address.is_none());
    }

    #[test]
    fn active_view_carries_share_code_and_short_address() {
        let mut machine = OnboardingStateMachine::new();
        machine.handle_event(SessionEvent::ModalOpened {
            invite_from_url: None,
        });
        machine.handle_event(SessionEvent::WalletChanged {
            address: Some("0x1234567890abcdef1234567890abcdef12345678".into()),
        });
        let epoch = machine.epoch();
        machine.handle_event(SessionEvent::LookupSettled {
            epoch,
            outcome: LookupOutcome::Found {
                user: registered_user(),
            },
        });

        let view = ModalView::project(&machine);
        assert!(view.active);
        assert_eq!(view.step, None);
        assert_eq!(view.short_address.as_deref(), Some("0x1234...5678"));
        assert_eq!(view.own_invite_code.as_deref(), Some("SHARE1"));
        assert_eq!(view.twitter_handle.as_deref(), Some("@user_f0m0aa"));
    }

    #[test]
    fn syncing_view_flags_the_spinner() {
        let mut machine = OnboardingStateMachine::new();
        machine.handle_event(SessionEvent::ModalOpened {
            invite_from_url: None,
        });
        machine.handle_event(SessionEvent::WalletChanged {
            address: Some("0xaaa".into()),
        });

        let view = ModalView::project(&machine);
        assert!(view.syncing);
        assert_eq!(view.step, None);
        assert_eq!(view.address.as_deref(), Some("0xaaa"));
    }
}
