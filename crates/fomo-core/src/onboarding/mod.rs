//! Wallet onboarding domain
//!
//! The session state machine behind the wallet connect modal, plus the
//! invite-code rules and the host-facing view projection. Everything here
//! is pure; network and wallet effects are expressed as `SessionAction`s
//! for the application layer to execute.

pub mod invite;
pub mod machine;
pub mod state;
pub mod view;

pub use machine::{
    InviteOutcome, LookupOutcome, OnboardingStateMachine, RegisterOutcome, SessionAction,
    SessionEvent, SocialOutcome, TermsOutcome,
};
pub use state::{Epoch, OnboardingFlow, OnboardingStep, SessionState, SyncPhase};
pub use view::ModalView;
