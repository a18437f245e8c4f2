//! # fomo-core
//!
//! Core domain models and business logic for the FOMO wallet client.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod ids;
pub mod onboarding;
pub mod ports;
pub mod settings;
pub mod user;

// Re-export commonly used types at the crate root
pub use ids::WalletAddress;
pub use onboarding::{
    ModalView, OnboardingStateMachine, OnboardingStep, SessionAction, SessionEvent, SessionState,
};
pub use settings::ClientSettings;
pub use user::{ReferralEntry, ReferralSummary, UserRecord};
