//! FOMO Client Application Layer
//!
//! This crate contains the onboarding session coordinator and the
//! one-shot use cases built on the `fomo-core` ports.

pub mod usecases;

pub use usecases::onboarding::{
    OnboardingConfig, OnboardingCoordinator, OnboardingDomainEvent, OnboardingEventPort,
    OnboardingFacade,
};
pub use usecases::referrals::GetReferralSummary;
pub use usecases::{GetSettings, UpdateSettings};
