pub mod coordinator;
pub mod events;
pub mod facade;

pub use coordinator::{OnboardingConfig, OnboardingCoordinator};
pub use events::{OnboardingDomainEvent, OnboardingEventPort};
pub use facade::OnboardingFacade;
