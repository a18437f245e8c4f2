//! Business logic use cases
//!
//! The onboarding coordinator owns the long-running session; the other
//! use cases are one-shot request/response wrappers around the ports.

pub mod get_settings;
pub mod onboarding;
pub mod referrals;
pub mod update_settings;

pub use get_settings::GetSettings;
pub use update_settings::UpdateSettings;
