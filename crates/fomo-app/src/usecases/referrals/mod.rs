pub mod get_referral_summary;

pub use get_referral_summary::GetReferralSummary;
