//! Use case for fetching a wallet's referral stats

use anyhow::Result;
use tracing::{info, info_span, Instrument};

use fomo_core::ports::UserDirectoryPort;
use fomo_core::user::ReferralSummary;
use fomo_core::WalletAddress;

/// Use case for retrieving a wallet's own invite code and the list of
/// wallets it referred.
///
/// Backs the share card on the connected view; the session itself never
/// needs this data, so it is fetched on demand rather than during sync.
pub struct GetReferralSummary {
    directory: std::sync::Arc<dyn UserDirectoryPort>,
}

impl GetReferralSummary {
    pub fn new(directory: std::sync::Arc<dyn UserDirectoryPort>) -> Self {
        Self { directory }
    }

    /// Execute the use case.
    ///
    /// # Parameters
    /// - `address`: The wallet whose referrals to fetch
    ///
    /// # Returns
    /// - `Ok(ReferralSummary)` - The invite code and referral list
    /// - `Err(e)` if the Directory call fails
    pub async fn execute(&self, address: &WalletAddress) -> Result<ReferralSummary> {
        let span = info_span!("usecase.get_referral_summary.execute", address = %address);

        async {
            let summary = self.directory.referral_summary(address).await?;

            info!(
                referral_count = summary.referral_count,
                "Referral summary retrieved"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }
}
