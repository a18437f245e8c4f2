//! Wallet adapter port
//!
//! Thin surface over the host's wallet provider: a few commands the session
//! issues plus a change subscription the coordinator listens on.

use async_trait::async_trait;

use crate::ids::WalletAddress;

#[async_trait]
pub trait WalletPort: Send + Sync {
    /// The account the provider currently reports, if any.
    async fn current_address(&self) -> anyhow::Result<Option<WalletAddress>>;

    /// Open the provider's connect UI. The resulting account (or lack of
    /// one) is only ever observed through the change subscription.
    async fn request_connect(&self) -> anyhow::Result<()>;

    /// Drop the current account.
    async fn disconnect(&self) -> anyhow::Result<()>;

    /// Subscribe to account changes.
    ///
    /// Yields the new current address on connect or switch, `None` on
    /// disconnect. The provider may report the same address repeatedly.
    async fn subscribe_changes(
        &self,
    ) -> anyhow::Result<tokio::sync::mpsc::Receiver<Option<WalletAddress>>>;
}
