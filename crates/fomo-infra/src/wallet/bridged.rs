//! Wallet provider bridge
//!
//! The wallet lives on the host side (a browser extension or an embedded
//! provider); this adapter is the seam between it and the session.
//! Commands flow out through `subscribe_commands`, account changes flow
//! back in through `report_account_change`.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use anyhow::Result;
use fomo_core::ports::WalletPort;
use fomo_core::WalletAddress;

/// Provider operation the host is asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletBridgeCommand {
    /// Open the provider's account chooser.
    OpenChooser,
    /// Drop the provider session.
    Disconnect,
}

pub struct BridgedWalletAdapter {
    current: std::sync::Mutex<Option<WalletAddress>>,
    change_txs: std::sync::Mutex<Vec<mpsc::Sender<Option<WalletAddress>>>>,
    command_txs: std::sync::Mutex<Vec<mpsc::Sender<WalletBridgeCommand>>>,
}

impl BridgedWalletAdapter {
    pub fn new() -> Self {
        Self {
            current: std::sync::Mutex::new(None),
            change_txs: std::sync::Mutex::new(Vec::new()),
            command_txs: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Host entry point: the provider reported a new account set. `None`
    /// means the session was dropped on the provider side.
    pub async fn report_account_change(&self, address: Option<WalletAddress>) {
        *self.current.lock().unwrap() = address.clone();

        let txs = { self.change_txs.lock().unwrap().clone() };
        for tx in txs {
            if tx.send(address.clone()).await.is_err() {
                debug!("wallet change receiver dropped");
            }
        }
    }

    /// Host entry point: stream of provider operations the session wants
    /// run. A host must consume this for connect and disconnect to reach
    /// the actual provider.
    pub fn subscribe_commands(&self) -> mpsc::Receiver<WalletBridgeCommand> {
        let (tx, rx) = mpsc::channel(16);
        self.command_txs.lock().unwrap().push(tx);
        rx
    }

    async fn send_command(&self, command: WalletBridgeCommand) -> Result<()> {
        let txs = { self.command_txs.lock().unwrap().clone() };
        if txs.is_empty() {
            anyhow::bail!("no wallet bridge attached");
        }
        for tx in txs {
            if tx.send(command).await.is_err() {
                debug!(?command, "wallet command receiver dropped");
            }
        }
        Ok(())
    }
}

impl Default for BridgedWalletAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletPort for BridgedWalletAdapter {
    async fn current_address(&self) -> Result<Option<WalletAddress>> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn request_connect(&self) -> Result<()> {
        self.send_command(WalletBridgeCommand::OpenChooser).await
    }

    async fn disconnect(&self) -> Result<()> {
        self.send_command(WalletBridgeCommand::Disconnect).await?;
        // The provider confirms asynchronously; the cached address is
        // cleared at once so `current_address` never serves the dropped
        // session in the meantime.
        self.report_account_change(None).await;
        Ok(())
    }

    async fn subscribe_changes(&self) -> Result<mpsc::Receiver<Option<WalletAddress>>> {
        let (tx, rx) = mpsc::channel(16);
        self.change_txs.lock().unwrap().push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn reported_account_becomes_current() {
        let adapter = BridgedWalletAdapter::new();
        assert!(adapter.current_address().await.unwrap().is_none());

        adapter
            .report_account_change(Some(WalletAddress::from("0xabc")))
            .await;

        let current = adapter.current_address().await.unwrap();
        assert_eq!(current.unwrap().as_str(), "0xabc");
    }

    #[tokio::test]
    async fn account_changes_reach_subscribers() {
        let adapter = BridgedWalletAdapter::new();
        let mut changes = adapter.subscribe_changes().await.unwrap();

        adapter
            .report_account_change(Some(WalletAddress::from("0xabc")))
            .await;

        let change = timeout(Duration::from_secs(1), changes.recv())
            .await
            .expect("change timeout")
            .expect("change channel closed");
        assert_eq!(change.unwrap().as_str(), "0xabc");
    }

    #[tokio::test]
    async fn connect_request_reaches_the_bridge() {
        let adapter = BridgedWalletAdapter::new();
        let mut commands = adapter.subscribe_commands();

        adapter.request_connect().await.unwrap();

        let command = timeout(Duration::from_secs(1), commands.recv())
            .await
            .expect("command timeout")
            .expect("command channel closed");
        assert_eq!(command, WalletBridgeCommand::OpenChooser);
    }

    #[tokio::test]
    async fn connect_without_bridge_is_an_error() {
        let adapter = BridgedWalletAdapter::new();
        assert!(adapter.request_connect().await.is_err());
    }

    #[tokio::test]
    async fn disconnect_clears_current_and_notifies() {
        let adapter = BridgedWalletAdapter::new();
        let mut commands = adapter.subscribe_commands();
        let mut changes = adapter.subscribe_changes().await.unwrap();

        adapter
            .report_account_change(Some(WalletAddress::from("0xabc")))
            .await;
        let _ = changes.recv().await;

        adapter.disconnect().await.unwrap();

        let command = timeout(Duration::from_secs(1), commands.recv())
            .await
            .expect("command timeout")
            .expect("command channel closed");
        assert_eq!(command, WalletBridgeCommand::Disconnect);

        let change = timeout(Duration::from_secs(1), changes.recv())
            .await
            .expect("change timeout")
            .expect("change channel closed");
        assert!(change.is_none());
        assert!(adapter.current_address().await.unwrap().is_none());
    }
}
