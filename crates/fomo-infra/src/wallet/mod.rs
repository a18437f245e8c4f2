pub mod bridged;

pub use bridged::{BridgedWalletAdapter, WalletBridgeCommand};
