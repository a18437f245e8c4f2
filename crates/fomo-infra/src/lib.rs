pub mod directory;
pub mod settings;
pub mod wallet;

pub use directory::HttpUserDirectory;
pub use settings::FileSettingsRepository;
pub use wallet::{BridgedWalletAdapter, WalletBridgeCommand};
