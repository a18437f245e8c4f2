//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and infrastructure implementations. This follows Hexagonal Architecture
//! principles, allowing the core business logic to remain independent of
//! external dependencies.

pub mod errors;
pub mod settings;
pub mod user_directory;
pub mod wallet;

pub use errors::DirectoryError;
pub use settings::SettingsPort;
pub use user_directory::{
    DirectoryAck, InviteVerdict, RegistrationReceipt, UserDirectoryPort,
};
pub use wallet::WalletPort;
