//! Client configuration model.

mod defaults;
pub mod model;

pub use model::{ClientSettings, DirectorySettings, WalletSettings, CURRENT_SCHEMA_VERSION};
