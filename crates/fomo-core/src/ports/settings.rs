use async_trait::async_trait;

use crate::settings::model::ClientSettings;

#[async_trait]
pub trait SettingsPort: Send + Sync {
    async fn load(&self) -> anyhow::Result<ClientSettings>;
    async fn save(&self, settings: &ClientSettings) -> anyhow::Result<()>;
}
