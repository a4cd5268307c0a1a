use super::traits::{AppSettings, SettingsProvider};
use crate::config::Config;
use async_trait::async_trait;

/// Settings fixed at startup from the process configuration.
pub struct ConfigSettingsProvider {
    settings: AppSettings,
}

impl ConfigSettingsProvider {
    pub fn new(settings: AppSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(AppSettings {
            require_approval: config.require_approval,
            approve_new_reviews: config.approve_new_reviews,
        })
    }
}

#[async_trait]
impl SettingsProvider for ConfigSettingsProvider {
    async fn get_settings(&self) -> anyhow::Result<AppSettings> {
        Ok(self.settings)
    }
}
