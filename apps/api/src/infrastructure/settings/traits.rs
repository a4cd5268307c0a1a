use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Only approved reviews count towards the average rating
    pub require_approval: bool,

    /// Approval state given to newly created reviews
    pub approve_new_reviews: bool,
}

#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn get_settings(&self) -> anyhow::Result<AppSettings>;
}
