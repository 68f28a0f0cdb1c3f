use async_trait::async_trait;
use db::{DBService, seed::SeedError};
use services::services::{
    ai_client::ChatProviderError, assistant::AssistantService, config::AppConfig,
    config::ConfigError, database_validator::DatabaseValidationError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    DatabaseValidation(#[from] DatabaseValidationError),
    #[error(transparent)]
    ChatProvider(#[from] ChatProviderError),
    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// Everything a request handler needs, behind one cloneable handle.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    /// Build from the process environment.
    async fn new() -> Result<Self, DeploymentError>;

    fn config(&self) -> &AppConfig;

    fn db(&self) -> &DBService;

    fn assistant(&self) -> &AssistantService;
}
