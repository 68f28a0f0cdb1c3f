use std::sync::Arc;

use async_trait::async_trait;
use db::{DBService, seed::seed_demo_data};
use deployment::{Deployment, DeploymentError};
use services::services::{
    ai_client::{ChatCompletionProvider, provider_from_config},
    assistant::AssistantService,
    config::AppConfig,
    database_validator::DatabaseValidator,
};
use tracing::info;

#[derive(Clone)]
pub struct LocalDeployment {
    config: Arc<AppConfig>,
    db: DBService,
    assistant: AssistantService,
}

impl LocalDeployment {
    /// Open the database, verify the schema and seed it when asked to.
    pub async fn from_config(config: AppConfig) -> Result<Self, DeploymentError> {
        let provider = provider_from_config(&config.ai)?;
        Self::with_provider(config, provider).await
    }

    /// Like [`LocalDeployment::from_config`] with an explicit chat provider.
    pub async fn with_provider(
        config: AppConfig,
        provider: Arc<dyn ChatCompletionProvider>,
    ) -> Result<Self, DeploymentError> {
        let db = DBService::new(&config.database_url).await?;

        let validation = DatabaseValidator::new(db.pool.clone()).ensure_ready().await?;
        info!("{}", validation.summary());

        if config.seed_demo_data && seed_demo_data(&db.pool).await? {
            info!("Demo data inserted");
        }

        let assistant = AssistantService::new(provider);
        info!(provider = assistant.provider_name(), "Assistant ready");

        Ok(Self {
            config: Arc::new(config),
            db,
            assistant,
        })
    }
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new() -> Result<Self, DeploymentError> {
        Self::from_config(AppConfig::from_env()?).await
    }

    fn config(&self) -> &AppConfig {
        &self.config
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn assistant(&self) -> &AssistantService {
        &self.assistant
    }
}
