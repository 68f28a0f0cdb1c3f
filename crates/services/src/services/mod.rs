pub mod ai_client;
pub mod assistant;
pub mod config;
pub mod database_validator;
pub mod intent;
pub mod prompts;
