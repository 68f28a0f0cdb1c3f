use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use deployment::Deployment;
use services::services::assistant::{AssistantChatRequest, AssistantReply};

use crate::{DeploymentImpl, error::ApiError, extract::ApiJson};

/// POST /api/ai-assistant/chat
///
/// Answers with the bare reply object rather than the list envelope; failures
/// still use the error envelope.
pub async fn chat(
    State(deployment): State<DeploymentImpl>,
    ApiJson(request): ApiJson<AssistantChatRequest>,
) -> Result<ResponseJson<AssistantReply>, ApiError> {
    let reply = deployment.assistant().chat(request).await?;
    Ok(ResponseJson(reply))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest("/ai-assistant", Router::new().route("/chat", post(chat)))
}
