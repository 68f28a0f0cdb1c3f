use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{
    idea::IdeaError,
    life_area::{AreaItem, LifeAreaError},
    note::NoteError,
    task::TaskError,
};
use services::services::assistant::AssistantError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Database(e) => ApiError::Database(e),
            TaskError::ProjectNotFound(_) => ApiError::bad_request("Project not found"),
        }
    }
}

impl From<IdeaError> for ApiError {
    fn from(err: IdeaError) -> Self {
        match err {
            IdeaError::Database(e) => ApiError::Database(e),
            IdeaError::ConnectionNotFound(_) => ApiError::bad_request("Connected idea not found"),
        }
    }
}

impl From<LifeAreaError> for ApiError {
    fn from(err: LifeAreaError) -> Self {
        match err {
            LifeAreaError::Database(e) => ApiError::Database(e),
            LifeAreaError::AreaNotFound(_) => ApiError::not_found("Life area not found"),
            LifeAreaError::ItemNotFound(item, _) => ApiError::not_found(match item {
                AreaItem::Goal => "Goal not found",
                AreaItem::Habit => "Habit not found",
                AreaItem::Review => "Review not found",
            }),
        }
    }
}

impl From<NoteError> for ApiError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::Database(e) => ApiError::Database(e),
            NoteError::NoteNotFound(_) => ApiError::not_found("Note not found"),
            NoteError::SelfConnection => ApiError::bad_request("A note cannot be connected to itself"),
            NoteError::DuplicateConnection => ApiError::bad_request("Connection already exists"),
            NoteError::ConnectionNotFound => ApiError::not_found("Connection not found"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::Assistant(AssistantError::EmptyMessage) => {
                (StatusCode::BAD_REQUEST, AssistantError::EmptyMessage.to_string())
            }
            ApiError::Assistant(AssistantError::Provider(err)) => {
                tracing::error!(error = %err, "AI provider error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get AI response".to_string())
            }
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use services::services::ai_client::ChatProviderError;

    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(ApiError::bad_request("x").into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(NoteError::NoteNotFound(uuid::Uuid::nil())).into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(AssistantError::Provider(ChatProviderError::Timeout))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(TaskError::ProjectNotFound(uuid::Uuid::nil()))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
