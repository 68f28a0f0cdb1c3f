//! Request extractors that answer malformed input with the API envelope.

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::error::ApiError;

/// `axum::Json` whose rejections become 400 envelopes.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(ApiError::bad_request(rejection_message(&rejection)))
            }
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonDataError(e) => format!("Invalid request body: {}", e.body_text()),
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON".to_string(),
        JsonRejection::MissingJsonContentType(_) => "Expected a JSON body".to_string(),
        other => other.body_text(),
    }
}

/// Query string extractor with the same 400 behaviour.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|e| ApiError::bad_request(e.body_text()))
    }
}

/// Body shape of every PUT: the target id next to the changed fields.
#[derive(Debug, Deserialize)]
pub struct WithId<T> {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub changes: T,
}

/// `?id=` on DELETE routes.
#[derive(Debug, Default, Deserialize)]
pub struct IdParam {
    pub id: Option<String>,
}

/// Resolve a client id. Missing is a 400; anything that is not a UUID cannot exist.
pub fn require_id(raw: Option<&str>, not_found: &str) -> Result<uuid::Uuid, ApiError> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty()).ok_or_else(|| ApiError::bad_request("ID is required"))?;
    db::models::common::parse_id(raw).ok_or_else(|| ApiError::not_found(not_found))
}
