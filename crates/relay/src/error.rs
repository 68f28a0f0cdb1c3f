use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("chat endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat endpoint returned {status}")]
    Status { status: u16 },
    #[error("chat endpoint returned no text")]
    EmptyResponse,
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}
