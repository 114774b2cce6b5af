use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Failure of a single places lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("rate limited by places provider: {0}")]
    RateLimited(String),
    #[error("no data for region: {0}")]
    NotFound(String),
    #[error("places provider unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("invalid lookup argument: {0}")]
    InvalidArgument(String),
}

impl LookupError {
    /// Worth retrying after a backoff
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LookupError::RateLimited(_) | LookupError::ServiceUnavailable(_)
        )
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::ServiceUnavailable(err.to_string())
    }
}

/// Why a route could not be produced. Never surfaced to clients as an error.
#[derive(Debug, Error)]
pub enum RouteUnavailable {
    #[error("route service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("route service answered with status {0}")]
    Status(u16),
    #[error("route service rejected the request: {0}")]
    Rejected(String),
    #[error("malformed route response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("invalid polyline character {character:?} at byte {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("polyline ends in the middle of a value")]
    Truncated,
    #[error("polyline value overflows at byte {0}")]
    Overflow(usize),
    #[error("decoded coordinate out of range at byte {0}")]
    OutOfRange(usize),
    #[error("cannot encode non-finite or out-of-range coordinate")]
    NonFinite,
}

/// Missing or malformed configuration, raised once at boot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ChatbotError {
    #[error("text generation failed: {0}")]
    Generation(String),
    #[error("no canned replies available")]
    NoCannedReply,
}

impl From<reqwest::Error> for ChatbotError {
    fn from(err: reqwest::Error) -> Self {
        ChatbotError::Generation(err.to_string())
    }
}

/// Request-level errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("superseded")]
    Superseded,
    #[error("Internal server error")]
    Internal,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Superseded => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string(),
            "success": false,
        }))
    }
}
