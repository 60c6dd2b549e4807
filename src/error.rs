use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing required query parameter: url")]
    MissingUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Upstream returned HTTP {status} for URL: {url}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("Fetch timeout for URL: {0}")]
    FetchTimeout(String),

    #[error("Failed to fetch URL: {url} - {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl Error {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingUrl => "MISSING_URL",
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::UpstreamStatus { .. } => "UPSTREAM_STATUS",
            Self::FetchTimeout(_) => "UPSTREAM_TIMEOUT",
            Self::FetchFailed { .. } => "UPSTREAM_UNREACHABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingUrl | Self::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamStatus { .. } | Self::FetchFailed { .. } => StatusCode::BAD_GATEWAY,
            Self::FetchTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Internal details stay in the server log.
    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Self::Internal(detail) = &self {
            tracing::error!(%detail, "Request failed with internal error");
        }
        let body = ErrorResponse {
            error: self.public_message(),
            code: self.error_code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string()).unwrap_or_default();
        if e.is_timeout() {
            return Self::FetchTimeout(url);
        }

        // Coarse reason only; the full error is logged by the transport.
        let reason = if e.is_connect() {
            "connection failed"
        } else if e.is_redirect() {
            "redirect policy violated"
        } else if e.is_body() || e.is_decode() {
            "response body could not be read"
        } else {
            "request failed"
        };
        Self::FetchFailed {
            url,
            reason: reason.to_string(),
        }
    }
}
