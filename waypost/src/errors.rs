use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

/// Errors that can terminate a save request.
///
/// Every variant maps to a plain-text HTTP response; nothing propagates past
/// the handler boundary. Upstream GitHub failures carry the raw status and
/// body through verbatim to aid debugging. The bearer token never appears in
/// any message.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Malformed request body or missing/non-array markers
    #[error("{message}")]
    BadRequest { message: String },

    /// Any inbound method other than POST or OPTIONS
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Required settings absent, no remote call was attempted
    #[error("Missing required env vars: {}", vars.join(", "))]
    MissingConfig { vars: Vec<&'static str> },

    /// Reading the current file revision failed with something other than 404
    #[error("GitHub GET failed: {status}: {body}")]
    UpstreamRead { status: u16, body: String },

    /// GitHub rejected the commit
    #[error("GitHub PUT failed: {status}: {body}")]
    UpstreamWrite { status: u16, body: String },

    /// Transport-level failure talking to GitHub
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Unexpected error with full context chain
    #[error("Error: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::MissingConfig { .. }
            | Error::UpstreamRead { .. }
            | Error::UpstreamWrite { .. }
            | Error::Http(_)
            | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::BadRequest { .. } | Error::MethodNotAllowed => {
                tracing::debug!("Client error: {}", self);
            }
            Error::MissingConfig { .. } => {
                tracing::warn!("Configuration error: {}", self);
            }
            Error::UpstreamRead { .. } | Error::UpstreamWrite { .. } | Error::Http(_) => {
                tracing::error!("Upstream error: {}", self);
            }
            Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
        }

        (self.status_code(), self.to_string()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
