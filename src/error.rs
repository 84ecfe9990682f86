use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the conversation service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Network failure, timeout, or a request that could not be built.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The body did not match the expected shape.
    #[error("malformed {endpoint} response: {source}")]
    Malformed {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The service flavor does not offer this operation.
    #[error("{operation} is not supported by this service")]
    Unsupported { operation: &'static str },
}

impl ServiceError {
    pub fn status(status: StatusCode, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

/// Errors reported to the caller of `email_transcript`.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("no chat session to send")]
    NoSession,

    #[error("an email address is required")]
    MissingEmail,

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("failed to send transcript: {0}")]
    Service(#[from] ServiceError),
}
