//! Error kinds shared by every stage of the relay.
//!
//! Startup errors ([`RelayError::Config`], [`RelayError::CredentialVerification`])
//! end the process. Everything else is recoverable: the loop logs it and
//! waits for the next poll cycle.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// Config file missing, unreadable or malformed.
    #[error("config error: {0}")]
    Config(String),

    /// The destination rejected our credentials at startup.
    #[error("credential verification failed: {0}")]
    CredentialVerification(String),

    /// The timeline request never produced a response.
    #[error("timeline request failed: {0}")]
    FetchTransport(#[source] reqwest::Error),

    /// The timeline endpoint answered with a non-2xx status.
    #[error("timeline request returned HTTP {status}: {body}")]
    FetchStatus { status: u16, body: String },

    /// The response body was not the expected JSON envelope.
    #[error("failed to decode timeline body: {0}")]
    FetchDecode(#[from] serde_json::Error),

    /// Well-formed envelope carrying an application-level error.
    #[error("timeline API error{}: {message}", .code.map(|c| format!(" {c}")).unwrap_or_default())]
    SourceApi { message: String, code: Option<i64> },

    /// A `created_at` value did not match the source timestamp format.
    #[error("failed to parse timestamp {raw:?} on item {id}: {source}")]
    TimestampParse {
        id: i64,
        raw: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Posting a single message failed.
    #[error("publish failed: {0}")]
    Publish(String),
}

impl RelayError {
    /// Whether this error should terminate the process.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::CredentialVerification(_)
        )
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
