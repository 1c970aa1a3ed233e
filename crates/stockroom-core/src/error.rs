// ── Core error types ──
//
// User-facing errors from stockroom-core. Consumers never see raw HTTP
// or JSON failures; the `From<stockroom_api::Error>` impl translates
// transport-layer errors into domain variants.

use thiserror::Error;

use crate::storage::StorageError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Cannot reach catalog API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Catalog API request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("Product not found: {id}")]
    ProductNotFound { id: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Local state ──────────────────────────────────────────────────
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Fill in the configured timeout for timeouts raised by the transport,
    /// which does not know its own limit.
    pub(crate) fn with_timeout(self, timeout_secs: u64) -> Self {
        match self {
            Self::Timeout { timeout_secs: 0 } => Self::Timeout { timeout_secs },
            other => other,
        }
    }

    /// Rewrite a 404 from a single-product endpoint as `ProductNotFound`.
    pub(crate) fn for_product(self, id: &str) -> Self {
        match self {
            Self::Api {
                status: Some(404), ..
            } => Self::ProductNotFound { id: id.to_owned() },
            other => other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<stockroom_api::Error> for CoreError {
    fn from(err: stockroom_api::Error) -> Self {
        match err {
            stockroom_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            stockroom_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.origin().ascii_serialization())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            stockroom_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            stockroom_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            stockroom_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            stockroom_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected response from API: {message}"))
            }
            stockroom_api::Error::Attachment { file_name, reason } => {
                CoreError::validation(format!("image '{file_name}': {reason}"))
            }
        }
    }
}
