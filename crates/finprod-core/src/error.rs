// ── Core error types ──
//
// Consumers never see reqwest errors or JSON parse failures directly.
// The `From<finprod_api::Error>` impl folds transport-layer errors into
// the taxonomy the UI reports: invalid data, not found, server error,
// connection error, or unexpected.

pub use finprod_api::error::messages;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach products API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Controller disconnected")]
    ControllerDisconnected,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Product not found: {message}")]
    NotFound { message: String },

    #[error("Invalid product data: {message}")]
    InvalidData { message: String },

    #[error("Products API internal error: {message}")]
    ServerError { message: String },

    // ── Validation errors ────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if the server answered).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The message shown to people for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::ConnectionFailed { .. } => messages::CONNECTION.into(),
            Self::NotFound { .. } => messages::NOT_FOUND.into(),
            Self::InvalidData { .. } => messages::INVALID_DATA.into(),
            Self::ServerError { .. } => messages::SERVER.into(),
            Self::ValidationFailed { message } => message.clone(),
            Self::ControllerDisconnected
            | Self::Api { .. }
            | Self::Config { .. }
            | Self::Internal(_) => messages::UNEXPECTED.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<finprod_api::Error> for CoreError {
    fn from(err: finprod_api::Error) -> Self {
        if err.is_connection() {
            let url = match &err {
                finprod_api::Error::Transport(e) => e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                _ => "<unknown>".into(),
            };
            return CoreError::ConnectionFailed {
                url,
                reason: err.to_string(),
            };
        }

        match err {
            finprod_api::Error::BadRequest { message } => CoreError::InvalidData { message },
            finprod_api::Error::NotFound { message } => CoreError::NotFound { message },
            finprod_api::Error::Server { message } => CoreError::ServerError { message },
            finprod_api::Error::UnexpectedStatus { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            finprod_api::Error::Transport(e) => CoreError::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            finprod_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            finprod_api::Error::InvalidBaseUrl(raw) => CoreError::Config {
                message: format!("Invalid base URL: {raw}"),
            },
            finprod_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            finprod_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
