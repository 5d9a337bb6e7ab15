use thiserror::Error;

/// User-facing messages for each failure class of the products API.
pub mod messages {
    pub const INVALID_DATA: &str = "Datos inválidos. Por favor verifica la información ingresada.";
    pub const NOT_FOUND: &str = "Producto no encontrado.";
    pub const SERVER: &str = "Error interno del servidor. Intenta más tarde.";
    pub const CONNECTION: &str = "No se pudo conectar con el servidor. Verifica tu conexión.";
    pub const UNEXPECTED: &str = "Ha ocurrido un error inesperado";
}

/// Top-level error type for the `finprod-api` crate.
///
/// HTTP status codes are folded into a small taxonomy (400, 404, 500,
/// unreachable, anything else). `finprod-core` maps these into domain
/// errors; [`Error::user_message`] gives the string shown to people.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured base URL cannot carry endpoint paths.
    #[error("Invalid base URL '{0}': expected an absolute http(s) URL")]
    InvalidBaseUrl(String),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── HTTP status ─────────────────────────────────────────────────
    /// HTTP 400: the server rejected the payload.
    #[error("Bad request (HTTP 400): {message}")]
    BadRequest { message: String },

    /// HTTP 404: the product (or route) does not exist.
    #[error("Not found (HTTP 404): {message}")]
    NotFound { message: String },

    /// HTTP 500.
    #[error("Internal server error (HTTP 500): {message}")]
    Server { message: String },

    /// Any other non-success status.
    #[error("Unexpected response (HTTP {status}): {message}")]
    UnexpectedStatus { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Build the error for a non-success HTTP status.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => Self::BadRequest { message },
            404 => Self::NotFound { message },
            500 => Self::Server { message },
            _ => Self::UnexpectedStatus { status, message },
        }
    }

    /// HTTP status carried by this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::NotFound { .. } => Some(404),
            Self::Server { .. } => Some(500),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the server could not be reached.
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// The message shown to people for this failure class.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => messages::INVALID_DATA,
            Self::NotFound { .. } => messages::NOT_FOUND,
            Self::Server { .. } => messages::SERVER,
            e if e.is_connection() => messages::CONNECTION,
            _ => messages::UNEXPECTED,
        }
    }
}
