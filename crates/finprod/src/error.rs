//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help
//! text. The headline of each error is the message the UI would show.

use miette::Diagnostic;
use thiserror::Error;

use finprod_config::ConfigError;
use finprod_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const VALIDATION: i32 = 5;
    pub const SERVER: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(finprod::connection_failed),
        help(
            "Check that the products API is running and reachable.\n\
             URL: {url}\n\
             Cause: {reason}\n\
             Override with --base-url or FINPROD_BASE_URL."
        )
    )]
    ConnectionFailed {
        url: String,
        reason: String,
        message: String,
    },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(finprod::not_found),
        help("No product with ID '{id}'. Run: finprod products list")
    )]
    NotFound { id: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("{field}: {reason}")]
    #[diagnostic(code(finprod::validation))]
    Validation { field: String, reason: String },

    #[error("El formulario contiene errores")]
    #[diagnostic(code(finprod::invalid_form), help("{details}"))]
    InvalidForm { details: String },

    #[error("{message}")]
    #[diagnostic(
        code(finprod::invalid_data),
        help("The server rejected the request: {detail}")
    )]
    InvalidData { message: String, detail: String },

    // ── Server ───────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(finprod::server_error), help("Server said: {detail}"))]
    Server { message: String, detail: String },

    #[error("{message}")]
    #[diagnostic(code(finprod::api_error), help("{detail}"))]
    Api { message: String, detail: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(finprod::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: finprod config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(finprod::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(finprod::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Prompt failed: {0}")]
    #[diagnostic(code(finprod::prompt))]
    Prompt(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(finprod::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(finprod::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(finprod::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::InvalidForm { .. } | Self::InvalidData { .. } => {
                exit_code::VALIDATION
            }
            Self::Server { .. } => exit_code::SERVER,
            Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownProfile { name } => {
                let cfg = finprod_config::load_config_or_default();
                let mut available: Vec<_> = cfg.profiles.into_keys().collect();
                available.sort();
                CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

/// Not-found errors need the ID, which `CoreError` does not carry.
pub fn not_found(id: &str) -> CliError {
    CliError::NotFound {
        id: id.into(),
        message: finprod_core::error::messages::NOT_FOUND.into(),
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.user_message();
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                reason,
                message,
            },

            CoreError::ControllerDisconnected => CliError::ConnectionFailed {
                url: "(disconnected)".into(),
                reason: "connection to the products API was closed".into(),
                message,
            },

            CoreError::NotFound { message: detail } => CliError::NotFound {
                id: detail,
                message,
            },

            CoreError::InvalidData { message: detail } => CliError::InvalidData { message, detail },

            CoreError::ServerError { message: detail } => CliError::Server { message, detail },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message: detail, .. }
            | CoreError::Config { message: detail }
            | CoreError::Internal(detail) => CliError::Api { message, detail },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    url: "http://localhost:3002/bp".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::NotFound {
                    message: "gone".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::InvalidData {
                    message: "bad".into(),
                },
                exit_code::VALIDATION,
            ),
            (
                CoreError::ServerError {
                    message: "boom".into(),
                },
                exit_code::SERVER,
            ),
            (CoreError::Internal("odd".into()), exit_code::GENERAL),
        ];

        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn headline_is_user_message() {
        let err = CliError::from(CoreError::ServerError {
            message: "stack trace".into(),
        });
        assert_eq!(err.to_string(), "Error interno del servidor. Intenta más tarde.");
    }
}
