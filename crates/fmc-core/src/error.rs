// ── Core error types ──
//
// User-facing errors from fmc-core. The `From<fmc_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants.
// "Not ready" conditions (unresolved names, undeployed policies) are
// status values, not errors.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    /// An operation needs an id that the configuration has not resolved.
    #[error("Controller not configured: {what} is unresolved")]
    NotConfigured { what: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Rejected by controller (HTTP {status}): {message}")]
    Rejected { message: String, status: u16 },

    #[error("Unexpected controller response: {message}")]
    UnexpectedResponse { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn not_found(entity_type: &str, identifier: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            identifier: identifier.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fmc_api::Error> for CoreError {
    fn from(err: fmc_api::Error) -> Self {
        match err {
            fmc_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            fmc_api::Error::TokenManager { message } => CoreError::AuthenticationFailed {
                message: format!("token manager: {message}"),
            },
            fmc_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            fmc_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            fmc_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            fmc_api::Error::Api {
                method,
                status: 401,
                ..
            } => CoreError::AuthenticationFailed {
                message: format!("{method} rejected: token not accepted"),
            },
            fmc_api::Error::Api {
                method,
                status,
                body,
            } => CoreError::Rejected {
                message: format!("{method}: {body}"),
                status,
            },
            fmc_api::Error::Deserialization { message, body: _ } => {
                CoreError::UnexpectedResponse { message }
            }
            fmc_api::Error::UnexpectedResponse(message) => {
                CoreError::UnexpectedResponse { message }
            }
        }
    }
}
