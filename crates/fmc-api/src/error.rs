use thiserror::Error;

/// Top-level error type for the `fmc-api` crate.
///
/// Transport failures (the request never produced an HTTP status) are kept
/// apart from API rejections (the controller answered outside the accepted
/// status range). Name lookups that find nothing are not errors at all --
/// they return `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token exchange failed or produced no token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The external token manager could not mint a token.
    #[error("Token manager error: {message}")]
    TokenManager { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, TLS handshake).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate loading error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// The controller answered with a status outside the accepted range
    /// for the verb. `body` carries the controller's diagnostic text.
    #[error("{method} rejected by controller (HTTP {status}): {body}")]
    Api {
        method: String,
        status: u16,
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A response parsed but lacked a field the operation depends on.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Authentication { .. } | Self::TokenManager { .. } => true,
            Self::Api { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Returns `true` if the request never reached the controller.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Tls(_))
    }

    /// HTTP status of an API rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
