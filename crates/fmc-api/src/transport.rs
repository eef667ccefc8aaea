// Shared transport configuration for building reqwest::Client instances.
//
// The FMC client and the HTTP token manager both build their clients here,
// so TLS and timeout policy live in one place.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("fmcctl/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
///
/// Verification is on unless the caller explicitly opts out with
/// [`DangerAcceptInvalid`](Self::DangerAcceptInvalid). Management centers
/// usually ship self-signed certificates, so prefer [`CustomCa`](Self::CustomCa)
/// with the controller's exported certificate over disabling checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate. Exposes the session token to interception.
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Whole-request timeout, applied to every call.
    pub timeout: Duration,
    /// TCP + TLS handshake timeout.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                tracing::warn!("TLS certificate verification disabled");
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the TLS mode.
    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_verifies_certificates() {
        assert_eq!(TransportConfig::default().tls, TlsMode::System);
    }

    #[test]
    fn missing_ca_file_is_tls_error() {
        let config = TransportConfig::default()
            .with_tls(TlsMode::CustomCa(PathBuf::from("/nonexistent/ca.pem")));
        let err = config.build_client().unwrap_err();
        assert!(matches!(err, Error::Tls(ref m) if m.contains("failed to read CA cert")));
    }

    #[test]
    fn builds_client_with_insecure_mode() {
        let config = TransportConfig::default()
            .with_tls(TlsMode::DangerAcceptInvalid)
            .with_timeout(Duration::from_secs(5));
        assert!(config.build_client().is_ok());
    }
}
