// ── Runtime connection configuration ──
//
// These types describe *how* to reach a management center and what it is
// expected to hold. They carry credential data and connection tuning, but
// never touch disk. The CLI constructs a `ControllerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use fmc_api::{Credentials, DEFAULT_TOKEN_MAX_AGE, GLOBAL_DOMAIN, ProbePolicy, TlsMode};
use url::Url;

use crate::model::DesiredConfiguration;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file, usually the controller's own export.
    CustomCa(PathBuf),
    /// Skip verification entirely.
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

/// Configuration for one management center.
///
/// Built by the CLI, passed to [`ManagedFmc`](crate::ManagedFmc). Core never
/// reads config files.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller URL (e.g., `https://fmc.example.net`).
    pub url: Url,
    /// Basic-auth credentials for the token exchange. Optional when a
    /// token manager or an injected token is used instead.
    pub credentials: Option<Credentials>,
    /// External token manager endpoint. Takes precedence over credentials
    /// when refreshing.
    pub token_manager: Option<String>,
    /// Domain for configuration calls.
    pub domain: String,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Tokens older than this are refreshed before use.
    pub token_max_age: Duration,
    /// Retry policy for token verification.
    pub probe: ProbePolicy,
    /// What the controller is expected to hold.
    pub desired: DesiredConfiguration,
}

impl ControllerConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            credentials: None,
            token_manager: None,
            domain: GLOBAL_DOMAIN.into(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            token_max_age: DEFAULT_TOKEN_MAX_AGE,
            probe: ProbePolicy::default(),
            desired: DesiredConfiguration::default(),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_verify_tls_and_use_global_domain() {
        let config = ControllerConfig::new("https://fmc.example.net".parse().unwrap());
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
        assert_eq!(config.domain, GLOBAL_DOMAIN);
        assert_eq!(config.token_max_age, Duration::from_secs(1800));
        assert!(config.credentials.is_none());
    }

    #[test]
    fn tls_maps_to_transport_mode() {
        let path = PathBuf::from("/etc/fmc/ca.pem");
        assert_eq!(
            TlsMode::from(&TlsVerification::CustomCa(path.clone())),
            TlsMode::CustomCa(path)
        );
        assert_eq!(
            TlsMode::from(&TlsVerification::DangerAcceptInvalid),
            TlsMode::DangerAcceptInvalid
        );
    }
}
