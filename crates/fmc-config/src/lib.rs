//! Shared configuration for fmcctl.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `fmc_core::ControllerConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use fmc_core::{ControllerConfig, Credentials, DesiredConfiguration, ProbePolicy, TlsVerification};

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "fmcctl";

/// Environment variable consulted first for the controller password.
pub const PASSWORD_ENV: &str = "FMC_PASSWORD";

/// Environment variable consulted when a profile names no username.
pub const USERNAME_ENV: &str = "FMC_USERNAME";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named management-center profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Controller base URL (e.g., "https://fmc.example.net").
    pub controller: String,

    /// Domain UUID. Defaults to the global domain.
    pub domain: Option<String>,

    /// Username for the basic-auth token exchange.
    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or `FMC_PASSWORD`).
    pub password: Option<String>,

    /// External token manager endpoint, used instead of the exchange.
    pub token_manager: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    /// Per-request timeout in seconds.
    pub timeout: Option<u64>,

    /// Refresh tokens older than this many seconds.
    pub token_max_age: Option<u64>,

    /// Token verification attempts.
    pub probe_attempts: Option<u32>,

    /// Seconds between token verification attempts.
    pub probe_delay: Option<u64>,

    /// What the controller is expected to hold.
    #[serde(default)]
    pub desired: DesiredConfiguration,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "fmcctl", "fmcctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fmcctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from `path` + `FMC_`-prefixed environment variables.
///
/// Nested keys use a double underscore:
/// `FMC_PROFILES__LAB__CONTROLLER=https://...`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("FMC_")
                .ignore(&["PASSWORD", "USERNAME"])
                .split("__"),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

fn keyring_password(profile_name: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

/// Resolve basic-auth credentials from the chain
/// `FMC_PASSWORD` → keyring → plaintext.
///
/// `Ok(None)` when the profile names no user at all (token-manager or
/// injected-token setups). A username without any password is an error.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    resolve_credentials_with(
        profile,
        profile_name,
        std::env::var(USERNAME_ENV).ok(),
        std::env::var(PASSWORD_ENV).ok(),
    )
}

fn resolve_credentials_with(
    profile: &Profile,
    profile_name: &str,
    env_username: Option<String>,
    env_password: Option<String>,
) -> Result<Option<Credentials>, ConfigError> {
    let Some(username) = profile.username.clone().or(env_username) else {
        return Ok(None);
    };

    let password = env_password
        .map(SecretString::from)
        .or_else(|| keyring_password(profile_name))
        .or_else(|| profile.password.clone().map(SecretString::from))
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    Ok(Some(Credentials { username, password }))
}

/// TLS mode from a profile: `insecure` wins, then a custom CA, else the
/// system store.
pub fn tls_for(profile: &Profile) -> TlsVerification {
    if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `ControllerConfig` from a profile, without CLI flag overrides.
///
/// Fails when the profile can obtain no token at all: no username and no
/// token manager.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ControllerConfig, ConfigError> {
    let credentials = resolve_credentials(profile, profile_name)?;
    if credentials.is_none() && profile.token_manager.is_none() {
        return Err(ConfigError::NoCredentials {
            profile: profile_name.into(),
        });
    }
    controller_config(profile, credentials)
}

/// Translate a profile plus already-resolved credentials. Callers that
/// inject a token need no credentials, so none are required here.
pub fn controller_config(
    profile: &Profile,
    credentials: Option<Credentials>,
) -> Result<ControllerConfig, ConfigError> {
    let url: url::Url = profile
        .controller
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "controller".into(),
            reason: format!("invalid URL: {}", profile.controller),
        })?;

    let mut config = ControllerConfig::new(url);
    config.credentials = credentials;
    config.token_manager.clone_from(&profile.token_manager);
    if let Some(domain) = &profile.domain {
        config.domain.clone_from(domain);
    }
    config.tls = tls_for(profile);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));
    if let Some(secs) = profile.token_max_age {
        config.token_max_age = Duration::from_secs(secs);
    }
    let default_probe = ProbePolicy::default();
    config.probe = ProbePolicy {
        attempts: profile.probe_attempts.unwrap_or(default_probe.attempts),
        delay: profile
            .probe_delay
            .map_or(default_probe.delay, Duration::from_secs),
    };
    config.desired = profile.desired.clone();
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
output = "json"

[profiles.lab]
controller = "https://fmc.lab.example.net"
username = "api-user"
password = "from-file"
insecure = true
token_max_age = 600
probe_attempts = 5

[profiles.lab.desired]
device_group = "ftdv-group"
access_policy = "ftdv-acl"
security_zones = ["inside", "outside"]

[profiles.managed]
controller = "https://fmc.example.net"
token_manager = "https://tokens.example.net/fmc"
ca_cert = "/etc/fmc/ca.pem"
"#;

    fn write_sample() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_profiles_from_file() {
        let (_dir, path) = write_sample();
        let config = load_config_from(&path).unwrap();

        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.timeout, 30);
        let (name, lab) = config.profile(None).unwrap();
        assert_eq!(name, "lab");
        assert_eq!(lab.desired.device_group.as_deref(), Some("ftdv-group"));
        assert_eq!(lab.desired.security_zones, ["inside", "outside"]);
        assert!(lab.desired.nat_policy.is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert!(config.profiles.is_empty());
        assert!(matches!(
            config.profile(Some("lab")),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                controller: "https://fmc.example.net".into(),
                username: Some("admin".into()),
                ..Profile::default()
            },
        );

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        let (_, profile) = loaded.profile(None).unwrap();
        assert_eq!(profile.username.as_deref(), Some("admin"));
    }

    #[test]
    fn env_password_wins_over_plaintext() {
        let profile = Profile {
            username: Some("api-user".into()),
            password: Some("from-file".into()),
            ..Profile::default()
        };
        let creds = resolve_credentials_with(&profile, "p", None, Some("from-env".into()))
            .unwrap()
            .unwrap();
        assert_eq!(creds.username, "api-user");
        assert_eq!(creds.password.expose_secret(), "from-env");
    }

    #[test]
    fn no_username_means_no_credentials() {
        let creds = resolve_credentials_with(&Profile::default(), "p", None, None).unwrap();
        assert!(creds.is_none());
    }

    #[test]
    fn env_username_fills_profile_gap() {
        let profile = Profile {
            password: Some("pw".into()),
            ..Profile::default()
        };
        let creds = resolve_credentials_with(&profile, "p", Some("env-user".into()), None)
            .unwrap()
            .unwrap();
        assert_eq!(creds.username, "env-user");
    }

    #[test]
    fn profile_translates_to_controller_config() {
        let (_dir, path) = write_sample();
        let config = load_config_from(&path).unwrap();
        let (name, lab) = config.profile(Some("lab")).unwrap();
        let creds = resolve_credentials_with(lab, name, None, Some("pw".into())).unwrap();

        let cc = controller_config(lab, creds).unwrap();
        assert_eq!(cc.url.as_str(), "https://fmc.lab.example.net/");
        assert_eq!(cc.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cc.token_max_age, Duration::from_secs(600));
        assert_eq!(cc.probe.attempts, 5);
        assert_eq!(cc.probe.delay, ProbePolicy::default().delay);
        assert_eq!(cc.desired.access_policy.as_deref(), Some("ftdv-acl"));
    }

    #[test]
    fn token_manager_profile_needs_no_credentials() {
        let (_dir, path) = write_sample();
        let config = load_config_from(&path).unwrap();
        let (name, managed) = config.profile(Some("managed")).unwrap();

        let cc = profile_to_controller_config(managed, name).unwrap();
        assert_eq!(
            cc.token_manager.as_deref(),
            Some("https://tokens.example.net/fmc")
        );
        assert_eq!(
            cc.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/fmc/ca.pem"))
        );
    }

    #[test]
    fn profile_without_any_auth_is_rejected() {
        let profile = Profile {
            controller: "https://fmc.example.net".into(),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_controller_config(&profile, "bare"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn invalid_url_is_a_validation_error() {
        let profile = Profile {
            controller: "not a url".into(),
            token_manager: Some("https://tokens".into()),
            ..Profile::default()
        };
        let err = controller_config(&profile, None).unwrap_err();
        assert!(err.to_string().contains("invalid controller"));
    }
}
