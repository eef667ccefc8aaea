//! CLI configuration: thin wrapper around `fmc_config` shared types.
//!
//! Adds CLI-specific resolution that respects `GlobalOpts` flag overrides
//! (--controller, --username, --token, etc.).

use std::time::Duration;

use fmc_core::{ControllerConfig, CoreError, Credentials, TlsVerification, TokenGrant};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use fmc_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

/// Everything needed to open a session with the active controller.
#[derive(Debug)]
pub struct Connection {
    pub profile_name: String,
    pub config: ControllerConfig,
    /// Token supplied on the command line, adopted instead of an exchange.
    pub token: Option<TokenGrant>,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the connection from the config file, profile, and CLI overrides.
///
/// Without a profile, `--controller` plus credentials or `--token` suffice.
pub fn resolve_connection(global: &GlobalOpts) -> Result<Connection, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.controller.is_some() => Profile::default(),
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };
    apply_overrides(&mut profile, global, &cfg.defaults);

    let token = global.token.as_deref().map(parse_token).transpose()?;
    let credentials = resolve_credentials(&profile, &profile_name, global)?;
    if credentials.is_none() && token.is_none() && profile.token_manager.is_none() {
        return Err(CliError::NoCredentials {
            profile: profile_name,
        });
    }

    let mut config = fmc_config::controller_config(&profile, credentials)?;
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(max_age) = global.token_max_age {
        config.token_max_age = max_age;
    }

    Ok(Connection {
        profile_name,
        config,
        token,
    })
}

/// Layer CLI flags over profile values. Flags win; `[defaults]` fills
/// what neither sets.
fn apply_overrides(profile: &mut Profile, global: &GlobalOpts, defaults: &Defaults) {
    if let Some(controller) = &global.controller {
        profile.controller.clone_from(controller);
    }
    if let Some(username) = &global.username {
        profile.username = Some(username.clone());
    }
    if let Some(domain) = &global.domain {
        profile.domain = Some(domain.clone());
    }
    profile.timeout = global
        .timeout
        .or(profile.timeout)
        .or(Some(defaults.timeout));
    if profile.insecure.is_none() && defaults.insecure {
        profile.insecure = Some(true);
    }
}

/// `--password` (env only) pairs with the resolved username; otherwise the
/// shared chain applies.
fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<Option<Credentials>, CliError> {
    if let (Some(username), Some(password)) = (&profile.username, &global.password) {
        return Ok(Some(Credentials::new(username.clone(), password.clone())));
    }
    match fmc_config::resolve_credentials(profile, profile_name) {
        Ok(credentials) => Ok(credentials),
        // A token on the command line makes a missing password harmless.
        Err(fmc_config::ConfigError::NoCredentials { .. }) if global.token.is_some() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// `--token` takes a bare access token or an exported grant as JSON.
fn parse_token(raw: &str) -> Result<TokenGrant, CliError> {
    if raw.trim_start().starts_with('{') {
        raw.parse::<TokenGrant>()
            .map_err(|e| CliError::from(CoreError::from(e)))
    } else {
        Ok(TokenGrant::new(raw.trim()))
    }
}

/// Human-readable duration for display.
pub fn format_duration(d: Duration) -> String {
    humantime::format_duration(d).to_string()
}
