//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use fmc_config::ConfigError;
use fmc_core::{ApiError, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const NOT_CONFIGURED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(fmcctl::connection_failed),
        help(
            "Check that the controller is running and accessible.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(fmcctl::timeout),
        help("Increase timeout with --timeout or check controller responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fmcctl::auth_failed),
        help(
            "Verify the username and password for profile '{profile}'.\n\
             Run: fmcctl config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(fmcctl::no_credentials),
        help(
            "Configure credentials with: fmcctl config init\n\
             Or set FMC_USERNAME and FMC_PASSWORD, or pass --token."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(fmcctl::not_found),
        help("Run: fmcctl {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Controller is not configured: {what} is unresolved")]
    #[diagnostic(
        code(fmcctl::not_configured),
        help("Run: fmcctl status to see which names did not resolve")
    )]
    NotConfigured { what: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Controller rejected the request (HTTP {status}): {message}")]
    #[diagnostic(code(fmcctl::rejected))]
    Rejected { status: u16, message: String },

    #[error("Unexpected controller response: {message}")]
    #[diagnostic(code(fmcctl::unexpected_response))]
    UnexpectedResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fmcctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fmcctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: fmcctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(fmcctl::no_config),
        help(
            "Create one with: fmcctl config init\n\
             Expected at: {path}\n\
             Or pass --controller with FMC_USERNAME / FMC_PASSWORD."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(fmcctl::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(fmcctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::NotConfigured { .. } => exit_code::NOT_CONFIGURED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError ───────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: "(see fmcctl config profiles)".into(),
            },
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError ─────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },
            CoreError::Timeout => CliError::Timeout,
            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command_for(&entity_type).into(),
                resource_type: entity_type,
                identifier,
            },
            CoreError::NotConfigured { what } => CliError::NotConfigured { what },
            CoreError::Rejected { message, status } => CliError::Rejected { status, message },
            CoreError::UnexpectedResponse { message } => {
                CliError::UnexpectedResponse { message }
            }
            CoreError::Config { message } => CliError::Validation {
                field: "controller".into(),
                reason: message,
            },
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        CoreError::from(err).into()
    }
}

fn list_command_for(entity_type: &str) -> &'static str {
    match entity_type {
        "Device" => "devices list",
        "Interface" => "interfaces list <device>",
        _ => "objects list <kind>",
    }
}
