//! Shared helpers for command handlers.

use fmc_core::{CoreError, ManagedFmc, ObjectRef};

use crate::error::CliError;

/// Resolve a device name to its id.
pub async fn device_id(fmc: &ManagedFmc, name: &str) -> Result<String, CliError> {
    fmc.client()
        .device_id(name)
        .await?
        .ok_or_else(|| CoreError::not_found("Device", name).into())
}

/// Resolve a security zone name to its id.
pub async fn zone_id(fmc: &ManagedFmc, name: &str) -> Result<String, CliError> {
    fmc.client()
        .security_zone_id(name)
        .await?
        .ok_or_else(|| CoreError::not_found("SecurityZone", name).into())
}

/// Resolve a hardware interface name on a device to its id.
pub async fn interface_id(
    fmc: &ManagedFmc,
    device_id: &str,
    name: &str,
) -> Result<String, CliError> {
    fmc.client()
        .interface_id(device_id, name)
        .await?
        .ok_or_else(|| CoreError::not_found("Interface", name).into())
}

/// A route destination: a network object of that name, else a host object.
pub async fn destination_ref(fmc: &ManagedFmc, name: &str) -> Result<ObjectRef, CliError> {
    let client = fmc.client();
    if let Some(id) = client.network_object_id(name).await? {
        return Ok(ObjectRef::named(id, "Network", name));
    }
    if let Some(id) = client.host_object_id(name).await? {
        return Ok(ObjectRef::named(id, "Host", name));
    }
    Err(CoreError::not_found("Network", name).into())
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
