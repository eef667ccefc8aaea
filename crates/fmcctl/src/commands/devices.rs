//! Device command handlers.

use serde::Serialize;
use tabled::Tabled;

use fmc_core::{CoreError, FtdvRegistration, ManagedFmc, NamedObject};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts, RegisterArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
}

impl From<&NamedObject> for DeviceRow {
    fn from(d: &NamedObject) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            kind: d.kind.clone(),
        }
    }
}

#[derive(Serialize)]
struct Outcome<'a> {
    device: &'a str,
    status: String,
}

fn render_outcome(global: &GlobalOpts, outcome: &Outcome<'_>) {
    let out = output::render_single(
        &global.output,
        outcome,
        |o| format!("{}: {}", o.device, o.status),
        |o| o.status.clone(),
    );
    output::print_output(&out, global.quiet);
}

fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    fmc: &mut ManagedFmc,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List => {
            let devices = fmc.client().list_devices().await?;
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Show { device } => {
            let id = util::device_id(fmc, &device).await?;
            let record = fmc.client().get_device(&id).await?;
            let out = output::render_single(&global.output, &record, pretty_json, |_| id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Register(args) => register(fmc, args, global).await,

        DevicesCommand::Deregister { device } => {
            if !util::confirm(&format!("Deregister device '{device}'?"), global.yes)? {
                return Ok(());
            }
            let removed = fmc.deregister(&device).await?;
            if !removed {
                return Err(CoreError::not_found("Device", &device).into());
            }
            if !global.quiet {
                eprintln!("Device '{device}' deregistered");
            }
            Ok(())
        }

        DevicesCommand::Members { group } => {
            let group = group
                .or_else(|| fmc.desired().device_group.clone())
                .ok_or_else(|| CliError::NotConfigured {
                    what: "device group".into(),
                })?;
            let group_id = fmc
                .client()
                .device_group_id(&group)
                .await?
                .ok_or_else(|| CliError::from(CoreError::not_found("DeviceGroup", &group)))?;
            let members = fmc.device_group_members(&group_id).await?;
            let out = output::render_list(
                &global.output,
                &members,
                |d| DeviceRow::from(d),
                |d| d.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::RegStatus { device } => {
            let status = fmc.registration_status(&device).await?;
            render_outcome(
                global,
                &Outcome {
                    device: &device,
                    status: status.to_string(),
                },
            );
            Ok(())
        }

        DevicesCommand::Metrics { device } => {
            let id = util::device_id(fmc, &device).await?;
            let metrics = fmc.memory_metrics(&id).await?;
            let out = output::render_single(&global.output, &metrics, pretty_json, pretty_json);
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

/// Resolve the profile's configuration, then register into its device
/// group under its access policy.
async fn register(
    fmc: &mut ManagedFmc,
    args: RegisterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    fmc.resolve_configuration().await?;

    let request = FtdvRegistration {
        name: args.name,
        mgmt_ip: args.mgmt_ip,
        reg_key: args.reg_key,
        nat_id: args.nat_id,
        license_caps: args.license_caps,
        performance_tier: args.performance_tier,
    };
    let task = fmc.register_ftdv(&request).await?;
    render_outcome(
        global,
        &Outcome {
            device: &request.name,
            status: task.map_or_else(
                || "registration accepted (no task)".into(),
                |task| format!("registration started (task {task})"),
            ),
        },
    );
    Ok(())
}
