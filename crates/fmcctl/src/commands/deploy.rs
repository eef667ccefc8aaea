//! Deployment handlers.

use serde::Serialize;
use tabled::Tabled;

use fmc_core::{DeploymentStatus, ManagedFmc};

use crate::cli::{DeployArgs, DeployCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeployableRow {
    #[tabled(rename = "Device")]
    name: String,
}

#[derive(Serialize)]
struct DeployOutcome<'a> {
    device: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<DeploymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<String>,
}

pub async fn handle(
    fmc: &mut ManagedFmc,
    args: DeployArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DeployCommand::Start { device } => {
            let task = fmc.start_deployment(&device).await?;
            let outcome = DeployOutcome {
                device: &device,
                status: None,
                task,
            };
            let out = output::render_single(
                &global.output,
                &outcome,
                |o| match &o.task {
                    Some(task) => format!("{}: deployment started (task {task})", o.device),
                    None => format!("{}: nothing to deploy", o.device),
                },
                |o| o.task.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DeployCommand::Status { device } => {
            let status = fmc.check_deploy_status(&device).await;
            let outcome = DeployOutcome {
                device: &device,
                status: Some(status),
                task: None,
            };
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &outcome,
                |o| {
                    format!(
                        "{}: {}",
                        o.device,
                        output::paint_status(
                            &status.to_string(),
                            status == DeploymentStatus::Deployed,
                            color,
                        )
                    )
                },
                |_| status.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DeployCommand::Deployable => {
            let pending = fmc.client().deployable_devices().await?;
            let out = output::render_list(
                &global.output,
                &pending,
                |name| DeployableRow { name: name.clone() },
                Clone::clone,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
