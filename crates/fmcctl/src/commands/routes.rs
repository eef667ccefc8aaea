//! Static route handlers.

use serde::Serialize;
use tabled::Tabled;

use fmc_core::{ManagedFmc, NamedObject};

use crate::cli::{GlobalOpts, RoutesArgs, RoutesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Serialize)]
struct RouteStatus<'a> {
    device: &'a str,
    network: &'a str,
    gateway: &'a str,
    status: String,
}

pub async fn handle(
    fmc: &mut ManagedFmc,
    args: RoutesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RoutesCommand::List { device } => {
            let device_id = util::device_id(fmc, &device).await?;
            let routes = fmc.client().list_static_routes(&device_id).await?;
            let out = output::render_list(
                &global.output,
                &routes,
                |r: &NamedObject| RouteRow {
                    id: r.id.clone(),
                    name: r.name.clone(),
                },
                |r| r.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RoutesCommand::Create { route, metric } => {
            let device_id = util::device_id(fmc, &route.device).await?;
            let destination = util::destination_ref(fmc, &route.network).await?;
            let created = fmc
                .configure_static_route(
                    &device_id,
                    &route.interface,
                    destination,
                    &route.gateway,
                    metric,
                )
                .await?;
            let out = output::render_single(
                &global.output,
                &created,
                |c| {
                    format!(
                        "Route to {} via {} created ({})",
                        route.network,
                        route.gateway,
                        c["id"].as_str().unwrap_or("-")
                    )
                },
                |c| c["id"].as_str().unwrap_or_default().to_owned(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RoutesCommand::Check { route } => {
            let device_id = util::device_id(fmc, &route.device).await?;
            let status = fmc
                .static_route_status(&device_id, &route.interface, &route.network, &route.gateway)
                .await?;
            let report = RouteStatus {
                device: &route.device,
                network: &route.network,
                gateway: &route.gateway,
                status: status.to_string(),
            };
            let out = output::render_single(
                &global.output,
                &report,
                |r| format!("{} -> {} via {}: {}", r.device, r.network, r.gateway, r.status),
                |r| r.status.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
