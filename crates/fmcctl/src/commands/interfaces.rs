//! Interface command handlers.

use serde::Serialize;
use tabled::Tabled;

use fmc_core::{InterfaceAddressing, InterfaceConfig, InterfaceStatus, ManagedFmc, NamedObject};

use crate::cli::{GlobalOpts, InterfaceSpec, InterfacesArgs, InterfacesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Serialize)]
struct InterfaceReport {
    interface: String,
    status: InterfaceStatus,
    addressing_matches: bool,
    identity_matches: bool,
    misconfigured: bool,
}

/// Resolve names in `spec` to ids and pair them with `addressing`.
async fn expected_config(
    fmc: &ManagedFmc,
    spec: InterfaceSpec,
    addressing: InterfaceAddressing,
) -> Result<InterfaceConfig, CliError> {
    let device_id = util::device_id(fmc, &spec.device).await?;
    let nic_id = util::interface_id(fmc, &device_id, &spec.interface).await?;
    let zone_id = util::zone_id(fmc, &spec.zone).await?;
    Ok(InterfaceConfig {
        device_id,
        nic_id,
        name: spec.interface,
        ifname: spec.ifname,
        management_only: spec.management_only,
        mode: spec.mode,
        zone_id,
        mtu: spec.mtu,
        addressing,
    })
}

async fn configure(
    fmc: &ManagedFmc,
    spec: InterfaceSpec,
    addressing: InterfaceAddressing,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let config = expected_config(fmc, spec, addressing).await?;
    fmc.configure_interface(&config).await?;
    if !global.quiet {
        eprintln!("Interface {} configured as '{}'", config.name, config.ifname);
    }
    Ok(())
}

pub async fn handle(
    fmc: &mut ManagedFmc,
    args: InterfacesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        InterfacesCommand::List { device } => {
            let device_id = util::device_id(fmc, &device).await?;
            let interfaces = fmc.client().list_interfaces(&device_id).await?;
            let out = output::render_list(
                &global.output,
                &interfaces,
                |i: &NamedObject| InterfaceRow {
                    id: i.id.clone(),
                    name: i.name.clone(),
                },
                |i| i.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InterfacesCommand::ConfigureDhcp(spec) => {
            configure(fmc, spec, InterfaceAddressing::Dhcp, global).await
        }

        InterfacesCommand::ConfigureStatic { spec, address } => {
            let addressing = InterfaceAddressing::Static {
                address: address.address,
                netmask: address.netmask,
            };
            configure(fmc, spec, addressing, global).await
        }

        InterfacesCommand::Status {
            spec,
            address,
            netmask,
        } => {
            let addressing = match address {
                Some(address) => InterfaceAddressing::Static { address, netmask },
                None => InterfaceAddressing::Dhcp,
            };
            let expected = expected_config(fmc, spec, addressing).await?;
            let assessment = fmc.interface_status(&expected).await?;

            let report = InterfaceReport {
                interface: expected.name,
                status: assessment.status(),
                addressing_matches: assessment.addressing_matches,
                identity_matches: assessment.identity_matches,
                misconfigured: assessment.is_misconfigured(),
            };
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &report,
                |r| {
                    let mut line = format!(
                        "{}: {}",
                        r.interface,
                        output::paint_status(
                            &r.status.to_string(),
                            r.status == InterfaceStatus::Configured,
                            color,
                        )
                    );
                    if r.misconfigured {
                        line.push_str(if r.addressing_matches {
                            " (addressing matches, name or zone differs)"
                        } else {
                            " (name and zone match, addressing differs)"
                        });
                    }
                    line
                },
                |r| r.status.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
