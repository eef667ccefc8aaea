//! `status`: reach the controller, resolve every desired name, and report
//! whether the controller holds the configuration devices depend on.

use tabled::Tabled;

use fmc_core::{ConfigurationReport, ConfigurationStatus, ManagedFmc, Reachability};

use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ResolvedRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn rows(report: &ConfigurationReport) -> Vec<ResolvedRow> {
    let r = &report.resolved;
    let row = |kind, name: &str, id: Option<&str>| ResolvedRow {
        kind,
        name: name.to_owned(),
        id: id.unwrap_or("-").to_owned(),
    };

    let mut rows: Vec<ResolvedRow> = [
        ("device group", &r.device_group),
        ("access policy", &r.access_policy),
        ("NAT policy", &r.nat_policy),
    ]
    .into_iter()
    .filter_map(|(kind, resolved)| {
        resolved
            .as_ref()
            .map(|res| row(kind, &res.name, res.id()))
    })
    .collect();

    for (kind, map) in [
        ("security zone", &r.security_zones),
        ("network object", &r.network_objects),
        ("host object", &r.host_objects),
    ] {
        rows.extend(
            map.iter()
                .map(|(name, id)| row(kind, name, id.as_deref())),
        );
    }
    rows
}

fn detail(report: &ConfigurationReport, color: bool) -> String {
    let status = report.status.unwrap_or_default();
    let mut out = format!(
        "Controller:    {}\nConfiguration: {}",
        output::paint_status(
            &report.reachability.to_string(),
            report.reachability == Reachability::Available,
            color,
        ),
        output::paint_status(
            &status.to_string(),
            status == ConfigurationStatus::Configured,
            color,
        ),
    );

    let rows = rows(report);
    if !rows.is_empty() {
        out.push_str("\n\n");
        out.push_str(
            &tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string(),
        );
    }
    let missing = report.resolved.unresolved();
    if !missing.is_empty() {
        out.push_str("\n\nMissing: ");
        out.push_str(&missing.join(", "));
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    fmc: &mut ManagedFmc,
    args: StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if fmc.reachability() != Reachability::Available {
        fmc.reach().await;
    }
    if args.verify && fmc.reachability() == Reachability::Available {
        fmc.verify().await?;
    }
    if fmc.reachability() == Reachability::Available {
        fmc.resolve_configuration().await?;
    }
    fmc.check_configuration().await?;

    let report = fmc.report();
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| detail(r, color),
        |r| r.status.unwrap_or_default().to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
