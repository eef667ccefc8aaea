#![allow(clippy::unwrap_used)]
// Integration tests for `ManagedFmc` against a mocked management center.

use std::time::Duration;

use chrono::Utc;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fmc_api::FmcClient;
use fmc_core::{
    ConfigurationStatus, DeploymentStatus, DesiredConfiguration, FtdvRegistration,
    InterfaceAddressing, InterfaceConfig, InterfaceStatus, ManagedFmc, ObjectRef, ProbePolicy,
    Reachability, RegistrationStatus, TokenGrant,
};

const DOMAIN: &str = "e276abec-e0f2-11e3-8169-6d9ed49b625f";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ManagedFmc) {
    let server = MockServer::start().await;
    let client = FmcClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        None,
    );
    (server, ManagedFmc::from_client(client))
}

/// A controller that already holds a valid injected token.
async fn setup_reachable() -> (MockServer, ManagedFmc) {
    let (server, mut fmc) = setup().await;
    let state = fmc
        .reach_with_token(TokenGrant::new("tok").with_issued_at(Utc::now()))
        .await;
    assert_eq!(state, Reachability::Available);
    (server, fmc)
}

fn config_path(suffix: &str) -> String {
    format!("/api/fmc_config/v1/domain/{DOMAIN}/{suffix}")
}

async fn mount_get(server: &MockServer, suffix: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(config_path(suffix)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn desired() -> DesiredConfiguration {
    DesiredConfiguration {
        device_group: Some("ftdv-group".into()),
        access_policy: Some("ftdv-acl".into()),
        nat_policy: Some("ftdv-nat".into()),
        security_zones: vec!["inside".into(), "outside".into()],
        network_objects: vec!["any-ipv4".into()],
        host_objects: vec!["gw1".into()],
    }
}

/// Mount a controller holding everything `desired()` names, with both
/// policies assigned to the device group.
async fn mount_full_configuration(server: &MockServer) {
    mount_get(
        server,
        "devicegroups/devicegrouprecords",
        json!({ "items": [{ "id": "dg-1", "name": "ftdv-group", "type": "DeviceGroup" }] }),
    )
    .await;
    mount_get(
        server,
        "policy/accesspolicies",
        json!({ "items": [{ "id": "ap-1", "name": "ftdv-acl", "type": "AccessPolicy" }] }),
    )
    .await;
    mount_get(
        server,
        "policy/ftdnatpolicies",
        json!({ "items": [{ "id": "nat-1", "name": "ftdv-nat", "type": "FTDNatPolicy" }] }),
    )
    .await;
    mount_get(
        server,
        "object/securityzones",
        json!({ "items": [
            { "id": "z-in", "name": "inside", "type": "SecurityZone" },
            { "id": "z-out", "name": "outside", "type": "SecurityZone" }
        ] }),
    )
    .await;
    mount_get(
        server,
        "object/networkaddresses",
        json!({ "items": [{ "id": "n-1", "name": "any-ipv4", "type": "Network" }] }),
    )
    .await;
    mount_get(
        server,
        "object/hosts",
        json!({ "items": [{ "id": "h-1", "name": "gw1", "type": "Host" }] }),
    )
    .await;
    for policy in ["ap-1", "nat-1"] {
        mount_get(
            server,
            &format!("assignment/policyassignments/{policy}"),
            json!({ "targets": [{ "id": "dg-1", "type": "DeviceGroup", "name": "ftdv-group" }] }),
        )
        .await;
    }
}

// ── Reachability ────────────────────────────────────────────────────

#[tokio::test]
async fn test_reach_failure_marks_unavailable() {
    let (server, mut fmc) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/fmc_platform/v1/auth/generatetoken"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // No credentials configured and the exchange is refused either way.
    assert_eq!(fmc.reach().await, Reachability::Unavailable);
}

#[tokio::test]
async fn test_verify_rejected_token_marks_unavailable() {
    let server = MockServer::start().await;
    let client = FmcClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        None,
    )
    .with_probe_policy(ProbePolicy {
        attempts: 2,
        delay: Duration::ZERO,
    });
    let mut fmc = ManagedFmc::from_client(client);
    fmc.reach_with_token(TokenGrant::new("revoked").with_issued_at(Utc::now()))
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/api/fmc_platform/v1/domain/{DOMAIN}/audit/auditrecords"
        )))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    assert_eq!(fmc.verify().await.unwrap(), Reachability::Unavailable);
    assert_eq!(fmc.reachability(), Reachability::Unavailable);
}

// ── Configuration check ─────────────────────────────────────────────

#[tokio::test]
async fn test_fully_present_configuration_is_configured() {
    let (server, mut fmc) = setup_reachable().await;
    mount_full_configuration(&server).await;

    fmc.set_desired(desired());
    fmc.resolve_configuration().await.unwrap();
    assert!(fmc.resolved().unresolved().is_empty());

    let status = fmc.check_configuration().await.unwrap();
    assert_eq!(status, ConfigurationStatus::Configured);
    assert_eq!(fmc.configuration_status(), Some(ConfigurationStatus::Configured));
}

#[tokio::test]
async fn test_report_snapshot() {
    let (server, mut fmc) = setup_reachable().await;
    mount_full_configuration(&server).await;

    fmc.set_desired(DesiredConfiguration {
        host_objects: vec!["gw1".into(), "gw2".into()],
        ..desired()
    });
    fmc.resolve_configuration().await.unwrap();
    fmc.check_configuration().await.unwrap();

    insta::assert_json_snapshot!(fmc.report(), @r#"
    {
      "reachability": "AVAILABLE",
      "device_group": {
        "name": "ftdv-group",
        "id": "dg-1"
      },
      "access_policy": {
        "name": "ftdv-acl",
        "id": "ap-1"
      },
      "nat_policy": {
        "name": "ftdv-nat",
        "id": "nat-1"
      },
      "security_zones": {
        "inside": "z-in",
        "outside": "z-out"
      },
      "network_objects": {
        "any-ipv4": "n-1"
      },
      "host_objects": {
        "gw1": "h-1",
        "gw2": null
      },
      "status": "UN-CONFIGURED"
    }
    "#);
}

#[tokio::test]
async fn test_missing_zone_is_unconfigured() {
    let (server, mut fmc) = setup_reachable().await;
    mount_full_configuration(&server).await;

    fmc.set_desired(DesiredConfiguration {
        security_zones: vec!["inside".into(), "dmz".into()],
        ..desired()
    });
    fmc.resolve_configuration().await.unwrap();
    assert_eq!(
        fmc.check_configuration().await.unwrap(),
        ConfigurationStatus::Unconfigured
    );
}

#[tokio::test]
async fn test_missing_device_group_is_unconfigured() {
    let (server, mut fmc) = setup_reachable().await;
    mount_full_configuration(&server).await;

    fmc.set_desired(DesiredConfiguration {
        device_group: Some("no-such-group".into()),
        ..desired()
    });
    fmc.resolve_configuration().await.unwrap();
    assert_eq!(
        fmc.check_configuration().await.unwrap(),
        ConfigurationStatus::Unconfigured
    );
}

#[tokio::test]
async fn test_missing_nat_policy_is_unconfigured() {
    let (server, mut fmc) = setup_reachable().await;
    mount_full_configuration(&server).await;

    fmc.set_desired(DesiredConfiguration {
        nat_policy: None,
        ..desired()
    });
    fmc.resolve_configuration().await.unwrap();
    assert_eq!(
        fmc.check_configuration().await.unwrap(),
        ConfigurationStatus::Unconfigured
    );
}

#[tokio::test]
async fn test_unassigned_policy_is_unconfigured() {
    let (server, mut fmc) = setup_reachable().await;

    // Same controller, but the access policy targets another group.
    Mock::given(method("GET"))
        .and(path(config_path("assignment/policyassignments/ap-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "targets": [{ "id": "dg-other", "type": "DeviceGroup", "name": "other" }]
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_full_configuration(&server).await;

    fmc.set_desired(desired());
    fmc.resolve_configuration().await.unwrap();
    assert_eq!(
        fmc.check_configuration().await.unwrap(),
        ConfigurationStatus::Unconfigured
    );
}

/// Resolve `wanted` against the full controller and expect UN-CONFIGURED.
async fn assert_unconfigured_with(wanted: DesiredConfiguration) {
    let (server, mut fmc) = setup_reachable().await;
    mount_full_configuration(&server).await;

    fmc.set_desired(wanted);
    fmc.resolve_configuration().await.unwrap();
    assert_eq!(
        fmc.check_configuration().await.unwrap(),
        ConfigurationStatus::Unconfigured
    );
}

#[tokio::test]
async fn test_unresolved_access_policy_is_unconfigured() {
    assert_unconfigured_with(DesiredConfiguration {
        access_policy: Some("no-such-acl".into()),
        ..desired()
    })
    .await;
}

#[tokio::test]
async fn test_unresolved_network_object_is_unconfigured() {
    assert_unconfigured_with(DesiredConfiguration {
        network_objects: vec!["any-ipv4".into(), "lab-net".into()],
        ..desired()
    })
    .await;
}

#[tokio::test]
async fn test_unresolved_host_object_is_unconfigured() {
    assert_unconfigured_with(DesiredConfiguration {
        host_objects: vec!["gw-missing".into()],
        ..desired()
    })
    .await;
}

#[tokio::test]
async fn test_unassigned_nat_policy_is_unconfigured() {
    let (server, mut fmc) = setup_reachable().await;

    // The access policy is assigned; the NAT policy targets another group.
    Mock::given(method("GET"))
        .and(path(config_path("assignment/policyassignments/nat-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "targets": [{ "id": "dg-other", "type": "DeviceGroup", "name": "other" }]
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_full_configuration(&server).await;

    fmc.set_desired(desired());
    fmc.resolve_configuration().await.unwrap();
    assert!(fmc.resolved().unresolved().is_empty());
    assert_eq!(
        fmc.check_configuration().await.unwrap(),
        ConfigurationStatus::Unconfigured
    );
}

#[tokio::test]
async fn test_unreachable_controller_is_unconfigured() {
    // Never reached: no request may go out.
    let (server, mut fmc) = setup().await;
    fmc.set_desired(desired());

    assert_eq!(fmc.reachability(), Reachability::Unavailable);
    assert_eq!(
        fmc.check_configuration().await.unwrap(),
        ConfigurationStatus::Unconfigured
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Deployment ──────────────────────────────────────────────────────

async fn mount_deployable(server: &MockServer) {
    mount_get(
        server,
        "deployment/deployabledevices",
        json!({ "items": [
            { "name": "fw-a", "type": "DeployableDevice" },
            { "name": "fw-b", "type": "DeployableDevice" }
        ] }),
    )
    .await;
}

#[tokio::test]
async fn test_check_deploy_status() {
    let (server, fmc) = setup_reachable().await;
    mount_deployable(&server).await;

    assert_eq!(fmc.check_deploy_status("fw-a").await, DeploymentStatus::NotDeployed);
    assert_eq!(fmc.check_deploy_status("fw-c").await, DeploymentStatus::Deployed);
}

#[tokio::test]
async fn test_check_deploy_status_not_known_on_failure() {
    let (server, fmc) = setup_reachable().await;

    Mock::given(method("GET"))
        .and(path(config_path("deployment/deployabledevices")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert_eq!(fmc.check_deploy_status("fw-a").await, DeploymentStatus::NotKnown);
}

#[tokio::test]
async fn test_start_deployment_skips_devices_without_changes() {
    let (server, fmc) = setup_reachable().await;
    mount_deployable(&server).await;

    Mock::given(method("POST"))
        .and(path(config_path("deployment/deploymentrequests")))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(fmc.start_deployment("fw-c").await.unwrap(), None);
}

#[tokio::test]
async fn test_start_deployment_returns_task() {
    let (server, fmc) = setup_reachable().await;
    mount_deployable(&server).await;
    mount_get(
        &server,
        "devices/devicerecords",
        json!({ "items": [{ "id": "d-a", "name": "fw-a", "type": "Device" }] }),
    )
    .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/api/fmc_platform/v1/domain/{DOMAIN}/audit/auditrecords"
        )))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": [{ "time": 1_700_000_000 }] })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(config_path("deployment/deploymentrequests")))
        .and(body_partial_json(json!({
            "version": "1700000000000",
            "deviceList": ["d-a"]
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "type": "DeploymentRequest",
            "metadata": { "task": { "id": "task-1" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(
        fmc.start_deployment("fw-a").await.unwrap().as_deref(),
        Some("task-1")
    );
}

// ── Registration ────────────────────────────────────────────────────

fn ftdv() -> FtdvRegistration {
    FtdvRegistration {
        name: "fw-a".into(),
        mgmt_ip: "10.0.0.5".into(),
        reg_key: "reg".into(),
        nat_id: "nat".into(),
        license_caps: vec!["BASE".into(), "THREAT".into()],
        performance_tier: "FTDv30".into(),
    }
}

#[tokio::test]
async fn test_register_ftdv_requires_resolved_configuration() {
    let (_server, fmc) = setup_reachable().await;
    let err = fmc.register_ftdv(&ftdv()).await.unwrap_err();
    assert!(matches!(err, fmc_core::CoreError::NotConfigured { .. }));
}

#[tokio::test]
async fn test_register_ftdv_uses_resolved_ids() {
    let (server, mut fmc) = setup_reachable().await;
    mount_full_configuration(&server).await;
    fmc.set_desired(desired());
    fmc.resolve_configuration().await.unwrap();

    Mock::given(method("POST"))
        .and(path(config_path("devices/devicerecords")))
        .and(body_partial_json(json!({
            "name": "fw-a",
            "accessPolicy": { "id": "ap-1", "type": "AccessPolicy" },
            "deviceGroup": { "id": "dg-1", "type": "DeviceGroup" }
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "type": "Device",
            "metadata": { "task": { "id": "reg-task" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(
        fmc.register_ftdv(&ftdv()).await.unwrap().as_deref(),
        Some("reg-task")
    );
}

#[tokio::test]
async fn test_registration_status() {
    let (server, fmc) = setup_reachable().await;
    mount_get(
        &server,
        "devices/devicerecords",
        json!({ "items": [{ "id": "d-a", "name": "fw-a", "type": "Device" }] }),
    )
    .await;

    assert_eq!(
        fmc.registration_status("fw-a").await.unwrap(),
        RegistrationStatus::Success
    );
    assert_eq!(
        fmc.registration_status("fw-b").await.unwrap(),
        RegistrationStatus::Failed
    );
}

// ── Static routes ───────────────────────────────────────────────────

async fn assert_route_gateway(gateway: &str, expected: Value) {
    let (server, fmc) = setup_reachable().await;
    mount_get(
        &server,
        "object/hosts",
        json!({ "items": [{ "id": "h-1", "name": "gw1", "type": "Host" }] }),
    )
    .await;

    Mock::given(method("POST"))
        .and(path(config_path(
            "devices/devicerecords/d-1/routing/ipv4staticroutes",
        )))
        .and(body_partial_json(json!({
            "interfaceName": "outside",
            "selectedNetworks": [{ "id": "n-1", "type": "Network", "name": "any-ipv4" }],
            "gateway": expected,
            "metricValue": 1
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "r-1" })))
        .expect(1)
        .mount(&server)
        .await;

    fmc.configure_static_route(
        "d-1",
        "outside",
        ObjectRef::named("n-1", "Network", "any-ipv4"),
        gateway,
        1,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_route_gateway_is_host_object_when_known() {
    assert_route_gateway(
        "gw1",
        json!({ "object": { "type": "Host", "id": "h-1", "name": "gw1" } }),
    )
    .await;
}

#[tokio::test]
async fn test_route_gateway_is_literal_otherwise() {
    assert_route_gateway(
        "10.0.0.1",
        json!({ "literal": { "type": "Host", "value": "10.0.0.1" } }),
    )
    .await;
}

#[tokio::test]
async fn test_static_route_status() {
    let (server, fmc) = setup_reachable().await;
    let routes = "devices/devicerecords/d-1/routing/ipv4staticroutes";
    mount_get(&server, routes, json!({ "items": [{ "id": "r-1" }] })).await;
    mount_get(
        &server,
        &format!("{routes}/r-1"),
        json!({
            "id": "r-1",
            "interfaceName": "outside",
            "selectedNetworks": [{ "id": "n-1", "name": "any-ipv4", "type": "Network" }],
            "gateway": { "literal": { "type": "Host", "value": "10.0.0.1" } }
        }),
    )
    .await;

    assert_eq!(
        fmc.static_route_status("d-1", "outside", "any-ipv4", "10.0.0.1")
            .await
            .unwrap(),
        ConfigurationStatus::Configured
    );
    assert_eq!(
        fmc.static_route_status("d-1", "inside", "any-ipv4", "10.0.0.1")
            .await
            .unwrap(),
        ConfigurationStatus::Unconfigured
    );
}

// ── Interfaces ──────────────────────────────────────────────────────

fn expected_inside() -> InterfaceConfig {
    InterfaceConfig {
        device_id: "d-1".into(),
        nic_id: "nic-1".into(),
        name: "GigabitEthernet0/1".into(),
        ifname: "inside".into(),
        management_only: false,
        mode: "NONE".into(),
        zone_id: "z-in".into(),
        mtu: 1500,
        addressing: InterfaceAddressing::Static {
            address: "10.0.1.10".into(),
            netmask: "255.255.255.0".into(),
        },
    }
}

#[tokio::test]
async fn test_interface_status_configured() {
    let (server, fmc) = setup_reachable().await;
    mount_get(
        &server,
        "devices/devicerecords/d-1/physicalinterfaces/nic-1",
        json!({
            "id": "nic-1",
            "name": "GigabitEthernet0/1",
            "ifname": "inside",
            "ipv4": { "static": { "address": "10.0.1.10", "netmask": "24" } },
            "securityZone": { "id": "z-in", "type": "SecurityZone" }
        }),
    )
    .await;

    let assessment = fmc.interface_status(&expected_inside()).await.unwrap();
    assert_eq!(assessment.status(), InterfaceStatus::Configured);
}

#[tokio::test]
async fn test_interface_status_half_match_is_unconfigured() {
    let (server, fmc) = setup_reachable().await;
    mount_get(
        &server,
        "devices/devicerecords/d-1/physicalinterfaces/nic-1",
        json!({
            "id": "nic-1",
            "name": "GigabitEthernet0/1",
            "ifname": "inside",
            "ipv4": { "dhcp": { "enableDefaultRouteDHCP": false, "dhcpRouteMetric": 1 } },
            "securityZone": { "id": "z-in", "type": "SecurityZone" }
        }),
    )
    .await;

    let assessment = fmc.interface_status(&expected_inside()).await.unwrap();
    assert!(assessment.is_misconfigured());
    assert_eq!(assessment.status(), InterfaceStatus::Unconfigured);
}
