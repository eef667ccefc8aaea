// Wire types for the FMC configuration API
//
// Responses are deserialized leniently: only the fields the client reads
// are modelled, everything else is ignored. Request bodies are full
// representations as the controller expects them on create/update.

use serde::{Deserialize, Serialize};

// ── Collections ─────────────────────────────────────────────────────

/// Paged collection envelope. The controller omits `items` entirely when
/// a collection is empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Any named, typed object in a collection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedObject {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Reference to another object by id and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ObjectRef {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: None,
        }
    }

    pub fn named(id: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: Some(name.into()),
        }
    }
}

/// Device group detail, `devicegroups/devicegrouprecords/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceGroupRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<NamedObject>,
}

/// `assignment/policyassignments/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyAssignment {
    #[serde(default)]
    pub targets: Vec<NamedObject>,
}

// ── Created resources ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskRef {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceMetadata {
    #[serde(default)]
    pub task: Option<TaskRef>,
}

/// Response to an asynchronous create (registration, deployment): the
/// resource type plus the controller task tracking it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedResource {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: Option<ResourceMetadata>,
}

impl CreatedResource {
    /// The task id, but only when the response is of the expected type.
    pub fn task_id_if(&self, kind: &str) -> Option<&str> {
        if self.kind.as_deref() != Some(kind) {
            return None;
        }
        self.metadata
            .as_ref()?
            .task
            .as_ref()?
            .id
            .as_deref()
    }
}

// ── Device registration ─────────────────────────────────────────────

/// Registration inputs for a managed firewall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRegistration {
    pub name: String,
    pub host_name: String,
    pub reg_key: String,
    pub nat_id: String,
    pub license_caps: Vec<String>,
    pub performance_tier: String,
    pub access_policy_id: String,
    pub device_group_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeviceRecordRequest<'a> {
    pub name: &'a str,
    pub host_name: &'a str,
    pub reg_key: &'a str,
    #[serde(rename = "natID")]
    pub nat_id: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "license_caps")]
    pub license_caps: &'a [String],
    pub performance_tier: &'a str,
    pub access_policy: ObjectRef,
    pub device_group: ObjectRef,
}

impl<'a> From<&'a DeviceRegistration> for DeviceRecordRequest<'a> {
    fn from(reg: &'a DeviceRegistration) -> Self {
        Self {
            name: &reg.name,
            host_name: &reg.host_name,
            reg_key: &reg.reg_key,
            nat_id: &reg.nat_id,
            kind: "Device",
            license_caps: &reg.license_caps,
            performance_tier: &reg.performance_tier,
            access_policy: ObjectRef::new(&reg.access_policy_id, "AccessPolicy"),
            device_group: ObjectRef::new(&reg.device_group_id, "DeviceGroup"),
        }
    }
}

// ── Physical interfaces ─────────────────────────────────────────────

/// How an interface gets its IPv4 address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceAddressing {
    Dhcp,
    Static { address: String, netmask: String },
}

/// Desired configuration of one physical interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceConfig {
    pub device_id: String,
    pub nic_id: String,
    /// Hardware name, e.g. `GigabitEthernet0/0`.
    pub name: String,
    /// Logical name used by policies and routes, e.g. `outside`.
    pub ifname: String,
    pub management_only: bool,
    /// Interface mode, usually `NONE` for routed interfaces.
    pub mode: String,
    pub zone_id: String,
    pub mtu: u32,
    pub addressing: InterfaceAddressing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhcpAddressing {
    #[serde(default, rename = "enableDefaultRouteDHCP")]
    pub enable_default_route_dhcp: bool,
    #[serde(default)]
    pub dhcp_route_metric: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAddressing {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub netmask: String,
}

/// The `ipv4` block of an interface. Exactly one of the two is set on a
/// configured interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dhcp: Option<DhcpAddressing>,
    #[serde(rename = "static", default, skip_serializing_if = "Option::is_none")]
    pub static_addr: Option<StaticAddressing>,
}

/// `devices/devicerecords/{id}/physicalinterfaces/{nic}` as read back.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalInterface {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ifname: Option<String>,
    #[serde(default)]
    pub ipv4: Option<Ipv4Block>,
    #[serde(default)]
    pub security_zone: Option<NamedObject>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(rename = "MTU", default)]
    pub mtu: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PhysicalInterfaceUpdate<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub management_only: bool,
    #[serde(rename = "MTU")]
    pub mtu: u32,
    pub ipv4: Ipv4Block,
    pub security_zone: ObjectRef,
    pub mode: &'a str,
    pub ifname: &'a str,
    pub enabled: bool,
    pub name: &'a str,
    pub id: &'a str,
}

impl<'a> From<&'a InterfaceConfig> for PhysicalInterfaceUpdate<'a> {
    fn from(cfg: &'a InterfaceConfig) -> Self {
        let ipv4 = match &cfg.addressing {
            InterfaceAddressing::Dhcp => Ipv4Block {
                dhcp: Some(DhcpAddressing {
                    enable_default_route_dhcp: false,
                    dhcp_route_metric: 1,
                }),
                static_addr: None,
            },
            InterfaceAddressing::Static { address, netmask } => Ipv4Block {
                dhcp: None,
                static_addr: Some(StaticAddressing {
                    address: address.clone(),
                    netmask: netmask.clone(),
                }),
            },
        };
        Self {
            kind: "PhysicalInterface",
            management_only: cfg.management_only,
            mtu: cfg.mtu,
            ipv4,
            security_zone: ObjectRef::new(&cfg.zone_id, "SecurityZone"),
            mode: &cfg.mode,
            ifname: &cfg.ifname,
            enabled: true,
            name: &cfg.name,
            id: &cfg.nic_id,
        }
    }
}

// ── Static routes ───────────────────────────────────────────────────

/// Next hop of a static route: a host object reference, or a literal
/// address when no host object of that name exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gateway {
    Object(GatewayObject),
    Literal(GatewayLiteral),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayLiteral {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Gateway {
    pub fn host_object(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Object(GatewayObject {
            kind: "Host".into(),
            id: id.into(),
            name: name.into(),
        })
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(GatewayLiteral {
            kind: "Host".into(),
            value: value.into(),
        })
    }

    /// The name or address this gateway was declared with.
    pub fn label(&self) -> &str {
        match self {
            Self::Object(o) => &o.name,
            Self::Literal(l) => &l.value,
        }
    }
}

/// Desired static route on a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRoute {
    pub device_id: String,
    pub interface_name: String,
    /// Destination network object (a `Network` or `Host`).
    pub destination: ObjectRef,
    pub gateway: Gateway,
    pub metric: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StaticRouteRequest<'a> {
    pub interface_name: &'a str,
    pub selected_networks: [&'a ObjectRef; 1],
    pub gateway: &'a Gateway,
    pub metric_value: u32,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub is_tunneled: bool,
}

impl<'a> From<&'a StaticRoute> for StaticRouteRequest<'a> {
    fn from(route: &'a StaticRoute) -> Self {
        Self {
            interface_name: &route.interface_name,
            selected_networks: [&route.destination],
            gateway: &route.gateway,
            metric_value: route.metric,
            kind: "IPv4StaticRoute",
            is_tunneled: false,
        }
    }
}

/// Lenient view of a gateway as read back. Either side may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayView {
    #[serde(default)]
    pub object: Option<NamedObject>,
    #[serde(default)]
    pub literal: Option<LiteralView>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiteralView {
    #[serde(default)]
    pub value: String,
}

impl GatewayView {
    /// Whether this gateway is the object named, or the literal value, `label`.
    pub fn matches(&self, label: &str) -> bool {
        self.object.as_ref().is_some_and(|o| o.name == label)
            || self.literal.as_ref().is_some_and(|l| l.value == label)
    }
}

/// `devices/devicerecords/{id}/routing/ipv4staticroutes/{route}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticRouteDetail {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub interface_name: String,
    #[serde(default)]
    pub selected_networks: Vec<NamedObject>,
    #[serde(default)]
    pub gateway: Option<GatewayView>,
    #[serde(default)]
    pub metric_value: Option<u32>,
}

impl StaticRouteDetail {
    /// Whether this route sends `network` out `interface` via `gateway`.
    pub fn matches(&self, interface: &str, network: &str, gateway: &str) -> bool {
        self.interface_name == interface
            && self.selected_networks.iter().any(|n| n.name == network)
            && self.gateway.as_ref().is_some_and(|g| g.matches(gateway))
    }
}

// ── Deployment ──────────────────────────────────────────────────────

/// `deployment/deploymentrequests` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRequest {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Latest audit timestamp in milliseconds, as a decimal string.
    pub version: String,
    pub force_deploy: bool,
    pub ignore_warning: bool,
    pub device_list: Vec<String>,
}

impl DeploymentRequest {
    /// Forced deployment to `device_ids`, ignoring warnings.
    pub fn forced(device_ids: Vec<String>, version_ms: i64) -> Self {
        Self {
            kind: "DeploymentRequest",
            version: version_ms.to_string(),
            force_deploy: true,
            ignore_warning: true,
            device_list: device_ids,
        }
    }
}

/// One entry of `audit/auditrecords`. `time` is epoch seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditRecord {
    pub time: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn interface(addressing: InterfaceAddressing) -> InterfaceConfig {
        InterfaceConfig {
            device_id: "dev-1".into(),
            nic_id: "nic-1".into(),
            name: "GigabitEthernet0/0".into(),
            ifname: "outside".into(),
            management_only: false,
            mode: "NONE".into(),
            zone_id: "zone-1".into(),
            mtu: 1500,
            addressing,
        }
    }

    #[test]
    fn missing_items_is_empty_collection() {
        let c: Collection<NamedObject> = serde_json::from_value(json!({"paging": {}})).unwrap();
        assert!(c.items.is_empty());
    }

    #[test]
    fn dhcp_interface_body() {
        let cfg = interface(InterfaceAddressing::Dhcp);
        let body = serde_json::to_value(PhysicalInterfaceUpdate::from(&cfg)).unwrap();
        assert_eq!(
            body,
            json!({
                "type": "PhysicalInterface",
                "managementOnly": false,
                "MTU": 1500,
                "ipv4": { "dhcp": { "enableDefaultRouteDHCP": false, "dhcpRouteMetric": 1 } },
                "securityZone": { "id": "zone-1", "type": "SecurityZone" },
                "mode": "NONE",
                "ifname": "outside",
                "enabled": true,
                "name": "GigabitEthernet0/0",
                "id": "nic-1"
            })
        );
    }

    #[test]
    fn dhcp_block_reads_controller_field_name() {
        let nic: PhysicalInterface = serde_json::from_value(json!({
            "id": "nic-1",
            "name": "GigabitEthernet0/0",
            "ipv4": { "dhcp": { "enableDefaultRouteDHCP": true, "dhcpRouteMetric": 5 } }
        }))
        .unwrap();
        let dhcp = nic.ipv4.unwrap().dhcp.unwrap();
        assert!(dhcp.enable_default_route_dhcp);
        assert_eq!(dhcp.dhcp_route_metric, 5);
    }

    #[test]
    fn static_interface_body() {
        let cfg = interface(InterfaceAddressing::Static {
            address: "10.0.1.10".into(),
            netmask: "255.255.255.0".into(),
        });
        let body = serde_json::to_value(PhysicalInterfaceUpdate::from(&cfg)).unwrap();
        assert_eq!(
            body["ipv4"],
            json!({ "static": { "address": "10.0.1.10", "netmask": "255.255.255.0" } })
        );
    }

    #[test]
    fn gateway_serializes_externally_tagged() {
        assert_eq!(
            serde_json::to_value(Gateway::host_object("h-1", "gw1")).unwrap(),
            json!({ "object": { "type": "Host", "id": "h-1", "name": "gw1" } })
        );
        assert_eq!(
            serde_json::to_value(Gateway::literal("10.0.0.1")).unwrap(),
            json!({ "literal": { "type": "Host", "value": "10.0.0.1" } })
        );
    }

    #[test]
    fn static_route_body() {
        let route = StaticRoute {
            device_id: "dev-1".into(),
            interface_name: "outside".into(),
            destination: ObjectRef::named("net-1", "Network", "any-ipv4"),
            gateway: Gateway::literal("10.0.0.1"),
            metric: 1,
        };
        let body = serde_json::to_value(StaticRouteRequest::from(&route)).unwrap();
        assert_eq!(
            body,
            json!({
                "interfaceName": "outside",
                "selectedNetworks": [{ "id": "net-1", "type": "Network", "name": "any-ipv4" }],
                "gateway": { "literal": { "type": "Host", "value": "10.0.0.1" } },
                "metricValue": 1,
                "type": "IPv4StaticRoute",
                "isTunneled": false
            })
        );
    }

    #[test]
    fn registration_body() {
        let reg = DeviceRegistration {
            name: "fw-a".into(),
            host_name: "10.0.0.5".into(),
            reg_key: "cisco123".into(),
            nat_id: "nat123".into(),
            license_caps: vec!["BASE".into(), "THREAT".into()],
            performance_tier: "FTDv30".into(),
            access_policy_id: "ap-1".into(),
            device_group_id: "dg-1".into(),
        };
        let body = serde_json::to_value(DeviceRecordRequest::from(&reg)).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "fw-a",
                "hostName": "10.0.0.5",
                "regKey": "cisco123",
                "natID": "nat123",
                "type": "Device",
                "license_caps": ["BASE", "THREAT"],
                "performanceTier": "FTDv30",
                "accessPolicy": { "id": "ap-1", "type": "AccessPolicy" },
                "deviceGroup": { "id": "dg-1", "type": "DeviceGroup" }
            })
        );
    }

    #[test]
    fn deployment_body() {
        let req = DeploymentRequest::forced(vec!["dev-1".into()], 1_700_000_000_000);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "type": "DeploymentRequest",
                "version": "1700000000000",
                "forceDeploy": true,
                "ignoreWarning": true,
                "deviceList": ["dev-1"]
            })
        );
    }

    #[test]
    fn task_id_requires_matching_type() {
        let created: CreatedResource = serde_json::from_value(json!({
            "type": "Device",
            "metadata": { "task": { "id": "task-42" } }
        }))
        .unwrap();
        assert_eq!(created.task_id_if("Device"), Some("task-42"));
        assert_eq!(created.task_id_if("DeploymentRequest"), None);

        let bare: CreatedResource = serde_json::from_value(json!({ "type": "Device" })).unwrap();
        assert_eq!(bare.task_id_if("Device"), None);
    }

    #[test]
    fn route_detail_matches_object_or_literal_gateway() {
        let by_object: StaticRouteDetail = serde_json::from_value(json!({
            "interfaceName": "outside",
            "selectedNetworks": [{ "id": "n", "name": "any-ipv4", "type": "Network" }],
            "gateway": { "object": { "id": "h", "name": "gw1", "type": "Host" } }
        }))
        .unwrap();
        assert!(by_object.matches("outside", "any-ipv4", "gw1"));
        assert!(!by_object.matches("inside", "any-ipv4", "gw1"));
        assert!(!by_object.matches("outside", "any-ipv4", "gw2"));

        let by_literal: StaticRouteDetail = serde_json::from_value(json!({
            "interfaceName": "outside",
            "selectedNetworks": [{ "id": "n", "name": "any-ipv4", "type": "Network" }],
            "gateway": { "literal": { "type": "Host", "value": "10.0.0.1" } }
        }))
        .unwrap();
        assert!(by_literal.matches("outside", "any-ipv4", "10.0.0.1"));
        assert!(!by_literal.matches("outside", "other-net", "10.0.0.1"));
    }
}
