// ── Domain model ──
//
// Status values reported by the orchestrator, the desired configuration a
// controller is checked against, and the resolved name → id view of it.
// Status strings are the operator-facing vocabulary and are stable.

use fmc_api::models::{InterfaceAddressing, InterfaceConfig, PhysicalInterface};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ── Status values ───────────────────────────────────────────────────

/// Whether the controller has issued (or accepted) a token.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Reachability {
    #[default]
    #[strum(serialize = "UN-AVAILABLE")]
    #[serde(rename = "UN-AVAILABLE")]
    Unavailable,
    #[strum(serialize = "AVAILABLE")]
    #[serde(rename = "AVAILABLE")]
    Available,
}

/// Whether everything a managed device depends on exists on the controller.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ConfigurationStatus {
    #[default]
    #[strum(serialize = "UN-CONFIGURED")]
    #[serde(rename = "UN-CONFIGURED")]
    Unconfigured,
    #[strum(serialize = "CONFIGURED")]
    #[serde(rename = "CONFIGURED")]
    Configured,
}

/// Whether a device interface matches its expected configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum InterfaceStatus {
    #[strum(serialize = "UN-CONFIGURED")]
    #[serde(rename = "UN-CONFIGURED")]
    Unconfigured,
    #[strum(serialize = "CONFIGURED")]
    #[serde(rename = "CONFIGURED")]
    Configured,
}

/// Whether a device has pending, undeployed changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum DeploymentStatus {
    #[strum(serialize = "DEPLOYED")]
    #[serde(rename = "DEPLOYED")]
    Deployed,
    #[strum(serialize = "NOT-DEPLOYED")]
    #[serde(rename = "NOT-DEPLOYED")]
    NotDeployed,
    /// The deployable-device list could not be fetched.
    #[strum(serialize = "NOT-KNOWN")]
    #[serde(rename = "NOT-KNOWN")]
    NotKnown,
}

/// Whether a device record exists on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum RegistrationStatus {
    #[strum(serialize = "SUCCESS")]
    #[serde(rename = "SUCCESS")]
    Success,
    #[strum(serialize = "FAILED")]
    #[serde(rename = "FAILED")]
    Failed,
}

// ── Interface assessment ────────────────────────────────────────────

/// Result of comparing an interface against its expected configuration.
///
/// Addressing and identity are judged separately. Only both matching
/// counts as configured; exactly one matching is the mis-configured case,
/// which is still reported as [`InterfaceStatus::Unconfigured`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterfaceAssessment {
    /// DHCP expected and a DHCP block is present, or static expected and
    /// the static address equals the expected one.
    pub addressing_matches: bool,
    /// Hardware name, logical name and security zone all match.
    pub identity_matches: bool,
}

impl InterfaceAssessment {
    pub fn of(actual: &PhysicalInterface, expected: &InterfaceConfig) -> Self {
        let ipv4 = actual.ipv4.as_ref();
        let addressing_matches = match &expected.addressing {
            InterfaceAddressing::Dhcp => ipv4.is_some_and(|b| b.dhcp.is_some()),
            InterfaceAddressing::Static { address, .. } => ipv4
                .and_then(|b| b.static_addr.as_ref())
                .is_some_and(|s| &s.address == address),
        };

        let identity_matches = actual.name == expected.name
            && actual.ifname.as_deref() == Some(expected.ifname.as_str())
            && actual
                .security_zone
                .as_ref()
                .is_some_and(|z| z.id == expected.zone_id);

        Self {
            addressing_matches,
            identity_matches,
        }
    }

    pub fn status(self) -> InterfaceStatus {
        if self.addressing_matches && self.identity_matches {
            InterfaceStatus::Configured
        } else {
            InterfaceStatus::Unconfigured
        }
    }

    /// Exactly one of addressing and identity matches.
    pub fn is_misconfigured(self) -> bool {
        self.addressing_matches != self.identity_matches
    }
}

// ── Desired / resolved configuration ────────────────────────────────

/// Names the controller is expected to hold for a managed device group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesiredConfiguration {
    pub device_group: Option<String>,
    pub access_policy: Option<String>,
    pub nat_policy: Option<String>,
    pub security_zones: Vec<String>,
    pub network_objects: Vec<String>,
    pub host_objects: Vec<String>,
}

/// A single name and the id it resolved to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub name: String,
    pub id: Option<String>,
}

impl Resolved {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// The desired configuration with every name resolved against the
/// controller. Insertion order follows the desired configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_group: Option<Resolved>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_policy: Option<Resolved>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_policy: Option<Resolved>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub security_zones: IndexMap<String, Option<String>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub network_objects: IndexMap<String, Option<String>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub host_objects: IndexMap<String, Option<String>>,
}

impl ResolvedConfiguration {
    pub fn device_group_id(&self) -> Option<&str> {
        self.device_group.as_ref().and_then(Resolved::id)
    }

    pub fn access_policy_id(&self) -> Option<&str> {
        self.access_policy.as_ref().and_then(Resolved::id)
    }

    pub fn nat_policy_id(&self) -> Option<&str> {
        self.nat_policy.as_ref().and_then(Resolved::id)
    }

    /// Every requested name that did not resolve, labelled by kind.
    pub fn unresolved(&self) -> Vec<String> {
        let singles = [
            ("device group", &self.device_group),
            ("access policy", &self.access_policy),
            ("NAT policy", &self.nat_policy),
        ];
        let maps = [
            ("security zone", &self.security_zones),
            ("network object", &self.network_objects),
            ("host object", &self.host_objects),
        ];

        let mut missing: Vec<String> = singles
            .into_iter()
            .filter_map(|(kind, r)| {
                r.as_ref()
                    .filter(|r| r.id.is_none())
                    .map(|r| format!("{kind} '{}'", r.name))
            })
            .collect();
        for (kind, map) in maps {
            missing.extend(
                map.iter()
                    .filter(|(_, id)| id.is_none())
                    .map(|(name, _)| format!("{kind} '{name}'")),
            );
        }
        missing
    }
}

/// Serializable snapshot of what the orchestrator knows about a controller.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationReport {
    pub reachability: Reachability,
    #[serde(flatten)]
    pub resolved: ResolvedConfiguration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ConfigurationStatus>,
}

/// Inputs for registering a virtual firewall into the configured device
/// group under the configured access policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtdvRegistration {
    pub name: String,
    pub mgmt_ip: String,
    pub reg_key: String,
    pub nat_id: String,
    pub license_caps: Vec<String>,
    pub performance_tier: String,
}
