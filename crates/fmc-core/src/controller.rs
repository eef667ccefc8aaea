// ── Managed controller ──
//
// Composes resolved ids into device registration, interface and route
// configuration, and deployment. Tracks whether the controller is reachable
// and whether it holds everything the desired configuration names.

use std::sync::Arc;

use fmc_api::models::{
    DeviceRegistration, Gateway, InterfaceConfig, NamedObject, ObjectRef, StaticRoute,
};
use fmc_api::transport::TransportConfig;
use fmc_api::{FmcClient, HttpTokenManager, TokenGrant};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{
    ConfigurationReport, ConfigurationStatus, DeploymentStatus, DesiredConfiguration,
    FtdvRegistration, InterfaceAssessment, Reachability, RegistrationStatus, Resolved,
    ResolvedConfiguration,
};

const DEVICE_TYPE: &str = "Device";
const DEPLOYMENT_TYPE: &str = "DeploymentRequest";

/// A management center plus what this process knows about it.
///
/// Owns its [`FmcClient`]. State-changing checks (`reach`,
/// `resolve_configuration`, `check_configuration`) take `&mut self`;
/// everything else only reads.
pub struct ManagedFmc {
    client: FmcClient,
    reachability: Reachability,
    desired: DesiredConfiguration,
    resolved: ResolvedConfiguration,
    status: Option<ConfigurationStatus>,
}

impl ManagedFmc {
    /// Build a client from configuration. Does NOT contact the controller;
    /// call [`reach`](Self::reach) or [`reach_with_token`](Self::reach_with_token).
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let mut client = FmcClient::new(config.url.clone(), config.credentials, &transport)?
            .with_domain(config.domain)
            .with_token_max_age(config.token_max_age)
            .with_probe_policy(config.probe);

        if let Some(endpoint) = config.token_manager {
            let manager = HttpTokenManager::new(&transport)?;
            client = client.with_token_manager(Arc::new(manager), endpoint);
        }

        Ok(Self::from_client(client).with_desired(config.desired))
    }

    /// Wrap an existing client.
    pub fn from_client(client: FmcClient) -> Self {
        Self {
            client,
            reachability: Reachability::Unavailable,
            desired: DesiredConfiguration::default(),
            resolved: ResolvedConfiguration::default(),
            status: None,
        }
    }

    pub fn with_desired(mut self, desired: DesiredConfiguration) -> Self {
        self.set_desired(desired);
        self
    }

    /// The underlying REST client, for calls the orchestrator doesn't wrap.
    pub fn client(&self) -> &FmcClient {
        &self.client
    }

    pub fn reachability(&self) -> Reachability {
        self.reachability
    }

    /// Result of the last [`check_configuration`](Self::check_configuration).
    pub fn configuration_status(&self) -> Option<ConfigurationStatus> {
        self.status
    }

    pub fn desired(&self) -> &DesiredConfiguration {
        &self.desired
    }

    pub fn resolved(&self) -> &ResolvedConfiguration {
        &self.resolved
    }

    pub fn report(&self) -> ConfigurationReport {
        ConfigurationReport {
            reachability: self.reachability,
            resolved: self.resolved.clone(),
            status: self.status,
        }
    }

    // ── Reachability ─────────────────────────────────────────────────

    /// Obtain a fresh token. Success marks the controller available;
    /// any failure marks it unavailable.
    pub async fn reach(&mut self) -> Reachability {
        self.reachability = match self.client.generate_token().await {
            Ok(_) => Reachability::Available,
            Err(e) => {
                error!(error = %e, "controller unreachable");
                Reachability::Unavailable
            }
        };
        self.reachability
    }

    /// Adopt a token obtained elsewhere and mark the controller available.
    pub async fn reach_with_token(&mut self, grant: TokenGrant) -> Reachability {
        self.client.inject_token(grant).await;
        self.reachability = Reachability::Available;
        self.reachability
    }

    /// Probe the controller with the installed token, without refreshing.
    /// Marks the controller unavailable if the probe never succeeds.
    pub async fn verify(&mut self) -> Result<Reachability, CoreError> {
        self.reachability = if self.client.verify_token().await? {
            Reachability::Available
        } else {
            warn!("installed token rejected by controller");
            Reachability::Unavailable
        };
        Ok(self.reachability)
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Replace the desired configuration. Previously resolved ids and
    /// the last status are discarded.
    pub fn set_desired(&mut self, desired: DesiredConfiguration) {
        self.desired = desired;
        self.resolved = ResolvedConfiguration::default();
        self.status = None;
    }

    /// Resolve every name in the desired configuration.
    ///
    /// Names that don't exist resolve to `None`; listing failures abort.
    pub async fn resolve_configuration(&mut self) -> Result<&ResolvedConfiguration, CoreError> {
        let desired = &self.desired;
        let client = &self.client;
        let mut resolved = ResolvedConfiguration::default();

        if let Some(name) = &desired.device_group {
            resolved.device_group = Some(Resolved {
                name: name.clone(),
                id: client.device_group_id(name).await?,
            });
        }
        if let Some(name) = &desired.access_policy {
            resolved.access_policy = Some(Resolved {
                name: name.clone(),
                id: client.access_policy_id(name).await?,
            });
        }
        if let Some(name) = &desired.nat_policy {
            resolved.nat_policy = Some(Resolved {
                name: name.clone(),
                id: client.nat_policy_id(name).await?,
            });
        }
        resolved.security_zones =
            resolve_all(&desired.security_zones, |n| client.security_zone_id(n)).await?;
        resolved.network_objects =
            resolve_all(&desired.network_objects, |n| client.network_object_id(n)).await?;
        resolved.host_objects =
            resolve_all(&desired.host_objects, |n| client.host_object_id(n)).await?;

        debug!(resolved = ?resolved, "configuration resolved");
        self.resolved = resolved;
        Ok(&self.resolved)
    }

    /// Decide whether the controller holds everything the managed devices
    /// depend on.
    ///
    /// Configured requires: the controller is available; the device group
    /// and both policies resolved; both policies are assigned to that
    /// device group; every requested zone and object resolved. An
    /// unreachable controller is never configured.
    pub async fn check_configuration(&mut self) -> Result<ConfigurationStatus, CoreError> {
        let status = self.evaluate_configuration().await?;
        info!(%status, "configuration checked");
        self.status = Some(status);
        Ok(status)
    }

    async fn evaluate_configuration(&self) -> Result<ConfigurationStatus, CoreError> {
        if self.reachability != Reachability::Available {
            debug!("controller unavailable");
            return Ok(ConfigurationStatus::Unconfigured);
        }

        let resolved = &self.resolved;
        let Some(group_id) = resolved.device_group_id() else {
            debug!("device group unresolved");
            return Ok(ConfigurationStatus::Unconfigured);
        };

        for (label, policy_id) in [
            ("access policy", resolved.access_policy_id()),
            ("NAT policy", resolved.nat_policy_id()),
        ] {
            let Some(policy_id) = policy_id else {
                debug!(label, "policy unresolved");
                return Ok(ConfigurationStatus::Unconfigured);
            };
            if !self.client.is_policy_assigned_to(policy_id, group_id).await? {
                debug!(label, policy_id, group_id, "policy not assigned to device group");
                return Ok(ConfigurationStatus::Unconfigured);
            }
        }

        let all_objects_resolved = [
            &resolved.security_zones,
            &resolved.network_objects,
            &resolved.host_objects,
        ]
        .into_iter()
        .flat_map(IndexMap::values)
        .all(Option::is_some);

        if !all_objects_resolved {
            debug!(missing = ?resolved.unresolved(), "objects unresolved");
            return Ok(ConfigurationStatus::Unconfigured);
        }

        Ok(ConfigurationStatus::Configured)
    }

    // ── Device lifecycle ─────────────────────────────────────────────

    /// Register a virtual firewall into the resolved device group under the
    /// resolved access policy. Returns the registration task id when the
    /// controller accepted a `Device`.
    pub async fn register_ftdv(
        &self,
        request: &FtdvRegistration,
    ) -> Result<Option<String>, CoreError> {
        let access_policy_id = self
            .resolved
            .access_policy_id()
            .ok_or_else(|| not_configured("access policy"))?;
        let device_group_id = self
            .resolved
            .device_group_id()
            .ok_or_else(|| not_configured("device group"))?;

        let registration = DeviceRegistration {
            name: request.name.clone(),
            host_name: request.mgmt_ip.clone(),
            reg_key: request.reg_key.clone(),
            nat_id: request.nat_id.clone(),
            license_caps: request.license_caps.clone(),
            performance_tier: request.performance_tier.clone(),
            access_policy_id: access_policy_id.to_owned(),
            device_group_id: device_group_id.to_owned(),
        };

        let created = self.client.register_device(&registration).await?;
        let task = created.task_id_if(DEVICE_TYPE).map(String::from);
        match &task {
            Some(task) => info!(name = %request.name, %task, "registration started"),
            None => warn!(name = %request.name, "registration response carried no task"),
        }
        Ok(task)
    }

    /// Remove a device by name. `false` when it wasn't registered.
    pub async fn deregister(&self, name: &str) -> Result<bool, CoreError> {
        Ok(self.client.deregister_device(name).await?)
    }

    pub async fn registration_status(&self, name: &str) -> Result<RegistrationStatus, CoreError> {
        Ok(match self.client.device_id(name).await? {
            Some(_) => RegistrationStatus::Success,
            None => RegistrationStatus::Failed,
        })
    }

    pub async fn device_group_members(
        &self,
        group_id: &str,
    ) -> Result<Vec<NamedObject>, CoreError> {
        Ok(self.client.device_group_members(group_id).await?)
    }

    pub async fn memory_metrics(&self, device_id: &str) -> Result<Value, CoreError> {
        Ok(self.client.memory_metrics(device_id).await?)
    }

    // ── Interfaces ───────────────────────────────────────────────────

    pub async fn configure_interface(&self, config: &InterfaceConfig) -> Result<(), CoreError> {
        let _ = self.client.configure_interface(config).await?;
        Ok(())
    }

    /// Compare a device interface against `expected`.
    ///
    /// A half match is logged as mis-configured; callers that need to tell
    /// it apart from a blank interface use
    /// [`InterfaceAssessment::is_misconfigured`].
    pub async fn interface_status(
        &self,
        expected: &InterfaceConfig,
    ) -> Result<InterfaceAssessment, CoreError> {
        let actual = self
            .client
            .get_interface(&expected.device_id, &expected.nic_id)
            .await?;
        let assessment = InterfaceAssessment::of(&actual, expected);
        if assessment.is_misconfigured() {
            error!(
                device_id = %expected.device_id,
                nic = %expected.name,
                addressing_matches = assessment.addressing_matches,
                identity_matches = assessment.identity_matches,
                "interface mis-configured"
            );
        }
        Ok(assessment)
    }

    // ── Static routes ────────────────────────────────────────────────

    /// Create a static route to `destination` via `gateway`.
    ///
    /// `gateway` is sent as a host object reference when a host object of
    /// that name exists, else as a literal address.
    pub async fn configure_static_route(
        &self,
        device_id: &str,
        interface_name: &str,
        destination: ObjectRef,
        gateway: &str,
        metric: u32,
    ) -> Result<Value, CoreError> {
        let gateway = self.gateway_for(gateway).await?;
        let route = StaticRoute {
            device_id: device_id.to_owned(),
            interface_name: interface_name.to_owned(),
            destination,
            gateway,
            metric,
        };
        Ok(self.client.create_static_route(&route).await?)
    }

    async fn gateway_for(&self, gateway: &str) -> Result<Gateway, CoreError> {
        Ok(match self.client.host_object_id(gateway).await? {
            Some(id) => Gateway::host_object(id, gateway),
            None => Gateway::literal(gateway),
        })
    }

    pub async fn static_route_status(
        &self,
        device_id: &str,
        interface_name: &str,
        network: &str,
        gateway: &str,
    ) -> Result<ConfigurationStatus, CoreError> {
        let found = self
            .client
            .find_static_route(device_id, interface_name, network, gateway)
            .await?;
        Ok(if found.is_some() {
            ConfigurationStatus::Configured
        } else {
            ConfigurationStatus::Unconfigured
        })
    }

    // ── Deployment ───────────────────────────────────────────────────

    /// Deploy pending changes to a device.
    ///
    /// Returns `None` without contacting the deployment endpoint when the
    /// device has nothing pending, or when the request's response is not a
    /// `DeploymentRequest`.
    pub async fn start_deployment(&self, device_name: &str) -> Result<Option<String>, CoreError> {
        let pending = self.client.deployable_devices().await?;
        if !pending.iter().any(|d| d == device_name) {
            info!(device_name, "nothing to deploy");
            return Ok(None);
        }

        let device_id = self
            .client
            .device_id(device_name)
            .await?
            .ok_or_else(|| CoreError::not_found("Device", device_name))?;

        let created = self.client.request_deployment(vec![device_id]).await?;
        let task = created.task_id_if(DEPLOYMENT_TYPE).map(String::from);
        if let Some(task) = &task {
            info!(device_name, %task, "deployment started");
        }
        Ok(task)
    }

    /// Whether `device_name` has undeployed changes. A failure to fetch the
    /// deployable list is reported as [`DeploymentStatus::NotKnown`].
    pub async fn check_deploy_status(&self, device_name: &str) -> DeploymentStatus {
        match self.client.deployable_devices().await {
            Ok(pending) if pending.iter().any(|d| d == device_name) => {
                debug!(device_name, "policies not deployed");
                DeploymentStatus::NotDeployed
            }
            Ok(_) => {
                debug!(device_name, "policies deployed");
                DeploymentStatus::Deployed
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch deployable devices");
                DeploymentStatus::NotKnown
            }
        }
    }
}

async fn resolve_all<'a, F, Fut>(
    names: &'a [String],
    resolve: F,
) -> Result<IndexMap<String, Option<String>>, CoreError>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = Result<Option<String>, fmc_api::Error>>,
{
    let mut out = IndexMap::with_capacity(names.len());
    for name in names {
        out.insert(name.clone(), resolve(name).await?);
    }
    Ok(out)
}

fn not_configured(what: &str) -> CoreError {
    CoreError::NotConfigured { what: what.into() }
}

fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: (&config.tls).into(),
        timeout: config.timeout,
        connect_timeout: config.connect_timeout,
    }
}
