// Device records: registration, deregistration, group membership, health

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::FmcClient;
use crate::error::Error;
use crate::models::{
    CreatedResource, DeviceGroupRecord, DeviceRecordRequest, DeviceRegistration, NamedObject,
};
use crate::objects::ObjectKind;

const DEVICE_RECORDS: &str = "devices/devicerecords";

/// Health metric sampling window for [`FmcClient::memory_metrics`].
const METRICS_WINDOW_SECS: i64 = 60;
const METRICS_STEP_SECS: i64 = 10;

impl FmcClient {
    /// List every managed device.
    pub async fn list_devices(&self) -> Result<Vec<NamedObject>, Error> {
        self.list_objects(ObjectKind::Device).await
    }

    pub async fn device_id(&self, name: &str) -> Result<Option<String>, Error> {
        self.resolve_id(ObjectKind::Device, name).await
    }

    /// Full device record as the controller returns it.
    pub async fn get_device(&self, device_id: &str) -> Result<Value, Error> {
        let url = self.config_url(&format!("{DEVICE_RECORDS}/{device_id}"))?;
        self.get(url).await
    }

    /// Devices belonging to a device group.
    pub async fn device_group_members(&self, group_id: &str) -> Result<Vec<NamedObject>, Error> {
        let url = self.config_url(&format!("devicegroups/devicegrouprecords/{group_id}"))?;
        let record: DeviceGroupRecord = self.get(url).await?;
        debug!(group_id, members = record.members.len(), "device group members");
        Ok(record.members)
    }

    /// Start registering a device. The controller registers asynchronously;
    /// the response describes the pending device record and its task.
    pub async fn register_device(
        &self,
        registration: &DeviceRegistration,
    ) -> Result<CreatedResource, Error> {
        info!(name = %registration.name, host = %registration.host_name, "registering device");
        let url = self.config_url(DEVICE_RECORDS)?;
        let body = DeviceRecordRequest::from(registration);
        self.post(url, &body).await
    }

    /// Remove a device by name. Returns `false` if no device has that name.
    pub async fn deregister_device(&self, name: &str) -> Result<bool, Error> {
        let Some(id) = self.device_id(name).await? else {
            debug!(name, "device not registered, nothing to remove");
            return Ok(false);
        };
        info!(name, %id, "deregistering device");
        let url = self.config_url(&format!("{DEVICE_RECORDS}/{id}"))?;
        let _: Value = self.delete(url).await?;
        Ok(true)
    }

    /// Memory usage samples for the last minute at 10 second resolution.
    ///
    /// Metrics live under the domain the token was issued for, which may
    /// differ from the domain configuration calls use.
    pub async fn memory_metrics(&self, device_id: &str) -> Result<Value, Error> {
        let domain = self
            .guard()
            .peek()
            .await
            .and_then(|t| t.domain_uuid)
            .unwrap_or_else(|| self.domain().to_owned());

        let end = Utc::now().timestamp();
        let start = end - METRICS_WINDOW_SECS;
        let filter = format!(
            "deviceUUIDs:{device_id};metric:mem;startTime:{start};endTime:{end};\
             step:{METRICS_STEP_SECS};regexFilter:used_percentage_system_and_swap"
        );

        let mut url = self.config_url_in(&domain, "health/metrics")?;
        url.query_pairs_mut()
            .append_pair("offset", "0")
            .append_pair("limit", "100")
            .append_pair("filter", &filter)
            .append_pair("expanded", "true");

        self.get(url).await
    }
}
