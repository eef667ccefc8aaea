// Policy deployment

use tracing::{debug, info};

use crate::client::FmcClient;
use crate::error::Error;
use crate::models::{AuditRecord, Collection, CreatedResource, DeploymentRequest, NamedObject};

const DEPLOYABLE_TYPE: &str = "DeployableDevice";

impl FmcClient {
    /// Names of devices with pending, undeployed changes.
    pub async fn deployable_devices(&self) -> Result<Vec<String>, Error> {
        let url = self.config_url("deployment/deployabledevices")?;
        let collection: Collection<NamedObject> = self.get(url).await?;
        let names: Vec<String> = collection
            .items
            .into_iter()
            .filter(|item| item.kind == DEPLOYABLE_TYPE)
            .map(|item| item.name)
            .collect();
        debug!(count = names.len(), "deployable devices");
        Ok(names)
    }

    /// Time of the most recent audit record, in milliseconds.
    ///
    /// Deployment requests use it as their version stamp.
    pub async fn audit_timestamp(&self) -> Result<i64, Error> {
        let url = self.platform_url("audit/auditrecords")?;
        let records: Collection<AuditRecord> = self.get(url).await?;
        let latest = records.items.first().ok_or_else(|| {
            Error::UnexpectedResponse("audit record list is empty".into())
        })?;
        Ok(latest.time.saturating_mul(1000))
    }

    /// Submit a forced deployment to `device_ids`, versioned with the
    /// latest audit timestamp.
    pub async fn request_deployment(
        &self,
        device_ids: Vec<String>,
    ) -> Result<CreatedResource, Error> {
        let version = self.audit_timestamp().await?;
        info!(devices = ?device_ids, version, "requesting deployment");
        let url = self.config_url("deployment/deploymentrequests")?;
        let body = DeploymentRequest::forced(device_ids, version);
        self.post(url, &body).await
    }
}
