// Physical interfaces of a managed device

use serde_json::Value;
use tracing::info;

use crate::client::{DEFAULT_LIST_LIMIT, FmcClient};
use crate::error::Error;
use crate::models::{
    Collection, InterfaceConfig, NamedObject, PhysicalInterface, PhysicalInterfaceUpdate,
};
use crate::objects::find_by_name;

fn interfaces_path(device_id: &str) -> String {
    format!("devices/devicerecords/{device_id}/physicalinterfaces")
}

impl FmcClient {
    /// List a device's physical interfaces.
    pub async fn list_interfaces(&self, device_id: &str) -> Result<Vec<NamedObject>, Error> {
        let url = self.list_url(&interfaces_path(device_id), DEFAULT_LIST_LIMIT)?;
        let collection: Collection<NamedObject> = self.get(url).await?;
        Ok(collection.items)
    }

    /// Resolve a hardware interface name (e.g. `GigabitEthernet0/1`) on a
    /// device to its id.
    pub async fn interface_id(&self, device_id: &str, name: &str) -> Result<Option<String>, Error> {
        let items = self.list_interfaces(device_id).await?;
        Ok(find_by_name(&items, name, None).map(|o| o.id.clone()))
    }

    pub async fn get_interface(
        &self,
        device_id: &str,
        nic_id: &str,
    ) -> Result<PhysicalInterface, Error> {
        let url = self.config_url(&format!("{}/{nic_id}", interfaces_path(device_id)))?;
        self.get(url).await
    }

    /// Replace an interface's configuration with `config`.
    ///
    /// The update is a full representation: addressing, zone, names, MTU
    /// and mode are all set together, and the interface is enabled.
    pub async fn configure_interface(&self, config: &InterfaceConfig) -> Result<Value, Error> {
        info!(
            device_id = %config.device_id,
            nic = %config.name,
            ifname = %config.ifname,
            "configuring interface"
        );
        let url = self.config_url(&format!(
            "{}/{}",
            interfaces_path(&config.device_id),
            config.nic_id
        ))?;
        let body = PhysicalInterfaceUpdate::from(config);
        self.put(url, &body).await
    }
}
