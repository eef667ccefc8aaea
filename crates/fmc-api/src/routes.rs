// IPv4 static routes of a managed device

use serde_json::Value;
use tracing::{debug, info};

use crate::client::{DEFAULT_LIST_LIMIT, FmcClient};
use crate::error::Error;
use crate::models::{Collection, NamedObject, StaticRoute, StaticRouteDetail, StaticRouteRequest};

fn routes_path(device_id: &str) -> String {
    format!("devices/devicerecords/{device_id}/routing/ipv4staticroutes")
}

impl FmcClient {
    /// List a device's static routes (ids only; details need a GET each).
    pub async fn list_static_routes(&self, device_id: &str) -> Result<Vec<NamedObject>, Error> {
        let url = self.list_url(&routes_path(device_id), DEFAULT_LIST_LIMIT)?;
        let collection: Collection<NamedObject> = self.get(url).await?;
        Ok(collection.items)
    }

    pub async fn get_static_route(
        &self,
        device_id: &str,
        route_id: &str,
    ) -> Result<StaticRouteDetail, Error> {
        let url = self.config_url(&format!("{}/{route_id}", routes_path(device_id)))?;
        self.get(url).await
    }

    pub async fn create_static_route(&self, route: &StaticRoute) -> Result<Value, Error> {
        info!(
            device_id = %route.device_id,
            interface = %route.interface_name,
            gateway = route.gateway.label(),
            "creating static route"
        );
        let url = self.config_url(&routes_path(&route.device_id))?;
        let body = StaticRouteRequest::from(route);
        self.post(url, &body).await
    }

    /// Find a route on `device_id` that sends `network` out `interface`
    /// via `gateway` (a host object name or a literal address).
    ///
    /// Fetches every route's detail in turn; stops at the first match.
    pub async fn find_static_route(
        &self,
        device_id: &str,
        interface: &str,
        network: &str,
        gateway: &str,
    ) -> Result<Option<StaticRouteDetail>, Error> {
        for summary in self.list_static_routes(device_id).await? {
            let detail = self.get_static_route(device_id, &summary.id).await?;
            if detail.matches(interface, network, gateway) {
                debug!(device_id, route_id = %detail.id, "static route present");
                return Ok(Some(detail));
            }
        }
        Ok(None)
    }
}
