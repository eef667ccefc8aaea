// Name resolution
//
// Every lookup lists the whole collection (first page only, fixed size)
// and scans it for an exact, case-sensitive name match. Nothing is cached:
// the controller is the source of truth and objects come and go between
// calls.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, warn};

use crate::client::{DEFAULT_LIST_LIMIT, FmcClient, REDUCED_LIST_LIMIT};
use crate::error::Error;
use crate::models::{Collection, NamedObject};

/// A resolvable collection on the controller.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    DeviceGroup,
    AccessPolicy,
    NatPolicy,
    SecurityZone,
    Network,
    Host,
    Port,
    Device,
}

impl ObjectKind {
    /// Collection path under the domain-scoped configuration API.
    pub fn path(self) -> &'static str {
        match self {
            Self::DeviceGroup => "devicegroups/devicegrouprecords",
            Self::AccessPolicy => "policy/accesspolicies",
            Self::NatPolicy => "policy/ftdnatpolicies",
            Self::SecurityZone => "object/securityzones",
            Self::Network => "object/networkaddresses",
            Self::Host => "object/hosts",
            Self::Port => "object/protocolportobjects",
            Self::Device => "devices/devicerecords",
        }
    }

    /// Page size for the listing.
    pub fn list_limit(self) -> u32 {
        match self {
            Self::DeviceGroup | Self::SecurityZone => REDUCED_LIST_LIMIT,
            _ => DEFAULT_LIST_LIMIT,
        }
    }

    /// Required `type` for a match, for collections that mix object types.
    pub fn type_filter(self) -> Option<&'static str> {
        match self {
            Self::Network => Some("Network"),
            Self::Host => Some("Host"),
            Self::Port => Some("ProtocolPortObject"),
            _ => None,
        }
    }

    /// Object kinds tried, in order, by [`FmcClient::find_object`].
    pub const GENERIC_OBJECTS: [Self; 3] = [Self::Network, Self::Host, Self::Port];

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// First item named `name` (and of the filtered type, when there is one).
pub fn find_by_name<'a>(
    items: &'a [NamedObject],
    name: &str,
    type_filter: Option<&str>,
) -> Option<&'a NamedObject> {
    items
        .iter()
        .find(|item| item.name == name && type_filter.is_none_or(|t| item.kind == t))
}

impl FmcClient {
    /// List every object of `kind`, first page only.
    pub async fn list_objects(&self, kind: ObjectKind) -> Result<Vec<NamedObject>, Error> {
        let url = self.list_url(kind.path(), kind.list_limit())?;
        let collection: Collection<NamedObject> = self.get(url).await?;
        Ok(collection.items)
    }

    /// Resolve `name` to the id of an object of `kind`.
    ///
    /// `Ok(None)` when nothing matches; listing failures propagate.
    pub async fn resolve_id(&self, kind: ObjectKind, name: &str) -> Result<Option<String>, Error> {
        let items = self.list_objects(kind).await?;
        let id = find_by_name(&items, name, kind.type_filter()).map(|o| o.id.clone());
        debug!(%kind, name, found = id.is_some(), "resolved name");
        Ok(id)
    }

    pub async fn device_group_id(&self, name: &str) -> Result<Option<String>, Error> {
        self.resolve_id(ObjectKind::DeviceGroup, name).await
    }

    pub async fn access_policy_id(&self, name: &str) -> Result<Option<String>, Error> {
        self.resolve_id(ObjectKind::AccessPolicy, name).await
    }

    pub async fn nat_policy_id(&self, name: &str) -> Result<Option<String>, Error> {
        self.resolve_id(ObjectKind::NatPolicy, name).await
    }

    pub async fn security_zone_id(&self, name: &str) -> Result<Option<String>, Error> {
        self.resolve_id(ObjectKind::SecurityZone, name).await
    }

    pub async fn network_object_id(&self, name: &str) -> Result<Option<String>, Error> {
        self.resolve_id(ObjectKind::Network, name).await
    }

    pub async fn host_object_id(&self, name: &str) -> Result<Option<String>, Error> {
        self.resolve_id(ObjectKind::Host, name).await
    }

    pub async fn port_object_id(&self, name: &str) -> Result<Option<String>, Error> {
        self.resolve_id(ObjectKind::Port, name).await
    }

    /// Resolve a name that may be a network, host, or port object, in that
    /// order. Returns the kind that matched alongside the id.
    pub async fn find_object(&self, name: &str) -> Result<Option<(ObjectKind, String)>, Error> {
        for kind in ObjectKind::GENERIC_OBJECTS {
            if let Some(id) = self.resolve_id(kind, name).await? {
                return Ok(Some((kind, id)));
            }
        }
        warn!(name, "object not found as network, host, or port");
        Ok(None)
    }
}
