use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::NcError;

/// Orchestrator that owns a network container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkContainerType {
    AzureContainerInstance,
    WebApps,
    ClearContainerDocker,
    Docker,
    Basic,
    JobObject,
    #[serde(rename = "COW")]
    Cow,
    #[serde(other)]
    Unknown,
}

impl NetworkContainerType {
    /// Whether interface management through the CNI plugin applies to this orchestrator
    pub fn supports_interface_update(&self) -> bool {
        !matches!(self, NetworkContainerType::WebApps)
    }
}

impl fmt::Display for NetworkContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkContainerType::AzureContainerInstance => "AzureContainerInstance",
            NetworkContainerType::WebApps => "WebApps",
            NetworkContainerType::ClearContainerDocker => "ClearContainerDocker",
            NetworkContainerType::Docker => "Docker",
            NetworkContainerType::Basic => "Basic",
            NetworkContainerType::JobObject => "JobObject",
            NetworkContainerType::Cow => "COW",
            NetworkContainerType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Request to create or update a network container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkContainerRequest {
    #[serde(rename = "Version", default)]
    pub version: String,
    #[serde(rename = "NetworkContainerType")]
    pub network_container_type: NetworkContainerType,
    /// Unique network container id, also the interface name
    #[serde(rename = "NetworkContainerid")]
    pub network_container_id: String,
    #[serde(rename = "IPConfiguration")]
    pub ip_configuration: IpConfiguration,
    /// Raw orchestrator context; for Kubernetes style orchestrators this is a [`PodInfo`]
    #[serde(rename = "OrchestratorContext", default, with = "raw_json")]
    pub orchestrator_context: Vec<u8>,
}

impl NetworkContainerRequest {
    /// Decode the orchestrator context into pod metadata.
    ///
    /// A `null` context yields empty pod metadata; an absent or non-object context is an error.
    pub fn pod_info(&self) -> Result<PodInfo, NcError> {
        serde_json::from_slice::<Option<PodInfo>>(&self.orchestrator_context)
            .map(Option::unwrap_or_default)
            .map_err(|source| NcError::OrchestratorContext {
                orchestrator: self.network_container_type,
                source,
            })
    }
}

/// IP configuration of a network container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpConfiguration {
    #[serde(rename = "IPSubnet")]
    pub ip_subnet: IpSubnet,
    #[serde(rename = "DNSServers", default)]
    pub dns_servers: Vec<String>,
    #[serde(rename = "GatewayIPAddress", default)]
    pub gateway_ip_address: String,
}

/// Address with prefix length
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpSubnet {
    #[serde(rename = "IPAddress", default)]
    pub ip_address: String,
    #[serde(rename = "PrefixLength", default)]
    pub prefix_length: u8,
}

/// Kubernetes pod identity carried in the orchestrator context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PodInfo {
    #[serde(rename = "PodName")]
    pub pod_name: String,
    #[serde(rename = "PodNamespace")]
    pub pod_namespace: String,
}

// Keys match case-insensitively; missing keys and null values leave the field empty.
impl<'de> Deserialize<'de> for PodInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PodInfoVisitor)
    }
}

struct PodInfoVisitor;

impl<'de> Visitor<'de> for PodInfoVisitor {
    type Value = PodInfo;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a pod info object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<PodInfo, A::Error> {
        let mut pod = PodInfo::default();
        while let Some(key) = map.next_key::<String>()? {
            let field = match key.to_ascii_lowercase().as_str() {
                "podname" => &mut pod.pod_name,
                "podnamespace" => &mut pod.pod_namespace,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                    continue;
                }
            };
            if let Some(value) = map.next_value::<Option<String>>()? {
                *field = value;
            }
        }
        Ok(pod)
    }
}

/// Sandbox identity of the pod the interface belongs to.
///
/// Both fields come from the caller; empty values are passed through to the plugin unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodSandbox {
    pub container_id: String,
    pub netns_path: String,
}

impl PodSandbox {
    /// Create a sandbox identity from its container ID and network namespace path
    pub fn new(container_id: impl Into<String>, netns_path: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            netns_path: netns_path.into(),
        }
    }
}

/// CNI error object a plugin prints on stdout when it fails
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginError {
    #[serde(rename = "cniVersion", default, skip_serializing_if = "String::is_empty")]
    pub cni_version: String,
    /// Machine readable error code
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub msg: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}

impl PluginError {
    /// Create an error carrying only a message, with code 0
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.details.is_empty() {
            f.write_str(&self.msg)
        } else {
            write!(f, "{}; {}", self.msg, self.details)
        }
    }
}

impl std::error::Error for PluginError {}

/// Keeps an embedded JSON value as its raw bytes
mod raw_json {
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::value::RawValue;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        if bytes.is_empty() {
            return serializer.serialize_unit();
        }
        let text = std::str::from_utf8(bytes).map_err(S::Error::custom)?;
        let raw = RawValue::from_string(text.to_owned()).map_err(S::Error::custom)?;
        raw.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(raw.get().as_bytes().to_vec())
    }
}
