//! Instance and DNS record types shared by the orchestrator and providers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Tag key marking instances that belong to this deployment
pub const DEPLOY_GROUP_TAG: &str = "deploy-group";

/// Tag value marking instances that belong to this deployment
pub const DEPLOY_GROUP: &str = "learning-observer";

pub const NAME_TAG: &str = "Name";
pub const OWNER_TAG: &str = "Owner";

/// Placeholder reported by inventory for instances without a public address.
/// Callers match on this literal to detect "not yet addressable".
pub const MISSING_ADDRESS: &str = "--.--.--.--";

/// TTL of every address record, in seconds
pub const RECORD_TTL: i64 = 15;

/// Ubuntu 20.04 LTS (us-east-1)
pub const IMAGE_ID: &str = "ami-09e67e426f25ce0d7";
pub const INSTANCE_TYPE: &str = "t2.nano";
pub const ROOT_DEVICE_NAME: &str = "/dev/xvda";
pub const ROOT_VOLUME_SIZE_GB: i32 = 32;
pub const ROOT_VOLUME_TYPE: &str = "gp2";

pub type Tags = BTreeMap<String, String>;

/// Lifecycle state of a compute instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    /// Launch accepted, not yet running
    Requested,
    Running,
    Stopped,
    /// Shutting down or gone; terminal
    Terminated,
}

impl InstanceState {
    /// Map a provider state name (`pending`, `running`, ...) onto the lifecycle
    pub fn from_provider(name: &str) -> Self {
        match name {
            "running" => InstanceState::Running,
            "stopping" | "stopped" => InstanceState::Stopped,
            "shutting-down" | "terminated" => InstanceState::Terminated,
            _ => InstanceState::Requested,
        }
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceState::Requested => write!(f, "requested"),
            InstanceState::Running => write!(f, "running"),
            InstanceState::Stopped => write!(f, "stopped"),
            InstanceState::Terminated => write!(f, "terminated"),
        }
    }
}

/// A provider compute instance as last described by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub tags: Tags,
    pub public_address: Option<Ipv4Addr>,
    pub state: InstanceState,
}

impl Instance {
    /// Value of the `Name` tag
    pub fn name(&self) -> Option<&str> {
        self.tags.get(NAME_TAG).map(String::as_str)
    }
}

/// Provider grouping of instances launched together
#[derive(Debug, Clone, Default)]
pub struct Reservation {
    pub instances: Vec<Instance>,
}

/// Compact inventory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSummary {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,

    #[serde(rename = "Tags")]
    pub tags: Tags,

    /// Dotted address, or [`MISSING_ADDRESS`]
    #[serde(rename = "PublicIpAddress")]
    pub public_address: String,
}

impl InstanceSummary {
    pub fn name(&self) -> Option<&str> {
        self.tags.get(NAME_TAG).map(String::as_str)
    }

    /// Whether the provider has assigned a public address yet
    pub fn is_addressable(&self) -> bool {
        self.public_address != MISSING_ADDRESS
    }
}

impl From<Instance> for InstanceSummary {
    fn from(instance: Instance) -> Self {
        Self {
            instance_id: instance.id,
            tags: instance.tags,
            public_address: instance
                .public_address
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| MISSING_ADDRESS.to_string()),
        }
    }
}

/// Account-specific launch parameters supplied by configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSettings {
    pub key_name: String,
    pub subnet_id: String,
    pub security_group_id: String,
    pub owner: String,
    pub availability_zone: String,
}

/// Root block device of a launched instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootVolume {
    pub device_name: String,
    pub size_gb: i32,
    pub volume_type: String,
    pub delete_on_termination: bool,
}

/// Primary network interface of a launched instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub device_index: i32,
    pub subnet_id: String,
    pub security_group_id: String,
    pub associate_public_address: bool,
}

/// Everything a provider needs to launch exactly one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub image_id: String,
    pub instance_type: String,
    pub key_name: String,
    pub availability_zone: String,
    pub root_volume: RootVolume,
    pub network: NetworkInterface,
    pub tags: Tags,
}

impl LaunchRequest {
    /// Build the fixed launch profile for an instance called `name`
    pub fn new(name: &str, settings: &LaunchSettings) -> Self {
        let tags = [
            (NAME_TAG, name),
            (OWNER_TAG, settings.owner.as_str()),
            (DEPLOY_GROUP_TAG, DEPLOY_GROUP),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            image_id: IMAGE_ID.to_string(),
            instance_type: INSTANCE_TYPE.to_string(),
            key_name: settings.key_name.clone(),
            availability_zone: settings.availability_zone.clone(),
            root_volume: RootVolume {
                device_name: ROOT_DEVICE_NAME.to_string(),
                size_gb: ROOT_VOLUME_SIZE_GB,
                volume_type: ROOT_VOLUME_TYPE.to_string(),
                delete_on_termination: true,
            },
            network: NetworkInterface {
                device_index: 0,
                subnet_id: settings.subnet_id.clone(),
                security_group_id: settings.security_group_id.clone(),
                associate_public_address: true,
            },
            tags,
        }
    }
}

/// DNS provider container for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    pub id: String,
    pub name: String,
}

impl HostedZone {
    /// Exact name match, ignoring the trailing root dot
    pub fn matches(&self, domain: &str) -> bool {
        self.name.trim_end_matches('.') == domain.trim_end_matches('.')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Upsert,
    Delete,
}

impl std::fmt::Display for RecordAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordAction::Upsert => write!(f, "UPSERT"),
            RecordAction::Delete => write!(f, "DELETE"),
        }
    }
}

/// Fully-qualified record name, trailing dot included
///
/// `domain` may already be absolute (`example.org.`).
pub fn record_name(subdomain: &str, domain: &str) -> String {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    format!("{}.{}.", subdomain, domain)
}

/// A single-value `A` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub name: String,
    pub value: Ipv4Addr,
    pub ttl: i64,
}

impl DnsRecord {
    pub fn address(subdomain: &str, domain: &str, value: Ipv4Addr) -> Self {
        Self {
            name: record_name(subdomain, domain),
            value,
            ttl: RECORD_TTL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Pending,
    InSync,
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeStatus::Pending => write!(f, "PENDING"),
            ChangeStatus::InSync => write!(f, "INSYNC"),
        }
    }
}

/// Tracking handle for a submitted DNS change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    pub id: String,
    pub status: ChangeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> LaunchSettings {
        LaunchSettings {
            key_name: "lo-key".to_string(),
            subnet_id: "subnet-1234".to_string(),
            security_group_id: "sg-5678".to_string(),
            owner: "pmitros".to_string(),
            availability_zone: "us-east-1b".to_string(),
        }
    }

    #[test]
    fn test_launch_request_profile() {
        let request = LaunchRequest::new("alice", &settings());

        assert_eq!(request.image_id, "ami-09e67e426f25ce0d7");
        assert_eq!(request.instance_type, "t2.nano");
        assert_eq!(request.root_volume.device_name, "/dev/xvda");
        assert_eq!(request.root_volume.size_gb, 32);
        assert_eq!(request.root_volume.volume_type, "gp2");
        assert!(request.root_volume.delete_on_termination);
        assert_eq!(request.network.device_index, 0);
        assert!(request.network.associate_public_address);
        assert_eq!(request.network.subnet_id, "subnet-1234");
        assert_eq!(request.network.security_group_id, "sg-5678");
        assert_eq!(request.availability_zone, "us-east-1b");
    }

    #[test]
    fn test_launch_request_tags() {
        let request = LaunchRequest::new("alice", &settings());

        assert_eq!(request.tags.len(), 3);
        assert_eq!(request.tags["Name"], "alice");
        assert_eq!(request.tags["Owner"], "pmitros");
        assert_eq!(request.tags["deploy-group"], "learning-observer");
    }

    #[test]
    fn test_instance_state_from_provider() {
        assert_eq!(InstanceState::from_provider("pending"), InstanceState::Requested);
        assert_eq!(InstanceState::from_provider("running"), InstanceState::Running);
        assert_eq!(InstanceState::from_provider("stopping"), InstanceState::Stopped);
        assert_eq!(
            InstanceState::from_provider("shutting-down"),
            InstanceState::Terminated
        );
        assert_eq!(InstanceState::from_provider("terminated"), InstanceState::Terminated);
    }

    #[test]
    fn test_summary_uses_sentinel_without_address() {
        let instance = Instance {
            id: "i-0abc".to_string(),
            tags: Tags::new(),
            public_address: None,
            state: InstanceState::Requested,
        };

        let summary = InstanceSummary::from(instance);
        assert_eq!(summary.public_address, "--.--.--.--");
        assert!(!summary.is_addressable());
    }

    #[test]
    fn test_summary_json_field_names() {
        let summary = InstanceSummary {
            instance_id: "i-0abc".to_string(),
            tags: [("Name".to_string(), "alice".to_string())].into(),
            public_address: "203.0.113.7".to_string(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["InstanceId"], "i-0abc");
        assert_eq!(json["Tags"]["Name"], "alice");
        assert_eq!(json["PublicIpAddress"], "203.0.113.7");
    }

    #[test]
    fn test_record_name_keeps_trailing_dot() {
        assert_eq!(record_name("alice", "example.org"), "alice.example.org.");
        assert_eq!(record_name("alice", "example.org."), "alice.example.org.");

        let record = DnsRecord::address("alice", "example.org", Ipv4Addr::new(203, 0, 113, 7));
        assert_eq!(record.ttl, 15);
        assert_eq!(record.name, "alice.example.org.");
    }

    #[test]
    fn test_hosted_zone_matches_exact_name() {
        let zone = HostedZone {
            id: "/hostedzone/Z1".to_string(),
            name: "example.org.".to_string(),
        };

        assert!(zone.matches("example.org"));
        assert!(zone.matches("example.org."));
        assert!(!zone.matches("sub.example.org"));
        assert!(!zone.matches("example.org.uk"));
    }
}
