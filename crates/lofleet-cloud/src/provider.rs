//! Provider API traits
//!
//! The orchestrator talks to the compute and DNS services only through these
//! traits. `lofleet-cloud-aws` implements them on top of EC2 and Route 53;
//! tests implement them in memory.

use crate::error::Result;
use crate::model::{
    ChangeInfo, DnsRecord, HostedZone, Instance, LaunchRequest, RecordAction, Reservation,
};
use async_trait::async_trait;

/// Compute provisioning API
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Submit a single-instance launch and return the new instance id
    async fn run_instance(&self, request: &LaunchRequest) -> Result<String>;

    /// Describe one instance by id
    ///
    /// Returns `CloudError::InstanceNotFound` when the provider does not
    /// (yet) know the id.
    async fn describe_instance(&self, instance_id: &str) -> Result<Instance>;

    /// Describe every instance carrying tag `key=value`, grouped as the
    /// provider groups them
    async fn describe_instances_by_tag(&self, key: &str, value: &str) -> Result<Vec<Reservation>>;

    /// Submit one batched terminate request; completion is not awaited
    async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()>;
}

/// DNS provider API
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// List hosted zones using the provider's domain-name filter
    async fn list_hosted_zones_by_name(&self, domain: &str) -> Result<Vec<HostedZone>>;

    /// Submit exactly one record change in one hosted zone
    async fn change_record(
        &self,
        zone_id: &str,
        action: RecordAction,
        record: &DnsRecord,
    ) -> Result<ChangeInfo>;

    /// Fetch the current status of a submitted change
    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo>;
}
