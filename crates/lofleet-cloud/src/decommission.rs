//! Instance teardown
//!
//! Order matters: resolve the matching instances once, give the operator a
//! grace period to abort, remove each DNS record, then terminate every match
//! in one request. Termination itself is not awaited.

use crate::dns::DnsSynchronizer;
use crate::error::{CloudError, Result};
use crate::inventory::Inventory;
use crate::provider::ComputeApi;
use crate::wait::{DEFAULT_TERMINATION_GRACE, WaitOptions};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// What to do when several instances share the requested name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateNamePolicy {
    /// Terminate every instance with the name
    #[default]
    TerminateAll,
    /// Fail with `CloudError::AmbiguousName` before touching anything
    #[serde(rename = "reject")]
    RejectAmbiguous,
}

/// Terminates named instances and removes their DNS records
pub struct Decommissioner {
    compute: Arc<dyn ComputeApi>,
    inventory: Inventory,
    dns: DnsSynchronizer,
    domain: String,
    policy: DuplicateNamePolicy,
    grace: Duration,
}

impl Decommissioner {
    /// DNS records are removed from `<name>.<domain>`
    pub fn new(
        compute: Arc<dyn ComputeApi>,
        dns: DnsSynchronizer,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            inventory: Inventory::new(compute.clone()),
            compute,
            dns,
            domain: domain.into(),
            policy: DuplicateNamePolicy::default(),
            grace: DEFAULT_TERMINATION_GRACE,
        }
    }

    pub fn with_policy(mut self, policy: DuplicateNamePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Terminate every instance named `name` and drop its DNS record.
    ///
    /// DANGER: with `DuplicateNamePolicy::TerminateAll`, all same-named
    /// instances go down together. Returns how many instances were targeted,
    /// not how many have finished terminating. If termination fails after DNS
    /// removal, nothing is restored.
    pub async fn terminate_instances(&self, name: &str, wait: &WaitOptions) -> Result<usize> {
        let matching = self.inventory.list_instances().await?.into_matching(name);
        tracing::info!("Matching instances for '{}': {:?}", name, matching);

        if matching.is_empty() {
            return Ok(0);
        }

        if matching.len() > 1 && self.policy == DuplicateNamePolicy::RejectAmbiguous {
            return Err(CloudError::AmbiguousName {
                name: name.to_string(),
                count: matching.len(),
            });
        }

        self.countdown(wait).await?;

        tracing::info!("Removing DNS");
        for instance in &matching {
            if !instance.is_addressable() {
                tracing::warn!(
                    "Instance {} has no public address; skipping DNS removal",
                    instance.instance_id
                );
                continue;
            }
            self.dns
                .delete_record(name, &self.domain, &instance.public_address, wait)
                .await?;
        }

        tracing::info!("Terminating");
        let instance_ids: Vec<String> = matching.iter().map(|i| i.instance_id.clone()).collect();
        self.compute.terminate_instances(&instance_ids).await?;

        Ok(matching.len())
    }

    async fn countdown(&self, wait: &WaitOptions) -> Result<()> {
        let waiting_for = "termination grace period";
        let whole_secs = self.grace.as_secs();

        for remaining in (1..=whole_secs).rev() {
            tracing::info!("{}", remaining);
            wait.sleep(Duration::from_secs(1), waiting_for).await?;
        }

        let rest = self.grace - Duration::from_secs(whole_secs);
        if !rest.is_zero() {
            wait.sleep(rest, waiting_for).await?;
        }
        Ok(())
    }
}
