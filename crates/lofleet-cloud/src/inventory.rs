//! Deployment inventory
//!
//! Every query goes back to the provider; nothing is cached between calls.

use crate::error::Result;
use crate::model::{DEPLOY_GROUP, DEPLOY_GROUP_TAG, InstanceSummary};
use crate::provider::ComputeApi;
use std::sync::Arc;

/// Lists the instances tagged as belonging to this deployment
#[derive(Clone)]
pub struct Inventory {
    compute: Arc<dyn ComputeApi>,
}

impl Inventory {
    pub fn new(compute: Arc<dyn ComputeApi>) -> Self {
        Self { compute }
    }

    /// Query the provider for every deployment instance, in provider order.
    ///
    /// Terminated instances are included until the provider forgets them.
    pub async fn list_instances(&self) -> Result<InventorySnapshot> {
        let reservations = self
            .compute
            .describe_instances_by_tag(DEPLOY_GROUP_TAG, DEPLOY_GROUP)
            .await?;

        let summaries: Vec<InstanceSummary> = reservations
            .into_iter()
            .flat_map(|r| r.instances)
            .map(InstanceSummary::from)
            .collect();

        tracing::debug!("Inventory: {} instances", summaries.len());
        Ok(InventorySnapshot { summaries })
    }

    /// All instances whose `Name` tag equals `name`, duplicates included
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<InstanceSummary>> {
        Ok(self.list_instances().await?.into_matching(name))
    }

    /// Space-separated public addresses of the instances named `name`,
    /// the host pool handed to remote-execution tooling
    pub async fn address_pool(&self, name: &str) -> Result<String> {
        let pool = self
            .find_by_name(name)
            .await?
            .into_iter()
            .map(|i| i.public_address)
            .collect::<Vec<_>>()
            .join(" ");

        tracing::debug!("Address pool for {}: {}", name, pool);
        Ok(pool)
    }
}

/// One immutable inventory result
///
/// Selecting by name consumes the snapshot, so a stale view cannot be
/// consulted again after acting on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    summaries: Vec<InstanceSummary>,
}

impl InventorySnapshot {
    pub fn new(summaries: Vec<InstanceSummary>) -> Self {
        Self { summaries }
    }

    pub fn summaries(&self) -> &[InstanceSummary] {
        &self.summaries
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Keep only the instances named `name`
    pub fn into_matching(self, name: &str) -> Vec<InstanceSummary> {
        self.summaries
            .into_iter()
            .filter(|i| i.name() == Some(name))
            .collect()
    }
}

impl IntoIterator for InventorySnapshot {
    type Item = InstanceSummary;
    type IntoIter = std::vec::IntoIter<InstanceSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.summaries.into_iter()
    }
}
