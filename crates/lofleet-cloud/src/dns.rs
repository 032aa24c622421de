//! Address record synchronization
//!
//! Upserts block until the provider reports the change `INSYNC`, so a name
//! can be used right after registration. Deletes return as soon as the
//! change is accepted.

use crate::error::{CloudError, Result};
use crate::model::{ChangeStatus, DnsRecord, HostedZone, RecordAction};
use crate::provider::DnsApi;
use crate::wait::{DEFAULT_DNS_POLL_INTERVAL, WaitOptions};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

/// Registers and removes `<subdomain>.<domain>` address records
#[derive(Clone)]
pub struct DnsSynchronizer {
    dns: Arc<dyn DnsApi>,
    poll_interval: Duration,
}

impl DnsSynchronizer {
    pub fn new(dns: Arc<dyn DnsApi>) -> Self {
        Self {
            dns,
            poll_interval: DEFAULT_DNS_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Point `<subdomain>.<domain>` at `address`, or remove that record when
    /// `unregister` is set.
    ///
    /// Exactly one hosted zone must be named `domain`. Registration polls the
    /// change until it is in sync; removal does not wait. Returns `true` on
    /// success.
    pub async fn register_dns(
        &self,
        subdomain: &str,
        domain: &str,
        address: &str,
        unregister: bool,
        wait: &WaitOptions,
    ) -> Result<bool> {
        let domain = domain.strip_suffix('.').unwrap_or(domain);
        let value: Ipv4Addr = address.parse().map_err(|_| {
            CloudError::InvalidConfig(format!("not an IPv4 address: '{}'", address))
        })?;
        let action = if unregister {
            RecordAction::Delete
        } else {
            RecordAction::Upsert
        };

        let zone = self.resolve_zone(domain).await?;
        let record = DnsRecord::address(subdomain, domain, value);

        tracing::info!(
            "{} {} A {} (zone {})",
            action,
            record.name,
            record.value,
            zone.id
        );
        let mut change = self.dns.change_record(&zone.id, action, &record).await?;

        if unregister {
            return Ok(true);
        }

        let waiting_for = format!("{} to propagate", record.name);
        loop {
            tracing::info!("Propagating DNS.... {}", change.status);
            wait.sleep(self.poll_interval, &waiting_for).await?;
            change = self.dns.get_change(&change.id).await?;
            if change.status == ChangeStatus::InSync {
                break;
            }
        }

        tracing::info!("{} is in sync", record.name);
        Ok(true)
    }

    /// Register and wait for propagation
    pub async fn upsert_record(
        &self,
        subdomain: &str,
        domain: &str,
        address: &str,
        wait: &WaitOptions,
    ) -> Result<bool> {
        self.register_dns(subdomain, domain, address, false, wait).await
    }

    /// Remove without waiting for propagation
    pub async fn delete_record(
        &self,
        subdomain: &str,
        domain: &str,
        address: &str,
        wait: &WaitOptions,
    ) -> Result<bool> {
        self.register_dns(subdomain, domain, address, true, wait).await
    }

    async fn resolve_zone(&self, domain: &str) -> Result<HostedZone> {
        let mut zones: Vec<HostedZone> = self
            .dns
            .list_hosted_zones_by_name(domain)
            .await?
            .into_iter()
            .filter(|z| z.matches(domain))
            .collect();

        if zones.len() != 1 {
            return Err(CloudError::ZoneResolution {
                domain: domain.to_string(),
                count: zones.len(),
            });
        }

        Ok(zones.remove(0))
    }
}
