pub mod create;
pub mod dns;
pub mod list;
pub mod pool;
pub mod terminate;

use anyhow::Context as _;
use lofleet_cloud::{
    CancellationToken, ComputeApi, Decommissioner, DnsApi, DnsSynchronizer, DuplicateNamePolicy,
    Inventory, Provisioner, WaitOptions,
};
use lofleet_cloud_aws::AwsClients;
use lofleet_config::Settings;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Settings, provider clients and wait options shared by every command
pub struct Context {
    pub settings: Settings,
    compute: Arc<dyn ComputeApi>,
    dns: Arc<dyn DnsApi>,
    pub wait: WaitOptions,
}

impl Context {
    pub async fn load(config: Option<&Path>, timeout: Option<u64>) -> anyhow::Result<Self> {
        let settings = Settings::discover(config).context("Failed to load credentials")?;
        let aws = AwsClients::from_env(settings.region.clone()).await;

        // Ctrl-C cancels the running command, see `interruptible`
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted; cancelling");
                on_interrupt.cancel();
            }
        });

        let mut wait = WaitOptions::new().with_cancellation(cancel);
        if let Some(secs) = timeout {
            wait = wait.with_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            settings,
            compute: Arc::new(aws.compute()),
            dns: Arc::new(aws.dns()),
            wait,
        })
    }

    pub fn provisioner(&self) -> Provisioner {
        Provisioner::new(self.compute.clone(), self.settings.launch_settings())
            .with_poll_interval(self.settings.instance_poll_interval())
    }

    pub fn inventory(&self) -> Inventory {
        Inventory::new(self.compute.clone())
    }

    pub fn dns_sync(&self) -> DnsSynchronizer {
        DnsSynchronizer::new(self.dns.clone()).with_poll_interval(self.settings.dns_poll_interval())
    }

    pub fn decommissioner(&self, policy: DuplicateNamePolicy) -> Decommissioner {
        Decommissioner::new(self.compute.clone(), self.dns_sync(), &self.settings.domain)
            .with_policy(policy)
            .with_grace(self.settings.termination_grace())
    }
}

/// Drive `command` to completion unless `cancel` fires first
///
/// Waits already stop on cancellation by themselves; this also covers
/// plain provider calls such as `list` or a hung request.
pub async fn interruptible<T>(
    cancel: &CancellationToken,
    command: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    tokio::select! {
        biased;
        result = command => result,
        _ = cancel.cancelled() => Err(anyhow::anyhow!("Interrupted")),
    }
}
