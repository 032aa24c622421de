//! Instance creation

use crate::error::{CloudError, Result};
use crate::model::{Instance, InstanceState, LaunchRequest, LaunchSettings};
use crate::provider::ComputeApi;
use crate::wait::{DEFAULT_INSTANCE_POLL_INTERVAL, WaitOptions};
use std::sync::Arc;
use std::time::Duration;

/// Launches instances with the fixed deployment profile
pub struct Provisioner {
    compute: Arc<dyn ComputeApi>,
    settings: LaunchSettings,
    poll_interval: Duration,
}

impl Provisioner {
    pub fn new(compute: Arc<dyn ComputeApi>, settings: LaunchSettings) -> Self {
        Self {
            compute,
            settings,
            poll_interval: DEFAULT_INSTANCE_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Launch an instance tagged `Name=<name>` and wait until it is running
    /// with a public address.
    ///
    /// Names are not checked for uniqueness. Nothing is rolled back on
    /// failure: an instance that was launched but never became usable keeps
    /// running, and its id is part of the error.
    pub async fn create_instance(&self, name: &str, wait: &WaitOptions) -> Result<Instance> {
        if name.trim().is_empty() {
            return Err(CloudError::InvalidConfig(
                "instance name must not be empty".to_string(),
            ));
        }

        let request = LaunchRequest::new(name, &self.settings);
        let instance_id = self
            .compute
            .run_instance(&request)
            .await
            .map_err(|e| match e {
                CloudError::Provider(msg) => {
                    CloudError::Provision(format!("launch of '{}' rejected: {}", name, msg))
                }
                other => other,
            })?;
        tracing::info!("Requested instance {} ({})", instance_id, name);

        let instance = match self.await_address(&instance_id, wait).await {
            Ok(instance) => instance,
            Err(e) => {
                tracing::warn!("Instance {} was launched but is not usable: {}", instance_id, e);
                return Err(e);
            }
        };

        tracing::info!("Launched {}", instance.id);
        if let Some(address) = instance.public_address {
            tracing::info!("IP: {}", address);
        }
        Ok(instance)
    }

    /// Wait for `running`, then re-read to pick up the public address
    async fn await_address(&self, instance_id: &str, wait: &WaitOptions) -> Result<Instance> {
        self.wait_until_running(instance_id, wait).await?;

        // The launch response does not reliably carry the public address
        let instance = self.compute.describe_instance(instance_id).await?;
        if instance.public_address.is_none() {
            return Err(CloudError::Provision(format!(
                "instance {} is running but has no public address",
                instance_id
            )));
        }
        Ok(instance)
    }

    async fn wait_until_running(&self, instance_id: &str, wait: &WaitOptions) -> Result<()> {
        let waiting_for = format!("instance {} to reach running state", instance_id);

        loop {
            match self.compute.describe_instance(instance_id).await {
                Ok(instance) => match instance.state {
                    InstanceState::Running => return Ok(()),
                    InstanceState::Stopped | InstanceState::Terminated => {
                        return Err(CloudError::Provision(format!(
                            "instance {} entered state '{}' while starting",
                            instance_id, instance.state
                        )));
                    }
                    InstanceState::Requested => {
                        tracing::debug!("Instance {} still starting", instance_id);
                    }
                },
                // Freshly launched ids can be invisible to describe calls for a while
                Err(CloudError::InstanceNotFound(_)) => {
                    tracing::debug!("Instance {} not visible yet", instance_id);
                }
                Err(e) => return Err(e),
            }

            wait.sleep(self.poll_interval, &waiting_for).await?;
        }
    }
}
