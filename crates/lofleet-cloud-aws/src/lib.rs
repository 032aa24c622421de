//! AWS provider for lofleet
//!
//! Implements [`ComputeApi`](lofleet_cloud::ComputeApi) on EC2 and
//! [`DnsApi`](lofleet_cloud::DnsApi) on Route 53.
//!
//! # Requirements
//!
//! Credentials and region are resolved by the standard AWS chain
//! (`AWS_PROFILE`, `AWS_ACCESS_KEY_ID`, `~/.aws/config`, ...).
//!
//! # Example
//!
//! ```ignore
//! use lofleet_cloud_aws::AwsClients;
//! use lofleet_cloud::{Inventory, WaitOptions};
//! use std::sync::Arc;
//!
//! let aws = AwsClients::from_env(Some("us-east-1".to_string())).await;
//! let inventory = Inventory::new(Arc::new(aws.compute()));
//! for instance in inventory.list_instances().await? {
//!     println!("{} {}", instance.instance_id, instance.public_address);
//! }
//! ```

mod error;
pub mod ec2;
pub mod route53;

pub use ec2::Ec2Compute;
pub use route53::Route53Dns;

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Shared SDK configuration for the EC2 and Route 53 clients
#[derive(Clone)]
pub struct AwsClients {
    config: SdkConfig,
}

impl AwsClients {
    /// Load credentials from the environment; `region` overrides the
    /// configured default region
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;
        tracing::debug!("AWS region: {:?}", config.region());
        Self { config }
    }

    pub fn compute(&self) -> Ec2Compute {
        Ec2Compute::new(aws_sdk_ec2::Client::new(&self.config))
    }

    pub fn dns(&self) -> Route53Dns {
        Route53Dns::new(aws_sdk_route53::Client::new(&self.config))
    }
}
