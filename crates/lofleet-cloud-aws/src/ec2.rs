//! EC2 compute API

use crate::error::provider_error;
use async_trait::async_trait;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::ProvideErrorMetadata;
use aws_sdk_ec2::types::{
    BlockDeviceMapping, EbsBlockDevice, Filter, InstanceNetworkInterfaceSpecification,
    InstanceType, Placement, ResourceType, Tag, TagSpecification, VolumeType,
};
use lofleet_cloud::{
    CloudError, ComputeApi, Instance, InstanceState, LaunchRequest, Reservation, Result, Tags,
};

const INSTANCE_NOT_FOUND: &str = "InvalidInstanceID.NotFound";

/// EC2-backed [`ComputeApi`]
pub struct Ec2Compute {
    client: Client,
}

impl Ec2Compute {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Convert an SDK instance; instances without an id are dropped
fn to_instance(instance: &aws_sdk_ec2::types::Instance) -> Option<Instance> {
    let id = instance.instance_id()?.to_string();

    let tags: Tags = instance
        .tags()
        .iter()
        .filter_map(|t| Some((t.key()?.to_string(), t.value()?.to_string())))
        .collect();

    let state = instance
        .state()
        .and_then(|s| s.name())
        .map(|name| InstanceState::from_provider(name.as_str()))
        .unwrap_or(InstanceState::Requested);

    Some(Instance {
        id,
        tags,
        public_address: instance.public_ip_address().and_then(|ip| ip.parse().ok()),
        state,
    })
}

fn launch_tags(request: &LaunchRequest) -> TagSpecification {
    let tags: Vec<Tag> = request
        .tags
        .iter()
        .map(|(key, value)| Tag::builder().key(key).value(value).build())
        .collect();

    TagSpecification::builder()
        .resource_type(ResourceType::Instance)
        .set_tags(Some(tags))
        .build()
}

#[async_trait]
impl ComputeApi for Ec2Compute {
    async fn run_instance(&self, request: &LaunchRequest) -> Result<String> {
        let root = &request.root_volume;
        let ebs = EbsBlockDevice::builder()
            .delete_on_termination(root.delete_on_termination)
            .volume_size(root.size_gb)
            .volume_type(VolumeType::from(root.volume_type.as_str()))
            .build();

        let network = &request.network;
        let interface = InstanceNetworkInterfaceSpecification::builder()
            .device_index(network.device_index)
            .subnet_id(&network.subnet_id)
            .associate_public_ip_address(network.associate_public_address)
            .groups(&network.security_group_id)
            .build();

        tracing::debug!(
            "RunInstances {} {} in {}",
            request.image_id,
            request.instance_type,
            request.availability_zone
        );

        let output = self
            .client
            .run_instances()
            .image_id(&request.image_id)
            .instance_type(InstanceType::from(request.instance_type.as_str()))
            .key_name(&request.key_name)
            .min_count(1)
            .max_count(1)
            .placement(
                Placement::builder()
                    .availability_zone(&request.availability_zone)
                    .build(),
            )
            .block_device_mappings(
                BlockDeviceMapping::builder()
                    .device_name(&root.device_name)
                    .ebs(ebs)
                    .build(),
            )
            .network_interfaces(interface)
            .tag_specifications(launch_tags(request))
            .send()
            .await
            .map_err(|e| provider_error("RunInstances", e))?;

        output
            .instances()
            .first()
            .and_then(|i| i.instance_id())
            .map(str::to_string)
            .ok_or_else(|| CloudError::Provision("RunInstances returned no instance".to_string()))
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<Instance> {
        let output = match self
            .client
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if e.code() == Some(INSTANCE_NOT_FOUND) => {
                return Err(CloudError::InstanceNotFound(instance_id.to_string()));
            }
            Err(e) => return Err(provider_error("DescribeInstances", e)),
        };

        output
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .find_map(to_instance)
            .ok_or_else(|| CloudError::InstanceNotFound(instance_id.to_string()))
    }

    async fn describe_instances_by_tag(&self, key: &str, value: &str) -> Result<Vec<Reservation>> {
        let filter = Filter::builder()
            .name(format!("tag:{}", key))
            .values(value)
            .build();

        let mut reservations = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .describe_instances()
                .filters(filter.clone())
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| provider_error("DescribeInstances", e))?;

            reservations.extend(output.reservations().iter().map(|r| Reservation {
                instances: r.instances().iter().filter_map(to_instance).collect(),
            }));

            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        Ok(reservations)
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()> {
        tracing::debug!("TerminateInstances {:?}", instance_ids);

        self.client
            .terminate_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .map_err(|e| provider_error("TerminateInstances", e))?;
        Ok(())
    }
}
