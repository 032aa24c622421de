//! Route 53 DNS API

use crate::error::provider_error;
use async_trait::async_trait;
use aws_sdk_route53::Client;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use lofleet_cloud::{
    ChangeInfo, ChangeStatus, CloudError, DnsApi, DnsRecord, HostedZone, RecordAction, Result,
};

/// Route 53-backed [`DnsApi`]
pub struct Route53Dns {
    client: Client,
}

impl Route53Dns {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn change_action(action: RecordAction) -> ChangeAction {
    match action {
        RecordAction::Upsert => ChangeAction::Upsert,
        RecordAction::Delete => ChangeAction::Delete,
    }
}

fn to_change_info(
    operation: &str,
    info: Option<&aws_sdk_route53::types::ChangeInfo>,
) -> Result<ChangeInfo> {
    let info = info.ok_or_else(|| {
        CloudError::Provider(format!("{}: response carried no change info", operation))
    })?;

    let status = match info.status() {
        aws_sdk_route53::types::ChangeStatus::Insync => ChangeStatus::InSync,
        _ => ChangeStatus::Pending,
    };
    Ok(ChangeInfo {
        id: info.id().to_string(),
        status,
    })
}

/// The single-change batch for one `A` record
fn change_batch(action: RecordAction, record: &DnsRecord) -> Result<ChangeBatch> {
    let build = |e| provider_error("ChangeResourceRecordSets", e);

    let value = ResourceRecord::builder()
        .value(record.value.to_string())
        .build()
        .map_err(build)?;
    let record_set = ResourceRecordSet::builder()
        .name(&record.name)
        .r#type(RrType::A)
        .ttl(record.ttl)
        .resource_records(value)
        .build()
        .map_err(build)?;
    let change = Change::builder()
        .action(change_action(action))
        .resource_record_set(record_set)
        .build()
        .map_err(build)?;

    ChangeBatch::builder().changes(change).build().map_err(build)
}

#[async_trait]
impl DnsApi for Route53Dns {
    async fn list_hosted_zones_by_name(&self, domain: &str) -> Result<Vec<HostedZone>> {
        let output = self
            .client
            .list_hosted_zones_by_name()
            .dns_name(domain)
            .send()
            .await
            .map_err(|e| provider_error("ListHostedZonesByName", e))?;

        Ok(output
            .hosted_zones()
            .iter()
            .map(|z| HostedZone {
                id: z.id().to_string(),
                name: z.name().to_string(),
            })
            .collect())
    }

    async fn change_record(
        &self,
        zone_id: &str,
        action: RecordAction,
        record: &DnsRecord,
    ) -> Result<ChangeInfo> {
        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(change_batch(action, record)?)
            .send()
            .await
            .map_err(|e| provider_error("ChangeResourceRecordSets", e))?;

        to_change_info("ChangeResourceRecordSets", output.change_info())
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo> {
        let output = self
            .client
            .get_change()
            .id(change_id)
            .send()
            .await
            .map_err(|e| provider_error("GetChange", e))?;

        to_change_info("GetChange", output.change_info())
    }
}
