use async_trait::async_trait;
use lofleet_cloud::{
    ChangeInfo, ChangeStatus, CloudError, ComputeApi, DnsApi, DnsRecord, HostedZone, Instance,
    InstanceState, LaunchRequest, LaunchSettings, RecordAction, Reservation, Result, Tags,
};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Mutex;

/// Every provider call the fake has seen, in order
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum Call {
    RunInstance(LaunchRequest),
    DescribeInstance(String),
    DescribeByTag(String, String),
    Terminate(Vec<String>),
    ListZones(String),
    ChangeRecord {
        zone_id: String,
        action: RecordAction,
        record: DnsRecord,
    },
    GetChange(String),
}

#[derive(Default)]
struct FakeState {
    reservations: Vec<Vec<Instance>>,
    launched: u32,
    describes: HashMap<String, u32>,
    zones: Vec<HostedZone>,
    changes: HashMap<String, u32>,
    calls: Vec<Call>,
}

/// In-memory compute + DNS provider
///
/// Launched instances report `pending` for `pending_polls` describe calls,
/// then come up in `start_state` with an address. DNS changes stay `PENDING`
/// for `change_polls - 1` status checks.
pub struct FakeCloud {
    state: Mutex<FakeState>,
    pending_polls: u32,
    invisible_polls: u32,
    start_state: InstanceState,
    assign_addresses: bool,
    change_polls: u32,
    reject_launch: Option<String>,
    fail_describe_from: Option<u32>,
    fail_terminate: bool,
}

#[allow(dead_code)]
impl FakeCloud {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
            pending_polls: 2,
            invisible_polls: 0,
            start_state: InstanceState::Running,
            assign_addresses: true,
            change_polls: 1,
            reject_launch: None,
            fail_describe_from: None,
            fail_terminate: false,
        }
    }

    pub fn with_zone(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().zones.push(HostedZone {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_pending_polls(mut self, polls: u32) -> Self {
        self.pending_polls = polls;
        self
    }

    pub fn with_invisible_polls(mut self, polls: u32) -> Self {
        self.invisible_polls = polls;
        self
    }

    pub fn with_start_state(mut self, state: InstanceState) -> Self {
        self.start_state = state;
        self
    }

    pub fn without_addresses(mut self) -> Self {
        self.assign_addresses = false;
        self
    }

    pub fn with_change_polls(mut self, polls: u32) -> Self {
        self.change_polls = polls;
        self
    }

    pub fn rejecting_launch(mut self, message: &str) -> Self {
        self.reject_launch = Some(message.to_string());
        self
    }

    /// Describe calls fail from the `nth` call per instance onwards
    pub fn failing_describe_from(mut self, nth: u32) -> Self {
        self.fail_describe_from = Some(nth);
        self
    }

    pub fn failing_terminate(mut self) -> Self {
        self.fail_terminate = true;
        self
    }

    /// Seed one reservation of already existing instances
    pub fn with_reservation(self, instances: Vec<Instance>) -> Self {
        self.state.lock().unwrap().reservations.push(instances);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn get_changes(&self) -> usize {
        self.count(|c| matches!(c, Call::GetChange(_)))
    }

    pub fn record_changes(&self) -> Vec<(RecordAction, DnsRecord)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ChangeRecord { action, record, .. } => Some((action, record)),
                _ => None,
            })
            .collect()
    }

    pub fn terminate_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Terminate(ids) => Some(ids),
                _ => None,
            })
            .collect()
    }

    pub fn state_of(&self, instance_id: &str) -> Option<InstanceState> {
        let state = self.state.lock().unwrap();
        state
            .reservations
            .iter()
            .flatten()
            .find(|i| i.id == instance_id)
            .map(|i| i.state)
    }
}

#[async_trait]
impl ComputeApi for FakeCloud {
    async fn run_instance(&self, request: &LaunchRequest) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RunInstance(request.clone()));

        if let Some(message) = &self.reject_launch {
            return Err(CloudError::Provider(message.clone()));
        }

        state.launched += 1;
        let id = format!("i-{:017x}", state.launched);
        state.reservations.push(vec![Instance {
            id: id.clone(),
            tags: request.tags.clone(),
            public_address: None,
            state: InstanceState::Requested,
        }]);
        Ok(id)
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<Instance> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::DescribeInstance(instance_id.to_string()));

        let seen = {
            let count = state.describes.entry(instance_id.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if self.fail_describe_from.is_some_and(|nth| seen >= nth) {
            return Err(CloudError::Provider("RequestLimitExceeded".to_string()));
        }
        if seen <= self.invisible_polls {
            return Err(CloudError::InstanceNotFound(instance_id.to_string()));
        }

        let launched = state.launched;
        let instance = state
            .reservations
            .iter_mut()
            .flatten()
            .find(|i| i.id == instance_id)
            .ok_or_else(|| CloudError::InstanceNotFound(instance_id.to_string()))?;

        if instance.state == InstanceState::Requested
            && seen > self.invisible_polls + self.pending_polls
        {
            instance.state = self.start_state;
            if self.assign_addresses {
                instance.public_address = Some(Ipv4Addr::new(203, 0, 113, launched as u8));
            }
        }
        Ok(instance.clone())
    }

    async fn describe_instances_by_tag(&self, key: &str, value: &str) -> Result<Vec<Reservation>> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::DescribeByTag(key.to_string(), value.to_string()));

        Ok(state
            .reservations
            .iter()
            .map(|instances| Reservation {
                instances: instances
                    .iter()
                    .filter(|i| i.tags.get(key).map(String::as_str) == Some(value))
                    .cloned()
                    .collect(),
            })
            .filter(|r| !r.instances.is_empty())
            .collect())
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Terminate(instance_ids.to_vec()));

        if self.fail_terminate {
            return Err(CloudError::Provider("UnauthorizedOperation".to_string()));
        }

        for instance in state.reservations.iter_mut().flatten() {
            if instance_ids.contains(&instance.id) {
                instance.state = InstanceState::Terminated;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DnsApi for FakeCloud {
    async fn list_hosted_zones_by_name(&self, domain: &str) -> Result<Vec<HostedZone>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListZones(domain.to_string()));
        Ok(state.zones.clone())
    }

    async fn change_record(
        &self,
        zone_id: &str,
        action: RecordAction,
        record: &DnsRecord,
    ) -> Result<ChangeInfo> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ChangeRecord {
            zone_id: zone_id.to_string(),
            action,
            record: record.clone(),
        });

        let id = format!("/change/C{}", state.changes.len() + 1);
        state.changes.insert(id.clone(), 0);
        Ok(ChangeInfo {
            id,
            status: ChangeStatus::Pending,
        })
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetChange(change_id.to_string()));

        let polls = state
            .changes
            .get_mut(change_id)
            .ok_or_else(|| CloudError::Provider(format!("NoSuchChange: {}", change_id)))?;
        *polls += 1;

        let status = if *polls >= self.change_polls {
            ChangeStatus::InSync
        } else {
            ChangeStatus::Pending
        };
        Ok(ChangeInfo {
            id: change_id.to_string(),
            status,
        })
    }
}

#[allow(dead_code)]
pub fn settings() -> LaunchSettings {
    LaunchSettings {
        key_name: "lo-key".to_string(),
        subnet_id: "subnet-1234".to_string(),
        security_group_id: "sg-5678".to_string(),
        owner: "ops".to_string(),
        availability_zone: "us-east-1b".to_string(),
    }
}

/// An existing deployment instance
#[allow(dead_code)]
pub fn instance(id: &str, name: &str, address: Option<Ipv4Addr>) -> Instance {
    let tags: Tags = [
        ("Name", name),
        ("Owner", "ops"),
        ("deploy-group", "learning-observer"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Instance {
        id: id.to_string(),
        tags,
        public_address: address,
        state: InstanceState::Running,
    }
}
