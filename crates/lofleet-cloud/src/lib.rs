//! lofleet instance lifecycle and DNS orchestration
//!
//! Provisions small compute instances for the `learning-observer`
//! deployment, lists them by deployment tag, keeps one address record per
//! instance in sync, and tears instances down together with their records.
//!
//! # Architecture
//!
//! ```text
//!                    ┌──────────────────┐
//!                    │  Decommissioner  │
//!                    └───┬──────────┬───┘
//!                        │          │
//! ┌─────────────┐ ┌──────▼──────┐ ┌─▼───────────────┐
//! │ Provisioner │ │  Inventory  │ │ DnsSynchronizer │
//! └──────┬──────┘ └──────┬──────┘ └────────┬────────┘
//!        │               │                 │
//! ┌──────▼───────────────▼──────┐ ┌────────▼────────┐
//! │       trait ComputeApi      │ │  trait DnsApi   │
//! └─────────────────────────────┘ └─────────────────┘
//!         lofleet-cloud-aws (EC2 / Route 53)
//! ```
//!
//! Operations are sequential: each awaits one provider call at a time and
//! re-queries the provider instead of caching state. Concurrent calls for the
//! same name or subdomain must be serialized by the caller.

pub mod decommission;
pub mod dns;
pub mod error;
pub mod inventory;
pub mod model;
pub mod provider;
pub mod provisioner;
pub mod wait;

// Re-exports
pub use decommission::{Decommissioner, DuplicateNamePolicy};
pub use dns::DnsSynchronizer;
pub use error::{CloudError, Result};
pub use inventory::{Inventory, InventorySnapshot};
pub use model::{
    ChangeInfo, ChangeStatus, DnsRecord, HostedZone, Instance, InstanceState, InstanceSummary,
    LaunchRequest, LaunchSettings, MISSING_ADDRESS, RecordAction, Reservation, Tags,
};
pub use provider::{ComputeApi, DnsApi};
pub use provisioner::Provisioner;
pub use tokio_util::sync::CancellationToken;
pub use wait::WaitOptions;
