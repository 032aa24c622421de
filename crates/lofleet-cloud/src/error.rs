//! Orchestrator error types

use thiserror::Error;

/// Errors surfaced by the lifecycle and DNS operations
#[derive(Error, Debug)]
pub enum CloudError {
    /// The provider rejected the launch, or the instance never became usable
    #[error("Provisioning failed: {0}")]
    Provision(String),

    /// Zero or several hosted zones carry the requested domain name
    #[error("Expected exactly one hosted zone named {domain}, found {count}")]
    ZoneResolution { domain: String, count: usize },

    /// Any other provider call failure, passed through as reported
    #[error("Provider API error: {0}")]
    Provider(String),

    #[error("Instance not found: {0}")]
    InstanceNotFound(String),

    #[error("{count} instances are named '{name}'; refusing to terminate an ambiguous match")]
    AmbiguousName { name: String, count: usize },

    #[error("Cancelled while waiting for {0}")]
    Cancelled(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CloudError>;
