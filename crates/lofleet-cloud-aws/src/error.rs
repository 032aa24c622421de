//! Conversion of SDK failures into orchestrator errors

use aws_sdk_ec2::error::DisplayErrorContext;
use lofleet_cloud::CloudError;

/// Wrap any SDK failure as a provider error, keeping the full source chain
pub(crate) fn provider_error<E: std::error::Error>(operation: &str, err: E) -> CloudError {
    CloudError::Provider(format!("{}: {}", operation, DisplayErrorContext(err)))
}
