//! Volume snapshot service interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result type for capability calls.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur during capability calls.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    #[error("{operation} failed: {message}")]
    Call {
        operation: &'static str,
        message: String,
    },

    #[error("Malformed {operation} response: {message}")]
    MalformedResponse {
        operation: &'static str,
        message: String,
    },
}

/// Point-in-time copy of a volume.
///
/// Built at the conversion boundary from raw service records; never a
/// pass-through of the service's own response shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Opaque identifier assigned by the storage service.
    pub id: String,
    /// Creation time, normalized to UTC.
    pub created_at: DateTime<Utc>,
    /// Policy classification tag.
    pub tag: String,
}

/// One entry of a launch template's block device mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDeviceMapping {
    pub device_name: String,
    /// Snapshot backing the device, if any.
    pub snapshot_id: Option<String>,
}

/// Interface for volume snapshot operations.
///
/// Implementations:
/// - `Ec2SnapshotService`: Amazon EC2 (feature `aws`)
/// - `MockSnapshotService`: in-memory, for tests and non-live runs
#[async_trait]
pub trait SnapshotService: Send + Sync {
    /// List every snapshot carrying the given policy tag, owned by the
    /// calling account. Implementations enumerate fully, following the
    /// service's pagination until exhaustion.
    async fn list_snapshots(&self, tag: &str) -> Result<Vec<Snapshot>>;

    /// Request a new snapshot of the volume, classified with the policy tag.
    ///
    /// Returns as soon as the service accepts the request; the volume's
    /// prior state is preserved while the snapshot is in progress.
    async fn create_snapshot(&self, volume_id: &str, tag: &str) -> Result<Snapshot>;

    /// Delete a snapshot by id.
    async fn delete_snapshot(&self, id: &str) -> Result<()>;

    /// Read the block device mappings of the instance's launch template.
    async fn launch_template_device_mappings(
        &self,
        instance_id: &str,
    ) -> Result<Vec<BlockDeviceMapping>>;
}
