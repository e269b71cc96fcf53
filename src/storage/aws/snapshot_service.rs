//! EC2-backed snapshot service.
//!
//! Snapshots are classified with a `type` tag holding the policy tag; list
//! queries filter on it and scope to snapshots owned by the calling account.

use async_trait::async_trait;
use aws_sdk_ec2::primitives::DateTime as SmithyDateTime;
use aws_sdk_ec2::types::{Filter, ResourceType, Tag, TagSpecification};
use aws_sdk_ec2::Client;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::interfaces::{BlockDeviceMapping, Result, ServiceError, Snapshot, SnapshotService};

/// Tag key classifying this policy's snapshots.
const TAG_KEY: &str = "type";

/// EC2-based snapshot service.
pub struct Ec2SnapshotService {
    client: Client,
}

impl Ec2SnapshotService {
    /// Create a new EC2 snapshot service from the default AWS environment.
    pub async fn new() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&config),
        }
    }

    /// Create with explicit client (for custom endpoints or testing).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SnapshotService for Ec2SnapshotService {
    async fn list_snapshots(&self, tag: &str) -> Result<Vec<Snapshot>> {
        let mut snapshots = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .describe_snapshots()
                .filters(
                    Filter::builder()
                        .name(format!("tag:{TAG_KEY}"))
                        .values(tag)
                        .build(),
                )
                .owner_ids("self");

            if let Some(token) = &next_token {
                request = request.next_token(token);
            }

            let response = request.send().await.map_err(|e| ServiceError::Call {
                operation: "DescribeSnapshots",
                message: e.to_string(),
            })?;

            for raw in response.snapshots() {
                snapshots.push(convert_snapshot(raw)?);
            }

            next_token = response.next_token().map(|s| s.to_string());
            if next_token.is_none() {
                break;
            }
        }

        debug!(tag = %tag, count = snapshots.len(), "described snapshots");
        Ok(snapshots)
    }

    async fn create_snapshot(&self, volume_id: &str, tag: &str) -> Result<Snapshot> {
        let response = self
            .client
            .create_snapshot()
            .volume_id(volume_id)
            .tag_specifications(
                TagSpecification::builder()
                    .resource_type(ResourceType::Snapshot)
                    .tags(Tag::builder().key(TAG_KEY).value(tag).build())
                    .build(),
            )
            .send()
            .await
            .map_err(|e| ServiceError::Call {
                operation: "CreateSnapshot",
                message: e.to_string(),
            })?;

        let id = response
            .snapshot_id()
            .ok_or_else(|| ServiceError::MalformedResponse {
                operation: "CreateSnapshot",
                message: "response without snapshot id".to_string(),
            })?
            .to_string();

        let created_at = match response.start_time() {
            Some(ts) => to_utc(ts, "CreateSnapshot")?,
            // The request was accepted; treat the response instant as the
            // creation time.
            None => Utc::now(),
        };

        Ok(Snapshot {
            id,
            created_at,
            tag: tag.to_string(),
        })
    }

    async fn delete_snapshot(&self, id: &str) -> Result<()> {
        self.client
            .delete_snapshot()
            .snapshot_id(id)
            .send()
            .await
            .map_err(|e| ServiceError::Call {
                operation: "DeleteSnapshot",
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn launch_template_device_mappings(
        &self,
        instance_id: &str,
    ) -> Result<Vec<BlockDeviceMapping>> {
        let response = self
            .client
            .get_launch_template_data()
            .instance_id(instance_id)
            .send()
            .await
            .map_err(|e| ServiceError::Call {
                operation: "GetLaunchTemplateData",
                message: e.to_string(),
            })?;

        let mappings = response
            .launch_template_data()
            .map(|data| data.block_device_mappings())
            .unwrap_or_default()
            .iter()
            .filter_map(|mapping| {
                mapping.device_name().map(|device_name| BlockDeviceMapping {
                    device_name: device_name.to_string(),
                    snapshot_id: mapping
                        .ebs()
                        .and_then(|ebs| ebs.snapshot_id())
                        .map(|s| s.to_string()),
                })
            })
            .collect();

        Ok(mappings)
    }
}

/// Convert a raw EC2 snapshot record into the engine's value type.
fn convert_snapshot(raw: &aws_sdk_ec2::types::Snapshot) -> Result<Snapshot> {
    let id = raw
        .snapshot_id()
        .ok_or_else(|| ServiceError::MalformedResponse {
            operation: "DescribeSnapshots",
            message: "snapshot record without id".to_string(),
        })?
        .to_string();

    let start_time = raw
        .start_time()
        .ok_or_else(|| ServiceError::MalformedResponse {
            operation: "DescribeSnapshots",
            message: format!("snapshot {id} without start time"),
        })?;
    let created_at = to_utc(start_time, "DescribeSnapshots")?;

    let tag = raw
        .tags()
        .iter()
        .find(|t| t.key() == Some(TAG_KEY))
        .and_then(|t| t.value())
        .unwrap_or_default()
        .to_string();

    Ok(Snapshot {
        id,
        created_at,
        tag,
    })
}

/// Normalize a service timestamp to UTC.
fn to_utc(ts: &SmithyDateTime, operation: &'static str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos()).ok_or_else(|| {
        ServiceError::MalformedResponse {
            operation,
            message: format!("timestamp out of range: {ts}"),
        }
    })
}
