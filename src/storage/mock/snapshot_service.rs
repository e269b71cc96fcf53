//! Mock SnapshotService implementation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::interfaces::{BlockDeviceMapping, Result, ServiceError, Snapshot, SnapshotService};

/// Mock snapshot service that keeps snapshots in memory.
#[derive(Default)]
pub struct MockSnapshotService {
    snapshots: RwLock<Vec<Snapshot>>,
    mappings: RwLock<Vec<BlockDeviceMapping>>,
    fail_deletes: RwLock<HashSet<String>>,
    fail_launch_template: RwLock<bool>,
    next_id: AtomicUsize,
}

impl MockSnapshotService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pre-existing snapshot.
    pub async fn push_snapshot(&self, snapshot: Snapshot) {
        self.snapshots.write().await.push(snapshot);
    }

    /// Ids of every stored snapshot, in insertion order.
    pub async fn snapshot_ids(&self) -> Vec<String> {
        self.snapshots
            .read()
            .await
            .iter()
            .map(|s| s.id.clone())
            .collect()
    }

    pub async fn stored_count(&self) -> usize {
        self.snapshots.read().await.len()
    }

    /// Set the launch template block device mappings.
    pub async fn set_device_mappings(&self, mappings: Vec<BlockDeviceMapping>) {
        *self.mappings.write().await = mappings;
    }

    /// Make every delete of the given id fail.
    pub async fn fail_delete(&self, id: &str) {
        self.fail_deletes.write().await.insert(id.to_string());
    }

    /// Make launch template lookups fail.
    pub async fn fail_launch_template(&self) {
        *self.fail_launch_template.write().await = true;
    }
}

#[async_trait]
impl SnapshotService for MockSnapshotService {
    async fn list_snapshots(&self, tag: &str) -> Result<Vec<Snapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.iter().filter(|s| s.tag == tag).cloned().collect())
    }

    async fn create_snapshot(&self, _volume_id: &str, tag: &str) -> Result<Snapshot> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Snapshot {
            id: format!("snap-{n:04}"),
            created_at: Utc::now(),
            tag: tag.to_string(),
        };
        self.snapshots.write().await.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn delete_snapshot(&self, id: &str) -> Result<()> {
        if self.fail_deletes.read().await.contains(id) {
            return Err(ServiceError::Call {
                operation: "DeleteSnapshot",
                message: format!("injected failure for {id}"),
            });
        }
        // Deleting an absent id succeeds, like the real service treats
        // repeated deletes.
        self.snapshots.write().await.retain(|s| s.id != id);
        Ok(())
    }

    async fn launch_template_device_mappings(
        &self,
        _instance_id: &str,
    ) -> Result<Vec<BlockDeviceMapping>> {
        if *self.fail_launch_template.read().await {
            return Err(ServiceError::Call {
                operation: "GetLaunchTemplateData",
                message: "injected failure".to_string(),
            });
        }
        Ok(self.mappings.read().await.clone())
    }
}
