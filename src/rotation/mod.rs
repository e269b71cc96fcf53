//! Rotation engine.
//!
//! One read-decide-act cycle per [`RotationEngine::run`] call: enumerate the
//! policy's snapshots, compute the protected set, create a replacement if
//! every existing snapshot is stale, purge expired unprotected snapshots,
//! and report the active snapshot. All cross-run state lives in the external
//! services.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::{ResolvedIdentity, RotationConfig};
use crate::interfaces::{ParameterStore, ServiceError, Snapshot, SnapshotService};

/// Errors surfaced by a rotation run.
///
/// Protected-set lookups are recovered internally; every other capability
/// failure surfaces here with the failing operation's context.
#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    #[error("Failed to list snapshots for tag {tag}: {source}")]
    List { tag: String, source: ServiceError },

    #[error("Failed to create snapshot of volume {volume_id}: {source}")]
    Create {
        volume_id: String,
        source: ServiceError,
    },

    #[error("Failed to record active snapshot {id}: {source}")]
    Record { id: String, source: ServiceError },

    #[error("Purge incomplete: {} of {} deletions failed", .failures.len(), .attempted)]
    Purge {
        attempted: usize,
        failures: Vec<(String, ServiceError)>,
    },
}

/// Outcome of a rotation run.
#[derive(Debug, Clone)]
pub struct RotationReport {
    /// The newly created snapshot if one was created, otherwise the most
    /// recent pre-existing snapshot, otherwise `None`.
    pub snapshot: Option<Snapshot>,
    /// Whether this run created a snapshot.
    pub created: bool,
    /// Ids of the snapshots deleted by this run.
    pub purged: Vec<String>,
}

/// Orchestrates snapshot rotation against the injected capability handles.
///
/// Stateless across calls; safe to run back to back (a just-created snapshot
/// is fresh, so the second run creates nothing).
pub struct RotationEngine {
    snapshots: Arc<dyn SnapshotService>,
    params: Arc<dyn ParameterStore>,
    config: RotationConfig,
    identity: ResolvedIdentity,
}

impl RotationEngine {
    /// Create an engine with explicit capability handles.
    pub fn new(
        snapshots: Arc<dyn SnapshotService>,
        params: Arc<dyn ParameterStore>,
        config: RotationConfig,
        identity: ResolvedIdentity,
    ) -> Self {
        Self {
            snapshots,
            params,
            config,
            identity,
        }
    }

    /// Run one rotation cycle: enumerate, protect, create, purge, report.
    pub async fn run(&self) -> Result<RotationReport, RotationError> {
        let now = Utc::now();
        let tag = self.config.tag();

        let existing = self
            .snapshots
            .list_snapshots(&tag)
            .await
            .map_err(|source| RotationError::List {
                tag: tag.clone(),
                source,
            })?;
        debug!(tag = %tag, count = existing.len(), "listed snapshots");

        let protected = self.protected_ids(&tag).await;
        let created = self.create_if_stale(&tag, &existing, now).await?;
        let purged = self.purge(&existing, &protected, now).await?;

        let snapshot = created
            .clone()
            .or_else(|| most_recent(&existing).cloned());
        Ok(RotationReport {
            snapshot,
            created: created.is_some(),
            purged,
        })
    }

    /// Snapshot ids that purge must never delete.
    ///
    /// Union of two independent lookups: the id recorded in the parameter
    /// store, and the id backing the configured device in the instance's
    /// launch template. Either lookup failing contributes nothing.
    async fn protected_ids(&self, tag: &str) -> HashSet<String> {
        let mut protected = HashSet::new();

        match self.params.get_parameter(tag).await {
            Ok(id) => {
                protected.insert(id);
            }
            Err(e) => warn!(parameter = %tag, error = %e, "active snapshot parameter unavailable"),
        }

        if let Some(instance_id) = &self.identity.instance_id {
            match self
                .snapshots
                .launch_template_device_mappings(instance_id)
                .await
            {
                Ok(mappings) => {
                    if let Some(mapping) = mappings
                        .iter()
                        .find(|m| m.device_name == self.config.device_name)
                    {
                        if let Some(id) = &mapping.snapshot_id {
                            protected.insert(id.clone());
                        }
                    }
                }
                Err(e) => {
                    warn!(instance = %instance_id, error = %e, "launch template lookup failed")
                }
            }
        }

        protected
    }

    /// Create a snapshot if every existing one is older than the freshness
    /// threshold, then record its id as the active reference.
    ///
    /// An empty snapshot list always triggers a create. The parameter store
    /// write happens only after the service accepted the create request.
    async fn create_if_stale(
        &self,
        tag: &str,
        existing: &[Snapshot],
        now: DateTime<Utc>,
    ) -> Result<Option<Snapshot>, RotationError> {
        let all_stale = existing
            .iter()
            .all(|s| is_older_than(s, now, self.config.snapshot_days));
        if !all_stale {
            debug!("at least one snapshot is fresh, skipping create");
            return Ok(None);
        }

        let Some(volume_id) = &self.identity.volume_id else {
            warn!("snapshots are stale but no volume id is resolved, skipping create");
            return Ok(None);
        };

        // The service preserves the volume's prior state while the snapshot
        // is in progress; no need to wait for completed status.
        let snapshot = self
            .snapshots
            .create_snapshot(volume_id, tag)
            .await
            .map_err(|source| RotationError::Create {
                volume_id: volume_id.clone(),
                source,
            })?;

        self.params
            .put_parameter(tag, &snapshot.id)
            .await
            .map_err(|source| RotationError::Record {
                id: snapshot.id.clone(),
                source,
            })?;

        info!(id = %snapshot.id, volume = %volume_id, "created snapshot");
        Ok(Some(snapshot))
    }

    /// Delete every listed snapshot older than the retention threshold that
    /// is not protected.
    ///
    /// Deletions fan out concurrently; each failure is logged and collected,
    /// never blocking the remaining deletions. Failures aggregate into a
    /// single error after the sweep.
    async fn purge(
        &self,
        existing: &[Snapshot],
        protected: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, RotationError> {
        let purgeable: Vec<&Snapshot> = existing
            .iter()
            .filter(|s| {
                is_older_than(s, now, self.config.max_snapshot_days) && !protected.contains(&s.id)
            })
            .collect();

        if purgeable.is_empty() {
            return Ok(Vec::new());
        }

        let attempted = purgeable.len();
        let results = join_all(purgeable.into_iter().map(|snapshot| {
            let service = Arc::clone(&self.snapshots);
            async move {
                service
                    .delete_snapshot(&snapshot.id)
                    .await
                    .map(|()| snapshot.id.clone())
                    .map_err(|e| (snapshot.id.clone(), e))
            }
        }))
        .await;

        let mut purged = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(id) => {
                    debug!(id = %id, "deleted snapshot");
                    purged.push(id);
                }
                Err((id, e)) => {
                    warn!(id = %id, error = %e, "failed to delete snapshot");
                    failures.push((id, e));
                }
            }
        }

        if !failures.is_empty() {
            return Err(RotationError::Purge {
                attempted,
                failures,
            });
        }

        info!(deleted = purged.len(), "purged expired snapshots");
        Ok(purged)
    }
}

/// Whether the snapshot's age strictly exceeds `num_days`.
fn is_older_than(snapshot: &Snapshot, now: DateTime<Utc>, num_days: i64) -> bool {
    now - snapshot.created_at > Duration::days(num_days)
}

/// The snapshot with the greatest `created_at`.
///
/// Ties keep the first-seen occurrence (strict `>` scan).
fn most_recent(snapshots: &[Snapshot]) -> Option<&Snapshot> {
    let mut best: Option<&Snapshot> = None;
    for snapshot in snapshots {
        match best {
            Some(current) if snapshot.created_at > current.created_at => best = Some(snapshot),
            None => best = Some(snapshot),
            _ => {}
        }
    }
    best
}
