//! Snapcycle - block-storage snapshot rotation
//!
//! Automates snapshot lifecycle for a single persistent volume: creates a
//! new snapshot when the existing ones are stale, records the active
//! snapshot id in a durable parameter store, and purges snapshots beyond
//! the retention window while protecting in-use snapshots from deletion.

pub mod bootstrap;
pub mod config;
pub mod interfaces;
pub mod rotation;
pub mod storage;

pub use config::{ResolvedIdentity, RotationConfig};
pub use interfaces::{BlockDeviceMapping, ParameterStore, ServiceError, Snapshot, SnapshotService};
pub use rotation::{RotationEngine, RotationError, RotationReport};
