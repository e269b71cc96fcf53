//! Abstract interfaces consumed by the rotation engine.
//!
//! These traits define the contracts for:
//! - Volume snapshot service (list/create/delete, launch template reads)
//! - Durable parameter store (active snapshot bookkeeping)

pub mod parameter_store;
pub mod snapshot_service;

pub use parameter_store::ParameterStore;
pub use snapshot_service::{
    BlockDeviceMapping, Result, ServiceError, Snapshot, SnapshotService,
};
