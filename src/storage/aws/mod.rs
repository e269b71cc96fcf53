//! Amazon EC2 + SSM capability backends.
//!
//! Uses default credentials from the environment (AWS_ACCESS_KEY_ID,
//! AWS_SECRET_ACCESS_KEY, or IAM role).

mod parameter_store;
mod snapshot_service;

pub use parameter_store::SsmParameterStore;
pub use snapshot_service::Ec2SnapshotService;
