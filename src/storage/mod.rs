//! Capability implementations.

use std::sync::Arc;

#[cfg(not(feature = "aws"))]
use tracing::error;
use tracing::info;

use crate::config::RotationConfig;
use crate::interfaces::{ParameterStore, SnapshotService};

#[cfg(feature = "aws")]
pub mod aws;
pub mod mock;

#[cfg(feature = "aws")]
pub use aws::{Ec2SnapshotService, SsmParameterStore};
pub use mock::{MockParameterStore, MockSnapshotService};

/// Initialize capability handles based on configuration.
///
/// Live configurations (`aws: true`) get the AWS backends; everything else
/// gets in-memory stores, so non-live runs never touch real resources.
pub async fn init_stores(
    config: &RotationConfig,
) -> Result<(Arc<dyn SnapshotService>, Arc<dyn ParameterStore>), Box<dyn std::error::Error>> {
    match config.aws {
        #[cfg(feature = "aws")]
        true => {
            info!("snapshot backend: aws");
            let snapshots = Ec2SnapshotService::new().await;
            let params = SsmParameterStore::new().await;
            Ok((Arc::new(snapshots), Arc::new(params)))
        }
        #[cfg(not(feature = "aws"))]
        true => {
            error!("live mode requested but 'aws' feature is not enabled");
            Err("aws feature not enabled".into())
        }
        false => {
            info!("snapshot backend: in-memory");
            Ok((
                Arc::new(MockSnapshotService::new()),
                Arc::new(MockParameterStore::new()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_stores_non_live_is_in_memory() {
        let config = RotationConfig::for_test();

        let (snapshots, params) = init_stores(&config).await.unwrap();

        assert!(snapshots
            .list_snapshots(&config.tag())
            .await
            .unwrap()
            .is_empty());
        assert!(params.get_parameter(&config.tag()).await.is_err());
    }
}
