use chrono::{Duration, Utc};

use super::*;
use crate::interfaces::{ParameterStore, ServiceError, Snapshot, SnapshotService};

fn tagged_snapshot(id: &str, tag: &str) -> Snapshot {
    Snapshot {
        id: id.to_string(),
        created_at: Utc::now() - Duration::days(1),
        tag: tag.to_string(),
    }
}

#[tokio::test]
async fn test_list_filters_by_tag() {
    let service = MockSnapshotService::new();
    service.push_snapshot(tagged_snapshot("snap-a", "prod")).await;
    service.push_snapshot(tagged_snapshot("snap-b", "dev")).await;

    let listed = service.list_snapshots("prod").await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "snap-a");
}

#[tokio::test]
async fn test_create_assigns_id_and_tag() {
    let service = MockSnapshotService::new();

    let first = service.create_snapshot("vol-1", "prod").await.unwrap();
    let second = service.create_snapshot("vol-1", "prod").await.unwrap();

    assert_eq!(first.tag, "prod");
    assert_ne!(first.id, second.id);
    assert_eq!(service.stored_count().await, 2);
}

#[tokio::test]
async fn test_delete_absent_id_succeeds() {
    let service = MockSnapshotService::new();

    assert!(service.delete_snapshot("snap-missing").await.is_ok());
}

#[tokio::test]
async fn test_injected_delete_failure() {
    let service = MockSnapshotService::new();
    service.push_snapshot(tagged_snapshot("snap-a", "prod")).await;
    service.fail_delete("snap-a").await;

    let result = service.delete_snapshot("snap-a").await;

    assert!(result.is_err());
    assert_eq!(service.stored_count().await, 1);
}

#[tokio::test]
async fn test_parameter_roundtrip() {
    let store = MockParameterStore::new();

    store.put_parameter("key", "snap-1").await.unwrap();

    assert_eq!(store.get_parameter("key").await.unwrap(), "snap-1");
}

#[tokio::test]
async fn test_parameter_overwrite() {
    let store = MockParameterStore::new();

    store.put_parameter("key", "snap-1").await.unwrap();
    store.put_parameter("key", "snap-2").await.unwrap();

    assert_eq!(store.get_parameter("key").await.unwrap(), "snap-2");
}

#[tokio::test]
async fn test_parameter_not_found() {
    let store = MockParameterStore::new();

    let result = store.get_parameter("unset").await;

    assert!(matches!(result, Err(ServiceError::ParameterNotFound(_))));
}
