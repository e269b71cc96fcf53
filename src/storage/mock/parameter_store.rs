//! Mock ParameterStore implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::interfaces::{ParameterStore, Result, ServiceError};

/// Mock parameter store that keeps values in memory.
#[derive(Default)]
pub struct MockParameterStore {
    values: RwLock<HashMap<String, String>>,
    unavailable: RwLock<bool>,
}

impl MockParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored value.
    pub async fn set(&self, name: &str, value: &str) {
        self.values
            .write()
            .await
            .insert(name.to_string(), value.to_string());
    }

    pub async fn get_stored(&self, name: &str) -> Option<String> {
        self.values.read().await.get(name).cloned()
    }

    /// Make every call fail, simulating a store outage.
    pub async fn set_unavailable(&self) {
        *self.unavailable.write().await = true;
    }
}

#[async_trait]
impl ParameterStore for MockParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<String> {
        if *self.unavailable.read().await {
            return Err(ServiceError::Call {
                operation: "GetParameter",
                message: "injected outage".to_string(),
            });
        }
        self.values
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::ParameterNotFound(name.to_string()))
    }

    async fn put_parameter(&self, name: &str, value: &str) -> Result<()> {
        if *self.unavailable.read().await {
            return Err(ServiceError::Call {
                operation: "PutParameter",
                message: "injected outage".to_string(),
            });
        }
        self.values
            .write()
            .await
            .insert(name.to_string(), value.to_string());
        Ok(())
    }
}
