//! SSM-backed parameter store.

use async_trait::async_trait;
use aws_sdk_ssm::types::{ParameterTier, ParameterType};
use aws_sdk_ssm::Client;

use crate::interfaces::{ParameterStore, Result, ServiceError};

/// AWS Systems Manager parameter store.
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    /// Create a new SSM parameter store from the default AWS environment.
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
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<String> {
        let response = match self.client.get_parameter().name(name).send().await {
            Ok(response) => response,
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_parameter_not_found() {
                    return Err(ServiceError::ParameterNotFound(name.to_string()));
                }
                return Err(ServiceError::Call {
                    operation: "GetParameter",
                    message: service_error.to_string(),
                });
            }
        };

        response
            .parameter()
            .and_then(|p| p.value())
            .map(|v| v.to_string())
            .ok_or_else(|| ServiceError::MalformedResponse {
                operation: "GetParameter",
                message: format!("parameter {name} without value"),
            })
    }

    async fn put_parameter(&self, name: &str, value: &str) -> Result<()> {
        self.client
            .put_parameter()
            .name(name)
            .value(value)
            .r#type(ParameterType::String)
            .overwrite(true)
            .tier(ParameterTier::Standard)
            .data_type("text")
            .send()
            .await
            .map_err(|e| ServiceError::Call {
                operation: "PutParameter",
                message: e.to_string(),
            })?;
        Ok(())
    }
}
