//! Durable parameter store interface.

use async_trait::async_trait;

use super::Result;

/// Interface for durable key/value parameters.
///
/// Holds the active snapshot id under the policy tag key, surviving across
/// rotation runs.
///
/// Implementations:
/// - `SsmParameterStore`: AWS Systems Manager Parameter Store (feature `aws`)
/// - `MockParameterStore`: in-memory, for tests and non-live runs
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Read a parameter value.
    ///
    /// Fails with `ServiceError::ParameterNotFound` if the key is unset.
    async fn get_parameter(&self, name: &str) -> Result<String>;

    /// Write a parameter value, unconditionally replacing any prior value.
    async fn put_parameter(&self, name: &str, value: &str) -> Result<()>;
}
