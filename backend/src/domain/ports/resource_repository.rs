//! Port for resource persistence.
use async_trait::async_trait;

use crate::domain::{Resource, ResourceId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by resource repository adapters.
    pub enum ResourceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "resource repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "resource repository query failed: {message}",
    }
}

/// Resource storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Insert a new resource.
    async fn insert(&self, resource: &Resource) -> Result<(), ResourceRepositoryError>;

    /// Fetch a resource by identifier.
    async fn find_by_id(
        &self,
        id: &ResourceId,
    ) -> Result<Option<Resource>, ResourceRepositoryError>;

    /// All resources ordered by name, then id.
    async fn list(&self) -> Result<Vec<Resource>, ResourceRepositoryError>;

    /// Persist the name and type of an existing resource. Returns `false`
    /// when the resource no longer exists.
    async fn update(&self, resource: &Resource) -> Result<bool, ResourceRepositoryError>;

    /// Delete the resource's allocations, then the resource, in one
    /// transaction. Returns `false` when the resource was already gone.
    async fn delete_with_allocations(
        &self,
        id: &ResourceId,
    ) -> Result<bool, ResourceRepositoryError>;
}
