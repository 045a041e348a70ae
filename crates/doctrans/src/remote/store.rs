use std::time::Duration;

use crate::error::StorageError;
use crate::naming::ContainerName;

use super::access::AccessScope;

/// Object-storage backend operations consumed by the transfer gateway.
///
/// Calls block on the workflow's own thread. `create_container` reports an
/// existing container as [`StorageError::ContainerAlreadyExists`]; the
/// gateway decides whether that is a failure.
pub trait ObjectStore: Send + Sync {
    fn create_container(&self, name: &ContainerName) -> Result<(), StorageError>;

    /// Uploads bytes under `object`, overwriting, and returns the object URL.
    fn put_object(
        &self,
        container: &ContainerName,
        object: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError>;

    fn list_objects(&self, container: &ContainerName) -> Result<Vec<String>, StorageError>;

    fn get_object(&self, container: &ContainerName, object: &str)
        -> Result<Vec<u8>, StorageError>;

    fn delete_object(&self, container: &ContainerName, object: &str) -> Result<(), StorageError>;

    /// Bare URL of a container, without any access token.
    fn container_url(&self, name: &ContainerName) -> String;

    /// Produces a time-limited access token (query-string form) for a
    /// container. Only called under [`AccessMode::SignedUrl`].
    ///
    /// [`AccessMode::SignedUrl`]: super::access::AccessMode::SignedUrl
    fn sign_container(
        &self,
        name: &ContainerName,
        scope: AccessScope,
        ttl: Duration,
    ) -> Result<String, StorageError>;
}
