//! File movement between local storage and remote containers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::StorageError;
use crate::naming::{redact_path, ContainerName};
use crate::remote::{AccessMode, AccessScope, ObjectStore};

/// Moves files between local disk and named remote containers, and produces
/// the access URLs the translation service consumes.
pub struct TransferGateway {
    store: Arc<dyn ObjectStore>,
    access: AccessMode,
    signed_url_ttl: Duration,
}

impl TransferGateway {
    pub fn new(store: Arc<dyn ObjectStore>, access: AccessMode, signed_url_ttl: Duration) -> Self {
        Self {
            store,
            access,
            signed_url_ttl,
        }
    }

    /// Idempotent container creation; an existing container is success.
    pub fn ensure_container(&self, name: &ContainerName) -> Result<(), StorageError> {
        match self.store.create_container(name) {
            Ok(()) => {
                debug!(container = %name, "created container");
                Ok(())
            }
            Err(StorageError::ContainerAlreadyExists(_)) => {
                debug!(container = %name, "container already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Uploads each existing file under its base name; paths that do not
    /// exist are skipped with a warning. Returns one URL per uploaded file.
    pub fn upload_all(
        &self,
        paths: &[PathBuf],
        container: &ContainerName,
    ) -> Result<Vec<String>, StorageError> {
        let mut urls = Vec::with_capacity(paths.len());
        for path in paths {
            if !path.exists() {
                warn!(file = %redact_path(path), "skipping missing upload source");
                continue;
            }
            let bytes = fs::read(path).map_err(|e| StorageError::ReadFile {
                path: path.clone(),
                source: e,
            })?;
            let object = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("document")
                .to_string();
            let url = self.store.put_object(container, &object, &bytes)?;
            debug!(container = %container, object = %object, "uploaded object");
            urls.push(url);
        }
        Ok(urls)
    }

    /// Deletes every object in a container, so a reused target container
    /// cannot trip the translation service's object-exists check. Returns
    /// the number of objects removed.
    pub fn purge(&self, container: &ContainerName) -> Result<usize, StorageError> {
        let objects = self.store.list_objects(container)?;
        let removed = objects.len();
        for object in objects {
            self.store.delete_object(container, &object)?;
            debug!(container = %container, object = %object, "deleted object");
        }
        Ok(removed)
    }

    /// Downloads every object into `local_dir`, creating it if absent.
    /// Returns the object names written.
    pub fn download_all(
        &self,
        container: &ContainerName,
        local_dir: &Path,
    ) -> Result<Vec<String>, StorageError> {
        if !local_dir.exists() {
            fs::create_dir_all(local_dir).map_err(|e| StorageError::CreateDirectory {
                path: local_dir.to_path_buf(),
                source: e,
            })?;
        }

        let mut names = Vec::new();
        for object in self.store.list_objects(container)? {
            let bytes = self.store.get_object(container, &object)?;
            let path = local_dir.join(&object);
            fs::write(&path, bytes).map_err(|e| StorageError::WriteFile {
                path: path.clone(),
                source: e,
            })?;
            debug!(container = %container, object = %object, "downloaded object");
            names.push(object);
        }
        Ok(names)
    }

    /// Downloads a single object addressed by its URL (token query ignored).
    pub fn download_url(&self, url: &str, dest: &Path) -> Result<(), StorageError> {
        let (container, object) = split_object_url(url)?;
        let bytes = self.store.get_object(&container, &object)?;
        if let Some(parent) = dest.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }
        fs::write(dest, bytes).map_err(|e| StorageError::WriteFile {
            path: dest.to_path_buf(),
            source: e,
        })?;
        debug!(object = %object, dest = %redact_path(dest), "downloaded object");
        Ok(())
    }

    /// URL granting the translation service access to a container: bare
    /// under ambient identity, token-qualified under signed access.
    pub fn access_url(
        &self,
        container: &ContainerName,
        scope: AccessScope,
    ) -> Result<String, StorageError> {
        let base = self.store.container_url(container);
        match self.access {
            AccessMode::AmbientIdentity => Ok(base),
            AccessMode::SignedUrl => {
                let token = self
                    .store
                    .sign_container(container, scope, self.signed_url_ttl)?;
                Ok(format!("{}?{}", base, token))
            }
        }
    }
}

/// Splits an object URL into its container and object name.
fn split_object_url(url: &str) -> Result<(ContainerName, String), StorageError> {
    let without_query = url.split('?').next().unwrap_or(url);
    let mut segments = without_query.rsplit('/');
    let object = segments.next().filter(|s| !s.is_empty());
    let container = segments.next().filter(|s| !s.is_empty() && !s.contains(':'));
    match (container, object) {
        (Some(container), Some(object)) => {
            Ok((ContainerName::sanitize(container), object.to_string()))
        }
        _ => Err(StorageError::InvalidObjectUrl(url.to_string())),
    }
}
