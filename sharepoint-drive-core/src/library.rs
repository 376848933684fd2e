//! Document library operations: the service layer the CLI drives.
//!
//! [`DocumentLibrary`] owns a client implementing both [`RemoteResourceClient`]
//! and [`DocumentStore`] and adds path validation, folder creation before
//! upload, and uniform error reporting on top of them. Everything apart from
//! [`DocumentLibrary::upload`] is a single passthrough call.

use tracing::{error, info};

use crate::config::ResolverConfig;
use crate::contract::{DocumentStore, ItemRef, RemoteResourceClient, ShareScope};
use crate::error::{DriveError, RemoteError};
use crate::path::{format_drive_path, LogicalPath};
use crate::resolver::{EnsurePathReport, PathResolver};

pub struct DocumentLibrary<C> {
    client: C,
    config: ResolverConfig,
}

impl<C> DocumentLibrary<C>
where
    C: RemoteResourceClient + DocumentStore,
{
    pub fn new(client: C, config: ResolverConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn resolver(&self) -> PathResolver<'_, C> {
        PathResolver::with_policy(&self.client, self.config.lookup_errors)
    }

    /// Id of the item at `path`, `None` when there is nothing there.
    pub async fn find_item(&self, path: &str) -> Result<Option<ItemRef>, DriveError> {
        let path = LogicalPath::parse(path)?;
        self.resolver().find(&path).await
    }

    /// Create every missing folder along `path`.
    pub async fn create_folders(&self, path: &str) -> Result<EnsurePathReport, DriveError> {
        let path = LogicalPath::parse(path)?;
        self.resolver().ensure_path(&path).await
    }

    /// Upload `content` as `folder_path/file_name`, creating the folders first.
    /// An empty `folder_path` uploads to the library root.
    pub async fn upload(
        &self,
        folder_path: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<ItemRef, DriveError> {
        let target = if folder_path.trim_matches('/').is_empty() {
            LogicalPath::from_segments([file_name])?
        } else {
            let folder = LogicalPath::parse(folder_path)?;
            let target = folder.join(file_name)?;
            self.resolver().ensure_path(&folder).await?;
            target
        };

        let size = content.len();
        let conflict = self.config.conflict_behavior;
        info!(path = %target, size, conflict = conflict.as_str(), "Uploading file");
        let item = self
            .client
            .upload(&format_drive_path(&target.to_string()), content, conflict)
            .await
            .map_err(|e| remote_failure("upload", &target, e))?;
        info!(path = %target, item_id = %item, "Upload complete");
        Ok(item)
    }

    /// Full content of the file at `path`.
    pub async fn download(&self, path: &str) -> Result<Vec<u8>, DriveError> {
        let path = LogicalPath::parse(path)?;
        let bytes = self
            .client
            .download(&format_drive_path(&path.to_string()))
            .await
            .map_err(|e| remote_failure("download", &path, e))?;
        info!(path = %path, size = bytes.len(), "Downloaded file");
        Ok(bytes)
    }

    /// Create a view link to the item at `path` and return its URL.
    pub async fn create_share_link(
        &self,
        path: &str,
        scope: ShareScope,
    ) -> Result<String, DriveError> {
        let path = LogicalPath::parse(path)?;
        let url = self
            .client
            .create_link(&format_drive_path(&path.to_string()), scope)
            .await
            .map_err(|e| remote_failure("create_link", &path, e))?;
        info!(path = %path, scope = scope.as_str(), "Created share link");
        Ok(url)
    }

    /// Link usable by everyone in the organization.
    pub async fn create_public_url(&self, path: &str) -> Result<String, DriveError> {
        self.create_share_link(path, ShareScope::Organization).await
    }

    /// Link usable only by users who already have access to the item.
    pub async fn create_private_url(&self, path: &str) -> Result<String, DriveError> {
        self.create_share_link(path, ShareScope::Users).await
    }
}

fn remote_failure(operation: &'static str, path: &LogicalPath, source: RemoteError) -> DriveError {
    error!(operation, path = %path, error = %source, "Remote operation failed");
    DriveError::Remote {
        operation,
        path: path.to_string(),
        source,
    }
}
