//! # contract: interfaces to the remote document library
//!
//! This module defines the two traits a drive client implements and the plain
//! data types passed across them.
//!
//! - [`RemoteResourceClient`]: existence lookup and folder creation. This is the
//!   only interface the path resolver consumes.
//! - [`DocumentStore`]: content transfer and share links, used by
//!   [`crate::library::DocumentLibrary`].
//!
//! Both are async and return [`RemoteError`]. Paths handed to `find_by_path`
//! and the `DocumentStore` methods are already in drive form (`root:/a/b:`, see
//! [`crate::path::format_drive_path`]); `create_container` takes the logical
//! parent path because the drive root has no `root:/...:` form.
//!
//! ## Mocking
//! Both traits carry `mockall::automock` behind the `test-export-mocks`
//! feature, so downstream crates and integration tests get `MockRemoteResourceClient`
//! and `MockDocumentStore`.

use std::fmt;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// Opaque identifier of an existing remote item (file or folder).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef(pub String);

impl ItemRef {
    pub fn new(id: impl Into<String>) -> Self {
        ItemRef(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the remote side does when a created item's name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictBehavior {
    #[default]
    Fail,
    Rename,
    Replace,
}

impl ConflictBehavior {
    /// Value of `@microsoft.graph.conflictBehavior`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictBehavior::Fail => "fail",
            ConflictBehavior::Rename => "rename",
            ConflictBehavior::Replace => "replace",
        }
    }
}

/// Who can open a generated share link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareScope {
    /// Anyone signed in to the organization.
    Organization,
    /// Only users who already have access to the item.
    Users,
}

impl ShareScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareScope::Organization => "organization",
            ShareScope::Users => "users",
        }
    }
}

/// Lookup and folder creation against the remote drive.
///
/// No idempotency is assumed: creating a folder whose name is taken is
/// resolved by the implementation's [`ConflictBehavior`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RemoteResourceClient: Send + Sync {
    /// Look up an item by drive path (`root:/a/b:`). `Ok(None)` when absent.
    async fn find_by_path(&self, drive_path: &str) -> Result<Option<ItemRef>, RemoteError>;

    /// Create folder `name` under the logical `parent_path` ("" for the drive root).
    async fn create_container(&self, parent_path: &str, name: &str)
        -> Result<ItemRef, RemoteError>;
}

/// Content transfer and sharing against the remote drive.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Full content of the file at `drive_path`.
    async fn download(&self, drive_path: &str) -> Result<Vec<u8>, RemoteError>;

    /// Single-request upload of `content` to `drive_path`.
    async fn upload(
        &self,
        drive_path: &str,
        content: Vec<u8>,
        conflict: ConflictBehavior,
    ) -> Result<ItemRef, RemoteError>;

    /// Create a view link for the item and return its web URL.
    async fn create_link(&self, drive_path: &str, scope: ShareScope)
        -> Result<String, RemoteError>;
}
