//! Hierarchical path resolution: make sure every folder along a path exists.
//!
//! [`PathResolver::ensure_path`] walks a [`LogicalPath`] one segment at a time,
//! like `mkdir -p`:
//!
//! 1. extend the prefix by the next segment,
//! 2. look the prefix up,
//! 3. create it under its parent if the lookup found nothing.
//!
//! Each remote call is awaited before the next one is issued, since a child
//! can only be created once its parent exists. A walk costs `2N - M` calls for
//! `N` segments of which `M` already exist.
//!
//! Anything found at a prefix counts as present, whether it is a folder or a
//! file. A file sitting where a folder is expected is therefore skipped, and
//! creating anything beneath it fails remotely.
//!
//! There is no retry and no rollback. When creation fails at segment `k`, the
//! prefixes before `k` stay in place and the call can simply be repeated.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::contract::{ItemRef, RemoteResourceClient};
use crate::error::DriveError;
use crate::path::{format_drive_path, parent_of, LogicalPath};

/// How a failed lookup is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupErrorPolicy {
    /// Any lookup error means "not there": the walk goes on to create the
    /// folder. Outages and permission problems show up as failed creations.
    #[default]
    TreatAsNotFound,
    /// Only a clean "absent" answer leads to creation; any other lookup
    /// error aborts the walk with [`DriveError::Lookup`].
    Propagate,
}

/// Outcome of a successful [`PathResolver::ensure_path`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnsurePathReport {
    /// Prefixes that were found and left alone.
    pub existing: Vec<String>,
    /// Prefixes created by this call, in creation order.
    pub created: Vec<String>,
    /// Lookups that failed and were taken as "not found".
    pub misclassified_lookups: usize,
}

impl EnsurePathReport {
    /// Number of remote calls the walk made.
    pub fn round_trips(&self) -> usize {
        self.existing.len() + 2 * self.created.len()
    }
}

/// Walks logical paths against a [`RemoteResourceClient`]. Holds nothing
/// between calls except the client handle and the lookup policy.
pub struct PathResolver<'a, C: ?Sized> {
    client: &'a C,
    policy: LookupErrorPolicy,
}

impl<'a, C> PathResolver<'a, C>
where
    C: RemoteResourceClient + ?Sized,
{
    pub fn new(client: &'a C) -> Self {
        Self::with_policy(client, LookupErrorPolicy::default())
    }

    pub fn with_policy(client: &'a C, policy: LookupErrorPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> LookupErrorPolicy {
        self.policy
    }

    /// Validate raw segments, then [`ensure_path`](Self::ensure_path). An empty
    /// segment is rejected before any remote call.
    pub async fn ensure_segments<S>(&self, segments: &[S]) -> Result<EnsurePathReport, DriveError>
    where
        S: AsRef<str>,
    {
        let path = LogicalPath::from_segments(segments.iter().map(|s| s.as_ref().to_string()))?;
        self.ensure_path(&path).await
    }

    /// Make sure every prefix of `path` exists remotely as a folder.
    pub async fn ensure_path(&self, path: &LogicalPath) -> Result<EnsurePathReport, DriveError> {
        let total = path.len();
        let mut report = EnsurePathReport::default();
        info!(path = %path, segments = total, policy = ?self.policy, "Ensuring folder path");

        for (prefix, name) in path.prefixes().zip(path.segments()) {
            if self
                .lookup(&prefix, &mut report.misclassified_lookups)
                .await?
                .is_some()
            {
                debug!(prefix = %prefix, "Folder already present");
                report.existing.push(prefix);
                continue;
            }

            let parent = parent_of(&prefix);
            match self.client.create_container(parent, name).await {
                Ok(item) => {
                    info!(prefix = %prefix, item_id = %item, "Created folder");
                    report.created.push(prefix);
                }
                Err(source) => {
                    let satisfied = report.existing.len() + report.created.len();
                    error!(
                        prefix = %prefix,
                        satisfied,
                        total,
                        error = %source,
                        "Folder creation failed"
                    );
                    return Err(DriveError::RemoteOperation {
                        path: prefix,
                        satisfied,
                        total,
                        source,
                    });
                }
            }
        }

        info!(
            path = %path,
            created = report.created.len(),
            existing = report.existing.len(),
            misclassified_lookups = report.misclassified_lookups,
            "Folder path ensured"
        );
        Ok(report)
    }

    /// Look up a single path under this resolver's policy.
    pub async fn find(&self, path: &LogicalPath) -> Result<Option<ItemRef>, DriveError> {
        let mut misclassified = 0;
        self.lookup(&path.to_string(), &mut misclassified).await
    }

    async fn lookup(
        &self,
        prefix: &str,
        misclassified: &mut usize,
    ) -> Result<Option<ItemRef>, DriveError> {
        match self.client.find_by_path(&format_drive_path(prefix)).await {
            Ok(found) => Ok(found),
            Err(source) if source.is_not_found() => Ok(None),
            Err(source) => match self.policy {
                LookupErrorPolicy::TreatAsNotFound => {
                    warn!(
                        prefix = %prefix,
                        error = %source,
                        misclassified = true,
                        "Lookup failed, treating as not found"
                    );
                    *misclassified += 1;
                    Ok(None)
                }
                LookupErrorPolicy::Propagate => {
                    error!(prefix = %prefix, error = %source, "Lookup failed");
                    Err(DriveError::Lookup {
                        path: prefix.to_string(),
                        source,
                    })
                }
            },
        }
    }
}
