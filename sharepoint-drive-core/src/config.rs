use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::contract::ConflictBehavior;
use crate::resolver::LookupErrorPolicy;

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the document library lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Graph site id, e.g. `contoso.sharepoint.com,<site-guid>,<web-guid>`.
    pub site_id: String,
    /// Skips drive discovery when set.
    #[serde(default)]
    pub drive_id: Option<String>,
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_graph_base_url() -> String {
    DEFAULT_GRAPH_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// How folders are resolved and files are written.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub lookup_errors: LookupErrorPolicy,
    #[serde(default)]
    pub conflict_behavior: ConflictBehavior,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    pub sharepoint: SiteConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl DriveConfig {
    pub fn trace_loaded(&self) {
        info!(
            site_id = %self.sharepoint.site_id,
            drive_id = self.sharepoint.drive_id.as_deref().unwrap_or("<discover>"),
            graph_base_url = %self.sharepoint.graph_base_url,
            lookup_errors = ?self.resolver.lookup_errors,
            conflict_behavior = self.resolver.conflict_behavior.as_str(),
            "Loaded DriveConfig"
        );
        debug!(?self, "DriveConfig loaded (full debug)");
    }
}
