/// `load_config` module: Loads a static YAML config and injects secrets from the environment.
///
/// The YAML file describes which SharePoint site to talk to and how folders are
/// resolved; it never holds credentials. The access token comes from
/// `GRAPH_ACCESS_TOKEN` (a `.env` file is honored by `main`), and
/// `SHAREPOINT_SITE_ID` overrides the site id from the file.
///
/// # Errors
/// All errors use `anyhow::Error` and name the file, the YAML problem or the
/// missing variable. They are surfaced at the CLI boundary.
use anyhow::Result;
use sharepoint_drive_core::config::DriveConfig;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const ACCESS_TOKEN_VAR: &str = "GRAPH_ACCESS_TOKEN";
pub const SITE_ID_VAR: &str = "SHAREPOINT_SITE_ID";

#[derive(Debug)]
pub struct CliConfig {
    pub drive: DriveConfig,
    pub access_token: String,
}

/// Loads a static YAML config file (no secrets) and injects required env vars for secrets.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut drive: DriveConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if let Ok(site_id) = std::env::var(SITE_ID_VAR) {
        if !site_id.trim().is_empty() {
            info!(site_id = %site_id, "Site id overridden from {SITE_ID_VAR}");
            drive.sharepoint.site_id = site_id;
        }
    }

    if drive.sharepoint.site_id.trim().is_empty() && drive.sharepoint.drive_id.is_none() {
        error!("Neither sharepoint.site_id nor sharepoint.drive_id is set");
        anyhow::bail!("sharepoint.site_id must be set when sharepoint.drive_id is not");
    }

    let access_token = match std::env::var(ACCESS_TOKEN_VAR) {
        Ok(token) if !token.trim().is_empty() => {
            info!("{ACCESS_TOKEN_VAR} found in env");
            token
        }
        Ok(_) => {
            error!("{ACCESS_TOKEN_VAR} is empty");
            anyhow::bail!("{ACCESS_TOKEN_VAR} environment variable is empty");
        }
        Err(e) => {
            error!(error = ?e, "{ACCESS_TOKEN_VAR} environment variable not set");
            return Err(anyhow::anyhow!(
                "{ACCESS_TOKEN_VAR} environment variable not set: {e}"
            ));
        }
    };

    drive.trace_loaded();

    Ok(CliConfig {
        drive,
        access_token,
    })
}
