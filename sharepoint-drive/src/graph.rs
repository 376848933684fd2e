//! # Graph drive client
//!
//! [`GraphClient`] implements [`RemoteResourceClient`] and [`DocumentStore`]
//! from `sharepoint-drive-core` against the Graph v1.0 REST API with
//! `reqwest`. One client addresses one document library: the site's drive id
//! is resolved once in [`GraphClient::connect`] (or taken from configuration)
//! and kept for the client's lifetime.
//!
//! Items are addressed by path (`drives/{drive}/items/root:/{path}:`) with
//! every segment percent-encoded. Error bodies of the form
//! `{"error": {"code": "...", "message": "..."}}` become [`RemoteError::Api`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use sharepoint_drive_core::config::SiteConfig;
use sharepoint_drive_core::contract::{
    ConflictBehavior, DocumentStore, ItemRef, RemoteResourceClient, ShareScope,
};
use sharepoint_drive_core::error::RemoteError;
use sharepoint_drive_core::path::format_drive_path;

use crate::auth::AccessTokenProvider;

/// Characters left as-is inside a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Deserialize)]
struct DriveItem {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DriveCollection {
    #[serde(default)]
    value: Vec<DriveItem>,
}

#[derive(Debug, Deserialize)]
struct Permission {
    link: SharingLink,
}

#[derive(Debug, Deserialize)]
struct SharingLink {
    #[serde(rename = "webUrl")]
    web_url: String,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
    drive_id: String,
    tokens: Arc<dyn AccessTokenProvider>,
    folder_conflict: ConflictBehavior,
}

impl GraphClient {
    /// Client for a known drive id. Makes no request.
    pub fn new(
        site: &SiteConfig,
        drive_id: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(site.timeout_secs))
            .build()
            .map_err(|e| RemoteError::Transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(GraphClient {
            http,
            base_url: site.graph_base_url.trim_end_matches('/').to_string(),
            drive_id: drive_id.into(),
            tokens,
            folder_conflict: ConflictBehavior::default(),
        })
    }

    /// Client for the site's document library. Looks up the first drive of
    /// the site unless `site.drive_id` is set.
    pub async fn connect(
        site: &SiteConfig,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, RemoteError> {
        let mut client = Self::new(site, site.drive_id.clone().unwrap_or_default(), tokens)?;
        if client.drive_id.is_empty() {
            client.drive_id = client.resolve_drive_id(&site.site_id).await?;
        }
        tracing::info!(
            site_id = %site.site_id,
            drive_id = %client.drive_id,
            "Initialized GraphClient"
        );
        Ok(client)
    }

    /// What folder creation does when the name is taken.
    pub fn with_folder_conflict(mut self, conflict: ConflictBehavior) -> Self {
        self.folder_conflict = conflict;
        self
    }

    pub fn drive_id(&self) -> &str {
        &self.drive_id
    }

    async fn resolve_drive_id(&self, site_id: &str) -> Result<String, RemoteError> {
        let url = format!("{}/sites/{}/drives", self.base_url, site_id);
        tracing::info!(site_id, "Resolving document library drive");
        let resp = self.send(self.request(Method::GET, &url).await?).await?;
        let drives: DriveCollection = parse_json(resp).await?;
        drives
            .value
            .into_iter()
            .next()
            .map(|d| d.id)
            .ok_or_else(|| RemoteError::InvalidResponse(format!("site {site_id} has no drives")))
    }

    /// `{base}/drives/{drive}/items/root:/{encoded path}:`
    fn item_url(&self, drive_path: &str) -> String {
        format!(
            "{}/drives/{}/items/{}",
            self.base_url,
            self.drive_id,
            encode_drive_path(drive_path)
        )
    }

    fn children_url(&self, parent_path: &str) -> String {
        if parent_path.is_empty() {
            format!("{}/drives/{}/root/children", self.base_url, self.drive_id)
        } else {
            format!(
                "{}/children",
                self.item_url(&format_drive_path(parent_path))
            )
        }
    }

    async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, RemoteError> {
        let token = self.tokens.access_token().await?;
        tracing::debug!(%method, url, "Graph request");
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, RemoteError> {
        let resp = req.send().await.map_err(transport)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let err = api_error(status, &body);
        tracing::debug!(status = status.as_u16(), error = %err, "Graph request failed");
        Err(err)
    }
}

#[async_trait]
impl RemoteResourceClient for GraphClient {
    async fn find_by_path(&self, drive_path: &str) -> Result<Option<ItemRef>, RemoteError> {
        let req = self.request(Method::GET, &self.item_url(drive_path)).await?;
        match self.send(req).await {
            Ok(resp) => {
                let item: DriveItem = parse_json(resp).await?;
                Ok(Some(ItemRef::new(item.id)))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_container(
        &self,
        parent_path: &str,
        name: &str,
    ) -> Result<ItemRef, RemoteError> {
        let body = json!({
            "name": name,
            "folder": {},
            "@microsoft.graph.conflictBehavior": self.folder_conflict.as_str(),
        });
        tracing::info!(parent_path, name, "Creating folder");
        let req = self
            .request(Method::POST, &self.children_url(parent_path))
            .await?
            .json(&body);
        let item: DriveItem = parse_json(self.send(req).await?).await?;
        Ok(ItemRef::new(item.id))
    }
}

#[async_trait]
impl DocumentStore for GraphClient {
    async fn download(&self, drive_path: &str) -> Result<Vec<u8>, RemoteError> {
        let url = format!("{}/content", self.item_url(drive_path));
        let resp = self.send(self.request(Method::GET, &url).await?).await?;
        let bytes = resp.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }

    async fn upload(
        &self,
        drive_path: &str,
        content: Vec<u8>,
        conflict: ConflictBehavior,
    ) -> Result<ItemRef, RemoteError> {
        let url = format!("{}/content", self.item_url(drive_path));
        tracing::info!(drive_path, size = content.len(), "Uploading content");
        let req = self
            .request(Method::PUT, &url)
            .await?
            .query(&[("@microsoft.graph.conflictBehavior", conflict.as_str())])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content);
        let item: DriveItem = parse_json(self.send(req).await?).await?;
        Ok(ItemRef::new(item.id))
    }

    async fn create_link(
        &self,
        drive_path: &str,
        scope: ShareScope,
    ) -> Result<String, RemoteError> {
        let url = format!("{}/createLink", self.item_url(drive_path));
        let body = json!({ "type": "view", "scope": scope.as_str() });
        let req = self.request(Method::POST, &url).await?.json(&body);
        let permission: Permission = parse_json(self.send(req).await?).await?;
        Ok(permission.link.web_url)
    }
}

/// Percent-encode the path inside `root:/...:`, keeping the `/` separators.
/// Anything not in drive form is encoded as a single item id.
fn encode_drive_path(drive_path: &str) -> String {
    match drive_path
        .strip_prefix("root:/")
        .and_then(|p| p.strip_suffix(':'))
    {
        Some(inner) => {
            let encoded: Vec<String> = inner
                .split('/')
                .map(|s| utf8_percent_encode(s, SEGMENT).to_string())
                .collect();
            format_drive_path(&encoded.join("/"))
        }
        None => utf8_percent_encode(drive_path, SEGMENT).to_string(),
    }
}

fn api_error(status: StatusCode, body: &str) -> RemoteError {
    match serde_json::from_str::<GraphErrorBody>(body) {
        Ok(parsed) => RemoteError::api(status.as_u16(), parsed.error.code, parsed.error.message),
        Err(_) => RemoteError::api(
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown"),
            body.to_string(),
        ),
    }
}

fn transport(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Transport(format!("Request timed out: {err}"))
    } else if err.is_connect() {
        RemoteError::Transport(format!("Connection failed: {err}"))
    } else {
        RemoteError::Transport(format!("HTTP error: {err}"))
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, RemoteError> {
    let text = resp.text().await.map_err(transport)?;
    serde_json::from_str(&text).map_err(|e| RemoteError::InvalidResponse(format!("{e}: {text}")))
}
