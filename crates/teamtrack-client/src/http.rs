//! HTTP implementation of [`AdminBackend`].
//!
//! 401 and 403 both map to [`ClientError::Forbidden`]; the console treats
//! every auth-class failure the same way.

use crate::{AdminBackend, ClientError, ClientResult};
use serde::de::DeserializeOwned;
use std::time::Duration;
use teamtrack_types::admin::{AdminKeyRequest, ErrorBody, KeyStatus, SetupResponse, VerifyResponse};
use teamtrack_types::tasks::SearchResult;
use tracing::{debug, warn};
use url::Url;

/// Blocking HTTP client for the admin endpoints.
pub struct HttpBackend {
    base_url: Url,
    client: reqwest::blocking::Client,
}

impl HttpBackend {
    /// Create a backend rooted at `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: normalize_base(base_url)?,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// URL for a team-task search. Both values are form-encoded into the
    /// query string; the backend only accepts the key as a query parameter.
    pub fn team_tasks_url(&self, username: &str, admin_key: &str) -> ClientResult<Url> {
        let mut url = self.endpoint("admin/team-tasks")?;
        url.query_pairs_mut()
            .append_pair("search_username", username)
            .append_pair("admin_key", admin_key);
        Ok(url)
    }

    fn read_json<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> ClientResult<T> {
        let status = resp.status().as_u16();
        let body = resp.text()?;
        check_status(status, &body)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Parse `base_url` and make sure its path ends with `/` so relative joins
/// append instead of replacing the last segment.
fn normalize_base(base_url: &str) -> ClientResult<Url> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Map a non-2xx status to the matching error, pulling `detail` from the
/// body when it is JSON.
fn check_status(status: u16, body: &str) -> ClientResult<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail_text());
    match status {
        401 | 403 => {
            warn!(status, "Backend refused the admin key");
            Err(ClientError::Forbidden { status, detail })
        }
        _ => {
            warn!(status, detail = ?detail, "Backend request failed");
            Err(ClientError::Rejected { status, detail })
        }
    }
}

impl AdminBackend for HttpBackend {
    fn key_exists(&self) -> ClientResult<KeyStatus> {
        let url = self.endpoint("admin/key-exists")?;
        debug!(%url, "Probing admin key");
        Self::read_json(self.client.get(url).send()?)
    }

    fn setup_key(&self, admin_key: &str) -> ClientResult<SetupResponse> {
        let url = self.endpoint("admin/setup-key")?;
        debug!(%url, "Provisioning admin key");
        let resp = self
            .client
            .post(url)
            .json(&AdminKeyRequest { admin_key })
            .send()?;
        Self::read_json(resp)
    }

    fn verify_key(&self, admin_key: &str) -> ClientResult<VerifyResponse> {
        let url = self.endpoint("admin/verify-key")?;
        debug!(%url, "Verifying admin key");
        let resp = self
            .client
            .post(url)
            .json(&AdminKeyRequest { admin_key })
            .send()?;
        Self::read_json(resp)
    }

    fn team_tasks(&self, username: &str, admin_key: &str) -> ClientResult<SearchResult> {
        let url = self.team_tasks_url(username, admin_key)?;
        // The URL embeds the key; log only the user.
        debug!(username, "Searching team tasks");
        Self::read_json(self.client.get(url).send()?)
    }
}
