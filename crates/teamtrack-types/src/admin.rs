//! Admin credential wire types.
//!
//! The backend owns the admin key; these bodies only carry it across the
//! wire for provisioning and verification.

use serde::{Deserialize, Serialize};

/// Name of the session slot the console caches the admin key under.
pub const ADMIN_KEY_SLOT: &str = "admin_key";

/// Minimum length, in characters, of a newly provisioned admin key.
pub const MIN_ADMIN_KEY_LEN: usize = 6;

/// Response of `GET /admin/key-exists`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyStatus {
    /// Whether an admin key has been provisioned on the backend.
    pub exists: bool,
}

/// Request body for `POST /admin/setup-key` and `POST /admin/verify-key`.
#[derive(Clone, Serialize)]
pub struct AdminKeyRequest<'a> {
    pub admin_key: &'a str,
}

// Hand-written so the key never lands in logs.
impl std::fmt::Debug for AdminKeyRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminKeyRequest")
            .field("admin_key", &"<redacted>")
            .finish()
    }
}

/// Response of `POST /admin/setup-key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetupResponse {
    #[serde(default)]
    pub success: bool,
}

/// Response of `POST /admin/verify-key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub valid: bool,
}

/// Error body returned by the backend on non-2xx responses.
///
/// `detail` is usually a string but validation failures carry a structured
/// list, so it is kept as raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Human-readable rendition of `detail`, if any.
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
