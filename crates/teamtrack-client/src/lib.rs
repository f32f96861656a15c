//! Client side of the teamtrack admin backend.
//!
//! [`AdminBackend`] is the seam the console talks through; [`HttpBackend`]
//! is the production implementation over blocking `reqwest`.

pub mod error;
pub mod http;

pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;

use teamtrack_types::admin::{KeyStatus, SetupResponse, VerifyResponse};
use teamtrack_types::tasks::SearchResult;

/// Operations the admin console needs from the backend.
///
/// Calls block; callers run them off the UI thread.
pub trait AdminBackend: Send + Sync {
    /// `GET /admin/key-exists`.
    fn key_exists(&self) -> ClientResult<KeyStatus>;

    /// `POST /admin/setup-key`.
    fn setup_key(&self, admin_key: &str) -> ClientResult<SetupResponse>;

    /// `POST /admin/verify-key`.
    fn verify_key(&self, admin_key: &str) -> ClientResult<VerifyResponse>;

    /// `GET /admin/team-tasks`.
    fn team_tasks(&self, username: &str, admin_key: &str) -> ClientResult<SearchResult>;
}
