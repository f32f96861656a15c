//! Client error taxonomy.

use thiserror::Error;

/// Error type for all backend calls.
#[derive(Error, Debug)]
pub enum ClientError {
    /// 401/403: the admin key was missing, wrong or revoked.
    #[error("access denied (HTTP {status})")]
    Forbidden { status: u16, detail: Option<String> },
    /// Any other non-2xx answer.
    #[error("backend returned HTTP {status}")]
    Rejected { status: u16, detail: Option<String> },
    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// 2xx with a body that does not match the contract.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Whether this is an authorization failure that must drop the session
    /// back to the credential challenge.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, ClientError::Forbidden { .. })
    }

    /// Backend-supplied `detail`, if the error carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Forbidden { detail, .. } | ClientError::Rejected { detail, .. } => {
                detail.as_deref()
            }
            _ => None,
        }
    }
}
