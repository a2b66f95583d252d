//! HTTP client for the directory endpoint.

use crate::{core::directory::UserRecord, errors::Result};
use tracing::{debug, instrument};

/// Fetches the user directory on behalf of a signed-in operator.
#[derive(Clone, Debug)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl DirectoryClient {
    /// Creates a client for the API at `base_url` (e.g. `http://127.0.0.1:3000`)
    /// authenticating with the operator's session token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Calls `GET /api/admin/users`.
    ///
    /// # Errors
    /// [`crate::errors::Error::Http`] on network failures, non-2xx answers or an
    /// unreadable body.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_users(&self) -> Result<Vec<UserRecord>> {
        let url = format!("{}/api/admin/users", self.base_url.trim_end_matches('/'));
        let users: Vec<UserRecord> = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("Fetched {} users", users.len());
        Ok(users)
    }
}
