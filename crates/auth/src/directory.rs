//! Remote directory client for the account facade.

use tracing::error;

use crate::models::{UserAccount, UserData};

/// HTTP client for the identity/organisation facade.
///
/// The underlying connection pool is stateless and safe to share across
/// concurrent request evaluations. Fetches are aborted by dropping the
/// evaluation future, so a client disconnect cancels the outstanding call.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl DirectoryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Build on a caller-provided client (shared pool, custom TLS, timeouts).
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch a principal's user/organisation record from `endpoint`.
    ///
    /// Every failure mode (transport error, non-2xx status, malformed
    /// body) is logged and swallowed to `None`: a failed fetch is a deny,
    /// never an error surfaced to the pipeline. No retries; callers that
    /// need availability retry with a new request.
    pub async fn user_organisations(&self, endpoint: &str) -> Option<UserData> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                error!(endpoint = %url, error = %err, "user account fetch failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!(endpoint = %url, %status, "user account fetch returned non-success status");
            return None;
        }

        match response.json::<UserAccount>().await {
            Ok(account) => Some(account.user),
            Err(err) => {
                error!(endpoint = %url, error = %err, "user account response body was malformed");
                None
            }
        }
    }
}
