//! OAuth2 password-grant login.
//!
//! One form-encoded POST to the token endpoint, one attempt, no retry.

use crate::api::error::{response_detail, transport_detail, AuthError};
use crate::api::types::{mask_secret, Credentials, SessionToken, TokenResponse};
use tracing::{debug, info, warn};

/// Default OAuth token endpoint.
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com/services/oauth2/token";

/// Client for the token endpoint.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    login_url: String,
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("login_url", &self.login_url)
            .field("client_id", &mask_secret(&self.client_id))
            .finish_non_exhaustive()
    }
}

impl AuthClient {
    pub fn new(
        http: reqwest::Client,
        login_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            login_url: login_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Exchange username and password for a bearer token.
    ///
    /// Any failure, including a 2xx response without an `access_token`,
    /// comes back as an [`AuthError`] carrying the server's payload.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        debug!(
            url = %self.login_url,
            username = %credentials.username,
            client_id = %mask_secret(&self.client_id),
            "Requesting access token"
        );

        let form = [
            ("grant_type", "password"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];

        let response = self
            .http
            .post(&self.login_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Login request failed");
                AuthError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = response_detail(status.as_u16(), &body);
            warn!(status = %status, detail = %detail, "Login rejected");
            return Err(AuthError::new(detail));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Login response was not JSON");
            AuthError::new(transport_detail(&e))
        })?;

        match parsed.access_token {
            Some(token) if !token.is_empty() => {
                let token = SessionToken::new(token);
                info!(token = %token.masked(), "Login successful");
                Ok(token)
            }
            _ => {
                warn!("Login response carried no access_token");
                Err(AuthError::new(response_detail(status.as_u16(), &body)))
            }
        }
    }
}
