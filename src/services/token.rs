use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};
use crate::clients::HttpClient;
use crate::config::NaverConfig;
use crate::error::{Error, Result};
use crate::models::TokenResponse;
use crate::utils::signature::sign;
use crate::utils::time::now_millis;

/// A bearer token for one report run.
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    pub issued_at: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Exchanges signed client credentials for an access token.
pub struct TokenClient {
    http: Arc<HttpClient>,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl TokenClient {
    pub fn new(http: Arc<HttpClient>, settings: &NaverConfig) -> Self {
        Self {
            http,
            token_url: settings.token_url.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
        }
    }

    /// Not retried: any failure here aborts the run.
    pub async fn request_access_token(&self) -> Result<AccessToken> {
        let timestamp = now_millis();
        let signature = sign(&self.client_id, &self.client_secret, timestamp)?;
        let timestamp = timestamp.to_string();

        let form = [
            ("client_id", self.client_id.as_str()),
            ("timestamp", timestamp.as_str()),
            ("grant_type", "client_credentials"),
            ("client_secret_sign", signature.as_str()),
            ("type", "SELF"),
        ];

        debug!(url = %self.token_url, "Requesting access token");

        let body = self.http.post_form(&self.token_url, &form).await.map_err(|e| {
            error!(error = %e, "Token request failed");
            match e {
                Error::Fetch { status, message } => Error::Auth(format!("HTTP {status}: {message}")),
                Error::RateLimit { status } => Error::Auth(format!("HTTP {status}: rate limited")),
                other => Error::Auth(other.to_string()),
            }
        })?;

        let response: TokenResponse = serde_json::from_value(body)
            .map_err(|e| Error::Auth(format!("unreadable token response: {e}")))?;

        let value = response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Auth("token response missing access_token".to_string()))?;

        info!(expires_in = ?response.expires_in, "Access token acquired");

        Ok(AccessToken {
            value,
            issued_at: Utc::now(),
        })
    }
}
