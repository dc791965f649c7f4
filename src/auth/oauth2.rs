//! OAuth 2.0 client credentials with a shared token cache
//!
//! One [`CredentialProvider`] is built per run and handed to every
//! execution. The cache lock is held across the network fetch, so
//! concurrent callers trigger at most one token request at a time.

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::FlowpulseError;

/// Tokens this close to expiry are refreshed before use
pub const EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// Applied when the token response carries no `expires_in`
pub const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Shape of the token request body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthFlavor {
    /// `grant_type=client_credentials&client_id=..&client_secret=..`
    #[default]
    Form,
    /// `{"client_id": .., "client_secret": ..}`
    Json,
}

/// Client credentials and token endpoint
#[derive(Clone)]
pub struct CredentialConfig {
    pub token_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub flavor: AuthFlavor,
    /// Seconds, used when the server omits `expires_in`
    pub default_expires_in: u64,
}

impl CredentialConfig {
    pub fn new(token_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: None,
            client_secret: None,
            flavor: AuthFlavor::Form,
            default_expires_in: DEFAULT_EXPIRES_IN,
        }
    }

    pub fn with_client(mut self, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    fn credentials(&self) -> Result<(&str, &str), FlowpulseError> {
        let client_id = self
            .client_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FlowpulseError::Auth("Client ID is not configured".to_string()))?;
        let client_secret = self
            .client_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FlowpulseError::Auth("Client secret is not configured".to_string()))?;
        Ok((client_id, client_secret))
    }
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("flavor", &self.flavor)
            .field("default_expires_in", &self.default_expires_in)
            .finish()
    }
}

/// OAuth 2.0 token response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// OAuth 2.0 error response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenError {
    pub error: String,
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

/// Cached bearer token with its absolute expiry
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: Instant,
    /// Lifetime reported by the server (or the default)
    pub expires_in: u64,
}

impl CachedToken {
    pub fn new(access_token: impl Into<String>, expires_in: u64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: Instant::now() + Duration::from_secs(expires_in),
            expires_in,
        }
    }

    /// Usable if at least [`EXPIRY_SKEW`] remains before expiry
    pub fn is_fresh(&self, now: Instant) -> bool {
        now + EXPIRY_SKEW < self.expires_at
    }
}

/// Issues and caches bearer tokens
pub struct CredentialProvider {
    config: CredentialConfig,
    client: reqwest::Client,
    cache: Mutex<Option<CachedToken>>,
}

impl CredentialProvider {
    pub fn new(config: CredentialConfig, client: reqwest::Client) -> Self {
        Self {
            config,
            client,
            cache: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &CredentialConfig {
        &self.config
    }

    /// Current token, fetching a new one if none is cached or it is about to expire
    pub async fn get_token(&self) -> Result<CachedToken, FlowpulseError> {
        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref() {
            if token.is_fresh(Instant::now()) {
                debug!("Using cached access token");
                return Ok(token.clone());
            }
            debug!("Cached access token is about to expire, refreshing");
        }

        let token = self.obtain_token().await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    /// Fetch a new token regardless of the cache
    pub async fn force_refresh(&self) -> Result<CachedToken, FlowpulseError> {
        let mut cache = self.cache.lock().await;
        let token = self.obtain_token().await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    /// `Authorization: Bearer <token>` plus a JSON content type
    pub async fn auth_headers(&self) -> Result<HeaderMap, FlowpulseError> {
        let token = self.get_token().await?;
        bearer_headers(&token.access_token)
    }

    async fn obtain_token(&self) -> Result<CachedToken, FlowpulseError> {
        let (client_id, client_secret) = self.config.credentials()?;

        info!(url = %self.config.token_url, flavor = ?self.config.flavor, "Requesting access token");

        let request = self.client.post(&self.config.token_url).header("Accept", "application/json");
        let request = match self.config.flavor {
            AuthFlavor::Form => request.form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ]),
            AuthFlavor::Json => request.json(&JsonTokenRequest {
                client_id,
                client_secret,
            }),
        };

        let response = request.send().await.map_err(|e| {
            FlowpulseError::Auth(format!("Token request failed: {}", e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(FlowpulseError::Request)?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<TokenError>(&body) {
                let msg = match error.error_description {
                    Some(desc) => format!("{}: {}", error.error, desc),
                    None => error.error,
                };
                return Err(FlowpulseError::Auth(format!("Token request failed: {}", msg)));
            }
            return Err(FlowpulseError::Auth(format!(
                "Token request failed with status {}: {}",
                status, body
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            FlowpulseError::Auth(format!("Invalid token response: {}", e))
        })?;
        if parsed.access_token.is_empty() {
            return Err(FlowpulseError::Auth("Token response has an empty access_token".to_string()));
        }

        let expires_in = parsed.expires_in.unwrap_or(self.config.default_expires_in);
        info!(expires_in, "Obtained access token");
        Ok(CachedToken::new(parsed.access_token, expires_in))
    }

    #[cfg(test)]
    pub(crate) async fn seed(&self, token: CachedToken) {
        *self.cache.lock().await = Some(token);
    }
}

pub fn bearer_headers(token: &str) -> Result<HeaderMap, FlowpulseError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| FlowpulseError::Auth(format!("Invalid token characters: {}", e)))?;
    headers.insert(AUTHORIZATION, value);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> CredentialProvider {
        let config = CredentialConfig::new(format!("{}/auth/token", server.uri()))
            .with_client("client-a", "s3cret");
        CredentialProvider::new(config, reqwest::Client::new())
    }

    #[test]
    fn test_freshness_uses_skew() {
        let now = Instant::now();
        let fresh = CachedToken {
            access_token: "t".into(),
            expires_at: now + Duration::from_secs(61),
            expires_in: 61,
        };
        let stale = CachedToken {
            access_token: "t".into(),
            expires_at: now + Duration::from_secs(59),
            expires_in: 59,
        };
        assert!(fresh.is_fresh(now));
        assert!(!stale.is_fresh(now));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = CredentialConfig::new("http://x").with_client("id", "topsecret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_cached_token_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "new-token"
            })))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider(&server);
        provider.seed(CachedToken::new("cached", 600)).await;

        let token = provider.get_token().await.unwrap();
        assert_eq!(token.access_token, "cached");
    }

    #[tokio::test]
    async fn test_near_expiry_token_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "new-token",
                "expires_in": 120
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        provider.seed(CachedToken::new("stale", 30)).await;

        let token = provider.get_token().await.unwrap();
        assert_eq!(token.access_token, "new-token");
        assert_eq!(token.expires_in, 120);

        // Second call hits the refreshed cache
        let again = provider.get_token().await.unwrap();
        assert_eq!(again.access_token, "new-token");
    }

    #[tokio::test]
    async fn test_force_refresh_always_fetches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "forced"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        provider.seed(CachedToken::new("cached", 600)).await;

        let token = provider.force_refresh().await.unwrap();
        assert_eq!(token.access_token, "forced");
        assert_eq!(token.expires_in, DEFAULT_EXPIRES_IN);
    }

    #[tokio::test]
    async fn test_missing_client_id_is_auth_error() {
        let provider = CredentialProvider::new(
            CredentialConfig::new("http://127.0.0.1:9/auth/token"),
            reqwest::Client::new(),
        );
        let err = provider.get_token().await.unwrap_err();
        assert!(matches!(err, FlowpulseError::Auth(ref m) if m.contains("Client ID")));
    }

    #[tokio::test]
    async fn test_rejected_credentials_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "bad secret"
            })))
            .mount(&server)
            .await;

        let err = provider(&server).get_token().await.unwrap_err();
        match err {
            FlowpulseError::Auth(msg) => assert!(msg.contains("invalid_client: bad secret")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bearer_headers() {
        let headers = bearer_headers("abc").unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }
}
