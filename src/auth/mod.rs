//! Authentication handling
//!
//! - OAuth 2.0 client credentials with a shared token cache
//! - Detection of diagram steps that stand for "obtain a token"

pub mod oauth2;

pub use oauth2::{
    bearer_headers, AuthFlavor, CachedToken, CredentialConfig, CredentialProvider,
    DEFAULT_EXPIRES_IN, EXPIRY_SKEW,
};

use crate::process::Step;

/// Endpoint fragments that mark a token-issuing step
pub const DEFAULT_ENDPOINT_PATTERNS: &[&str] = &["/auth/bank-token", "/auth/token", "/oauth/token"];

/// Lowercase name fragments that mark a token-issuing step
pub const DEFAULT_NAME_PATTERNS: &[&str] = &["authentication", "auth", "аутентификация"];

/// Decides whether a step is served by the credential provider instead of an HTTP call
#[derive(Debug, Clone)]
pub struct AuthStepMatcher {
    endpoint_patterns: Vec<String>,
    name_patterns: Vec<String>,
}

impl Default for AuthStepMatcher {
    fn default() -> Self {
        Self::new(
            DEFAULT_ENDPOINT_PATTERNS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_NAME_PATTERNS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl AuthStepMatcher {
    pub fn new(endpoint_patterns: Vec<String>, name_patterns: Vec<String>) -> Self {
        Self {
            endpoint_patterns,
            name_patterns: name_patterns.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn is_auth_step(&self, step: &Step) -> bool {
        if let Some(endpoint) = step.endpoint.as_deref() {
            if self.endpoint_patterns.iter().any(|p| endpoint.contains(p.as_str())) {
                return true;
            }
        }
        let name = step.name.to_lowercase();
        self.name_patterns.iter().any(|p| name.contains(p.as_str()))
    }
}
