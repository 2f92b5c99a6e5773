//! Bearer token management.
//!
//! The cube API wants a short-lived JWT issued by the brawltime auth
//! endpoint. Tokens are cached to a JSON file and reused until the `exp`
//! claim lapses; the payload is decoded without signature verification,
//! expiry is the only claim we care about.

use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Errors that can occur while obtaining a token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Configuration for the token manager.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Auth endpoint issuing the token.
    pub auth_url: Url,

    /// Where to cache the token between runs.
    pub cache_path: PathBuf,

    /// Request timeout.
    pub timeout: Duration,

    /// Origin header the endpoint expects.
    pub origin: String,

    /// Referer header the endpoint expects.
    pub referer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auth_url: Url::parse("https://brawltime.ninja/api/auth.getToken")
                .expect("Invalid default auth URL"),
            cache_path: PathBuf::from("./.token_cache.json"),
            timeout: Duration::from_secs(30),
            origin: "https://brawltime.ninja".to_string(),
            referer: "https://brawltime.ninja/".to_string(),
        }
    }
}

/// Cached token file contents.
#[derive(Debug, Serialize, Deserialize)]
struct CachedToken {
    token: String,
    expiry: i64,
}

/// JWT payload; only `exp` matters here.
#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Auth endpoint response envelope.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    result: AuthResult,
}

#[derive(Debug, Deserialize)]
struct AuthResult {
    data: AuthData,
}

#[derive(Debug, Deserialize)]
struct AuthData {
    json: String,
}

/// Fetches and caches bearer tokens.
pub struct TokenManager {
    client: Client,
    config: AuthConfig,
}

impl TokenManager {
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ORIGIN, HeaderValue::from_str(&config.origin)?);
        headers.insert(REFERER, HeaderValue::from_str(&config.referer)?);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get a valid token, from cache when possible.
    pub async fn token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.load_cached() {
            debug!("Using cached auth token");
            return Ok(token);
        }

        let token = self.fetch_token().await?;
        if let Err(e) = self.save(&token) {
            warn!("Failed to cache auth token: {}", e);
        }
        Ok(token)
    }

    /// Load the cached token if the file exists and the token is unexpired.
    fn load_cached(&self) -> Option<String> {
        let contents = std::fs::read_to_string(&self.config.cache_path).ok()?;
        let cached: CachedToken = serde_json::from_str(&contents).ok()?;
        if is_token_valid(&cached.token) {
            Some(cached.token)
        } else {
            None
        }
    }

    /// Persist a token alongside its expiry claim.
    fn save(&self, token: &str) -> Result<(), AuthError> {
        let Some(expiry) = decode_exp(token) else {
            // Token without a readable expiry is not worth caching.
            return Ok(());
        };

        let cached = CachedToken {
            token: token.to_string(),
            expiry,
        };
        std::fs::write(&self.config.cache_path, serde_json::to_string(&cached)?)?;
        Ok(())
    }

    /// Request a fresh token from the auth endpoint.
    async fn fetch_token(&self) -> Result<String, AuthError> {
        debug!("Requesting fresh auth token");

        let response = self
            .client
            .post(self.config.auth_url.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body: AuthResponse = response.json().await?;
        Ok(body.result.data.json)
    }
}

/// Decode the `exp` claim from a JWT payload, without verification.
pub fn decode_exp(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    claims.exp
}

/// Whether the token carries an `exp` claim still in the future.
pub fn is_token_valid(token: &str) -> bool {
    decode_exp(token)
        .map(|exp| Utc::now().timestamp() < exp)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Build an unsigned JWT-shaped token with the given exp claim.
    fn make_jwt(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp));
        format!("{}.{}.sig", header, payload)
    }

    fn test_config(temp_dir: &TempDir) -> AuthConfig {
        AuthConfig {
            cache_path: temp_dir.path().join("token_cache.json"),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_exp() {
        let token = make_jwt(1_900_000_000);
        assert_eq!(decode_exp(&token), Some(1_900_000_000));
    }

    #[test]
    fn test_decode_exp_garbage() {
        assert_eq!(decode_exp("not-a-jwt"), None);
        assert_eq!(decode_exp("a.!!!.c"), None);
        assert_eq!(decode_exp(""), None);
    }

    #[test]
    fn test_token_validity() {
        let future = Utc::now().timestamp() + 3600;
        let past = Utc::now().timestamp() - 3600;

        assert!(is_token_valid(&make_jwt(future)));
        assert!(!is_token_valid(&make_jwt(past)));
        assert!(!is_token_valid("garbage"));
    }

    #[test]
    fn test_cache_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let manager = TokenManager::new(test_config(&temp_dir)).unwrap();

        let token = make_jwt(Utc::now().timestamp() + 3600);
        manager.save(&token).unwrap();

        assert_eq!(manager.load_cached(), Some(token));
    }

    #[test]
    fn test_cache_rejects_expired_token() {
        let temp_dir = TempDir::new().unwrap();
        let manager = TokenManager::new(test_config(&temp_dir)).unwrap();

        let token = make_jwt(Utc::now().timestamp() - 3600);
        manager.save(&token).unwrap();

        assert_eq!(manager.load_cached(), None);
    }

    #[test]
    fn test_cache_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = TokenManager::new(test_config(&temp_dir)).unwrap();

        assert_eq!(manager.load_cached(), None);
    }

    #[test]
    fn test_auth_response_envelope() {
        let body = r#"{"result":{"data":{"json":"tok.abc.def"}}}"#;
        let parsed: AuthResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.result.data.json, "tok.abc.def");
    }
}
