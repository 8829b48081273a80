//! Access tokens for calling Cloud Logging
//!
//! Inside Cloud Functions the metadata server hands out tokens for the
//! function's service account. Outside of GCP a token can be supplied directly,
//! e.g. from `gcloud auth print-access-token`.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Deserialize;

/// GCE metadata server URL
const METADATA_SERVER_URL: &str = "http://metadata.google.internal";
const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Header required for metadata server requests
const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
const METADATA_FLAVOR_VALUE: &str = "Google";

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Failure to obtain an access token.
#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    /// The metadata server could not be reached.
    #[error("failed to reach metadata server (not running on GCP?): {0}")]
    Unreachable(#[from] reqwest::Error),

    /// The metadata server answered with an error status.
    #[error("metadata server returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The metadata server's answer was not a token response.
    #[error("malformed token response from metadata server: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Supplies bearer tokens for Cloud Logging requests.
pub trait TokenSource: Send + Sync {
    /// Returns a currently valid access token.
    fn token(&self) -> Result<String, TokenError>;
}

/// A fixed, caller-provided token.
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps an access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> Result<String, TokenError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: Instant,
}

impl AccessToken {
    /// A lifetime too large to represent makes the token count as expired.
    fn new(token: String, expires_in: u64) -> Self {
        let now = Instant::now();
        Self {
            token,
            expires_at: now
                .checked_add(Duration::from_secs(expires_in))
                .unwrap_or(now),
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

/// Tokens for the default service account, fetched from the metadata server and
/// cached until shortly before they expire.
pub struct MetadataServerToken {
    http_client: reqwest::blocking::Client,
    base_url: String,
    cache: Mutex<Option<AccessToken>>,
}

impl MetadataServerToken {
    /// Uses the standard metadata server address.
    pub fn new(http_client: reqwest::blocking::Client) -> Self {
        Self::with_base_url(http_client, METADATA_SERVER_URL)
    }

    /// Uses a different metadata server address, e.g. a local emulator.
    pub fn with_base_url(
        http_client: reqwest::blocking::Client,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            cache: Mutex::new(None),
        }
    }

    fn fetch(&self) -> Result<AccessToken, TokenError> {
        let url = format!("{}{}", self.base_url, METADATA_TOKEN_PATH);
        let response = self
            .http_client
            .get(&url)
            .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE)
            .send()?;

        if !response.status().is_success() {
            return Err(TokenError::Status {
                status: response.status().as_u16(),
            });
        }

        let body = response.text()?;
        let TokenResponse {
            access_token,
            expires_in,
        } = serde_json::from_str(&body).map_err(TokenError::Decode)?;
        log::debug!("fetched access token from metadata server, expires in {expires_in}s");
        Ok(AccessToken::new(access_token, expires_in))
    }
}

impl TokenSource for MetadataServerToken {
    fn token(&self) -> Result<String, TokenError> {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(cached) = cache.as_ref().filter(|cached| !cached.is_expired()) {
            return Ok(cached.token.clone());
        }
        let fresh = self.fetch()?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }
}
