use std::time::Duration;

/// Default Cloud Logging API endpoint
pub(crate) const DEFAULT_ENDPOINT: &str = "https://logging.googleapis.com";
/// Matches the buffering limit of the official client libraries
pub(crate) const DEFAULT_MAX_BUFFERED_ENTRIES: usize = 1000;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How a [`LoggingClient`](crate::LoggingClient) talks to Cloud Logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    endpoint: String,
    timeout: Duration,
    max_buffered_entries: usize,
    access_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_buffered_entries: DEFAULT_MAX_BUFFERED_ENTRIES,
            access_token: None,
        }
    }
}

impl ClientConfig {
    /// Reads `LOGGING_ENDPOINT` and `GOOGLE_OAUTH_ACCESS_TOKEN` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`], with a custom variable lookup.
    /// Unset and empty variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(endpoint) = lookup("LOGGING_ENDPOINT").filter(|v| !v.is_empty()) {
            config = config.with_endpoint(endpoint);
        }
        if let Some(token) = lookup("GOOGLE_OAUTH_ACCESS_TOKEN").filter(|v| !v.is_empty()) {
            config = config.with_access_token(token);
        }
        config
    }

    /// Sends requests to a different API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the HTTP request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how many entries a logger holds before flushing on its own.
    /// Values below 1 are treated as 1.
    pub fn with_max_buffered_entries(mut self, max_buffered_entries: usize) -> Self {
        self.max_buffered_entries = max_buffered_entries.max(1);
        self
    }

    /// Uses a fixed access token instead of the metadata server.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// API endpoint without a trailing slash
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// HTTP request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Buffered entries that trigger an automatic flush
    pub fn max_buffered_entries(&self) -> usize {
        self.max_buffered_entries
    }

    /// Fixed access token, if one was configured
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}
