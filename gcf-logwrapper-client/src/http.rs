//! Cloud Logging over HTTPS

use crate::{
    EntryWriter, LoggingError, WriteEntriesRequest,
    auth::{MetadataServerToken, StaticToken, TokenSource},
    config::ClientConfig,
    error::ClientError,
};

/// Writes entries with the Cloud Logging REST API, `POST /v2/entries:write`.
pub struct HttpEntryWriter {
    http_client: reqwest::blocking::Client,
    write_url: String,
    tokens: Box<dyn TokenSource>,
}

impl HttpEntryWriter {
    /// Creates a writer for the configured endpoint.
    ///
    /// A configured access token is used as-is; otherwise tokens come from the
    /// metadata server.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;
        let tokens: Box<dyn TokenSource> = match config.access_token() {
            Some(token) => Box::new(StaticToken::new(token)),
            None => Box::new(MetadataServerToken::new(http_client.clone())),
        };
        Ok(Self::with_token_source(http_client, config.endpoint(), tokens))
    }

    /// Creates a writer with an explicit token source.
    pub fn with_token_source(
        http_client: reqwest::blocking::Client,
        endpoint: &str,
        tokens: Box<dyn TokenSource>,
    ) -> Self {
        Self {
            http_client,
            write_url: write_url(endpoint),
            tokens,
        }
    }
}

fn write_url(endpoint: &str) -> String {
    format!("{}/v2/entries:write", endpoint.trim_end_matches('/'))
}

impl EntryWriter for HttpEntryWriter {
    fn write_entries(&self, request: &WriteEntriesRequest) -> Result<(), LoggingError> {
        let token = self.tokens.token()?;
        let response = self
            .http_client
            .post(&self.write_url)
            .bearer_auth(token)
            .json(request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(LoggingError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_write_url() {
        assert_eq!(
            write_url("https://logging.googleapis.com"),
            "https://logging.googleapis.com/v2/entries:write"
        );
        assert_eq!(
            write_url("http://localhost:8085/"),
            "http://localhost:8085/v2/entries:write"
        );
    }
}
