//! Conversion daemon client implementation.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{ConvertError, ConvertResult};

/// Request path exposed by the conversion daemon.
const ENDPOINT: &str = "/request";

/// Configuration for the conversion client.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Base URL of the conversion daemon
    pub base_url: String,
    /// Request timeout (conversions of large decks can take a while)
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl ConvertConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ConvertResult<Self> {
        Ok(Self {
            base_url: std::env::var("UNOSERVER_URL")
                .map_err(|_| ConvertError::config_error("UNOSERVER_URL not set"))?,
            timeout: Duration::from_secs(
                std::env::var("CONVERT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("CONVERT_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        })
    }
}

/// Conversion daemon client.
#[derive(Clone)]
pub struct ConvertClient {
    http: Client,
    endpoint: Url,
}

impl ConvertClient {
    /// Create a new conversion client.
    pub fn new(config: ConvertConfig) -> ConvertResult<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ConvertError::config_error(format!("invalid base URL: {}", e)))?;
        let endpoint = base
            .join(ENDPOINT)
            .map_err(|e| ConvertError::config_error(format!("invalid endpoint: {}", e)))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("slidepdf-convert/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, endpoint })
    }

    /// Create from environment variables.
    pub fn from_env() -> ConvertResult<Self> {
        Self::new(ConvertConfig::from_env()?)
    }

    /// Convert a document, returning the converted bytes.
    ///
    /// Sends the source bytes as a multipart request with the original
    /// filename, the target format, and any extra daemon options. Any
    /// non-success response is surfaced as [`ConvertError::Rejected`] with
    /// the daemon's status and message.
    pub async fn convert(
        &self,
        file: Vec<u8>,
        filename: &str,
        convert_to: &str,
        opts: &[String],
    ) -> ConvertResult<Vec<u8>> {
        debug!(
            "Converting {} ({} bytes) to {}",
            filename,
            file.len(),
            convert_to
        );

        let mut form = Form::new()
            .part("file", Part::bytes(file).file_name(filename.to_string()))
            .text("convert-to", convert_to.to_string());
        for opt in opts {
            form = form.text("opts[]", opt.clone());
        }

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ConvertError::Rejected {
                status: status.as_u16(),
                message: if message.is_empty() {
                    "conversion failed".to_string()
                } else {
                    message
                },
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ConvertClient {
        ConvertClient::new(ConvertConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_convert_returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/request"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let converted = client
            .convert(b"deck bytes".to_vec(), "deck.pptx", "pdf", &[])
            .await
            .unwrap();

        assert_eq!(converted, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_convert_surfaces_daemon_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/request"))
            .respond_with(ResponseTemplate::new(500).set_body_string("soffice crashed"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .convert(b"deck bytes".to_vec(), "deck.pptx", "pdf", &[])
            .await
            .unwrap_err();

        match err {
            ConvertError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "soffice crashed");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_convert_failure_without_body_gets_default_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/request"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .convert(b"deck bytes".to_vec(), "deck.pptx", "pdf", &[])
            .await
            .unwrap_err();

        match err {
            ConvertError::Rejected { status, message } => {
                assert_eq!(status, 502);
                assert!(!message.is_empty());
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_endpoint_join() {
        let client = ConvertClient::new(ConvertConfig {
            base_url: "http://unoserver:2004".to_string(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(1),
        })
        .unwrap();
        assert_eq!(client.endpoint.as_str(), "http://unoserver:2004/request");
    }
}
