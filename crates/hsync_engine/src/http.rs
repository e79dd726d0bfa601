//! HTTP transport over a blocking `reqwest` client.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use hsync_protocol::{FingerprintMap, ReconcileRequest, ReconcileResponse, KEY_HEADER, SYNC_PATH};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use tracing::{debug, warn};

/// HTTP-based sync transport.
///
/// Must not be used from inside an async runtime; the coordinator runs it on
/// a plain thread.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    key: String,
    client: Client,
}

impl HttpTransport {
    /// Creates a transport from the client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        if config.insecure_skip_verify {
            warn!("TLS certificate verification disabled");
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()
            .map_err(|e| SyncError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: format!("{}{}", config.server_url.trim_end_matches('/'), SYNC_PATH),
            key: config.key.clone(),
            client,
        })
    }

    /// Returns the full URL of the sync endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn send(&self, request: RequestBuilder) -> SyncResult<Response> {
        request
            .header(KEY_HEADER, &self.key)
            .send()
            .map_err(transport_error)
    }
}

impl SyncTransport for HttpTransport {
    fn list_fingerprints(&self) -> SyncResult<FingerprintMap> {
        let response = check_status(self.send(self.client.get(&self.endpoint))?)?;
        response.json().map_err(transport_error)
    }

    fn fetch_document(&self, name: &str) -> SyncResult<Option<String>> {
        let response = self.send(self.client.get(&self.endpoint).query(&[("filename", name)]))?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(document = %name, "document vanished from server");
            return Ok(None);
        }
        let response = check_status(response)?;
        response.text().map(Some).map_err(transport_error)
    }

    fn reconcile(&self, request: &ReconcileRequest) -> SyncResult<ReconcileResponse> {
        let body = request.encode()?;
        let response = self.send(
            self.client
                .post(&self.endpoint)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body),
        )?;
        let bytes = check_status(response)?.bytes().map_err(transport_error)?;
        Ok(ReconcileResponse::decode(&bytes)?)
    }
}

fn check_status(response: Response) -> SyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(SyncError::Unauthorized);
    }

    let message = response.text().unwrap_or_default();
    Err(SyncError::ServerError {
        status: status.as_u16(),
        message: message.trim().to_string(),
    })
}

fn transport_error(e: reqwest::Error) -> SyncError {
    if e.is_builder() {
        SyncError::transport_fatal(e.to_string())
    } else {
        SyncError::transport_retryable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_cleanly() {
        let config = SyncConfig::new("http://localhost:8080/", ".");
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.endpoint(), "http://localhost:8080/sync");

        let config = SyncConfig::new("https://notes.example.com", ".");
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.endpoint(), "https://notes.example.com/sync");
    }

    #[test]
    fn unreachable_server_is_retryable() {
        // Port 9 (discard) on localhost is closed on test machines.
        let config = SyncConfig::new("http://127.0.0.1:9", ".")
            .with_timeout(std::time::Duration::from_secs(2));
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport.list_fingerprints().unwrap_err();
        assert!(err.is_retryable(), "{err}");
    }
}
