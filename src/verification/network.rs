/// Network transport for the RedefineAuth API
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::{ConfigError, TransportError};

/// Timeout used by the process-wide transport
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP layer used by [`crate::AuthClient`].
///
/// Implementations return `Ok` for every response that carried a status
/// code, whatever the code. `Err` is reserved for failures that prevented
/// a response.
pub trait Transport: Send + Sync {
    /// POST a JSON body
    fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse, TransportError>;

    /// Plain GET
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Blocking reqwest transport with a fixed overall timeout
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .danger_accept_invalid_certs(false) // Enforce SSL verification
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn finish(
        &self,
        response: reqwest::Result<reqwest::blocking::Response>,
    ) -> Result<HttpResponse, TransportError> {
        let response = response.map_err(classify_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(classify_error)?;
        Ok(HttpResponse { status, body })
    }
}

impl Transport for ReqwestTransport {
    fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .send();
        self.finish(response)
    }

    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.finish(self.client.get(url).send())
    }
}

fn classify_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

static SHARED_TRANSPORT: Mutex<Option<Arc<ReqwestTransport>>> = Mutex::new(None);

/// Process-wide transport, created on first use with [`DEFAULT_TIMEOUT`].
///
/// Not meant to be reconfigured mid-flight: callers keep their own `Arc`,
/// so a [`shutdown_shared_transport`] only affects later lookups.
pub fn shared_transport() -> Result<Arc<ReqwestTransport>, ConfigError> {
    let mut slot = SHARED_TRANSPORT
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(transport) = slot.as_ref() {
        return Ok(Arc::clone(transport));
    }

    let transport = Arc::new(ReqwestTransport::new(DEFAULT_TIMEOUT)?);
    log::debug!("Initialized shared HTTP transport");
    *slot = Some(Arc::clone(&transport));
    Ok(transport)
}

/// Release the process-wide transport. Returns whether one was live.
pub fn shutdown_shared_transport() -> bool {
    let released = SHARED_TRANSPORT
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .is_some();
    if released {
        log::debug!("Shared HTTP transport released");
    }
    released
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(503, "").is_success());
    }

    #[test]
    fn test_shared_transport_lifecycle() {
        let first = shared_transport().unwrap();
        let second = shared_transport().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.timeout(), DEFAULT_TIMEOUT);

        assert!(shutdown_shared_transport());
        assert!(!shutdown_shared_transport());

        let third = shared_transport().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        shutdown_shared_transport();
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        // Port 9 on loopback (discard) is closed on any sane test host
        let result = transport.post_json("http://127.0.0.1:9/api/health", "{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_silent_server_is_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            // Hold the connection open without ever answering
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_secs(5));
                drop(stream);
            }
        });

        let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();
        let result = transport.post_json(&format!("http://{addr}/api/keys/validate"), "{}");

        assert!(
            matches!(result, Err(TransportError::Timeout(_))),
            "unexpected result: {result:?}"
        );
    }
}
