use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{Full, combinators::UnsyncBoxBody};
use hyper::{Request, Response};
use thiserror::Error;

/// Boxed error carried by response bodies
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Response body handed back by an `HttpClient`
pub type ResponseBody = UnsyncBoxBody<Bytes, BoxError>;

/// Custom error type for HTTP client operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpClientError {
    /// Error when connecting to or exchanging data with the target fails
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error when the exchange does not finish in time
    #[error("Timeout error after {0:?}")]
    Timeout(Duration),

    /// Error when request is invalid
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error when the response body cannot be read
    #[error("Failed to read response body: {0}")]
    BodyError(String),

    /// Error when a client cannot be built for the requested options
    #[error("Failed to set up HTTP client: {0}")]
    ClientSetup(String),
}

/// Result type alias for HTTP client operations
pub type HttpClientResult<T> = Result<T, HttpClientError>;

/// Connection level knobs a client is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientOptions {
    /// Accept any server certificate
    pub skip_tls_verify: bool,
    pub connect_timeout: Duration,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            skip_tls_verify: false,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// HttpClient defines the port (interface) for issuing probe requests
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    /// Send one request and resolve once the response headers have arrived
    ///
    /// The body is returned unread so callers can time the header phase separately.
    async fn send_request(
        &self,
        req: Request<Full<Bytes>>,
    ) -> HttpClientResult<Response<ResponseBody>>;
}

/// Builds the client a request spec runs on, so TLS verification follows the spec
pub trait HttpClientFactory: Send + Sync + 'static {
    fn create(&self, options: HttpClientOptions) -> HttpClientResult<Arc<dyn HttpClient>>;
}

impl<F> HttpClientFactory for F
where
    F: Fn(HttpClientOptions) -> HttpClientResult<Arc<dyn HttpClient>> + Send + Sync + 'static,
{
    fn create(&self, options: HttpClientOptions) -> HttpClientResult<Arc<dyn HttpClient>> {
        self(options)
    }
}
