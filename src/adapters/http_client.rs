use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use eyre::{Result, WrapErr};
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, Version, header, header::HeaderValue};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use rustls::{
    DigitallySignedStruct, SignatureScheme,
    client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
    crypto::CryptoProvider,
    pki_types::{CertificateDer, ServerName, UnixTime},
};
use rustls_native_certs::load_native_certs;

pub use crate::ports::http_client::HttpClientOptions;
use crate::ports::http_client::{
    BoxError, HttpClient, HttpClientError, HttpClientResult, ResponseBody,
};

const USER_AGENT: &str = concat!("ingress-probe/", env!("CARGO_PKG_VERSION"));

/// HTTP client adapter using Hyper with Rustls (HTTP/1.1).
///
/// Responsibilities:
/// * Opens a fresh connection for every request (no idle pool, `Connection: close`)
/// * Verifies certificates against the native roots unless told not to
/// * Adds a User-Agent when the request has none
///
/// Timing and timeouts are left to the caller.
pub struct HttpClientAdapter {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HttpClientAdapter {
    /// Create a new HTTP client adapter.
    pub fn new(options: HttpClientOptions) -> Result<Self> {
        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());

        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false); // Allow HTTPS URLs
        http_connector.set_connect_timeout(Some(options.connect_timeout));

        let builder = rustls::ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .wrap_err("Failed to select TLS protocol versions")?;

        let tls_config = if options.skip_tls_verify {
            tracing::warn!("TLS certificate verification is disabled");
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate { provider }))
                .with_no_client_auth()
        } else {
            builder
                .with_root_certificates(Self::native_root_store())
                .with_no_client_auth()
        };

        let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        // Idle connections are never kept, so each request dials anew
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build::<_, Full<Bytes>>(https_connector);

        tracing::debug!(
            "Created HTTP client (skip TLS verify: {}, connect timeout: {:?})",
            options.skip_tls_verify,
            options.connect_timeout
        );
        Ok(Self { client })
    }

    /// Factory entry point: one adapter per options value, as a port object.
    pub fn connect(options: HttpClientOptions) -> HttpClientResult<Arc<dyn HttpClient>> {
        let adapter =
            Self::new(options).map_err(|e| HttpClientError::ClientSetup(format!("{e:#}")))?;
        Ok(Arc::new(adapter))
    }

    fn native_root_store() -> rustls::RootCertStore {
        let mut root_cert_store = rustls::RootCertStore::empty();
        let native_certs = load_native_certs();

        for cert in native_certs.certs {
            if root_cert_store.add(cert).is_err() {
                tracing::warn!("Failed to add native certificate to rustls RootCertStore");
            }
        }
        tracing::debug!("Loaded {} native root certificates.", root_cert_store.len());

        if !native_certs.errors.is_empty() {
            tracing::warn!(
                "Some native certificates failed to load: {:?}",
                native_certs.errors
            );
        }
        root_cert_store
    }

    /// Inject the headers every probe request carries.
    fn add_common_headers(req: &mut Request<Full<Bytes>>) {
        let headers = req.headers_mut();
        if !headers.contains_key(header::USER_AGENT) {
            headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        }
        headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
    }
}

#[async_trait]
impl HttpClient for HttpClientAdapter {
    async fn send_request(
        &self,
        mut req: Request<Full<Bytes>>,
    ) -> HttpClientResult<Response<ResponseBody>> {
        if req.uri().host().is_none() {
            tracing::error!("Outgoing URI has no host: {}", req.uri());
            return Err(HttpClientError::InvalidRequest(
                "Outgoing URI has no host".to_string(),
            ));
        }

        Self::add_common_headers(&mut req);
        *req.version_mut() = Version::HTTP_11;
        tracing::debug!("Outgoing request headers: {:?}", req.headers());

        let method_for_error_log = req.method().clone();
        let uri_for_error_log = req.uri().clone();

        match self.client.request(req).await {
            Ok(response) => {
                let (parts, incoming) = response.into_parts();
                let body = incoming
                    .map_err(|e| -> BoxError { Box::new(e) })
                    .boxed_unsync();
                Ok(Response::from_parts(parts, body))
            }
            Err(e) => {
                tracing::debug!(
                    "Error requesting {} {}: {:?}",
                    method_for_error_log,
                    uri_for_error_log,
                    e
                );
                Err(HttpClientError::ConnectionError(format!(
                    "Request to {method_for_error_log} {uri_for_error_log} failed: {}",
                    error_chain(&e)
                )))
            }
        }
    }
}

/// Flatten an error and its sources into one line, e.g. "client error (Connect): tcp
/// connect error: Connection refused".
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Certificate verifier that trusts every server. Signatures are still checked so the
/// handshake itself stays well-formed.
#[derive(Debug)]
struct AcceptAnyCertificate {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_client_creation() {
        assert!(HttpClientAdapter::new(HttpClientOptions::default()).is_ok());

        let insecure = HttpClientOptions {
            skip_tls_verify: true,
            ..HttpClientOptions::default()
        };
        assert!(HttpClientAdapter::new(insecure).is_ok());
    }

    #[tokio::test]
    async fn test_connect_builds_port_object() {
        let insecure = HttpClientOptions {
            skip_tls_verify: true,
            ..HttpClientOptions::default()
        };
        assert!(HttpClientAdapter::connect(insecure).is_ok());
    }

    #[test]
    fn test_add_common_headers() {
        let mut req = Request::builder()
            .uri("https://example.com")
            .body(Full::new(Bytes::new()))
            .unwrap();

        HttpClientAdapter::add_common_headers(&mut req);

        let headers = req.headers();
        assert_eq!(headers.get(header::CONNECTION).unwrap(), "close");
        assert!(
            headers
                .get(header::USER_AGENT)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("ingress-probe/")
        );
    }

    #[test]
    fn test_existing_user_agent_is_kept() {
        let mut req = Request::builder()
            .uri("https://example.com")
            .header(header::USER_AGENT, "curl/8.0")
            .body(Full::new(Bytes::new()))
            .unwrap();

        HttpClientAdapter::add_common_headers(&mut req);
        assert_eq!(req.headers().get(header::USER_AGENT).unwrap(), "curl/8.0");
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_error() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClientAdapter::new(HttpClientOptions::default()).unwrap();
        let req = Request::builder()
            .uri(format!("http://{addr}/"))
            .body(Full::new(Bytes::new()))
            .unwrap();

        match client.send_request(req).await {
            Err(HttpClientError::ConnectionError(message)) => {
                assert!(message.contains(&addr.to_string()));
            }
            other => panic!("Expected ConnectionError, got {other:?}"),
        }
    }

    #[test]
    fn test_accept_any_certificate_offers_schemes() {
        let verifier = AcceptAnyCertificate {
            provider: Arc::new(rustls::crypto::aws_lc_rs::default_provider()),
        };
        assert!(!verifier.supported_verify_schemes().is_empty());
    }
}
