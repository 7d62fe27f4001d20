use std::time::Duration;

use async_trait::async_trait;
use eyre::{Context, Result};
use reqwest::Client;

use crate::{
    adapters::routing_sources::ingress_json::parse_ingress_json,
    core::model::RoutingResource, ports::routing_source::RoutingSource,
};

/// Routing source that lists ingresses from a Kubernetes API server.
///
/// Meant for an unauthenticated endpoint such as `kubectl proxy`. A URL that already
/// contains `/apis/` is used as given; otherwise the namespaced ingress collection path
/// is appended.
pub struct HttpRoutingSource {
    url: String,
    client: Client,
}

impl HttpRoutingSource {
    pub fn new(base_url: &str, namespace: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build API server client")?;

        Ok(Self {
            url: Self::ingress_list_url(base_url, namespace),
            client,
        })
    }

    fn ingress_list_url(base_url: &str, namespace: &str) -> String {
        if base_url.contains("/apis/") {
            base_url.to_string()
        } else {
            format!(
                "{}/apis/networking.k8s.io/v1/namespaces/{}/ingresses",
                base_url.trim_end_matches('/'),
                namespace
            )
        }
    }
}

#[async_trait]
impl RoutingSource for HttpRoutingSource {
    async fn load_resources(&self) -> Result<Vec<RoutingResource>> {
        let bytes = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to send request")?
            .error_for_status()
            .context("API server rejected the ingress list request")?
            .bytes()
            .await
            .context("Failed to read ingress list body")?;

        let resources = parse_ingress_json(&bytes)
            .with_context(|| format!("Invalid ingress list from {}", self.url))?;
        tracing::info!("Loaded {} ingresses from {}", resources.len(), self.url);
        Ok(resources)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingress_list_url() {
        assert_eq!(
            HttpRoutingSource::ingress_list_url("http://127.0.0.1:8001/", "shop"),
            "http://127.0.0.1:8001/apis/networking.k8s.io/v1/namespaces/shop/ingresses"
        );
        let explicit = "http://127.0.0.1:8001/apis/networking.k8s.io/v1/ingresses";
        assert_eq!(
            HttpRoutingSource::ingress_list_url(explicit, "ignored"),
            explicit
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_server_is_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source =
            HttpRoutingSource::new(&format!("http://{addr}"), "default", Duration::from_secs(2))
                .unwrap();
        assert!(source.load_resources().await.is_err());
    }
}
