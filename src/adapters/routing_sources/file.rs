use std::path::PathBuf;

use async_trait::async_trait;
use eyre::{Context, Result};

use crate::{
    adapters::routing_sources::ingress_json::parse_ingress_json,
    core::model::RoutingResource, ports::routing_source::RoutingSource,
};

/// Routing source that reads a saved `kubectl get ingress -o json` document.
pub struct FileRoutingSource {
    path: PathBuf,
}

impl FileRoutingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RoutingSource for FileRoutingSource {
    async fn load_resources(&self) -> Result<Vec<RoutingResource>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read ingress file {}", self.path.display()))?;
        let resources = parse_ingress_json(&bytes)
            .with_context(|| format!("Invalid ingress file {}", self.path.display()))?;
        tracing::info!(
            "Loaded {} ingresses from {}",
            resources.len(),
            self.path.display()
        );
        Ok(resources)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
