use async_trait::async_trait;
use eyre::Result;

use crate::core::model::RoutingResource;

/// Trait for sources that supply the routing resources a target is resolved from.
#[async_trait]
pub trait RoutingSource: Send + Sync {
    /// Load every routing resource, in the order the source lists them.
    async fn load_resources(&self) -> Result<Vec<RoutingResource>>;

    /// Human readable location, used in log lines and error context.
    fn describe(&self) -> String;
}
