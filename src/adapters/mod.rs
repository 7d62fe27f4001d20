pub mod http_client;
pub mod line_prompt;
pub mod routing_sources;

/// Re-export commonly used types from adapters
pub use http_client::{HttpClientAdapter, HttpClientOptions};
pub use line_prompt::LinePrompt;
pub use routing_sources::{FileRoutingSource, HttpRoutingSource};
