pub mod http_client;
pub mod prompt;
pub mod routing_source;
