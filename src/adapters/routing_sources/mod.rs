pub mod file;
pub mod http;
pub mod ingress_json;

pub use file::FileRoutingSource;
pub use http::HttpRoutingSource;
pub use ingress_json::parse_ingress_json;
