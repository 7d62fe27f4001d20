//! Data model shared by the resolver, the planner and the executor.
//!
//! Routing types are plain owned values built once by a `RoutingSource` and then only
//! borrowed. `RequestSpec` is constructed once per run and handed to the executor by
//! value; every physical HTTP call produces a fresh `ExecutionReport`.
use std::{collections::BTreeMap, fmt};

use bytes::Bytes;
use http::Method;

/// One discoverable ingress-like object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingResource {
    pub name: String,
    pub rules: Vec<RoutingRule>,
}

/// A host plus its ordered path entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    pub host: String,
    pub paths: Vec<RoutingPath>,
}

/// A path prefix and the backend it routes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPath {
    pub path_prefix: String,
    /// Display only, never dereferenced.
    pub backend_description: String,
}

impl RoutingResource {
    pub fn new(name: impl Into<String>, rules: Vec<RoutingRule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }
}

impl RoutingRule {
    pub fn new(host: impl Into<String>, paths: Vec<RoutingPath>) -> Self {
        Self {
            host: host.into(),
            paths,
        }
    }
}

impl RoutingPath {
    pub fn new(path_prefix: impl Into<String>, backend_description: impl Into<String>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            backend_description: backend_description.into(),
        }
    }
}

/// The single host + path prefix pair selected from the routing collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub host: String,
    pub path_prefix: String,
}

/// Everything needed to issue one logical request, possibly many times.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub body: Option<Bytes>,
    pub content_type: Option<String>,
    pub skip_tls_verify: bool,
    pub repeat: bool,
}

impl RequestSpec {
    /// A body-less, single-shot request with TLS verification enabled.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            content_type: None,
            skip_tls_verify: false,
            repeat: false,
        }
    }
}

/// Outcome of one physical HTTP call.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// Wall-clock time from just before sending until the response headers arrived.
    pub elapsed_millis: i64,
    pub status_code: u16,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Bytes,
}

impl ExecutionReport {
    /// Group a header map into name -> ordered values, lossily decoding non UTF-8 values.
    pub fn collect_headers(headers: &http::HeaderMap) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in headers {
            grouped
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        grouped
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Elapsed time(ms) : {}", self.elapsed_millis)?;
        writeln!(f, "Status : {}", self.status_code)?;
        for (name, values) in &self.headers {
            writeln!(f, "{name} : [{}]", values.join(", "))?;
        }
        write!(f, "{}", String::from_utf8_lossy(&self.body))
    }
}
