//! ingress-probe - send ad-hoc HTTP requests through Kubernetes ingress routing rules.
//!
//! Given the ingress objects of a cluster (saved `kubectl get ingress -o json` output, or
//! an API server reachable through `kubectl proxy`), the tool narrows ingress → rule →
//! path, prompting on the console only when more than one candidate remains, builds the
//! URL from the rule host and path prefix, and sends one request or repeats it at a fixed
//! interval until interrupted.
//!
//! # Architecture
//! The crate separates **ports** (traits) from **adapters** (implementations) while keeping
//! the selection, planning and execution logic inside `core`:
//! - `core::target_resolver` walks the routing resources, asking an `InteractivePrompt`
//!   to disambiguate.
//! - `core::planner` turns the run configuration plus answers into a `RequestSpec`.
//! - `core::executor` drives an `HttpClient` and yields `ExecutionReport`s as a stream.
//!
//! # Quick Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use futures_util::StreamExt;
//! use ingress_probe::{
//!     HttpClientAdapter, LinePrompt, RequestExecutor,
//!     config::RunConfig,
//!     core::plan_request,
//! };
//!
//! # #[tokio::main] async fn main() -> eyre::Result<()> {
//! let config = RunConfig::default();
//! let resources = Vec::new(); // usually loaded through a RoutingSource
//! let mut prompt = LinePrompt::stdio();
//! let spec = plan_request(&config, &resources, &mut prompt).await?;
//!
//! // The executor builds a client per spec, honouring `skip_tls_verify`
//! let executor =
//!     RequestExecutor::new(Arc::new(HttpClientAdapter::connect), config.executor_settings());
//! let mut reports = executor.execute(spec);
//! while let Some(report) = reports.next().await {
//!     println!("{}", report?);
//! }
//! # Ok(()) }
//! ```
//!
//! # Error Handling
//! Core operations return `ProbeResult<T>` with a typed `ProbeError`. Sources, the config
//! loader and the binary use `eyre::Result<T>` with context attached via `WrapErr`.
pub mod config;
pub mod ports;
pub mod tracing_setup;
pub mod utils;

pub mod adapters;
pub mod core;

// Re-export the specific types needed by the binary crate
pub use crate::{
    adapters::{FileRoutingSource, HttpClientAdapter, HttpRoutingSource, LinePrompt},
    core::{ProbeError, RequestExecutor},
    ports::{http_client::HttpClient, prompt::InteractivePrompt, routing_source::RoutingSource},
    utils::Interrupt,
};
