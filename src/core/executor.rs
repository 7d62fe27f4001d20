//! Request execution: one shot or an unbounded fixed-interval loop.
//!
//! `RequestExecutor::execute` hands back a lazy stream. Nothing is sent until the caller
//! polls it, and each poll after the first waits the repeat interval before sending. The
//! stream ends after a single report when repeating is off, after the first error, or
//! when the stop token fires.
use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use futures_util::{
    StreamExt,
    stream::{self, BoxStream},
};
use http_body_util::{BodyExt, Full};
use hyper::{Request, Uri, header};
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::{
    core::{
        error::{ProbeError, ProbeResult},
        model::{ExecutionReport, RequestSpec, ResolvedTarget},
        path_join::join_path,
    },
    ports::http_client::{HttpClient, HttpClientError, HttpClientFactory, HttpClientOptions},
    tracing_setup::create_probe_span,
};

/// Per-exchange bound covering response headers and body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Pause between repeated executions.
pub const DEFAULT_REPEAT_INTERVAL: Duration = Duration::from_secs(1);

/// Build `scheme://host` + the joined path for a resolved target.
pub fn target_url(target: &ResolvedTarget, https: bool, sub_path: &str) -> String {
    let scheme = if https { "https" } else { "http" };
    format!(
        "{scheme}://{}{}",
        target.host,
        join_path(&target.path_prefix, sub_path)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorSettings {
    pub timeout: Duration,
    pub repeat_interval: Duration,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            repeat_interval: DEFAULT_REPEAT_INTERVAL,
        }
    }
}

/// Issues a `RequestSpec` through an `HttpClient` and reports every response.
///
/// The client is built per `execute` call from the spec, so certificate checking always
/// follows `RequestSpec::skip_tls_verify`.
pub struct RequestExecutor {
    clients: Arc<dyn HttpClientFactory>,
    settings: ExecutorSettings,
    stop: CancellationToken,
}

impl RequestExecutor {
    pub fn new(clients: Arc<dyn HttpClientFactory>, settings: ExecutorSettings) -> Self {
        Self {
            clients,
            settings,
            stop: CancellationToken::new(),
        }
    }

    /// Use `stop` to end the stream early, e.g. from a Ctrl+C handler.
    pub fn with_stop_token(mut self, stop: CancellationToken) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Lazily execute `spec`. Polling the stream again re-runs nothing that already ran;
    /// a fresh sequence needs a fresh call.
    pub fn execute(
        &self,
        spec: RequestSpec,
    ) -> BoxStream<'static, ProbeResult<ExecutionReport>> {
        let options = HttpClientOptions {
            skip_tls_verify: spec.skip_tls_verify,
            connect_timeout: self.settings.timeout,
        };
        let client = match self.clients.create(options) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("Could not build HTTP client: {}", e);
                return stream::once(async move { Err(e.into()) }).boxed();
            }
        };

        let state = LoopState {
            client,
            spec: Arc::new(spec),
            settings: self.settings,
            stop: self.stop.clone(),
            iteration: 0,
            finished: false,
        };

        stream::unfold(state, |mut state| async move {
            if state.finished || state.stop.is_cancelled() {
                return None;
            }

            if state.iteration > 0 {
                tokio::select! {
                    _ = state.stop.cancelled() => {
                        tracing::info!("Stop requested, ending repeat loop after {} runs", state.iteration);
                        return None;
                    }
                    _ = tokio::time::sleep(state.settings.repeat_interval) => {}
                }
            }

            state.iteration += 1;
            let outcome = tokio::select! {
                _ = state.stop.cancelled() => {
                    tracing::info!("Stop requested during run {}", state.iteration);
                    return None;
                }
                outcome = execute_once(
                    state.client.as_ref(),
                    &state.spec,
                    state.settings.timeout,
                    state.iteration,
                ) => outcome,
            };

            state.finished = !state.spec.repeat || outcome.is_err();
            Some((outcome, state))
        })
        .boxed()
    }
}

struct LoopState {
    client: Arc<dyn HttpClient>,
    spec: Arc<RequestSpec>,
    settings: ExecutorSettings,
    stop: CancellationToken,
    iteration: u64,
    finished: bool,
}

fn build_request(spec: &RequestSpec) -> ProbeResult<Request<Full<Bytes>>> {
    let uri: Uri = spec
        .url
        .parse()
        .map_err(|e| ProbeError::InvalidRequest(format!("{}: {e}", spec.url)))?;
    if uri.host().is_none_or(str::is_empty) {
        return Err(ProbeError::InvalidRequest(format!("{} has no host", spec.url)));
    }

    let mut builder = Request::builder().method(spec.method.clone()).uri(uri);
    if let Some(content_type) = &spec.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type.as_str());
    }

    builder
        .body(Full::new(spec.body.clone().unwrap_or_default()))
        .map_err(|e| ProbeError::InvalidRequest(e.to_string()))
}

async fn execute_once(
    client: &dyn HttpClient,
    spec: &RequestSpec,
    limit: Duration,
    iteration: u64,
) -> ProbeResult<ExecutionReport> {
    let request = build_request(spec)?;

    let span = create_probe_span(spec.method.as_str(), &spec.url, iteration);

    async move {
        tracing::info!("Requesting {} {}", spec.method, spec.url);
        let started = Instant::now();

        let response = match timeout(limit, client.send_request(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(
                    "Request failed after {}ms: {}",
                    started.elapsed().as_millis(),
                    e
                );
                return Err(e.into());
            }
            Err(_) => {
                tracing::warn!("Request timed out after {:?}", limit);
                return Err(HttpClientError::Timeout(limit).into());
            }
        };
        let elapsed = started.elapsed();

        let (parts, body) = response.into_parts();
        let remaining = limit.saturating_sub(elapsed);
        let body = timeout(remaining, body.collect())
            .await
            .map_err(|_| HttpClientError::Timeout(limit))?
            .map_err(|e| HttpClientError::BodyError(e.to_string()))?
            .to_bytes();

        let elapsed_millis = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);
        let span = tracing::Span::current();
        span.record("http.status_code", parts.status.as_u16());
        span.record("duration_ms", elapsed_millis);
        tracing::info!(
            "Received {} with {} body bytes in {}ms",
            parts.status,
            body.len(),
            elapsed_millis
        );

        Ok(ExecutionReport {
            elapsed_millis,
            status_code: parts.status.as_u16(),
            headers: ExecutionReport::collect_headers(&parts.headers),
            body,
        })
    }
    .instrument(span)
    .await
}
