use eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Log level for a `-v` count, starting from the configured level.
pub fn level_for_verbosity(configured: &str, verbose: u8) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Build the filter: `RUST_LOG` when set, otherwise the given level.
pub fn build_env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("Invalid log level: {level}")),
    }
}

/// Initialize diagnostics on stderr.
///
/// Stdout is reserved for menus, prompts and reports, so every layer writes to stderr.
pub fn init_tracing(level: &str, json_format: bool) -> Result<()> {
    let env_filter = build_env_filter(level)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    if json_format {
        Registry::default()
            .with(env_filter)
            .with(
                fmt_layer
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
            .wrap_err("Failed to install tracing subscriber")?;
    } else {
        Registry::default()
            .with(env_filter)
            .with(fmt_layer.compact())
            .try_init()
            .wrap_err("Failed to install tracing subscriber")?;
    }

    tracing::debug!("Logging initialized with level: {}, json: {}", level, json_format);
    Ok(())
}

/// Span wrapping one HTTP exchange; status and duration are recorded on completion.
pub fn create_probe_span(method: &str, url: &str, iteration: u64) -> tracing::Span {
    tracing::info_span!(
        "probe_request",
        http.method = method,
        http.url = url,
        iteration,
        http.status_code = tracing::field::Empty,
        duration_ms = tracing::field::Empty,
    )
}
