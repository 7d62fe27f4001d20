use std::{io::Write, sync::Arc};

use clap::Parser;
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use futures_util::StreamExt;
use ingress_probe::{
    adapters::{FileRoutingSource, HttpClientAdapter, HttpRoutingSource, LinePrompt},
    config::{ConfigOverrides, RunConfig, RunConfigValidator, load_run_config},
    core::{ExecutionReport, RequestExecutor, RequestSpec, plan_request},
    ports::routing_source::RoutingSource,
    tracing_setup,
    utils::Interrupt,
};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Ingress JSON file (`kubectl get ingress -o json`) or API server URL
    #[clap(short = 'f', long)]
    resources: Option<String>,

    /// Namespace to list when reading from an API server
    #[clap(short, long)]
    namespace: Option<String>,

    /// Ingress to use instead of asking
    #[clap(short, long)]
    ingress: Option<String>,

    /// HTTP method to use instead of asking
    #[clap(short, long)]
    method: Option<String>,

    /// Path appended to the rule's path prefix
    #[clap(short, long)]
    path: Option<String>,

    /// Request body: a .json/.xml/.txt file name or literal text
    #[clap(short = 'd', long = "data")]
    data: Option<String>,

    /// Use https instead of http
    #[clap(long)]
    https: bool,

    /// Accept any server certificate
    #[clap(long)]
    skip_verify: bool,

    /// Repeat the request until interrupted
    #[clap(short, long)]
    repeat: bool,

    /// Per-request timeout, e.g. `10s` or `500ms`
    #[clap(long)]
    timeout: Option<String>,

    /// Pause between repeated requests, e.g. `1s`
    #[clap(long)]
    interval: Option<String>,

    /// Optional configuration file (TOML, YAML or JSON)
    #[clap(short, long)]
    config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format: console or json
    #[clap(long)]
    log_format: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new()
            .set_option("resources", self.resources.clone())
            .set_option("namespace", self.namespace.clone())
            .set_option("ingress", self.ingress.clone())
            .set_option("method", self.method.clone())
            .set_option("path", self.path.clone())
            .set_option("body", self.data.clone())
            .set_option("timeout", self.timeout.clone())
            .set_option("repeat_interval", self.interval.clone())
            .set_option("log_format", self.log_format.clone());

        // Flags only ever switch these on; leaving them off keeps file/env values
        if self.https {
            overrides = overrides.set("https", true);
        }
        if self.skip_verify {
            overrides = overrides.set("skip_tls_verify", true);
        }
        if self.repeat {
            overrides = overrides.set("repeat", true);
        }
        overrides
    }
}

fn create_routing_source(config: &RunConfig) -> Result<Box<dyn RoutingSource>> {
    let location = config
        .resources
        .as_deref()
        .ok_or_else(|| eyre!("No ingress resources given (use --resources)"))?;

    if config.resources_is_remote() {
        Ok(Box::new(HttpRoutingSource::new(
            location,
            &config.namespace,
            config.timeout,
        )?))
    } else {
        Ok(Box::new(FileRoutingSource::new(location)))
    }
}

/// One block per execution, led by the request line so repeated runs stay apart
fn render_report(request_line: &str, report: &ExecutionReport) -> String {
    format!("{request_line}\n{report}\n")
}

fn print_report(request_line: &str, report: &ExecutionReport) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(render_report(request_line, report).as_bytes())?;
    stdout.flush()?;
    Ok(())
}

async fn run(config: RunConfig) -> Result<()> {
    let source = create_routing_source(&config)?;
    tracing::info!("Loading ingresses from {}", source.describe());
    let resources = source
        .load_resources()
        .await
        .wrap_err_with(|| format!("Failed to load ingresses from {}", source.describe()))?;

    if resources.is_empty() {
        return Err(eyre!("ingress not found in {}", config.namespace));
    }

    let mut prompt = LinePrompt::stdio();
    let spec: RequestSpec = plan_request(&config, &resources, &mut prompt).await?;

    let interrupt = Interrupt::new();
    let listener = interrupt.spawn_listener();
    let executor = RequestExecutor::new(
        Arc::new(HttpClientAdapter::connect),
        config.executor_settings(),
    )
    .with_stop_token(interrupt.token());

    let request_line = format!("requesting... {} {}", spec.method, spec.url);
    let mut reports = executor.execute(spec);
    let mut outcome = Ok(());
    while let Some(report) = reports.next().await {
        match report {
            Ok(report) => print_report(&request_line, &report)?,
            Err(e) => {
                outcome = Err(e).wrap_err("Request failed");
                break;
            }
        }
    }

    interrupt.trigger();
    if let Err(e) = listener.await {
        tracing::debug!("Interrupt listener ended abnormally: {}", e);
    }
    outcome
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let config = load_run_config(args.config.as_deref(), args.overrides())
        .wrap_err("Failed to load configuration")?;

    RunConfigValidator::validate(&config).map_err(|e| eyre!("Invalid configuration: {}", e))?;

    let level = tracing_setup::level_for_verbosity(&config.log_level, args.verbose);
    tracing_setup::init_tracing(&level, config.log_format == "json")?;

    run(config).await
}
