use http::Method;

use crate::{
    config::models::RunConfig,
    core::{
        content_type::resolve_body,
        error::{ProbeError, ProbeResult, SelectionLevel},
        executor::target_url,
        model::{RequestSpec, RoutingResource},
        target_resolver::{choose, resolve_target},
    },
    ports::prompt::InteractivePrompt,
};

/// Methods offered when none is configured, in menu order.
pub const METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

/// Whether a request with `method` is given a body.
pub fn carries_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// Parse a method token case-insensitively.
pub fn parse_method(token: &str) -> ProbeResult<Method> {
    Method::from_bytes(token.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| ProbeError::InvalidRequest(format!("invalid HTTP method '{token}'")))
}

/// Turn the run configuration and the routing collection into one `RequestSpec`.
///
/// Anything the configuration leaves open (target ambiguity, method, sub-path, body) is
/// asked through `prompt`, in that order.
pub async fn plan_request<P>(
    config: &RunConfig,
    resources: &[RoutingResource],
    prompt: &mut P,
) -> ProbeResult<RequestSpec>
where
    P: InteractivePrompt + ?Sized,
{
    let target = resolve_target(resources, config.ingress.as_deref(), prompt).await?;

    let method = match &config.method {
        Some(token) => parse_method(token)?,
        None => {
            let labels: Vec<String> = METHODS.iter().map(Method::to_string).collect();
            let index = choose(prompt, SelectionLevel::Method, "method", &labels).await?;
            METHODS[index].clone()
        }
    };

    let sub_path = match &config.path {
        Some(path) => path.clone(),
        None => prompt.read_line("path").await?,
    };

    let mut spec = RequestSpec::new(method, target_url(&target, config.https, &sub_path));
    spec.skip_tls_verify = config.skip_tls_verify;
    spec.repeat = config.repeat;

    if carries_body(&spec.method) {
        let token = match &config.body {
            Some(token) => token.clone(),
            None => prompt.read_line("body").await?,
        };
        if token.is_empty() {
            tracing::debug!("No body given for {}", spec.method);
        } else {
            let body = resolve_body(&token).await?;
            spec.body = Some(body.bytes);
            spec.content_type = body.content_type;
        }
    }

    tracing::info!(
        "Planned {} {} (repeat: {}, skip TLS verify: {})",
        spec.method,
        spec.url,
        spec.repeat,
        spec.skip_tls_verify
    );
    Ok(spec)
}
