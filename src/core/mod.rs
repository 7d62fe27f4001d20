pub mod content_type;
pub mod error;
pub mod executor;
pub mod model;
pub mod path_join;
pub mod planner;
pub mod target_resolver;
#[cfg(test)]
pub(crate) mod testing;

pub use error::{ProbeError, ProbeResult, SelectionLevel};
pub use executor::{ExecutorSettings, RequestExecutor};
pub use model::{
    ExecutionReport, RequestSpec, ResolvedTarget, RoutingPath, RoutingResource, RoutingRule,
};
pub use planner::plan_request;
pub use target_resolver::resolve_target;
