pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{ConfigOverrides, load_run_config};
pub use models::*;
pub use validation::{RunConfigValidator, ValidationError, ValidationResult};
