use http::Method;

use crate::config::models::RunConfig;

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

const LOG_FORMATS: [&str; 2] = ["console", "json"];

/// Run configuration validator
pub struct RunConfigValidator;

impl RunConfigValidator {
    /// Validate the entire run configuration, reporting every problem at once
    pub fn validate(config: &RunConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        match config.resources.as_deref() {
            None => errors.push(ValidationError::MissingField {
                field: "resources".to_string(),
            }),
            Some(resources) if resources.trim().is_empty() => {
                errors.push(ValidationError::InvalidField {
                    field: "resources".to_string(),
                    message: "Must name an ingress JSON file or an API server URL".to_string(),
                })
            }
            Some(_) => {}
        }

        if config.resources_is_remote() && config.namespace.trim().is_empty() {
            errors.push(ValidationError::InvalidField {
                field: "namespace".to_string(),
                message: "A namespace is required when listing from an API server".to_string(),
            });
        }

        if config.ingress.as_deref().is_some_and(|name| name.is_empty()) {
            errors.push(ValidationError::InvalidField {
                field: "ingress".to_string(),
                message: "Ingress name must not be empty".to_string(),
            });
        }

        if let Some(method) = config.method.as_deref() {
            if let Err(e) = Self::validate_method(method) {
                errors.push(e);
            }
        }

        if config.timeout.is_zero() {
            errors.push(ValidationError::InvalidField {
                field: "timeout".to_string(),
                message: "Timeout must be greater than zero".to_string(),
            });
        }

        if !LOG_FORMATS.contains(&config.log_format.as_str()) {
            errors.push(ValidationError::InvalidField {
                field: "log_format".to_string(),
                message: format!(
                    "Unknown log format '{}', expected one of: {}",
                    config.log_format,
                    LOG_FORMATS.join(", ")
                ),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    fn validate_method(method: &str) -> ValidationResult<()> {
        if method.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "method".to_string(),
                message: "Method must not be empty".to_string(),
            });
        }
        Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
            .map(|_| ())
            .map_err(|_| ValidationError::InvalidField {
                field: "method".to_string(),
                message: format!("'{method}' is not a valid HTTP method token"),
            })
    }

    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        errors
            .iter()
            .enumerate()
            .map(|(i, e)| format!("  {}. {}", i + 1, e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
