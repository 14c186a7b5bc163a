//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, status codes valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GeeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::GeeConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address must not be empty")]
    EmptyBindAddress,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("routing.not_found_status {0} is not a valid HTTP status code")]
    InvalidStatus(u16),

    #[error("observability.log_level {0:?} is not a valid filter directive")]
    InvalidLogLevel(String),
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &GeeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.routing.not_found_status_code().is_none() {
        errors.push(ValidationError::InvalidStatus(config.routing.not_found_status));
    }
    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&GeeConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_error() {
        let mut config = GeeConfig::default();
        config.listener.bind_address = "  ".to_string();
        config.timeouts.request_secs = 0;
        config.limits.max_body_bytes = 0;
        config.routing.not_found_status = 1000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyBindAddress,
                ValidationError::ZeroRequestTimeout,
                ValidationError::ZeroBodyLimit,
                ValidationError::InvalidStatus(1000),
            ]
        );
    }

    #[test]
    fn accepts_not_found_status() {
        let mut config = GeeConfig::default();
        config.routing.not_found_status = 404;
        assert!(validate_config(&config).is_ok());
    }
}
