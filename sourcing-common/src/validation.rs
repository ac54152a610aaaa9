//! Configuration validation.
//!
//! Every section is checked independently and all failures are reported
//! together.

use thiserror::Error;

use crate::config::{Config, EngineSettings, ObservabilityConfig, MAX_CACHE_TTL_SECS};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["json", "pretty"];

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("'{}' is not one of {:?}", self.log_level, LOG_LEVELS),
            });
        }
        if !LOG_FORMATS.contains(&self.log_format.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("'{}' is not one of {:?}", self.log_format, LOG_FORMATS),
            });
        }
        Ok(())
    }
}

impl Validate for EngineSettings {
    fn validate(&self) -> ValidationResult<()> {
        if self.max_concurrency == 0 {
            return Err(ValidationError::InvalidValue {
                field: "engine.max_concurrency".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.candidate_timeout_ms == 0 {
            return Err(ValidationError::InvalidValue {
                field: "engine.candidate_timeout_ms".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.default_limit == 0 {
            return Err(ValidationError::InvalidValue {
                field: "engine.default_limit".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !(0..=MAX_CACHE_TTL_SECS).contains(&self.cache_ttl_secs) {
            return Err(ValidationError::InvalidValue {
                field: "engine.cache_ttl_secs".into(),
                reason: format!("must be between 0 and {}", MAX_CACHE_TTL_SECS),
            });
        }
        Ok(())
    }
}

impl Validate for Config {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }
        if let Err(e) = self.engine.validate() {
            errors.push(e);
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}
