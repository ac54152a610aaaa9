//! Sourcing Common - error types, logging and configuration shared by the
//! sourcing crates.
//!
//! This crate provides:
//! - Configuration types, loading and validation
//! - The ambient error type
//! - Logging setup

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{Config, EngineSettings, ObservabilityConfig};
pub use error::{Error, Result, ResultExt};
pub use validation::{Validate, ValidationError, ValidationResult};
