//! Logging setup for the sourcing engine.
//!
//! The engine only emits `tracing` events with structured context
//! (`product_id`, `error`, batch counters). Where those events go is decided
//! here, once, by the embedding process.
//!
//! # Noise Filtering
//!
//! HTTP client internals used by marketplace/crawler implementations are set
//! to `warn` so business logs stay readable.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// Library modules that are filtered to warn level by default.
pub const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

/// Build the filter directive string for a base level plus exclusions.
fn build_directives(log_level: &str, excluded_targets: &[String]) -> String {
    let mut directives = String::from(log_level);

    for module in NOISY_MODULES {
        directives.push_str(&format!(",{}=warn", module));
    }
    for target in excluded_targets {
        directives.push_str(&format!(",{}=warn", target));
    }

    directives
}

fn build_filter(log_level: &str, excluded_targets: &[String]) -> EnvFilter {
    // RUST_LOG wins when set
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(build_directives(log_level, excluded_targets)))
}

/// Initialize logging.
///
/// * `log_level` - base level (trace, debug, info, warn, error)
/// * `log_format` - "json" for structured output, anything else for pretty
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(log_level: &str, log_format: &str) {
    init_with(log_level, log_format, &[]);
}

/// Initialize logging from the observability section of the config.
pub fn init_from_config(config: &ObservabilityConfig) {
    init_with(&config.log_level, &config.log_format, &config.excluded_targets);
}

fn init_with(log_level: &str, log_format: &str, excluded_targets: &[String]) {
    let filter = build_filter(log_level, excluded_targets);
    let subscriber = tracing_subscriber::registry().with(filter);

    if log_format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(true)
            .with_file(false)
            .with_line_number(false);
        let _ = subscriber.with(fmt_layer).try_init();
    }

    tracing::info!(
        log_level = %log_level,
        log_format = %log_format,
        noise_filtered = NOISY_MODULES.len() + excluded_targets.len(),
        "Logging initialized"
    );
}
