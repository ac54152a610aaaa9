//! Error taxonomy for product analysis.
//!
//! Division by zero is not an error anywhere in this crate: see
//! [`crate::math::safe_div`]. Partial batch failure is not an error either;
//! failed candidates are reported in the run metadata.

use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised while analyzing or ranking candidates.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required field is absent. Fatal to that computation.
    #[error("Missing required input: {field}")]
    MissingInput { field: &'static str },

    /// An external data source reported failure. Fatal to that candidate only.
    #[error("Upstream error from {provider}: {message}")]
    Upstream { provider: String, message: String },

    /// A candidate did not finish within the per-candidate timeout.
    #[error("Analysis of {product_id} timed out after {after_ms}ms")]
    Timeout { product_id: String, after_ms: u64 },

    /// The whole input batch was empty.
    #[error("Candidate batch is empty")]
    EmptyBatch,

    /// Composite weights do not sum to 1.0.
    #[error("Score weights must sum to 1.0, got {sum}")]
    InvalidWeights { sum: f64 },

    /// Configuration or IO failure from the common layer.
    #[error(transparent)]
    Common(#[from] sourcing_common::Error),
}

impl AnalysisError {
    /// Build an upstream error.
    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error only affects a single candidate.
    pub const fn is_candidate_scoped(&self) -> bool {
        matches!(
            self,
            Self::MissingInput { .. } | Self::Upstream { .. } | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::MissingInput { field: "price" };
        assert_eq!(err.to_string(), "Missing required input: price");

        let err = AnalysisError::upstream("marketplace", "product not found");
        assert_eq!(err.to_string(), "Upstream error from marketplace: product not found");

        let err = AnalysisError::Timeout {
            product_id: "B001".into(),
            after_ms: 250,
        };
        assert!(err.to_string().contains("250ms"));
    }

    #[test]
    fn test_candidate_scope() {
        assert!(AnalysisError::MissingInput { field: "price" }.is_candidate_scoped());
        assert!(AnalysisError::upstream("x", "y").is_candidate_scoped());
        assert!(!AnalysisError::EmptyBatch.is_candidate_scoped());
        assert!(!AnalysisError::InvalidWeights { sum: 0.9 }.is_candidate_scoped());
    }

    #[test]
    fn test_common_error_converts() {
        let err: AnalysisError = sourcing_common::Error::Config("bad".into()).into();
        assert!(matches!(err, AnalysisError::Common(_)));
    }
}
