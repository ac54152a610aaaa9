//! Scoring configuration: cost model rates, competition thresholds and
//! composite weights.

use serde::{Deserialize, Serialize};
use sourcing_common::config::load_json;
use sourcing_common::{Error, Validate, ValidationError, ValidationResult};
use std::path::Path;

use crate::competition::CompetitionThresholds;
use crate::profit::CostModelConfig;
use crate::scoring::{ScoreWeights, WEIGHT_SUM_TOLERANCE};

/// Domain configuration of the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub cost_model: CostModelConfig,

    #[serde(default)]
    pub competition: CompetitionThresholds,

    #[serde(default)]
    pub weights: ScoreWeights,
}

impl ScoringConfig {
    /// Load from a JSON file and validate.
    pub fn load_from(path: &Path) -> sourcing_common::Result<Self> {
        let config: Self =
            load_json(path).map_err(|e| Error::Config(format!("{:#}", e)))?;
        config.check()?;
        tracing::info!(path = %path.display(), "Loaded scoring config");
        Ok(config)
    }

    /// Validate, converting failures into the common error type.
    pub fn check(&self) -> sourcing_common::Result<()> {
        self.validate()
            .map_err(|e| Error::Config(e.to_string()).with_context("Invalid scoring config"))
    }
}

impl Validate for ScoringConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.cost_model.validate() {
            errors.push(e);
        }

        if self.competition.low_below > self.competition.medium_below {
            errors.push(ValidationError::InvalidValue {
                field: "competition.low_below".into(),
                reason: "must not exceed competition.medium_below".into(),
            });
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.push(ValidationError::InvalidValue {
                field: "weights".into(),
                reason: format!("must sum to 1.0, got {}", sum),
            });
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}
