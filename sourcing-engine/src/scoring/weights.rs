//! Named weight maps and the weighted scorer built from them.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Tolerance on the sum of weights.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

const QUALITY_WEIGHTS: [(&str, f64); 2] = [("rating", 0.7), ("reviews", 0.3)];

/// Weighted sum over named components.
///
/// The weights are checked once at construction: they must be finite,
/// non-negative and sum to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedScorer {
    weights: Vec<(String, f64)>,
}

impl WeightedScorer {
    /// Build a scorer from `(name, weight)` pairs.
    pub fn new<I, S>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let weights: Vec<(String, f64)> = weights
            .into_iter()
            .map(|(name, weight)| (name.into(), weight))
            .collect();

        let sum: f64 = weights.iter().map(|(_, w)| w).sum();
        let all_valid = weights.iter().all(|(_, w)| w.is_finite() && *w >= 0.0);
        if !all_valid || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AnalysisError::InvalidWeights { sum });
        }

        Ok(Self { weights })
    }

    /// Weights of the competitor quality score: rating 0.7, reviews 0.3.
    pub fn competitor_quality() -> Self {
        Self {
            weights: QUALITY_WEIGHTS
                .iter()
                .map(|(name, weight)| (name.to_string(), *weight))
                .collect(),
        }
    }

    /// Weighted sum. `value_of` supplies each named component; unknown names
    /// should return 0.
    pub fn score<F>(&self, value_of: F) -> f64
    where
        F: Fn(&str) -> f64,
    {
        self.weights
            .iter()
            .map(|(name, weight)| weight * value_of(name))
            .sum()
    }

    /// Weight of a component, 0 when absent.
    pub fn weight(&self, name: &str) -> f64 {
        self.weights
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    pub fn weights(&self) -> &[(String, f64)] {
        &self.weights
    }
}

/// Composite weights for the opportunity score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_profit_weight")]
    pub profit: f64,
    #[serde(default = "default_competition_weight")]
    pub competition: f64,
    #[serde(default = "default_market_potential_weight")]
    pub market_potential: f64,
    #[serde(default = "default_minor_weight")]
    pub quality: f64,
    #[serde(default = "default_minor_weight")]
    pub trend: f64,
    #[serde(default = "default_minor_weight")]
    pub risk: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            profit: default_profit_weight(),
            competition: default_competition_weight(),
            market_potential: default_market_potential_weight(),
            quality: default_minor_weight(),
            trend: default_minor_weight(),
            risk: default_minor_weight(),
        }
    }
}

impl ScoreWeights {
    /// Component names, in the order they are weighted.
    pub const COMPONENTS: [&'static str; 6] = [
        "profit",
        "competition",
        "market_potential",
        "quality",
        "trend",
        "risk",
    ];

    pub fn sum(&self) -> f64 {
        self.profit + self.competition + self.market_potential + self.quality + self.trend + self.risk
    }

    /// Build the checked scorer for these weights.
    pub fn to_scorer(&self) -> Result<WeightedScorer> {
        WeightedScorer::new(Self::COMPONENTS.into_iter().zip([
            self.profit,
            self.competition,
            self.market_potential,
            self.quality,
            self.trend,
            self.risk,
        ]))
    }
}

fn default_profit_weight() -> f64 {
    0.3
}

fn default_competition_weight() -> f64 {
    0.2
}

fn default_market_potential_weight() -> f64 {
    0.2
}

fn default_minor_weight() -> f64 {
    0.1
}
