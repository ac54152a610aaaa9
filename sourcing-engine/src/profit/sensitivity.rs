//! What-if scenarios over a computed margin.
//!
//! Each scenario scales the already-computed net margin by
//! `price × sales / cost` and the ROI by `price / cost`. This is a
//! proportional approximation; the cost model is not re-run.

use serde::{Deserialize, Serialize};

use crate::math::safe_div;

/// Scenario name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Optimistic,
    Pessimistic,
    Moderate,
}

/// Multipliers applied by one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub price_multiplier: f64,
    pub cost_multiplier: f64,
    pub sales_multiplier: f64,
}

/// The three fixed scenarios.
pub const SCENARIOS: [Scenario; 3] = [
    Scenario {
        kind: ScenarioKind::Optimistic,
        price_multiplier: 1.10,
        cost_multiplier: 0.95,
        sales_multiplier: 1.20,
    },
    Scenario {
        kind: ScenarioKind::Pessimistic,
        price_multiplier: 0.90,
        cost_multiplier: 1.05,
        sales_multiplier: 0.80,
    },
    Scenario {
        kind: ScenarioKind::Moderate,
        price_multiplier: 1.05,
        cost_multiplier: 1.02,
        sales_multiplier: 1.10,
    },
];

/// Projected outcome of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub kind: ScenarioKind,
    pub net_margin: f64,
    pub roi: f64,
}

impl Scenario {
    /// Apply this scenario to a base net margin and ROI.
    pub fn project(&self, net_margin: f64, roi: f64) -> ScenarioOutcome {
        ScenarioOutcome {
            kind: self.kind,
            net_margin: safe_div(
                net_margin * self.price_multiplier * self.sales_multiplier,
                self.cost_multiplier,
            ),
            roi: safe_div(roi * self.price_multiplier, self.cost_multiplier),
        }
    }
}

/// Outcomes of all three scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityAnalysis {
    pub optimistic: ScenarioOutcome,
    pub pessimistic: ScenarioOutcome,
    pub moderate: ScenarioOutcome,
}

impl SensitivityAnalysis {
    /// Project every scenario from a base net margin and ROI.
    pub fn from_base(net_margin: f64, roi: f64) -> Self {
        let [optimistic, pessimistic, moderate] = SCENARIOS.map(|s| s.project(net_margin, roi));
        Self {
            optimistic,
            pessimistic,
            moderate,
        }
    }

    /// Outcomes in fixed scenario order.
    pub fn outcomes(&self) -> [ScenarioOutcome; 3] {
        [self.optimistic, self.pessimistic, self.moderate]
    }
}
