//! Cost & Margin Model.
//!
//! ```text
//! Product + PriceData
//!        │
//!        ▼
//! ┌───────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ CostBreakdown │──▶│ MarginResult │──▶│ Sensitivity  │
//! └───────────────┘   └──────────────┘   └──────────────┘
//!        │
//!        ▼
//! ┌─────────────────┐
//! │ BreakevenResult │
//! └─────────────────┘
//! ```

mod calculator;
mod config;
mod sensitivity;

pub use calculator::{
    BreakevenResult, BreakevenUnits, CostBreakdown, CostRatios, MarginResult, ProfitCalculator,
    ProfitabilityReport, UnitEconomics,
};
pub use config::CostModelConfig;
pub use sensitivity::{Scenario, ScenarioKind, ScenarioOutcome, SensitivityAnalysis, SCENARIOS};
