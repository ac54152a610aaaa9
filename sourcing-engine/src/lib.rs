//! Sourcing Engine Library
//!
//! Scores sourcing opportunities: given candidate products from a
//! marketplace, it computes profitability, competitive position and market
//! signals, fuses them into one composite score and ranks the candidates.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     RecommendationEngine                            │
//! │        (market snapshot, bounded fan-out, timeout, cache)           │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                       ProductAnalyzer                               │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────┐      │
//! │  │  Cost & Margin  │  │  Competitive    │  │  Trend &        │      │
//! │  │  Model          │  │  Analyzer       │  │  Seasonality    │      │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘      │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │               OpportunityScorer ──▶ Ranker                          │
//! └─────────────────────────────────────────────────────────────────────┘
//!          ▲                                   ▲
//!  MarketplaceProvider                   TrendProvider
//! ```
//!
//! # Key Concepts
//!
//! ## Opportunity score
//! - Six sub-scores in [0, 100]: profit, competition, market potential,
//!   quality, trend and risk
//! - Weighted total with weights summing to 1.0
//!
//! ## Concentration (CR3)
//! - Sum of the three largest market shares by sales volume
//!
//! ## Guarded math
//! - Every ratio divides through [`math::safe_div`]; a zero denominator gives 0
//!
//! The scoring functions are pure. Only [`engine::RecommendationEngine`] and
//! [`analysis::ProductAnalyzer`] talk to the providers.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod competition;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod math;
pub mod profit;
pub mod scoring;

pub use analysis::{AnalysisInputs, AnalysisResult, AnalysisStatus, ProductAnalyzer, ProductReport};
pub use competition::{CompetitionLevel, CompetitionThresholds, CompetitiveAnalyzer, CompetitiveReport};
pub use config::ScoringConfig;
pub use data::{
    CompetitorListing, MarketInsight, MarketplaceProvider, NoTrendData, PriceData, Product,
    ProviderResponse, TrendProvider,
};
pub use engine::{EngineMetrics, RecommendationEngine, RecommendationResult};
pub use error::{AnalysisError, Result};
pub use profit::{CostModelConfig, ProfitCalculator, ProfitabilityReport};
pub use scoring::{
    OpportunityScoreSet, OpportunityScorer, RankFilters, RankRequest, Ranker, ScoreWeights,
    SortKey, WeightedScorer,
};
