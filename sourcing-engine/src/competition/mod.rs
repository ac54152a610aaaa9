//! Competitive Landscape Analyzer.
//!
//! Market share by sales volume, CR3 concentration, a competition-level
//! decision table, price and quality positioning, and SWOT insights from a
//! static rule table.

mod analyzer;
mod insights;
mod types;

pub use analyzer::{market_share, pricing_position, summarize, CompetitiveAnalyzer};
pub use insights::{evaluate_rules, generate_insights, InsightRule, InsightSignals, INSIGHT_RULES};
pub use types::{
    CompetitionLevel, CompetitionThresholds, CompetitiveReport, Insight, InsightCategory,
    MarketShareDistribution, MarketSummary, PricePosition, PricingAnalysis, QualityAnalysis,
    QualityPosition, ShareEntry,
};
