//! Product Analysis Aggregator.
//!
//! ```text
//!  MarketplaceProvider ──┐
//!                        ├──▶ AnalysisInputs ──▶ ┌──────────────────┐
//!  TrendProvider ────────┘                       │ ProfitCalculator │──┐
//!                                                ├──────────────────┤  │
//!                                                │ Competitive      │──┼──▶ ProductReport
//!                                                ├──────────────────┤  │
//!                                                │ Trend signals    │──┘
//!                                                └──────────────────┘
//! ```
//!
//! Status goes `Processing → Completed | Failed`; a failed analysis keeps
//! no partial report.

mod aggregator;
pub mod trend;

pub use aggregator::{AnalysisInputs, AnalysisResult, AnalysisStatus, ProductAnalyzer, ProductReport};
pub use trend::{
    GrowthRates, SalesEstimate, SeasonFlag, SeasonalBucket, Seasonality, TrendAnalysis,
};
