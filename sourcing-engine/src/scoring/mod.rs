//! Opportunity Scorer & Ranker.
//!
//! Reports are turned into six bounded sub-scores, fused by a
//! [`WeightedScorer`] into a total, then filtered, stably sorted and paged.

mod ranker;
mod scorer;
mod weights;

pub use ranker::{RankFilters, RankRequest, RankedList, Ranker, ScoredCandidate, SortKey};
pub use scorer::{
    competition_score, market_potential_score, profit_score, quality_score, risk_score,
    trend_score, OpportunityScoreSet, OpportunityScorer, SubScores,
};
pub use weights::{ScoreWeights, WeightedScorer, WEIGHT_SUM_TOLERANCE};
