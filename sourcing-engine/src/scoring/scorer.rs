//! Opportunity sub-scores and the weighted composite.
//!
//! Six sub-scores, each clamped to [0, 100]:
//!
//! | score            | inputs                                              |
//! |------------------|-----------------------------------------------------|
//! | profit           | net margin ratio, ROI, breakeven units              |
//! | competition      | competition level, CR3 concentration                |
//! | market_potential | market size, growth rate, entry barrier             |
//! | quality          | rating, review count, seller rating                 |
//! | trend            | search trend growth, seasonality in current month   |
//! | risk             | competition level, market risks (higher is safer)   |

use serde::{Deserialize, Serialize};

use super::weights::{ScoreWeights, WeightedScorer};
use crate::analysis::ProductReport;
use crate::competition::{CompetitionLevel, CompetitiveReport};
use crate::data::{MarketInsight, MarketRisk, Product};
use crate::error::Result;
use crate::math::clamp_score;
use crate::profit::ProfitabilityReport;

/// The six sub-scores before weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub profit: f64,
    pub competition: f64,
    pub market_potential: f64,
    pub quality: f64,
    pub trend: f64,
    pub risk: f64,
}

impl SubScores {
    /// Sub-score by component name, 0 for unknown names.
    pub fn get(&self, name: &str) -> f64 {
        match name {
            "profit" => self.profit,
            "competition" => self.competition,
            "market_potential" => self.market_potential,
            "quality" => self.quality,
            "trend" => self.trend,
            "risk" => self.risk,
            _ => 0.0,
        }
    }
}

/// Sub-scores plus the weighted total. Every field is in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OpportunityScoreSet {
    pub profit: f64,
    pub competition: f64,
    pub market_potential: f64,
    pub quality: f64,
    pub trend: f64,
    pub risk: f64,
    pub total_score: f64,
}

// ============================================================================
// Sub-scores
// ============================================================================

pub fn profit_score(report: &ProfitabilityReport) -> f64 {
    let margin = (report.margins.net_margin_ratio * 2.0).min(40.0);
    let roi = (report.margins.roi / 2.0).min(30.0);
    let breakeven = report
        .breakeven
        .breakeven_units
        .units()
        .map(|units| (30.0 - units as f64 / 100.0).max(0.0))
        .unwrap_or(0.0);
    clamp_score(margin + roi + breakeven)
}

pub fn competition_score(report: &CompetitiveReport) -> f64 {
    let concentration = (report.distribution.concentration / 2.0).min(30.0);
    clamp_score(100.0 - report.competition_level.penalty() - concentration)
}

pub fn market_potential_score(market: &MarketInsight) -> f64 {
    let size = (market.market_size / 1e6).min(40.0);
    let growth = (market.growth_rate * 2.0).min(40.0);
    clamp_score(size + growth + market.entry_barrier.bonus())
}

pub fn quality_score(product: &Product) -> f64 {
    let reviews = (product.review_count as f64 / 100.0).min(30.0);
    clamp_score(product.rating * 10.0 + reviews + product.seller_rating * 4.0)
}

/// `seasonality_bonus` is -1, 0 or +1.
pub fn trend_score(search_trend_growth: f64, seasonality_bonus: f64) -> f64 {
    let growth = (search_trend_growth * 2.0).min(25.0);
    clamp_score(50.0 + growth + seasonality_bonus * 25.0)
}

pub fn risk_score(level: CompetitionLevel, risks: &[MarketRisk]) -> f64 {
    let market: f64 = risks.iter().map(|r| r.level.penalty()).sum();
    clamp_score(100.0 - level.penalty() - market)
}

// ============================================================================
// Scorer
// ============================================================================

/// Turns product reports into [`OpportunityScoreSet`]s.
#[derive(Debug, Clone)]
pub struct OpportunityScorer {
    weights: ScoreWeights,
    scorer: WeightedScorer,
}

impl OpportunityScorer {
    /// Create a scorer. Fails when the weights do not sum to 1.0.
    pub fn new(weights: ScoreWeights) -> Result<Self> {
        Ok(Self {
            scorer: weights.to_scorer()?,
            weights,
        })
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Compute all sub-scores of a report.
    pub fn sub_scores(&self, report: &ProductReport, current_month: u32) -> SubScores {
        SubScores {
            profit: profit_score(&report.profitability),
            competition: competition_score(&report.competition),
            market_potential: market_potential_score(&report.market),
            quality: quality_score(&report.product),
            trend: trend_score(
                report.trend.search_trend_growth,
                report.trend.seasonality.bonus(current_month),
            ),
            risk: risk_score(report.competition.competition_level, &report.market.risks),
        }
    }

    /// Score a report for the given calendar month (1-12).
    pub fn score(&self, report: &ProductReport, current_month: u32) -> OpportunityScoreSet {
        self.compose(self.sub_scores(report, current_month))
    }

    /// Weighted total over already-computed sub-scores.
    pub fn compose(&self, sub: SubScores) -> OpportunityScoreSet {
        let sub = SubScores {
            profit: clamp_score(sub.profit),
            competition: clamp_score(sub.competition),
            market_potential: clamp_score(sub.market_potential),
            quality: clamp_score(sub.quality),
            trend: clamp_score(sub.trend),
            risk: clamp_score(sub.risk),
        };

        OpportunityScoreSet {
            profit: sub.profit,
            competition: sub.competition,
            market_potential: sub.market_potential,
            quality: sub.quality,
            trend: sub.trend,
            risk: sub.risk,
            total_score: clamp_score(self.scorer.score(|name| sub.get(name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::MarketShareDistribution;
    use crate::data::{EntryBarrier, RiskLevel};
    use test_case::test_case;

    #[test]
    fn test_composite_of_known_sub_scores() {
        let scorer = OpportunityScorer::new(ScoreWeights::default()).unwrap();
        let scores = scorer.compose(SubScores {
            profit: 80.0,
            competition: 60.0,
            market_potential: 50.0,
            quality: 90.0,
            trend: 40.0,
            risk: 70.0,
        });
        assert!((scores.total_score - 66.0).abs() < 1e-9);
    }

    #[test]
    fn test_compose_clamps_out_of_range_inputs() {
        let scorer = OpportunityScorer::new(ScoreWeights::default()).unwrap();
        let scores = scorer.compose(SubScores {
            profit: 150.0,
            competition: -20.0,
            market_potential: f64::NAN,
            ..SubScores::default()
        });
        assert_eq!(scores.profit, 100.0);
        assert_eq!(scores.competition, 0.0);
        assert_eq!(scores.market_potential, 0.0);
        assert!((scores.total_score - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let weights = ScoreWeights {
            profit: 0.5,
            ..ScoreWeights::default()
        };
        assert!(OpportunityScorer::new(weights).is_err());
    }

    #[test_case(CompetitionLevel::Low, 0.0, 100.0 ; "low unconcentrated")]
    #[test_case(CompetitionLevel::Medium, 60.0, 50.0 ; "medium")]
    #[test_case(CompetitionLevel::HighConcentrated, 90.0, 20.0 ; "concentrated capped")]
    #[test_case(CompetitionLevel::HighFragmented, 30.0, 55.0 ; "fragmented")]
    fn test_competition_score(level: CompetitionLevel, concentration: f64, expected: f64) {
        let report = CompetitiveReport {
            product_id: "P".into(),
            summary: Default::default(),
            distribution: MarketShareDistribution {
                concentration,
                ..Default::default()
            },
            competition_level: level,
            pricing: Default::default(),
            quality: Default::default(),
            insights: Vec::new(),
        };
        assert!((competition_score(&report) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_market_potential_score() {
        let market = MarketInsight {
            market_size: 25e6,
            growth_rate: 10.0,
            entry_barrier: EntryBarrier::Low,
            ..MarketInsight::default()
        };
        assert!((market_potential_score(&market) - 65.0).abs() < 1e-9);

        let huge = MarketInsight {
            market_size: 1e9,
            growth_rate: 100.0,
            entry_barrier: EntryBarrier::Low,
            ..MarketInsight::default()
        };
        assert_eq!(market_potential_score(&huge), 100.0);
        assert_eq!(market_potential_score(&MarketInsight::default()), 10.0);
    }

    #[test]
    fn test_quality_score() {
        let product = Product::new("P", "X", 10.0)
            .with_reviews(4.5, 1200)
            .with_seller_rating(4.0);
        // 45 + 12 + 16
        assert!((quality_score(&product) - 73.0).abs() < 1e-9);

        let star = Product::new("P", "X", 10.0)
            .with_reviews(5.0, 10_000)
            .with_seller_rating(5.0);
        assert_eq!(quality_score(&star), 100.0);
    }

    #[test_case(0.0, 0.0, 50.0 ; "flat")]
    #[test_case(20.0, 1.0, 100.0 ; "growing peak month")]
    #[test_case(5.0, -1.0, 35.0 ; "low month")]
    #[test_case(-40.0, -1.0, 0.0 ; "collapsing")]
    fn test_trend_score(growth: f64, bonus: f64, expected: f64) {
        assert!((trend_score(growth, bonus) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_risk_score() {
        let risks = vec![
            MarketRisk {
                kind: "seasonal".into(),
                level: RiskLevel::High,
            },
            MarketRisk {
                kind: "regulation".into(),
                level: RiskLevel::Low,
            },
        ];
        assert!((risk_score(CompetitionLevel::Medium, &risks) - 55.0).abs() < 1e-9);
        assert_eq!(risk_score(CompetitionLevel::Low, &[]), 100.0);
    }
}
