//! Competitive landscape types.

use serde::{Deserialize, Serialize};

/// Market competition classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompetitionLevel {
    Low,
    Medium,
    HighConcentrated,
    HighFragmented,
}

impl CompetitionLevel {
    /// Points subtracted from the competition and risk scores.
    pub fn penalty(&self) -> f64 {
        match self {
            Self::HighConcentrated => 50.0,
            Self::HighFragmented => 30.0,
            Self::Medium => 20.0,
            Self::Low => 0.0,
        }
    }
}

/// Where a product's price sits against competitors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricePosition {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

/// Where a product's rating sits against competitors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPosition {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

/// One competitor's share of sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareEntry {
    pub competitor_id: String,
    pub name: String,
    pub share_percent: f64,
}

/// Market share by sales volume, largest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketShareDistribution {
    pub shares: Vec<ShareEntry>,
    /// CR3: sum of the top three shares
    pub concentration: f64,
    pub leader_share: f64,
}

/// Thresholds of the competition-level decision table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompetitionThresholds {
    /// Fewer competitors than this is LOW
    #[serde(default = "default_low_below")]
    pub low_below: usize,
    /// Fewer competitors than this is MEDIUM
    #[serde(default = "default_medium_below")]
    pub medium_below: usize,
    /// CR3 above this is HIGH_CONCENTRATED, otherwise HIGH_FRAGMENTED
    #[serde(default = "default_concentration_above")]
    pub concentration_above: f64,
}

impl Default for CompetitionThresholds {
    fn default() -> Self {
        Self {
            low_below: default_low_below(),
            medium_below: default_medium_below(),
            concentration_above: default_concentration_above(),
        }
    }
}

fn default_low_below() -> usize {
    5
}

fn default_medium_below() -> usize {
    15
}

fn default_concentration_above() -> f64 {
    70.0
}

impl CompetitionThresholds {
    /// Classify a market. Rules are evaluated in order.
    pub fn classify(&self, competitor_count: usize, concentration: f64) -> CompetitionLevel {
        if competitor_count < self.low_below {
            CompetitionLevel::Low
        } else if competitor_count < self.medium_below {
            CompetitionLevel::Medium
        } else if concentration > self.concentration_above {
            CompetitionLevel::HighConcentrated
        } else {
            CompetitionLevel::HighFragmented
        }
    }
}

/// Aggregates over the competitor list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub competitor_count: usize,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_rating: f64,
    pub avg_reviews: f64,
    pub total_sales_volume: f64,
    pub total_revenue: f64,
}

/// Price positioning result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingAnalysis {
    pub position: PricePosition,
    /// `(price - avg) / avg`
    pub relative_gap: f64,
    /// 1.0 at the cheapest competitor, 0.0 at or above the average
    pub price_competitiveness: f64,
}

/// Quality positioning result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityAnalysis {
    pub position: QualityPosition,
    /// `rating - avg_rating`
    pub rating_delta: f64,
    /// 0-100
    pub quality_score: f64,
}

/// SWOT quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Strength,
    Weakness,
    Opportunity,
    Threat,
}

/// One generated insight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub category: InsightCategory,
    pub message: String,
    /// Impact (strengths, opportunities) or risk (weaknesses, threats), 1-10
    pub score: u8,
}

/// Output of the competitive landscape analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveReport {
    pub product_id: String,
    pub summary: MarketSummary,
    pub distribution: MarketShareDistribution,
    pub competition_level: CompetitionLevel,
    pub pricing: PricingAnalysis,
    pub quality: QualityAnalysis,
    pub insights: Vec<Insight>,
}

impl CompetitiveReport {
    /// Insights of one quadrant, in rule order.
    pub fn insights_in(&self, category: InsightCategory) -> impl Iterator<Item = &Insight> {
        self.insights.iter().filter(move |i| i.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, 0.0, CompetitionLevel::Low ; "no competitors")]
    #[test_case(4, 100.0, CompetitionLevel::Low ; "few competitors")]
    #[test_case(5, 60.0, CompetitionLevel::Medium ; "five competitors")]
    #[test_case(14, 95.0, CompetitionLevel::Medium ; "count wins over concentration")]
    #[test_case(15, 70.1, CompetitionLevel::HighConcentrated ; "concentrated")]
    #[test_case(15, 70.0, CompetitionLevel::HighFragmented ; "boundary is fragmented")]
    #[test_case(40, 12.0, CompetitionLevel::HighFragmented ; "fragmented")]
    fn test_classify(count: usize, concentration: f64, expected: CompetitionLevel) {
        assert_eq!(
            CompetitionThresholds::default().classify(count, concentration),
            expected
        );
    }

    #[test]
    fn test_overridden_thresholds() {
        let thresholds = CompetitionThresholds {
            low_below: 2,
            medium_below: 3,
            concentration_above: 50.0,
        };
        assert_eq!(thresholds.classify(3, 60.0), CompetitionLevel::HighConcentrated);
    }

    #[test]
    fn test_level_serializes_screaming_case() {
        let json = serde_json::to_string(&CompetitionLevel::HighConcentrated).unwrap();
        assert_eq!(json, "\"HIGH_CONCENTRATED\"");
    }
}
