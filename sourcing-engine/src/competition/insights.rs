//! SWOT insight rules.
//!
//! Each rule is a row: predicate, quadrant, message, score. Rules are
//! evaluated in table order and every matching row produces one insight.

use super::types::{
    CompetitionLevel, Insight, InsightCategory, PricePosition, QualityPosition,
};

/// Signals the rules are evaluated over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightSignals {
    pub competitor_count: usize,
    pub competition_level: CompetitionLevel,
    pub price_position: PricePosition,
    pub quality_position: QualityPosition,
    pub price_competitiveness: f64,
    pub concentration: f64,
    pub leader_share: f64,
    pub review_count: u64,
    pub avg_reviews: f64,
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct InsightRule {
    pub category: InsightCategory,
    pub applies: fn(&InsightSignals) -> bool,
    pub message: &'static str,
    pub score: u8,
}

fn priced_below_market(s: &InsightSignals) -> bool {
    s.price_position == PricePosition::Low
}

fn priced_above_market(s: &InsightSignals) -> bool {
    s.price_position == PricePosition::High
}

fn rated_above_market(s: &InsightSignals) -> bool {
    s.quality_position == QualityPosition::High
}

fn rated_below_market(s: &InsightSignals) -> bool {
    s.quality_position == QualityPosition::Low
}

fn more_reviews_than_average(s: &InsightSignals) -> bool {
    s.competitor_count > 0 && s.review_count as f64 > s.avg_reviews
}

fn few_reviews(s: &InsightSignals) -> bool {
    s.competitor_count > 0 && (s.review_count as f64) < s.avg_reviews / 2.0
}

fn few_competitors(s: &InsightSignals) -> bool {
    s.competition_level == CompetitionLevel::Low
}

fn fragmented_market(s: &InsightSignals) -> bool {
    s.competition_level == CompetitionLevel::HighFragmented
}

fn room_on_price(s: &InsightSignals) -> bool {
    s.competitor_count > 0 && s.price_competitiveness >= 0.8
}

fn concentrated_market(s: &InsightSignals) -> bool {
    s.competition_level == CompetitionLevel::HighConcentrated
}

fn dominant_leader(s: &InsightSignals) -> bool {
    s.leader_share > 40.0
}

fn undercut_on_price(s: &InsightSignals) -> bool {
    s.competitor_count > 0
        && s.competition_level != CompetitionLevel::Low
        && s.price_competitiveness < 0.3
}

/// The rule table.
pub const INSIGHT_RULES: &[InsightRule] = &[
    InsightRule {
        category: InsightCategory::Strength,
        applies: priced_below_market,
        message: "Priced below the competitor average",
        score: 7,
    },
    InsightRule {
        category: InsightCategory::Strength,
        applies: rated_above_market,
        message: "Rated above the competitor average",
        score: 8,
    },
    InsightRule {
        category: InsightCategory::Strength,
        applies: more_reviews_than_average,
        message: "More reviews than the average competitor",
        score: 6,
    },
    InsightRule {
        category: InsightCategory::Weakness,
        applies: priced_above_market,
        message: "Priced above the competitor average",
        score: 6,
    },
    InsightRule {
        category: InsightCategory::Weakness,
        applies: rated_below_market,
        message: "Rated below the competitor average",
        score: 7,
    },
    InsightRule {
        category: InsightCategory::Weakness,
        applies: few_reviews,
        message: "Fewer than half the reviews of the average competitor",
        score: 5,
    },
    InsightRule {
        category: InsightCategory::Opportunity,
        applies: few_competitors,
        message: "Few competitors in this market",
        score: 8,
    },
    InsightRule {
        category: InsightCategory::Opportunity,
        applies: fragmented_market,
        message: "Fragmented market without a dominant seller",
        score: 6,
    },
    InsightRule {
        category: InsightCategory::Opportunity,
        applies: room_on_price,
        message: "Price is close to the cheapest competitor",
        score: 5,
    },
    InsightRule {
        category: InsightCategory::Threat,
        applies: concentrated_market,
        message: "A few sellers control most of the sales",
        score: 8,
    },
    InsightRule {
        category: InsightCategory::Threat,
        applies: dominant_leader,
        message: "Market leader holds over 40% of sales",
        score: 7,
    },
    InsightRule {
        category: InsightCategory::Threat,
        applies: undercut_on_price,
        message: "Competitors undercut this price",
        score: 6,
    },
];

/// Evaluate a rule table against the signals.
pub fn evaluate_rules(rules: &[InsightRule], signals: &InsightSignals) -> Vec<Insight> {
    rules
        .iter()
        .filter(|rule| (rule.applies)(signals))
        .map(|rule| Insight {
            category: rule.category,
            message: rule.message.to_string(),
            score: rule.score,
        })
        .collect()
}

/// Evaluate the built-in rule table.
pub fn generate_insights(signals: &InsightSignals) -> Vec<Insight> {
    evaluate_rules(INSIGHT_RULES, signals)
}
