//! Competitive landscape analyzer.

use std::cmp::Ordering;

use super::insights::{generate_insights, InsightSignals};
use super::types::*;
use crate::data::{CompetitorListing, Product};
use crate::math::{clamp01, clamp_score, mean, percent_of, safe_div};
use crate::scoring::WeightedScorer;

/// Relative price gap beyond which a product is priced low or high.
const PRICE_GAP_THRESHOLD: f64 = 0.1;

/// Rating delta beyond which a product is rated low or high.
const RATING_DELTA_THRESHOLD: f64 = 0.3;

/// Number of leading competitors summed into the concentration ratio.
const CONCENTRATION_TOP_N: usize = 3;

/// Analyzes a product against its competing listings.
///
/// Never fails: an empty competitor list yields `Unknown` positions and
/// zero scores.
#[derive(Debug, Clone)]
pub struct CompetitiveAnalyzer {
    thresholds: CompetitionThresholds,
    quality_scorer: WeightedScorer,
}

impl Default for CompetitiveAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl CompetitiveAnalyzer {
    /// Create an analyzer with the default decision table.
    pub fn new() -> Self {
        Self::with_thresholds(CompetitionThresholds::default())
    }

    /// Create with custom competition-level thresholds.
    pub fn with_thresholds(thresholds: CompetitionThresholds) -> Self {
        Self {
            thresholds,
            quality_scorer: WeightedScorer::competitor_quality(),
        }
    }

    pub fn thresholds(&self) -> &CompetitionThresholds {
        &self.thresholds
    }

    /// Run the full analysis.
    pub fn analyze_competitors(
        &self,
        product: &Product,
        listings: &[CompetitorListing],
    ) -> CompetitiveReport {
        let summary = summarize(listings);
        let distribution = market_share(listings);
        let competition_level = self
            .thresholds
            .classify(listings.len(), distribution.concentration);
        let pricing = pricing_position(product.price.unwrap_or(0.0), &summary);
        let quality = self.quality_position(product, &summary);

        let insights = generate_insights(&InsightSignals {
            competitor_count: summary.competitor_count,
            competition_level,
            price_position: pricing.position,
            quality_position: quality.position,
            price_competitiveness: pricing.price_competitiveness,
            concentration: distribution.concentration,
            leader_share: distribution.leader_share,
            review_count: product.review_count,
            avg_reviews: summary.avg_reviews,
        });

        tracing::debug!(
            product_id = %product.id,
            competitors = listings.len(),
            concentration = distribution.concentration,
            level = ?competition_level,
            "Analyzed competitors"
        );

        CompetitiveReport {
            product_id: product.id.clone(),
            summary,
            distribution,
            competition_level,
            pricing,
            quality,
            insights,
        }
    }

    /// Rating delta against the average, plus the weighted quality score.
    pub fn quality_position(&self, product: &Product, summary: &MarketSummary) -> QualityAnalysis {
        if summary.competitor_count == 0 {
            return QualityAnalysis::default();
        }

        let rating_delta = product.rating - summary.avg_rating;
        let position = if rating_delta > RATING_DELTA_THRESHOLD {
            QualityPosition::High
        } else if rating_delta < -RATING_DELTA_THRESHOLD {
            QualityPosition::Low
        } else {
            QualityPosition::Medium
        };

        let review_cap = 2.0 * summary.avg_reviews;
        let rating_ratio = safe_div(product.rating, summary.avg_rating);
        let review_ratio = safe_div((product.review_count as f64).min(review_cap), review_cap);

        let quality_score = clamp_score(self.quality_scorer.score(|name| match name {
            "rating" => rating_ratio * 100.0,
            "reviews" => review_ratio * 100.0,
            _ => 0.0,
        }));

        QualityAnalysis {
            position,
            rating_delta,
            quality_score,
        }
    }
}

/// Aggregate price, rating and volume statistics.
pub fn summarize(listings: &[CompetitorListing]) -> MarketSummary {
    if listings.is_empty() {
        return MarketSummary::default();
    }

    let prices: Vec<f64> = listings.iter().map(|l| l.price).collect();
    let ratings: Vec<f64> = listings.iter().map(|l| l.rating).collect();
    let reviews: Vec<f64> = listings.iter().map(|l| l.review_count as f64).collect();

    MarketSummary {
        competitor_count: listings.len(),
        avg_price: mean(&prices),
        min_price: prices.iter().copied().fold(f64::INFINITY, f64::min),
        max_price: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        avg_rating: mean(&ratings),
        avg_reviews: mean(&reviews),
        total_sales_volume: listings.iter().map(|l| l.sales_volume).sum(),
        total_revenue: listings.iter().map(|l| l.revenue).sum(),
    }
}

/// Share of sales volume per competitor, largest first.
///
/// Ties keep input order. Zero total volume gives an empty distribution.
pub fn market_share(listings: &[CompetitorListing]) -> MarketShareDistribution {
    let total: f64 = listings.iter().map(|l| l.sales_volume).sum();
    if total <= 0.0 {
        return MarketShareDistribution::default();
    }

    let mut shares: Vec<ShareEntry> = listings
        .iter()
        .map(|l| ShareEntry {
            competitor_id: l.product_id.clone(),
            name: l.display_name().to_string(),
            share_percent: percent_of(l.sales_volume, total),
        })
        .collect();

    // sort_by is stable
    shares.sort_by(|a, b| {
        b.share_percent
            .partial_cmp(&a.share_percent)
            .unwrap_or(Ordering::Equal)
    });

    let concentration = shares
        .iter()
        .take(CONCENTRATION_TOP_N)
        .map(|s| s.share_percent)
        .sum();
    let leader_share = shares.first().map(|s| s.share_percent).unwrap_or(0.0);

    MarketShareDistribution {
        shares,
        concentration,
        leader_share,
    }
}

/// Price position and competitiveness against the market summary.
pub fn pricing_position(price: f64, summary: &MarketSummary) -> PricingAnalysis {
    if summary.competitor_count == 0 {
        return PricingAnalysis::default();
    }

    let avg = summary.avg_price;
    let min = summary.min_price;
    let relative_gap = safe_div(price - avg, avg);

    let position = if relative_gap < -PRICE_GAP_THRESHOLD {
        PricePosition::Low
    } else if relative_gap > PRICE_GAP_THRESHOLD {
        PricePosition::High
    } else {
        PricePosition::Medium
    };

    let price_competitiveness = if avg == min {
        if price <= min {
            1.0
        } else {
            0.0
        }
    } else {
        clamp01(1.0 - safe_div(price - min, avg - min))
    };

    PricingAnalysis {
        position,
        relative_gap,
        price_competitiveness,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Seller;

    fn listing(id: &str, price: f64, rating: f64, reviews: u64, sales: f64) -> CompetitorListing {
        CompetitorListing {
            product_id: id.to_string(),
            title: format!("Listing {}", id),
            price,
            rating,
            review_count: reviews,
            seller: Seller {
                id: format!("S-{}", id),
                name: format!("Seller {}", id),
                rating: 4.5,
            },
            sales_volume: sales,
            revenue: price * sales,
        }
    }

    #[test]
    fn test_equal_sales_five_competitors() {
        let listings: Vec<_> = (0..5)
            .map(|i| listing(&format!("C{}", i), 20.0, 4.0, 50, 100.0))
            .collect();
        let product = Product::new("P1", "Bottle", 20.0).with_reviews(4.0, 50);
        let report = CompetitiveAnalyzer::new().analyze_competitors(&product, &listings);

        assert_eq!(report.distribution.shares.len(), 5);
        for share in &report.distribution.shares {
            assert!((share.share_percent - 20.0).abs() < 1e-9);
        }
        assert!((report.distribution.concentration - 60.0).abs() < 1e-9);
        assert_eq!(report.competition_level, CompetitionLevel::Medium);

        // ties keep input order
        let ids: Vec<_> = report
            .distribution
            .shares
            .iter()
            .map(|s| s.competitor_id.as_str())
            .collect();
        assert_eq!(ids, vec!["C0", "C1", "C2", "C3", "C4"]);
    }

    #[test]
    fn test_no_competitors() {
        let product = Product::new("P1", "Bottle", 20.0).with_reviews(4.0, 50);
        let report = CompetitiveAnalyzer::new().analyze_competitors(&product, &[]);

        assert!(report.distribution.shares.is_empty());
        assert_eq!(report.distribution.concentration, 0.0);
        assert_eq!(report.distribution.leader_share, 0.0);
        assert_eq!(report.competition_level, CompetitionLevel::Low);
        assert_eq!(report.pricing.position, PricePosition::Unknown);
        assert_eq!(report.quality.position, QualityPosition::Unknown);
        assert_eq!(report.pricing.price_competitiveness, 0.0);
        assert_eq!(report.quality.quality_score, 0.0);
    }

    #[test]
    fn test_zero_sales_gives_empty_distribution() {
        let listings = vec![listing("C1", 10.0, 4.0, 5, 0.0), listing("C2", 12.0, 4.0, 5, 0.0)];
        let dist = market_share(&listings);
        assert!(dist.shares.is_empty());
        assert_eq!(dist.concentration, 0.0);
    }

    #[test]
    fn test_shares_sorted_and_concentration() {
        let listings = vec![
            listing("C1", 10.0, 4.0, 5, 10.0),
            listing("C2", 10.0, 4.0, 5, 50.0),
            listing("C3", 10.0, 4.0, 5, 20.0),
            listing("C4", 10.0, 4.0, 5, 20.0),
        ];
        let dist = market_share(&listings);
        let ids: Vec<_> = dist.shares.iter().map(|s| s.competitor_id.as_str()).collect();
        assert_eq!(ids, vec!["C2", "C3", "C4", "C1"]);
        assert!((dist.leader_share - 50.0).abs() < 1e-9);
        assert!((dist.concentration - 90.0).abs() < 1e-9);

        let total: f64 = dist.shares.iter().map(|s| s.share_percent).sum();
        assert!((total - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_pricing_position() {
        let listings = vec![
            listing("C1", 10.0, 4.0, 5, 1.0),
            listing("C2", 20.0, 4.0, 5, 1.0),
            listing("C3", 30.0, 4.0, 5, 1.0),
        ];
        let summary = summarize(&listings);
        assert_eq!(summary.avg_price, 20.0);
        assert_eq!(summary.min_price, 10.0);
        assert_eq!(summary.max_price, 30.0);

        let low = pricing_position(15.0, &summary);
        assert_eq!(low.position, PricePosition::Low);
        assert!((low.price_competitiveness - 0.5).abs() < 1e-9);

        let high = pricing_position(25.0, &summary);
        assert_eq!(high.position, PricePosition::High);
        assert_eq!(high.price_competitiveness, 0.0);

        let cheapest = pricing_position(5.0, &summary);
        assert_eq!(cheapest.price_competitiveness, 1.0);

        assert_eq!(pricing_position(21.0, &summary).position, PricePosition::Medium);
    }

    #[test]
    fn test_pricing_when_all_prices_equal() {
        let listings = vec![listing("C1", 10.0, 4.0, 5, 1.0), listing("C2", 10.0, 4.0, 5, 1.0)];
        let summary = summarize(&listings);
        assert_eq!(pricing_position(10.0, &summary).price_competitiveness, 1.0);
        assert_eq!(pricing_position(12.0, &summary).price_competitiveness, 0.0);
    }

    #[test]
    fn test_quality_score() {
        let listings = vec![listing("C1", 10.0, 4.0, 100, 1.0), listing("C2", 10.0, 4.0, 100, 1.0)];
        let summary = summarize(&listings);
        let analyzer = CompetitiveAnalyzer::new();

        // rating ratio 1.0, reviews 100 / 200 = 0.5
        let product = Product::new("P", "X", 10.0).with_reviews(4.0, 100);
        let q = analyzer.quality_position(&product, &summary);
        assert_eq!(q.position, QualityPosition::Medium);
        assert!((q.quality_score - 85.0).abs() < 1e-9);

        let better = Product::new("P", "X", 10.0).with_reviews(4.5, 1000);
        let q = analyzer.quality_position(&better, &summary);
        assert_eq!(q.position, QualityPosition::High);
        assert_eq!(q.quality_score, 100.0);

        let worse = Product::new("P", "X", 10.0).with_reviews(3.5, 0);
        assert_eq!(
            analyzer.quality_position(&worse, &summary).position,
            QualityPosition::Low
        );
    }

    #[test]
    fn test_quality_guarded_for_zero_averages() {
        let listings = vec![listing("C1", 10.0, 0.0, 0, 1.0)];
        let summary = summarize(&listings);
        let product = Product::new("P", "X", 10.0).with_reviews(4.0, 10);
        let q = CompetitiveAnalyzer::new().quality_position(&product, &summary);
        assert_eq!(q.quality_score, 0.0);
    }

    #[test]
    fn test_insights_attached() {
        let listings = vec![listing("C1", 30.0, 3.5, 100, 10.0)];
        let product = Product::new("P", "X", 10.0).with_reviews(4.8, 300);
        let report = CompetitiveAnalyzer::new().analyze_competitors(&product, &listings);

        assert!(report.insights_in(InsightCategory::Strength).count() >= 2);
        assert!(report
            .insights_in(InsightCategory::Opportunity)
            .any(|i| i.message.contains("Few competitors")));
    }
}
