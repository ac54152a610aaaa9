//! Marketplace data model.
//!
//! Snapshots handed to the engine by the marketplace and crawler
//! collaborators. Everything here is read-only inside the engine.

mod cache;
mod provider;

pub use cache::{cache_key, AnalysisCache, CacheMetrics, CacheMetricsSnapshot};
pub use provider::{
    CompetitorQuery, CompetitorSort, CompetitorTrendData, MarketTrendData, MarketplaceProvider,
    NoTrendData, ProductTrendData, ProviderResponse, SearchFilters, TrendProvider,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::math::safe_div;

// ============================================================================
// Product
// ============================================================================

/// One point of a product's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    /// Observation date
    pub date: NaiveDate,
    /// Listed price on that date
    pub price: f64,
    /// Units sold (or a proxy such as new reviews) on that date
    #[serde(default)]
    pub sales_volume: f64,
}

/// A candidate product as returned by the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Marketplace product id
    pub id: String,
    /// Listing title
    pub title: String,
    /// Current selling price. Required for profitability.
    pub price: Option<f64>,
    /// Category id
    #[serde(default)]
    pub category: String,
    /// Average rating (0-5)
    #[serde(default)]
    pub rating: f64,
    /// Number of reviews
    #[serde(default)]
    pub review_count: u64,
    /// Seller rating (0-5)
    #[serde(default)]
    pub seller_rating: f64,
    /// Unit cost, when the marketplace knows it
    #[serde(default)]
    pub cost_price: Option<f64>,
    /// Feature tags
    #[serde(default)]
    pub features: BTreeSet<String>,
    /// Price/sales history, oldest first
    #[serde(default)]
    pub historical_data: Vec<HistoricalPoint>,
}

impl Product {
    /// Create a product with the given id, title and price. Other fields default.
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price: Some(price),
            category: String::new(),
            rating: 0.0,
            review_count: 0,
            seller_rating: 0.0,
            cost_price: None,
            features: BTreeSet::new(),
            historical_data: Vec::new(),
        }
    }

    /// Set rating and review count.
    pub fn with_reviews(mut self, rating: f64, review_count: u64) -> Self {
        self.rating = rating;
        self.review_count = review_count;
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the seller rating.
    pub fn with_seller_rating(mut self, seller_rating: f64) -> Self {
        self.seller_rating = seller_rating;
        self
    }

    /// Set the unit cost.
    pub fn with_cost_price(mut self, cost_price: f64) -> Self {
        self.cost_price = Some(cost_price);
        self
    }

    /// Set the history.
    pub fn with_history(mut self, history: Vec<HistoricalPoint>) -> Self {
        self.historical_data = history;
        self
    }
}

// ============================================================================
// Competitors
// ============================================================================

/// Seller behind a competing listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rating: f64,
}

/// A competing listing in the same market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorListing {
    /// Competitor's product id
    pub product_id: String,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u64,
    pub seller: Seller,
    /// Units sold over the observation window
    #[serde(default)]
    pub sales_volume: f64,
    /// Revenue over the observation window
    #[serde(default)]
    pub revenue: f64,
}

impl CompetitorListing {
    /// Display name used in share tables: seller name, or the title when blank.
    pub fn display_name(&self) -> &str {
        if self.seller.name.trim().is_empty() {
            &self.title
        } else {
            &self.seller.name
        }
    }

    /// Revenue earned per review.
    pub fn revenue_per_review(&self) -> f64 {
        safe_div(self.revenue, self.review_count as f64)
    }

    /// Price paid per rating point.
    pub fn price_per_rating_point(&self) -> f64 {
        safe_div(self.price, self.rating)
    }
}

// ============================================================================
// Pricing inputs
// ============================================================================

/// Cost inputs for the profitability model. Missing values are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceData {
    #[serde(default)]
    pub cost_price: f64,
    #[serde(default)]
    pub shipping_cost: f64,
    /// Share of revenue refunded (0-1)
    #[serde(default)]
    pub refund_rate: f64,
}

impl PriceData {
    /// Price data derived from the product snapshot alone.
    pub fn from_product(product: &Product) -> Self {
        Self {
            cost_price: product.cost_price.unwrap_or(0.0),
            ..Self::default()
        }
    }
}

// ============================================================================
// Market signals
// ============================================================================

/// How hard it is to enter a market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryBarrier {
    Low,
    #[default]
    Medium,
    High,
}

impl EntryBarrier {
    /// Bonus points added to the market potential score.
    pub fn bonus(&self) -> f64 {
        match self {
            Self::Low => 20.0,
            Self::Medium => 10.0,
            Self::High => 0.0,
        }
    }
}

/// Severity of a market risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Points subtracted from the risk score.
    pub fn penalty(&self) -> f64 {
        match self {
            Self::High => 20.0,
            Self::Medium => 10.0,
            Self::Low => 5.0,
        }
    }
}

/// A named market risk (seasonal demand, regulation, supplier dependency...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRisk {
    pub kind: String,
    pub level: RiskLevel,
}

/// Category-level statistics from the marketplace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category_id: String,
    /// Annual market size in currency units
    #[serde(default)]
    pub market_size: f64,
    /// Year-over-year growth (%)
    #[serde(default)]
    pub growth_rate: f64,
    #[serde(default)]
    pub product_count: u64,
    #[serde(default)]
    pub avg_price: f64,
    #[serde(default)]
    pub entry_barrier: Option<EntryBarrier>,
}

/// Market-wide signals used by the opportunity scorer.
///
/// Built once per batch per category and shared read-only by all candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketInsight {
    pub market_size: f64,
    pub growth_rate: f64,
    pub entry_barrier: EntryBarrier,
    pub risks: Vec<MarketRisk>,
    /// Search interest growth (%)
    pub search_trend_growth: f64,
}

impl MarketInsight {
    /// Merge marketplace statistics and crawler market data. Either may be absent.
    ///
    /// The crawler's entry barrier wins over the marketplace's when both exist.
    pub fn from_sources(stats: Option<&CategoryStats>, trend: Option<&MarketTrendData>) -> Self {
        let mut insight = Self::default();

        if let Some(stats) = stats {
            insight.market_size = stats.market_size;
            insight.growth_rate = stats.growth_rate;
            if let Some(barrier) = stats.entry_barrier {
                insight.entry_barrier = barrier;
            }
        }

        if let Some(trend) = trend {
            insight.search_trend_growth = trend.search_trend_growth;
            insight.risks = trend.risks.clone();
            if let Some(barrier) = trend.entry_barrier {
                insight.entry_barrier = barrier;
            }
        }

        insight
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(rating: f64, reviews: u64, revenue: f64) -> CompetitorListing {
        CompetitorListing {
            product_id: "C1".into(),
            title: "Steel bottle".into(),
            price: 20.0,
            rating,
            review_count: reviews,
            seller: Seller {
                id: "S1".into(),
                name: String::new(),
                rating: 4.0,
            },
            sales_volume: 10.0,
            revenue,
        }
    }

    #[test]
    fn test_derived_metrics_guarded() {
        let l = listing(0.0, 0, 500.0);
        assert_eq!(l.revenue_per_review(), 0.0);
        assert_eq!(l.price_per_rating_point(), 0.0);

        let l = listing(4.0, 50, 500.0);
        assert!((l.revenue_per_review() - 10.0).abs() < 1e-12);
        assert!((l.price_per_rating_point() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_display_name_falls_back_to_title() {
        let mut l = listing(4.0, 1, 1.0);
        assert_eq!(l.display_name(), "Steel bottle");
        l.seller.name = "Acme".into();
        assert_eq!(l.display_name(), "Acme");
    }

    #[test]
    fn test_price_data_from_product() {
        let p = Product::new("P1", "Lamp", 30.0).with_cost_price(12.0);
        let data = PriceData::from_product(&p);
        assert_eq!(data.cost_price, 12.0);
        assert_eq!(data.shipping_cost, 0.0);

        let p = Product::new("P2", "Lamp", 30.0);
        assert_eq!(PriceData::from_product(&p), PriceData::default());
    }

    #[test]
    fn test_market_insight_merge() {
        let stats = CategoryStats {
            category_id: "home".into(),
            market_size: 5e6,
            growth_rate: 12.0,
            entry_barrier: Some(EntryBarrier::High),
            ..CategoryStats::default()
        };
        let trend = MarketTrendData {
            search_trend_growth: 8.0,
            risks: vec![MarketRisk {
                kind: "seasonal".into(),
                level: RiskLevel::Medium,
            }],
            entry_barrier: Some(EntryBarrier::Low),
        };

        let insight = MarketInsight::from_sources(Some(&stats), Some(&trend));
        assert_eq!(insight.market_size, 5e6);
        assert_eq!(insight.growth_rate, 12.0);
        assert_eq!(insight.entry_barrier, EntryBarrier::Low);
        assert_eq!(insight.risks.len(), 1);

        let none = MarketInsight::from_sources(None, None);
        assert_eq!(none, MarketInsight::default());
        assert_eq!(none.entry_barrier, EntryBarrier::Medium);
    }

    #[test]
    fn test_product_deserializes_with_defaults() {
        let json = r#"{"id": "B0X", "title": "Mug", "price": 12.5}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.price, Some(12.5));
        assert_eq!(p.review_count, 0);
        assert!(p.historical_data.is_empty());
    }

    #[test]
    fn test_penalty_tables() {
        assert_eq!(RiskLevel::High.penalty(), 20.0);
        assert_eq!(RiskLevel::Medium.penalty(), 10.0);
        assert_eq!(RiskLevel::Low.penalty(), 5.0);
        assert_eq!(EntryBarrier::Low.bonus(), 20.0);
        assert_eq!(EntryBarrier::Medium.bonus(), 10.0);
        assert_eq!(EntryBarrier::High.bonus(), 0.0);
    }
}
