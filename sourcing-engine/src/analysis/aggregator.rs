//! Product analysis aggregator.
//!
//! Fetches a product's data, runs the cost model and the competitive
//! analyzer over it, adds trend signals and produces one [`ProductReport`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use super::trend::{confidence_score, estimate_sales, GrowthRates, Seasonality, TrendAnalysis};
use crate::competition::{CompetitiveAnalyzer, CompetitiveReport};
use crate::data::{
    CompetitorListing, CompetitorQuery, CompetitorSort, HistoricalPoint, MarketInsight,
    MarketplaceProvider, PriceData, Product, ProductTrendData, TrendProvider,
};
use crate::error::{AnalysisError, Result};
use crate::profit::{ProfitCalculator, ProfitabilityReport};

// ============================================================================
// Result Types
// ============================================================================

/// Lifecycle of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Processing,
    Completed,
    Failed,
}

/// Everything known about one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReport {
    pub product: Product,
    pub profitability: ProfitabilityReport,
    pub competition: CompetitiveReport,
    pub trend: TrendAnalysis,
    pub market: MarketInsight,
}

/// Outcome of [`ProductAnalyzer::analyze`].
///
/// A failed analysis carries the error message and no report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub product_id: String,
    pub status: AnalysisStatus,
    pub report: Option<ProductReport>,
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Start an analysis.
    pub fn processing(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            status: AnalysisStatus::Processing,
            report: None,
            error: None,
        }
    }

    /// Mark the analysis completed.
    pub fn complete(self, report: ProductReport) -> Self {
        Self {
            status: AnalysisStatus::Completed,
            report: Some(report),
            error: None,
            ..self
        }
    }

    /// Mark the analysis failed, dropping any partial report.
    pub fn fail(self, error: &AnalysisError) -> Self {
        Self {
            status: AnalysisStatus::Failed,
            report: None,
            error: Some(error.to_string()),
            ..self
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == AnalysisStatus::Completed
    }
}

/// Already-fetched inputs of one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInputs {
    pub product: Product,
    pub competitors: Vec<CompetitorListing>,
    /// Marketplace cost data, when available
    pub price_data: Option<PriceData>,
    /// Crawler product data, when available
    pub product_trend: Option<ProductTrendData>,
    pub market: MarketInsight,
}

impl AnalysisInputs {
    /// Inputs with only a product and its competitors.
    pub fn new(product: Product, competitors: Vec<CompetitorListing>) -> Self {
        Self {
            product,
            competitors,
            price_data: None,
            product_trend: None,
            market: MarketInsight::default(),
        }
    }

    pub fn with_price_data(mut self, price_data: PriceData) -> Self {
        self.price_data = Some(price_data);
        self
    }

    pub fn with_market(mut self, market: MarketInsight) -> Self {
        self.market = market;
        self
    }

    pub fn with_product_trend(mut self, trend: ProductTrendData) -> Self {
        self.product_trend = Some(trend);
        self
    }
}

// ============================================================================
// Analyzer
// ============================================================================

/// Builds product reports from the marketplace and crawler.
pub struct ProductAnalyzer {
    marketplace: Arc<dyn MarketplaceProvider>,
    trends: Arc<dyn TrendProvider>,
    calculator: ProfitCalculator,
    competitive: CompetitiveAnalyzer,
    competitor_limit: usize,
}

impl ProductAnalyzer {
    pub fn new(
        marketplace: Arc<dyn MarketplaceProvider>,
        trends: Arc<dyn TrendProvider>,
        calculator: ProfitCalculator,
        competitive: CompetitiveAnalyzer,
    ) -> Self {
        Self {
            marketplace,
            trends,
            calculator,
            competitive,
            competitor_limit: CompetitorQuery::default().limit,
        }
    }

    /// Set how many competitor listings are requested per product.
    pub fn with_competitor_limit(mut self, limit: usize) -> Self {
        self.competitor_limit = limit;
        self
    }

    pub fn marketplace(&self) -> &Arc<dyn MarketplaceProvider> {
        &self.marketplace
    }

    /// Compute a report from already-fetched inputs. Never awaits.
    pub fn analyze_snapshot(&self, inputs: &AnalysisInputs) -> Result<ProductReport> {
        let product = &inputs.product;
        let price_data = merge_price_data(product, inputs.price_data);
        let profitability = self.calculator.compute_profitability(product, &price_data)?;
        let competition = self
            .competitive
            .analyze_competitors(product, &inputs.competitors);

        let history = select_history(product, inputs.product_trend.as_ref());
        let search_trend_growth = inputs
            .product_trend
            .as_ref()
            .and_then(|t| t.search_trend_growth)
            .unwrap_or(inputs.market.search_trend_growth);

        let trend = TrendAnalysis {
            sales_estimate: estimate_sales(
                product.review_count,
                product.rating,
                profitability.estimated_monthly_sales,
            ),
            growth: GrowthRates::from_history(history),
            seasonality: Seasonality::from_history(history),
            search_trend_growth,
            confidence_score: confidence_score(product.review_count, product.rating),
        };

        Ok(ProductReport {
            product: product.clone(),
            profitability,
            competition,
            trend,
            market: inputs.market.clone(),
        })
    }

    /// Fetch and analyze one product, fetching its market context too.
    pub async fn analyze(&self, product_id: &str) -> AnalysisResult {
        finish(product_id, self.fetch_report(product_id).await)
    }

    /// Fetch everything needed for one product, including the market
    /// context of its category, and build its report.
    pub async fn fetch_report(&self, product_id: &str) -> Result<ProductReport> {
        let mut inputs = self.fetch_inputs(product_id).await?;
        inputs.market = self.fetch_market_insight(&inputs.product.category).await?;
        self.analyze_snapshot(&inputs)
    }

    /// Fetch one product's inputs, leaving the market context at its default.
    ///
    /// Every marketplace call is checked: product details and competitors
    /// must be present, and a failed price lookup is an upstream error while
    /// a successful one without data falls back to the product's own cost.
    /// Crawler data is best-effort.
    pub async fn fetch_inputs(&self, product_id: &str) -> Result<AnalysisInputs> {
        let provider = self.marketplace.name();
        let query = CompetitorQuery {
            limit: self.competitor_limit,
            sort: CompetitorSort::SalesVolume,
        };

        let (product, competitors, price, product_trend, crawled) = tokio::join!(
            self.marketplace.get_product(product_id),
            self.marketplace.get_competitors(product_id, &query),
            self.marketplace.get_product_price(product_id),
            self.trends.collect_product_data(product_id),
            self.trends.collect_competitor_data(product_id),
        );

        let product = product.into_result(provider)?;
        let competitors = competitors.into_result(provider)?;

        let price_data = price.into_optional(provider)?;
        if price_data.is_none() {
            tracing::debug!(product_id = %product_id, "No price data, using product cost");
        }

        let product_trend = match product_trend {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::debug!(
                    product_id = %product_id,
                    provider = self.trends.name(),
                    error = %e,
                    "Product trend data unavailable"
                );
                None
            }
        };

        let extra = match crawled {
            Ok(data) => data.listings,
            Err(e) => {
                tracing::debug!(product_id = %product_id, error = %e, "Crawled competitors unavailable");
                Vec::new()
            }
        };

        Ok(AnalysisInputs {
            competitors: merge_competitors(product_id, competitors, extra),
            product,
            price_data,
            product_trend,
            market: MarketInsight::default(),
        })
    }

    /// Market context for a category.
    ///
    /// A failed category-stats call is an upstream error; a successful one
    /// without data and any crawler failure degrade to defaults.
    pub async fn fetch_market_insight(&self, category: &str) -> Result<MarketInsight> {
        if category.is_empty() {
            return Ok(MarketInsight::default());
        }

        let (stats, trend) = tokio::join!(
            self.marketplace.get_category_stats(category),
            self.trends.collect_market_data(category),
        );

        let stats = stats.into_optional(self.marketplace.name())?;
        let trend = match trend {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::debug!(category = %category, error = %e, "Market trend data unavailable");
                None
            }
        };

        Ok(MarketInsight::from_sources(stats.as_ref(), trend.as_ref()))
    }
}

/// Close the lifecycle of one analysis.
fn finish(product_id: &str, outcome: Result<ProductReport>) -> AnalysisResult {
    let result = AnalysisResult::processing(product_id);
    match outcome {
        Ok(report) => result.complete(report),
        Err(e) => {
            tracing::warn!(product_id = %product_id, error = %e, "Product analysis failed");
            result.fail(&e)
        }
    }
}

/// Marketplace cost data, falling back to the product's own cost price.
fn merge_price_data(product: &Product, price_data: Option<PriceData>) -> PriceData {
    match price_data {
        Some(mut data) => {
            if data.cost_price == 0.0 {
                data.cost_price = product.cost_price.unwrap_or(0.0);
            }
            data
        }
        None => PriceData::from_product(product),
    }
}

/// The product's own history, or the crawler's when the product has none.
fn select_history<'a>(
    product: &'a Product,
    trend: Option<&'a ProductTrendData>,
) -> &'a [HistoricalPoint] {
    match trend {
        Some(t) if product.historical_data.is_empty() => &t.historical_data,
        _ => &product.historical_data,
    }
}

/// Marketplace listings first, then crawled listings not already present.
/// The product itself is never its own competitor.
fn merge_competitors(
    product_id: &str,
    listings: Vec<CompetitorListing>,
    crawled: Vec<CompetitorListing>,
) -> Vec<CompetitorListing> {
    let mut seen: HashSet<String> = HashSet::new();
    listings
        .into_iter()
        .chain(crawled)
        .filter(|l| l.product_id != product_id && seen.insert(l.product_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Seller;

    fn listing(id: &str) -> CompetitorListing {
        CompetitorListing {
            product_id: id.to_string(),
            title: id.to_string(),
            price: 10.0,
            rating: 4.0,
            review_count: 10,
            seller: Seller {
                id: "S".into(),
                name: "Seller".into(),
                rating: 4.0,
            },
            sales_volume: 5.0,
            revenue: 50.0,
        }
    }

    #[test]
    fn test_lifecycle() {
        let result = AnalysisResult::processing("P1");
        assert_eq!(result.status, AnalysisStatus::Processing);

        let failed = result.clone().fail(&AnalysisError::MissingInput { field: "price" });
        assert_eq!(failed.status, AnalysisStatus::Failed);
        assert!(failed.report.is_none());
        assert_eq!(failed.error.as_deref(), Some("Missing required input: price"));
    }

    #[test]
    fn test_merge_competitors() {
        let merged = merge_competitors(
            "P1",
            vec![listing("C1"), listing("P1"), listing("C2")],
            vec![listing("C2"), listing("C3")],
        );
        let ids: Vec<_> = merged.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C2", "C3"]);
    }

    #[test]
    fn test_merge_price_data() {
        let product = Product::new("P1", "Lamp", 30.0).with_cost_price(12.0);
        let merged = merge_price_data(
            &product,
            Some(PriceData {
                shipping_cost: 4.0,
                ..PriceData::default()
            }),
        );
        assert_eq!(merged.cost_price, 12.0);
        assert_eq!(merged.shipping_cost, 4.0);

        let explicit = merge_price_data(
            &product,
            Some(PriceData {
                cost_price: 9.0,
                ..PriceData::default()
            }),
        );
        assert_eq!(explicit.cost_price, 9.0);
    }
}
