//! Collaborator interfaces for marketplace and crawler data.
//!
//! The engine never talks to a network directly. Callers plug in a
//! [`MarketplaceProvider`] (required data) and a [`TrendProvider`]
//! (best-effort trend data).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    CategoryStats, CompetitorListing, EntryBarrier, HistoricalPoint, MarketRisk, PriceData,
    Product,
};
use crate::error::{AnalysisError, Result};

// ============================================================================
// Provider Response
// ============================================================================

/// Envelope returned by every marketplace call: a success flag plus either a
/// payload or a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ProviderResponse<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Successful response with no payload: the provider has no data.
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
        }
    }

    /// Failed response with a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Check the success flag and unwrap the payload.
    ///
    /// A response flagged successful without a payload is treated as an
    /// upstream failure too.
    pub fn into_result(self, provider: &str) -> Result<T> {
        self.into_optional(provider)?
            .ok_or_else(|| AnalysisError::upstream(provider, "successful response without data"))
    }

    /// Check the success flag, keeping "no data" apart from failure.
    ///
    /// An unsuccessful response is an upstream error; a successful one
    /// without a payload is `Ok(None)`.
    pub fn into_optional(self, provider: &str) -> Result<Option<T>> {
        if !self.success {
            let message = self
                .message
                .unwrap_or_else(|| "request unsuccessful".to_string());
            return Err(AnalysisError::upstream(provider, message));
        }
        Ok(self.data)
    }
}

// ============================================================================
// Query Types
// ============================================================================

/// Ordering requested from the competitor endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitorSort {
    #[default]
    SalesVolume,
    Price,
    Rating,
}

/// Options for `get_competitors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorQuery {
    pub limit: usize,
    #[serde(default)]
    pub sort: CompetitorSort,
}

impl Default for CompetitorQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            sort: CompetitorSort::SalesVolume,
        }
    }
}

/// Product search filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub limit: Option<usize>,
}

// ============================================================================
// Crawler Payloads
// ============================================================================

/// Product-level data collected by the crawler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductTrendData {
    /// Search interest growth for this product (%)
    #[serde(default)]
    pub search_trend_growth: Option<f64>,
    /// Additional history, oldest first
    #[serde(default)]
    pub historical_data: Vec<HistoricalPoint>,
}

/// Market-level data collected by the crawler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketTrendData {
    #[serde(default)]
    pub search_trend_growth: f64,
    #[serde(default)]
    pub risks: Vec<MarketRisk>,
    #[serde(default)]
    pub entry_barrier: Option<EntryBarrier>,
}

/// Competitor listings discovered by the crawler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorTrendData {
    #[serde(default)]
    pub listings: Vec<CompetitorListing>,
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Marketplace data source.
///
/// Every call returns a [`ProviderResponse`]; the engine checks the flag and
/// turns failures into [`AnalysisError::Upstream`].
#[async_trait]
pub trait MarketplaceProvider: Send + Sync {
    /// Provider name used in error messages and logs
    fn name(&self) -> &'static str;

    /// Product detail lookup.
    async fn get_product(&self, id: &str) -> ProviderResponse<Product>;

    /// Competing listings for a product.
    async fn get_competitors(
        &self,
        id: &str,
        query: &CompetitorQuery,
    ) -> ProviderResponse<Vec<CompetitorListing>>;

    /// Search the catalog.
    async fn search_products(&self, filters: &SearchFilters) -> ProviderResponse<Vec<Product>>;

    /// Cost data for a product.
    async fn get_product_price(&self, id: &str) -> ProviderResponse<PriceData>;

    /// Category statistics.
    async fn get_category_stats(&self, category_id: &str) -> ProviderResponse<CategoryStats>;
}

/// Crawler / trend data source. Best-effort: failures degrade to defaults.
#[async_trait]
pub trait TrendProvider: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &'static str;

    async fn collect_product_data(&self, product_id: &str) -> anyhow::Result<ProductTrendData>;

    async fn collect_market_data(&self, category: &str) -> anyhow::Result<MarketTrendData>;

    async fn collect_competitor_data(&self, product_id: &str)
        -> anyhow::Result<CompetitorTrendData>;
}

/// Trend provider used when no crawler is configured. Always reports no data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrendData;

#[async_trait]
impl TrendProvider for NoTrendData {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn collect_product_data(&self, _product_id: &str) -> anyhow::Result<ProductTrendData> {
        anyhow::bail!("no trend provider configured")
    }

    async fn collect_market_data(&self, _category: &str) -> anyhow::Result<MarketTrendData> {
        anyhow::bail!("no trend provider configured")
    }

    async fn collect_competitor_data(
        &self,
        _product_id: &str,
    ) -> anyhow::Result<CompetitorTrendData> {
        anyhow::bail!("no trend provider configured")
    }
}

// ============================================================================
// Tests
// ============================================================================
