//! Recommendation engine.
//!
//! Batch orchestration over the analysis and scoring layers:
//!
//! ```text
//! product ids
//!      │
//!   ┌────────── bounded fan-out (max_concurrency) ──────────┐
//!   │  timeout(fetch)       │  timeout(fetch)       │  ...  │
//!   │  cache hit or inputs  │  cache hit or inputs  │       │
//!   └───────────────────────────────────────────────────────┘
//!                      │  re-sorted by input index
//!                      ▼
//!      MarketSnapshot (once per distinct category in the batch)
//!                      │
//!                      ▼
//!   analyze ──▶ OpportunityScorer ──▶ Ranker ──▶ RecommendationResult
//! ```
//!
//! The only shared state across candidates is the read-only market snapshot.
//! A failed or timed-out candidate is counted in the run metadata and
//! excluded; it never fails the batch. A candidate whose category has no
//! market context because the stats call failed is such a failure.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use sourcing_common::{EngineSettings, Error as CommonError, Validate};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::analysis::{AnalysisInputs, ProductAnalyzer, ProductReport};
use crate::competition::CompetitiveAnalyzer;
use crate::config::ScoringConfig;
use crate::data::{
    cache_key, AnalysisCache, CacheMetrics, CacheMetricsSnapshot, MarketInsight,
    MarketplaceProvider, SearchFilters, TrendProvider,
};
use crate::error::{AnalysisError, Result};
use crate::profit::ProfitCalculator;
use crate::scoring::{
    OpportunityScoreSet, OpportunityScorer, RankFilters, RankRequest, Ranker, ScoredCandidate,
    SortKey,
};

const ANALYSIS_CACHE_DOMAIN: &str = "analysis";

// ============================================================================
// Metrics
// ============================================================================

/// Engine counters. Owned by the caller and shared with the engine.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    batches: AtomicU64,
    analyzed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    cache: Arc<CacheMetrics>,
}

/// Point-in-time copy of [`EngineMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineMetricsSnapshot {
    pub batches: u64,
    pub analyzed: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub cache: CacheMetricsSnapshot,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache counters; pass these to the engine's cache.
    pub fn cache(&self) -> &Arc<CacheMetrics> {
        &self.cache
    }

    pub fn snapshot(&self) -> EngineMetricsSnapshot {
        EngineMetricsSnapshot {
            batches: self.batches.load(Ordering::Relaxed),
            analyzed: self.analyzed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            cache: self.cache.snapshot(),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Market context shared by every candidate of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub categories: BTreeMap<String, MarketInsight>,
    /// Categories whose market data could not be fetched
    #[serde(default)]
    pub unavailable: BTreeMap<String, UnavailableMarket>,
    /// Used for categories not in the snapshot
    pub fallback: MarketInsight,
}

/// Upstream failure behind a missing market context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnavailableMarket {
    pub provider: String,
    pub message: String,
}

impl MarketSnapshot {
    /// Market context of a category, or the upstream error that left it empty.
    pub fn for_category(&self, category: &str) -> Result<&MarketInsight> {
        if let Some(failure) = self.unavailable.get(category) {
            return Err(AnalysisError::upstream(
                failure.provider.clone(),
                failure.message.clone(),
            ));
        }
        Ok(self.categories.get(category).unwrap_or(&self.fallback))
    }
}

/// First-phase outcome for one candidate.
enum Fetched {
    Cached(ProductReport),
    Fresh(AnalysisInputs),
}

impl Fetched {
    fn category(&self) -> &str {
        match self {
            Self::Cached(report) => &report.product.category,
            Self::Fresh(inputs) => &inputs.product.category,
        }
    }
}

/// A candidate excluded because its analysis failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedCandidate {
    pub product_id: String,
    pub error: String,
}

/// What a run was asked for and what happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub filters: RankFilters,
    pub sort_key: SortKey,
    pub offset: usize,
    pub limit: usize,
    pub current_month: u32,
    /// Candidates in the input batch
    pub requested: usize,
    /// Candidates analyzed successfully
    pub analyzed: usize,
    pub failed: usize,
    /// Candidates left after filtering
    pub matched: usize,
    pub returned: usize,
    pub failures: Vec<FailedCandidate>,
}

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// 1-based position in the full ranking
    pub rank: usize,
    pub product_id: String,
    pub scores: OpportunityScoreSet,
    pub report: ProductReport,
}

/// Output of a recommendation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommendations: Vec<Recommendation>,
    pub metadata: RunMetadata,
}

impl RecommendationResult {
    /// Product ids in ranked order.
    pub fn product_ids(&self) -> Vec<&str> {
        self.recommendations
            .iter()
            .map(|r| r.product_id.as_str())
            .collect()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Batch analysis, scoring and ranking.
pub struct RecommendationEngine {
    analyzer: ProductAnalyzer,
    scorer: OpportunityScorer,
    settings: EngineSettings,
    metrics: Arc<EngineMetrics>,
    cache: Option<AnalysisCache<ProductReport>>,
}

impl RecommendationEngine {
    /// Create an engine. Fails when the settings or the configured weights
    /// are invalid.
    pub fn new(
        marketplace: Arc<dyn MarketplaceProvider>,
        trends: Arc<dyn TrendProvider>,
        config: &ScoringConfig,
        settings: EngineSettings,
    ) -> Result<Self> {
        settings.validate().map_err(|e| {
            CommonError::Config(e.to_string()).with_context("Invalid engine settings")
        })?;

        let analyzer = ProductAnalyzer::new(
            marketplace,
            trends,
            ProfitCalculator::with_config(config.cost_model.clone()),
            CompetitiveAnalyzer::with_thresholds(config.competition),
        )
        .with_competitor_limit(settings.competitor_limit);

        Ok(Self {
            analyzer,
            scorer: OpportunityScorer::new(config.weights)?,
            settings,
            metrics: Arc::new(EngineMetrics::new()),
            cache: None,
        })
    }

    /// Use caller-owned metrics. A cache enabled earlier reports into them too.
    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = metrics;
        if self.cache.is_some() {
            self.cache = Some(self.new_cache());
        }
        self
    }

    /// Cache product reports for `settings.cache_ttl_secs`.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(self.new_cache());
        self
    }

    fn new_cache(&self) -> AnalysisCache<ProductReport> {
        AnalysisCache::new(
            self.settings.cache_ttl_secs,
            Arc::clone(self.metrics.cache()),
        )
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn analyzer(&self) -> &ProductAnalyzer {
        &self.analyzer
    }

    /// A request paged by the configured default limit.
    pub fn default_request(&self) -> RankRequest {
        RankRequest::default().with_page(0, self.settings.default_limit)
    }

    /// Reports held by the cache, expired ones included until the next batch.
    pub fn cached_reports(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.len())
    }

    /// Drop cached reports of one category.
    pub fn invalidate_category(&self, category: &str) -> usize {
        self.cache
            .as_ref()
            .map(|c| c.invalidate_tag(&category_tag(category)))
            .unwrap_or(0)
    }

    /// Analyze, score and rank a batch of product ids.
    pub async fn recommend(
        &self,
        product_ids: &[String],
        request: &RankRequest,
    ) -> Result<RecommendationResult> {
        if product_ids.is_empty() {
            return Err(AnalysisError::EmptyBatch);
        }
        self.metrics.batches.fetch_add(1, Ordering::Relaxed);

        if let Some(cache) = &self.cache {
            let pruned = cache.clear_expired();
            if pruned > 0 {
                tracing::debug!(pruned, "Pruned expired analyses");
            }
        }

        let fetched = self.fetch_batch(product_ids).await;

        let categories: BTreeSet<String> = request
            .market_categories
            .iter()
            .map(String::as_str)
            .chain(
                fetched
                    .iter()
                    .filter_map(|(_, _, outcome)| outcome.as_ref().ok())
                    .map(Fetched::category),
            )
            .filter(|category| !category.is_empty())
            .map(str::to_string)
            .collect();
        let snapshot = self.snapshot_market(categories).await;

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for (index, product_id, outcome) in fetched {
            let outcome =
                outcome.and_then(|fetched| self.complete_candidate(&product_id, fetched, &snapshot));
            match outcome {
                Ok(report) => reports.push((index, report)),
                Err(e) => {
                    tracing::warn!(product_id = %product_id, error = %e, "Candidate excluded");
                    failures.push(FailedCandidate {
                        product_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.metrics
            .analyzed
            .fetch_add(reports.len() as u64, Ordering::Relaxed);
        self.metrics
            .failed
            .fetch_add(failures.len() as u64, Ordering::Relaxed);

        let result = self.rank_indexed(reports, failures, product_ids.len(), request);

        tracing::info!(
            requested = result.metadata.requested,
            analyzed = result.metadata.analyzed,
            failed = result.metadata.failed,
            returned = result.metadata.returned,
            "Recommendation batch complete"
        );

        Ok(result)
    }

    /// Search the marketplace and recommend from the results.
    pub async fn recommend_from_search(
        &self,
        filters: &SearchFilters,
        request: &RankRequest,
    ) -> Result<RecommendationResult> {
        let marketplace = self.analyzer.marketplace();
        let products = marketplace
            .search_products(filters)
            .await
            .into_result(marketplace.name())?;

        tracing::debug!(found = products.len(), "Search returned candidates");

        let ids: Vec<String> = products.into_iter().map(|p| p.id).collect();
        self.recommend(&ids, request).await
    }

    /// Score and rank reports that were built elsewhere. No I/O.
    pub fn rank_reports(
        &self,
        reports: Vec<ProductReport>,
        request: &RankRequest,
    ) -> Result<RecommendationResult> {
        if reports.is_empty() {
            return Err(AnalysisError::EmptyBatch);
        }
        let requested = reports.len();
        let indexed = reports.into_iter().enumerate().collect();
        Ok(self.rank_indexed(indexed, Vec::new(), requested, request))
    }

    fn rank_indexed(
        &self,
        reports: Vec<(usize, ProductReport)>,
        failures: Vec<FailedCandidate>,
        requested: usize,
        request: &RankRequest,
    ) -> RecommendationResult {
        let analyzed = reports.len();
        let candidates = reports
            .into_iter()
            .map(|(index, report)| ScoredCandidate {
                index,
                scores: self.scorer.score(&report, request.current_month),
                item: report,
            })
            .collect();

        let ranked = Ranker::rank(candidates, request);
        let recommendations: Vec<Recommendation> = ranked
            .items
            .into_iter()
            .enumerate()
            .map(|(i, c)| Recommendation {
                rank: ranked.offset + i + 1,
                product_id: c.item.product.id.clone(),
                scores: c.scores,
                report: c.item,
            })
            .collect();

        RecommendationResult {
            metadata: RunMetadata {
                filters: request.filters,
                sort_key: request.sort_key,
                offset: request.offset,
                limit: request.limit,
                current_month: request.current_month,
                requested,
                analyzed,
                failed: failures.len(),
                matched: ranked.matched,
                returned: recommendations.len(),
                failures,
            },
            recommendations,
        }
    }

    /// Fetch market context once for each distinct category.
    async fn snapshot_market(&self, categories: BTreeSet<String>) -> MarketSnapshot {
        let fetched = futures::future::join_all(categories.into_iter().map(|category| async move {
            let insight = self.analyzer.fetch_market_insight(&category).await;
            (category, insight)
        }))
        .await;

        let mut snapshot = MarketSnapshot::default();
        for (category, insight) in fetched {
            match insight {
                Ok(insight) => {
                    snapshot.categories.insert(category, insight);
                }
                Err(e) => {
                    tracing::warn!(category = %category, error = %e, "Market context unavailable");
                    let failure = match e {
                        AnalysisError::Upstream { provider, message } => {
                            UnavailableMarket { provider, message }
                        }
                        other => UnavailableMarket {
                            provider: self.analyzer.marketplace().name().to_string(),
                            message: other.to_string(),
                        },
                    };
                    snapshot.unavailable.insert(category, failure);
                }
            }
        }
        snapshot
    }

    /// Fetch every candidate with bounded concurrency, in input order.
    async fn fetch_batch(&self, product_ids: &[String]) -> Vec<(usize, String, Result<Fetched>)> {
        let timeout_ms = self.settings.candidate_timeout_ms;
        let timeout = Duration::from_millis(timeout_ms);

        let mut outcomes: Vec<_> = stream::iter(product_ids.iter().cloned().enumerate())
            .map(|(index, product_id)| async move {
                let outcome = match tokio::time::timeout(timeout, self.fetch_candidate(&product_id)).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        self.metrics.timed_out.fetch_add(1, Ordering::Relaxed);
                        Err(AnalysisError::Timeout {
                            product_id: product_id.clone(),
                            after_ms: timeout_ms,
                        })
                    }
                };
                (index, product_id, outcome)
            })
            .buffer_unordered(self.settings.max_concurrency.max(1))
            .collect()
            .await;

        outcomes.sort_by_key(|(index, _, _)| *index);
        outcomes
    }

    async fn fetch_candidate(&self, product_id: &str) -> Result<Fetched> {
        if let Some(cache) = &self.cache {
            if let Some(report) = cache.get(&cache_key(ANALYSIS_CACHE_DOMAIN, product_id)) {
                tracing::debug!(product_id = %product_id, "Using cached analysis");
                return Ok(Fetched::Cached(report));
            }
        }
        Ok(Fetched::Fresh(self.analyzer.fetch_inputs(product_id).await?))
    }

    /// Attach the batch market context and build the report. Never awaits.
    fn complete_candidate(
        &self,
        product_id: &str,
        fetched: Fetched,
        snapshot: &MarketSnapshot,
    ) -> Result<ProductReport> {
        match fetched {
            Fetched::Cached(mut report) => {
                report.market = snapshot.for_category(&report.product.category)?.clone();
                Ok(report)
            }
            Fetched::Fresh(mut inputs) => {
                inputs.market = snapshot.for_category(&inputs.product.category)?.clone();
                let report = self.analyzer.analyze_snapshot(&inputs)?;

                if let Some(cache) = &self.cache {
                    cache.set(
                        &cache_key(ANALYSIS_CACHE_DOMAIN, product_id),
                        report.clone(),
                        [category_tag(&report.product.category)],
                    );
                }
                Ok(report)
            }
        }
    }
}

fn category_tag(category: &str) -> String {
    format!("category:{}", category)
}
