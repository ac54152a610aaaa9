//! Filter, stable sort and paginate scored candidates.

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::scorer::OpportunityScoreSet;

/// Score a ranking is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    TotalScore,
    Profit,
    Competition,
    MarketPotential,
    Quality,
    Trend,
    /// Ascending: lower sorts first
    Risk,
}

impl SortKey {
    pub fn value(&self, scores: &OpportunityScoreSet) -> f64 {
        match self {
            Self::TotalScore => scores.total_score,
            Self::Profit => scores.profit,
            Self::Competition => scores.competition,
            Self::MarketPotential => scores.market_potential,
            Self::Quality => scores.quality,
            Self::Trend => scores.trend,
            Self::Risk => scores.risk,
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self, Self::Risk)
    }

    fn compare(&self, a: &OpportunityScoreSet, b: &OpportunityScoreSet) -> Ordering {
        let (a, b) = (self.value(a), self.value(b));
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        if self.is_ascending() {
            ord
        } else {
            ord.reverse()
        }
    }
}

/// Optional score thresholds. Absent thresholds admit everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RankFilters {
    /// Keep if profit score >= this
    #[serde(default)]
    pub min_margin: Option<f64>,
    /// Keep if quality score >= this
    #[serde(default)]
    pub min_quality: Option<f64>,
    /// Keep if risk score <= this
    #[serde(default)]
    pub max_risk: Option<f64>,
}

impl RankFilters {
    pub fn admits(&self, scores: &OpportunityScoreSet) -> bool {
        self.min_margin.map_or(true, |min| scores.profit >= min)
            && self.min_quality.map_or(true, |min| scores.quality >= min)
            && self.max_risk.map_or(true, |max| scores.risk <= max)
    }
}

/// Ranking request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRequest {
    #[serde(default)]
    pub filters: RankFilters,
    #[serde(default)]
    pub sort_key: SortKey,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Calendar month (1-12) used for the seasonality bonus
    #[serde(default = "current_month")]
    pub current_month: u32,
    /// Categories whose market context is fetched once before a batch
    #[serde(default)]
    pub market_categories: Vec<String>,
}

impl Default for RankRequest {
    fn default() -> Self {
        Self {
            filters: RankFilters::default(),
            sort_key: SortKey::default(),
            offset: 0,
            limit: default_limit(),
            current_month: current_month(),
            market_categories: Vec::new(),
        }
    }
}

impl RankRequest {
    pub fn with_filters(mut self, filters: RankFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort_key(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.current_month = month;
        self
    }

    pub fn with_market_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.market_categories = categories.into_iter().map(Into::into).collect();
        self
    }
}

fn default_limit() -> usize {
    10
}

fn current_month() -> u32 {
    Local::now().month()
}

/// A candidate with its scores and position in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate<T> {
    /// Position in the input batch; breaks ties
    pub index: usize,
    pub item: T,
    pub scores: OpportunityScoreSet,
}

/// One page of ranked candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedList<T> {
    pub items: Vec<ScoredCandidate<T>>,
    /// Candidates offered to the ranker
    pub total_candidates: usize,
    /// Candidates left after filtering
    pub matched: usize,
    pub offset: usize,
    pub limit: usize,
}

/// Filter, sort and paginate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker;

impl Ranker {
    /// Rank candidates.
    ///
    /// Sorting is stable on the requested key with input index as the
    /// tie-break, so equal scores keep their input order no matter how the
    /// vector was assembled.
    pub fn rank<T>(candidates: Vec<ScoredCandidate<T>>, request: &RankRequest) -> RankedList<T> {
        let total_candidates = candidates.len();

        let mut kept: Vec<ScoredCandidate<T>> = candidates
            .into_iter()
            .filter(|c| request.filters.admits(&c.scores))
            .collect();
        let matched = kept.len();

        kept.sort_by(|a, b| {
            request
                .sort_key
                .compare(&a.scores, &b.scores)
                .then(a.index.cmp(&b.index))
        });

        let items = kept
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .collect();

        RankedList {
            items,
            total_candidates,
            matched,
            offset: request.offset,
            limit: request.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(index: usize, total: f64, risk: f64) -> ScoredCandidate<&'static str> {
        ScoredCandidate {
            index,
            item: "p",
            scores: OpportunityScoreSet {
                profit: total,
                quality: total,
                risk,
                total_score: total,
                ..OpportunityScoreSet::default()
            },
        }
    }

    fn indices<T>(list: &RankedList<T>) -> Vec<usize> {
        list.items.iter().map(|c| c.index).collect()
    }

    #[test]
    fn test_default_sort_is_total_descending_with_stable_ties() {
        let candidates = vec![
            candidate(0, 50.0, 0.0),
            candidate(1, 70.0, 0.0),
            candidate(2, 50.0, 0.0),
            candidate(3, 90.0, 0.0),
        ];
        let ranked = Ranker::rank(candidates, &RankRequest::default());
        assert_eq!(indices(&ranked), vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_ties_follow_index_not_vector_order() {
        let candidates = vec![candidate(2, 50.0, 0.0), candidate(0, 50.0, 0.0), candidate(1, 50.0, 0.0)];
        let ranked = Ranker::rank(candidates, &RankRequest::default());
        assert_eq!(indices(&ranked), vec![0, 1, 2]);
    }

    #[test]
    fn test_risk_sorts_ascending() {
        let candidates = vec![candidate(0, 50.0, 80.0), candidate(1, 50.0, 20.0), candidate(2, 50.0, 50.0)];
        let request = RankRequest::default().with_sort_key(SortKey::Risk);
        assert_eq!(indices(&Ranker::rank(candidates, &request)), vec![1, 2, 0]);
    }

    #[test]
    fn test_filters_are_a_subset() {
        let candidates: Vec<_> = (0..6)
            .map(|i| candidate(i, i as f64 * 20.0, i as f64 * 10.0))
            .collect();
        let all = Ranker::rank(candidates.clone(), &RankRequest::default());

        let request = RankRequest::default().with_filters(RankFilters {
            min_margin: Some(40.0),
            min_quality: None,
            max_risk: Some(40.0),
        });
        let filtered = Ranker::rank(candidates, &request);

        assert!(filtered.matched <= all.matched);
        assert_eq!(indices(&filtered), vec![4, 3, 2]);
        assert!(filtered
            .items
            .iter()
            .all(|c| all.items.iter().any(|a| a.index == c.index)));
    }

    #[test]
    fn test_pagination_after_sort() {
        let candidates: Vec<_> = (0..25).map(|i| candidate(i, i as f64, 0.0)).collect();

        let first = Ranker::rank(candidates.clone(), &RankRequest::default());
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.items[0].index, 24);
        assert_eq!(first.total_candidates, 25);

        let page = Ranker::rank(candidates.clone(), &RankRequest::default().with_page(20, 10));
        assert_eq!(indices(&page), vec![4, 3, 2, 1, 0]);

        let past_end = Ranker::rank(candidates, &RankRequest::default().with_page(30, 10));
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.matched, 25);
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: RankRequest = serde_json::from_str(r#"{"sort_key": "risk"}"#).unwrap();
        assert_eq!(request.sort_key, SortKey::Risk);
        assert_eq!(request.limit, 10);
        assert!((1..=12).contains(&request.current_month));
        assert_eq!(request.filters, RankFilters::default());
    }
}
