//! Sales, growth and seasonality signals derived from product history.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data::HistoricalPoint;
use crate::math::{clamp_score, percent_of, safe_div};

/// Reviews-to-sales multiplier of the review-based estimate.
const SALES_PER_REVIEW: f64 = 3.5;

/// Points per seasonality chunk.
const SEASON_CHUNK: usize = 30;

/// Deviation from the overall mean (%) that flags a chunk.
const SEASON_DEVIATION_THRESHOLD: f64 = 20.0;

/// Growth windows in points: monthly, quarterly, yearly.
const GROWTH_WINDOWS: [usize; 3] = [30, 90, 365];

// ============================================================================
// Sales Estimate
// ============================================================================

/// Multiplier rewarding highly rated products.
pub fn rating_multiplier(rating: f64) -> f64 {
    if rating >= 4.5 {
        1.2
    } else if rating >= 4.0 {
        1.1
    } else {
        1.0
    }
}

/// Two views of expected sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesEstimate {
    pub rating_multiplier: f64,
    /// `reviews × 3.5 × multiplier`
    pub review_based: f64,
    /// Margin-base monthly sales × multiplier
    pub rating_adjusted_monthly: f64,
}

/// Estimate sales from reviews, rating and the margin-base monthly sales.
pub fn estimate_sales(review_count: u64, rating: f64, monthly_sales: u64) -> SalesEstimate {
    let multiplier = rating_multiplier(rating);
    SalesEstimate {
        rating_multiplier: multiplier,
        review_based: review_count as f64 * SALES_PER_REVIEW * multiplier,
        rating_adjusted_monthly: adjust_for_rating(monthly_sales, rating),
    }
}

/// Scale a sales figure by the rating multiplier.
pub fn adjust_for_rating(sales: u64, rating: f64) -> f64 {
    sales as f64 * rating_multiplier(rating)
}

// ============================================================================
// Growth
// ============================================================================

/// Percent change from `old` to `new`.
///
/// From zero, any increase is 100% and no change is 0%.
pub fn percent_change(old: f64, new: f64) -> f64 {
    if old == 0.0 {
        return if new > 0.0 { 100.0 } else { 0.0 };
    }
    percent_of(new - old, old.abs())
}

fn window_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.mean()
    }
}

/// Growth of the last `window` points against the `window` before them.
///
/// Short histories shrink the window to half the available points.
pub fn window_growth(values: &[f64], window: usize) -> f64 {
    let window = window.min(values.len() / 2);
    if window == 0 {
        return 0.0;
    }

    let n = values.len();
    let recent = window_mean(&values[n - window..]);
    let previous = window_mean(&values[n - 2 * window..n - window]);
    percent_change(previous, recent)
}

/// Sales growth over monthly, quarterly and yearly windows (%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthRates {
    pub monthly: f64,
    pub quarterly: f64,
    pub yearly: f64,
}

impl GrowthRates {
    pub fn from_history(history: &[HistoricalPoint]) -> Self {
        let sales: Vec<f64> = history.iter().map(|p| p.sales_volume).collect();
        let [monthly, quarterly, yearly] = GROWTH_WINDOWS.map(|w| window_growth(&sales, w));
        Self {
            monthly,
            quarterly,
            yearly,
        }
    }
}

// ============================================================================
// Seasonality
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonFlag {
    Peak,
    Normal,
    Low,
}

/// One 30-point chunk of history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalBucket {
    /// Calendar month (1-12) of the chunk's first point
    pub month: u32,
    pub average: f64,
    /// Deviation of `average` from the overall mean (%)
    pub deviation: f64,
    pub flag: SeasonFlag,
}

/// Seasonal pattern of a product's sales.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub buckets: Vec<SeasonalBucket>,
    pub peak_months: Vec<u32>,
    pub low_months: Vec<u32>,
}

impl Seasonality {
    /// Split the history into 30-point chunks and flag deviating ones.
    pub fn from_history(history: &[HistoricalPoint]) -> Self {
        if history.is_empty() {
            return Self::default();
        }

        let overall = window_mean(&history.iter().map(|p| p.sales_volume).collect::<Vec<_>>());

        let buckets: Vec<SeasonalBucket> = history
            .chunks(SEASON_CHUNK)
            .map(|chunk| {
                let values: Vec<f64> = chunk.iter().map(|p| p.sales_volume).collect();
                let average = window_mean(&values);
                let deviation = percent_of(average - overall, overall);
                let flag = if deviation > SEASON_DEVIATION_THRESHOLD {
                    SeasonFlag::Peak
                } else if deviation < -SEASON_DEVIATION_THRESHOLD {
                    SeasonFlag::Low
                } else {
                    SeasonFlag::Normal
                };
                SeasonalBucket {
                    month: chunk[0].date.month(),
                    average,
                    deviation,
                    flag,
                }
            })
            .collect();

        let months_flagged = |flag: SeasonFlag| {
            let mut months: Vec<u32> = buckets
                .iter()
                .filter(|b| b.flag == flag)
                .map(|b| b.month)
                .collect();
            months.sort_unstable();
            months.dedup();
            months
        };

        Self {
            peak_months: months_flagged(SeasonFlag::Peak),
            low_months: months_flagged(SeasonFlag::Low),
            buckets,
        }
    }

    /// +1 in a peak month, -1 in a low month, 0 otherwise or when the month
    /// was flagged both ways.
    pub fn bonus(&self, month: u32) -> f64 {
        let peak = self.peak_months.contains(&month);
        let low = self.low_months.contains(&month);
        match (peak, low) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

// ============================================================================
// Confidence
// ============================================================================

/// How much the estimates can be trusted, from review volume and rating.
pub fn confidence_score(review_count: u64, rating: f64) -> f64 {
    let volume = (review_count as f64 / 1000.0).min(1.0);
    clamp_score(100.0 * (0.7 * volume + 0.3 * safe_div(rating, 5.0)))
}

/// Trend block of a product report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub sales_estimate: SalesEstimate,
    pub growth: GrowthRates,
    pub seasonality: Seasonality,
    /// Search interest growth (%)
    pub search_trend_growth: f64,
    pub confidence_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use test_case::test_case;

    fn history(sales: &[f64]) -> Vec<HistoricalPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        sales
            .iter()
            .enumerate()
            .map(|(i, s)| HistoricalPoint {
                date: start + Duration::days(i as i64),
                price: 10.0,
                sales_volume: *s,
            })
            .collect()
    }

    #[test_case(4.6, 1.2 ; "excellent")]
    #[test_case(4.5, 1.2 ; "boundary excellent")]
    #[test_case(4.2, 1.1 ; "good")]
    #[test_case(3.9, 1.0 ; "average")]
    fn test_rating_multiplier(rating: f64, expected: f64) {
        assert_eq!(rating_multiplier(rating), expected);
    }

    #[test]
    fn test_sales_estimate() {
        let estimate = estimate_sales(100, 4.6, 1000);
        assert!((estimate.rating_adjusted_monthly - 1200.0).abs() < 1e-9);
        assert!((estimate.review_based - 420.0).abs() < 1e-9);
    }

    #[test_case(0.0, 5.0, 100.0 ; "from zero")]
    #[test_case(0.0, 0.0, 0.0 ; "zero to zero")]
    #[test_case(50.0, 75.0, 50.0 ; "increase")]
    #[test_case(80.0, 60.0, -25.0 ; "decrease")]
    fn test_percent_change(old: f64, new: f64, expected: f64) {
        assert!((percent_change(old, new) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_growth_rates() {
        let mut sales = vec![10.0; 30];
        sales.extend(vec![15.0; 30]);
        let growth = GrowthRates::from_history(&history(&sales));

        assert!((growth.monthly - 50.0).abs() < 1e-9);
        // 60 points: quarterly and yearly shrink to 30-point windows
        assert!((growth.quarterly - 50.0).abs() < 1e-9);
        assert!((growth.yearly - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_growth_with_short_history() {
        assert_eq!(GrowthRates::from_history(&[]), GrowthRates::default());
        assert_eq!(GrowthRates::from_history(&history(&[5.0])), GrowthRates::default());
        let growth = GrowthRates::from_history(&history(&[5.0, 10.0]));
        assert!((growth.monthly - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_seasonality_flags() {
        // Jan normal, Jan 31.. (Jan) peak, Mar 1.. low
        let mut sales = vec![100.0; 30];
        sales.extend(vec![200.0; 30]);
        sales.extend(vec![0.0; 30]);
        let season = Seasonality::from_history(&history(&sales));

        assert_eq!(season.buckets.len(), 3);
        assert_eq!(season.buckets[0].flag, SeasonFlag::Normal);
        assert_eq!(season.buckets[1].flag, SeasonFlag::Peak);
        assert_eq!(season.buckets[1].month, 1);
        assert_eq!(season.buckets[2].flag, SeasonFlag::Low);
        assert_eq!(season.buckets[2].month, 3);

        // January has a normal and a peak chunk: still a peak month
        assert_eq!(season.bonus(1), 1.0);
        assert_eq!(season.bonus(3), -1.0);
        assert_eq!(season.bonus(7), 0.0);
    }

    #[test]
    fn test_seasonality_zero_sales_is_flat() {
        let season = Seasonality::from_history(&history(&[0.0; 60]));
        assert!(season.buckets.iter().all(|b| b.flag == SeasonFlag::Normal));
        assert!(season.peak_months.is_empty());
    }

    #[test]
    fn test_confidence_score() {
        assert!((confidence_score(1000, 5.0) - 100.0).abs() < 1e-9);
        assert!((confidence_score(500, 4.0) - 59.0).abs() < 1e-9);
        assert_eq!(confidence_score(0, 0.0), 0.0);
        assert!((confidence_score(5000, 5.0) - 100.0).abs() < 1e-9);
    }
}
