//! Profitability calculator.
//!
//! Fixed-rate cost model: fees are fractions of the selling price, cost and
//! shipping come from [`PriceData`]. Monthly sales are estimated from the
//! review count.

use serde::{Deserialize, Serialize};

use super::config::CostModelConfig;
use super::sensitivity::SensitivityAnalysis;
use crate::data::{PriceData, Product};
use crate::error::{AnalysisError, Result};
use crate::math::{ceil_units, percent_of, safe_div};

// ============================================================================
// Report Types
// ============================================================================

/// Each cost component as a percentage of the per-unit total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRatios {
    pub cost_price: f64,
    pub shipping_cost: f64,
    pub platform_fee: f64,
    pub payment_fee: f64,
    pub marketing_cost: f64,
    pub operational_cost: f64,
}

/// Per-unit cost breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub cost_price: f64,
    pub shipping_cost: f64,
    pub platform_fee: f64,
    pub payment_fee: f64,
    pub marketing_cost: f64,
    pub operational_cost: f64,
    pub total: f64,
    pub ratios: CostRatios,
}

impl CostBreakdown {
    fn new(
        cost_price: f64,
        shipping_cost: f64,
        platform_fee: f64,
        payment_fee: f64,
        marketing_cost: f64,
        operational_cost: f64,
    ) -> Self {
        let total = cost_price
            + shipping_cost
            + platform_fee
            + payment_fee
            + marketing_cost
            + operational_cost;

        Self {
            cost_price,
            shipping_cost,
            platform_fee,
            payment_fee,
            marketing_cost,
            operational_cost,
            total,
            ratios: CostRatios {
                cost_price: percent_of(cost_price, total),
                shipping_cost: percent_of(shipping_cost, total),
                platform_fee: percent_of(platform_fee, total),
                payment_fee: percent_of(payment_fee, total),
                marketing_cost: percent_of(marketing_cost, total),
                operational_cost: percent_of(operational_cost, total),
            },
        }
    }

    /// Costs that do not scale with each unit sold.
    pub fn fixed_costs(&self) -> f64 {
        self.operational_cost + self.marketing_cost
    }

    /// Costs paid on every unit sold.
    pub fn variable_cost_per_unit(&self) -> f64 {
        self.cost_price + self.shipping_cost + self.platform_fee + self.payment_fee
    }
}

/// Margins and return on investment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginResult {
    pub gross_margin: f64,
    pub net_margin: f64,
    /// Gross margin as % of gross revenue
    pub gross_margin_ratio: f64,
    /// Net margin as % of net revenue
    pub net_margin_ratio: f64,
    /// Net margin as % of total cost
    pub roi: f64,
}

/// Units needed to cover fixed costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "units")]
pub enum BreakevenUnits {
    Reachable(u64),
    /// Contribution margin is not positive, so no volume covers fixed costs.
    Unreachable,
}

impl BreakevenUnits {
    pub fn units(&self) -> Option<u64> {
        match self {
            Self::Reachable(units) => Some(*units),
            Self::Unreachable => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable(_))
    }
}

/// Breakeven analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakevenResult {
    pub fixed_costs: f64,
    pub variable_cost_per_unit: f64,
    pub contribution_margin: f64,
    pub breakeven_units: BreakevenUnits,
    /// `units × price`, 0 when unreachable
    pub breakeven_revenue: f64,
}

/// Profit on a single unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitEconomics {
    pub unit_net_profit: f64,
    /// Unit profit as % of price
    pub unit_margin_ratio: f64,
}

/// Full profitability report for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilityReport {
    pub product_id: String,
    pub price: f64,
    pub estimated_monthly_sales: u64,
    pub gross_revenue: f64,
    pub net_revenue: f64,
    pub costs: CostBreakdown,
    pub margins: MarginResult,
    pub breakeven: BreakevenResult,
    pub unit_economics: UnitEconomics,
    pub sensitivity: SensitivityAnalysis,
}

// ============================================================================
// Calculator
// ============================================================================

/// Computes [`ProfitabilityReport`]s from product snapshots.
#[derive(Debug, Clone, Default)]
pub struct ProfitCalculator {
    config: CostModelConfig,
}

impl ProfitCalculator {
    /// Create a calculator with the default rates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom rates.
    pub fn with_config(config: CostModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CostModelConfig {
        &self.config
    }

    /// Compute the full profitability report.
    ///
    /// Fails only when the product has no usable price. Every ratio is
    /// guarded, so zero revenue or zero cost yields 0.
    pub fn compute_profitability(
        &self,
        product: &Product,
        price_data: &PriceData,
    ) -> Result<ProfitabilityReport> {
        let price = product
            .price
            .filter(|p| p.is_finite())
            .ok_or(AnalysisError::MissingInput { field: "price" })?;

        let costs = self.cost_breakdown(price, &product.category, price_data);
        let estimated_monthly_sales = self.estimate_monthly_sales(product.review_count);

        let gross_revenue = price * estimated_monthly_sales as f64;
        let net_revenue = gross_revenue * (1.0 - price_data.refund_rate);
        let margins = margins(gross_revenue, net_revenue, &costs);
        let breakeven = breakeven(price, &costs);

        let unit_net_profit = price - costs.total;
        let unit_economics = UnitEconomics {
            unit_net_profit,
            unit_margin_ratio: percent_of(unit_net_profit, price),
        };

        tracing::debug!(
            product_id = %product.id,
            net_margin = margins.net_margin,
            roi = margins.roi,
            "Computed profitability"
        );

        Ok(ProfitabilityReport {
            product_id: product.id.clone(),
            price,
            estimated_monthly_sales,
            gross_revenue,
            net_revenue,
            costs,
            sensitivity: SensitivityAnalysis::from_base(margins.net_margin, margins.roi),
            margins,
            breakeven,
            unit_economics,
        })
    }

    /// Monthly sales implied by a review count: `ceil(reviews / ratio)`.
    pub fn estimate_monthly_sales(&self, review_count: u64) -> u64 {
        ceil_units(safe_div(
            review_count as f64,
            self.config.review_to_sales_ratio,
        ))
    }

    /// Per-unit cost breakdown at `price`.
    pub fn cost_breakdown(&self, price: f64, category: &str, price_data: &PriceData) -> CostBreakdown {
        let c = &self.config;
        CostBreakdown::new(
            price_data.cost_price,
            price_data.shipping_cost,
            price * c.platform_fee_rate_for(category),
            price * c.payment_fee_rate,
            price * c.marketing_rate,
            price * c.operational_rate,
        )
    }
}

fn margins(gross_revenue: f64, net_revenue: f64, costs: &CostBreakdown) -> MarginResult {
    let gross_margin = gross_revenue - costs.cost_price;
    let net_margin = net_revenue - costs.total;

    MarginResult {
        gross_margin,
        net_margin,
        gross_margin_ratio: percent_of(gross_margin, gross_revenue),
        net_margin_ratio: percent_of(net_margin, net_revenue),
        roi: percent_of(net_margin, costs.total),
    }
}

fn breakeven(price: f64, costs: &CostBreakdown) -> BreakevenResult {
    let fixed_costs = costs.fixed_costs();
    let variable_cost_per_unit = costs.variable_cost_per_unit();
    let contribution_margin = price - variable_cost_per_unit;

    let breakeven_units = if contribution_margin > 0.0 {
        BreakevenUnits::Reachable(ceil_units(fixed_costs / contribution_margin))
    } else {
        BreakevenUnits::Unreachable
    };

    let breakeven_revenue = breakeven_units
        .units()
        .map(|units| units as f64 * price)
        .unwrap_or(0.0);

    BreakevenResult {
        fixed_costs,
        variable_cost_per_unit,
        contribution_margin,
        breakeven_units,
        breakeven_revenue,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn scenario_one() -> (Product, PriceData) {
        let product = Product::new("P1", "Desk lamp", 20000.0)
            .with_reviews(4.6, 100)
            .with_cost_price(8000.0);
        let price_data = PriceData {
            cost_price: 8000.0,
            shipping_cost: 3000.0,
            refund_rate: 0.0,
        };
        (product, price_data)
    }

    #[test]
    fn test_monthly_sales_estimate() {
        let calc = ProfitCalculator::new();
        assert_eq!(calc.estimate_monthly_sales(100), 1000);
        assert_eq!(calc.estimate_monthly_sales(0), 0);
        assert_eq!(calc.estimate_monthly_sales(3), 30);
    }

    #[test]
    fn test_cost_breakdown() {
        let (product, price_data) = scenario_one();
        let report = ProfitCalculator::new()
            .compute_profitability(&product, &price_data)
            .unwrap();

        let costs = report.costs;
        assert!(approx(costs.platform_fee, 2000.0));
        assert!(approx(costs.payment_fee, 640.0));
        assert!(approx(costs.marketing_cost, 2000.0));
        assert!(approx(costs.operational_cost, 1000.0));
        assert!(approx(costs.total, 16640.0));

        let ratio_sum = costs.ratios.cost_price
            + costs.ratios.shipping_cost
            + costs.ratios.platform_fee
            + costs.ratios.payment_fee
            + costs.ratios.marketing_cost
            + costs.ratios.operational_cost;
        assert!(approx(ratio_sum, 100.0));
    }

    #[test]
    fn test_margins_and_breakeven() {
        let (product, price_data) = scenario_one();
        let report = ProfitCalculator::new()
            .compute_profitability(&product, &price_data)
            .unwrap();

        assert_eq!(report.estimated_monthly_sales, 1000);
        assert!(approx(report.gross_revenue, 20_000_000.0));
        assert!(approx(report.margins.gross_margin, 20_000_000.0 - 8000.0));
        assert!(approx(report.margins.net_margin, 20_000_000.0 - 16640.0));
        assert!(approx(
            report.margins.roi,
            (20_000_000.0 - 16640.0) / 16640.0 * 100.0
        ));

        // fixed 3000, variable 13640, contribution 6360
        assert!(approx(report.breakeven.fixed_costs, 3000.0));
        assert!(approx(report.breakeven.contribution_margin, 6360.0));
        assert_eq!(report.breakeven.breakeven_units, BreakevenUnits::Reachable(1));
        assert!(approx(report.breakeven.breakeven_revenue, 20000.0));

        assert!(approx(report.unit_economics.unit_net_profit, 3360.0));
        assert!(approx(report.unit_economics.unit_margin_ratio, 16.8));
    }

    #[test]
    fn test_unreachable_breakeven() {
        let product = Product::new("P2", "Loss leader", 10.0).with_reviews(4.0, 10);
        let price_data = PriceData {
            cost_price: 12.0,
            ..PriceData::default()
        };
        let report = ProfitCalculator::new()
            .compute_profitability(&product, &price_data)
            .unwrap();

        assert_eq!(report.breakeven.breakeven_units, BreakevenUnits::Unreachable);
        assert_eq!(report.breakeven.breakeven_revenue, 0.0);
    }

    #[test]
    fn test_zero_reviews_guarded() {
        let product = Product::new("P3", "New listing", 0.0);
        let report = ProfitCalculator::new()
            .compute_profitability(&product, &PriceData::default())
            .unwrap();

        assert_eq!(report.estimated_monthly_sales, 0);
        assert_eq!(report.margins.gross_margin_ratio, 0.0);
        assert_eq!(report.margins.net_margin_ratio, 0.0);
        assert_eq!(report.margins.roi, 0.0);
        assert_eq!(report.costs.ratios, CostRatios::default());
        assert_eq!(report.unit_economics.unit_margin_ratio, 0.0);
        assert!(report.sensitivity.outcomes().iter().all(|o| o.roi == 0.0));
    }

    #[test]
    fn test_missing_price() {
        let mut product = Product::new("P4", "No price", 1.0);
        product.price = None;
        let err = ProfitCalculator::new()
            .compute_profitability(&product, &PriceData::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingInput { field: "price" }));

        product.price = Some(f64::NAN);
        assert!(ProfitCalculator::new()
            .compute_profitability(&product, &PriceData::default())
            .is_err());
    }

    #[test]
    fn test_refund_rate_reduces_net_revenue() {
        let product = Product::new("P5", "Mug", 10.0).with_reviews(4.0, 10);
        let price_data = PriceData {
            refund_rate: 0.1,
            ..PriceData::default()
        };
        let report = ProfitCalculator::new()
            .compute_profitability(&product, &price_data)
            .unwrap();
        assert!(approx(report.gross_revenue, 1000.0));
        assert!(approx(report.net_revenue, 900.0));
    }

    #[test]
    fn test_category_fee_override() {
        let config = CostModelConfig::default().with_category_fee("jewelry", 0.2);
        let calc = ProfitCalculator::with_config(config);
        let ring = Product::new("R1", "Ring", 100.0).with_category("jewelry");
        let report = calc
            .compute_profitability(&ring, &PriceData::default())
            .unwrap();
        assert!(approx(report.costs.platform_fee, 20.0));

        let lamp = Product::new("L1", "Lamp", 100.0).with_category("home");
        let report = calc
            .compute_profitability(&lamp, &PriceData::default())
            .unwrap();
        assert!(approx(report.costs.platform_fee, 10.0));
    }
}
