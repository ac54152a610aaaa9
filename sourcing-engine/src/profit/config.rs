//! Cost model configuration.

use serde::{Deserialize, Serialize};
use sourcing_common::{Validate, ValidationError, ValidationResult};
use std::collections::BTreeMap;

/// Rates used by the fixed-rate cost model.
///
/// All rates are fractions of the selling price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostModelConfig {
    /// Marketplace commission (default 10%)
    #[serde(default = "default_platform_fee_rate")]
    pub platform_fee_rate: f64,

    /// Payment processing fee (default 3.2%)
    #[serde(default = "default_payment_fee_rate")]
    pub payment_fee_rate: f64,

    /// Advertising spend (default 10%)
    #[serde(default = "default_marketing_rate")]
    pub marketing_rate: f64,

    /// Warehousing, staff and overhead (default 5%)
    #[serde(default = "default_operational_rate")]
    pub operational_rate: f64,

    /// Share of buyers who leave a review; monthly sales = reviews / ratio
    #[serde(default = "default_review_to_sales_ratio")]
    pub review_to_sales_ratio: f64,

    /// Platform fee overrides keyed by category id
    #[serde(default)]
    pub category_platform_fees: BTreeMap<String, f64>,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            platform_fee_rate: default_platform_fee_rate(),
            payment_fee_rate: default_payment_fee_rate(),
            marketing_rate: default_marketing_rate(),
            operational_rate: default_operational_rate(),
            review_to_sales_ratio: default_review_to_sales_ratio(),
            category_platform_fees: BTreeMap::new(),
        }
    }
}

impl CostModelConfig {
    /// Platform fee rate for a category, falling back to the flat rate.
    pub fn platform_fee_rate_for(&self, category: &str) -> f64 {
        self.category_platform_fees
            .get(category)
            .copied()
            .unwrap_or(self.platform_fee_rate)
    }

    /// Add a per-category platform fee override.
    pub fn with_category_fee(mut self, category: impl Into<String>, rate: f64) -> Self {
        self.category_platform_fees.insert(category.into(), rate);
        self
    }
}

fn default_platform_fee_rate() -> f64 {
    0.10
}

fn default_payment_fee_rate() -> f64 {
    0.032
}

fn default_marketing_rate() -> f64 {
    0.10
}

fn default_operational_rate() -> f64 {
    0.05
}

fn default_review_to_sales_ratio() -> f64 {
    0.10
}

fn check_rate(field: &str, value: f64) -> Option<ValidationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        None
    } else {
        Some(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("{} is not a fraction in [0, 1]", value),
        })
    }
}

impl Validate for CostModelConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors: Vec<ValidationError> = [
            ("cost_model.platform_fee_rate", self.platform_fee_rate),
            ("cost_model.payment_fee_rate", self.payment_fee_rate),
            ("cost_model.marketing_rate", self.marketing_rate),
            ("cost_model.operational_rate", self.operational_rate),
        ]
        .into_iter()
        .filter_map(|(field, value)| check_rate(field, value))
        .collect();

        for (category, rate) in &self.category_platform_fees {
            if let Some(err) = check_rate(
                &format!("cost_model.category_platform_fees.{}", category),
                *rate,
            ) {
                errors.push(err);
            }
        }

        // A zero ratio would make every product look like it sells nothing.
        if !(self.review_to_sales_ratio.is_finite() && self.review_to_sales_ratio > 0.0) {
            errors.push(ValidationError::InvalidValue {
                field: "cost_model.review_to_sales_ratio".into(),
                reason: "must be greater than 0".into(),
            });
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CostModelConfig::default();
        assert_eq!(config.platform_fee_rate, 0.10);
        assert_eq!(config.payment_fee_rate, 0.032);
        assert_eq!(config.marketing_rate, 0.10);
        assert_eq!(config.operational_rate, 0.05);
        assert_eq!(config.review_to_sales_ratio, 0.10);
        assert!(config.category_platform_fees.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_category_override() {
        let config = CostModelConfig::default().with_category_fee("jewelry", 0.20);
        assert_eq!(config.platform_fee_rate_for("jewelry"), 0.20);
        assert_eq!(config.platform_fee_rate_for("home"), 0.10);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CostModelConfig = serde_json::from_str(r#"{"marketing_rate": 0.15}"#).unwrap();
        assert_eq!(config.marketing_rate, 0.15);
        assert_eq!(config.platform_fee_rate, 0.10);
    }

    #[test]
    fn test_validate_collects_errors() {
        let config = CostModelConfig {
            platform_fee_rate: 1.5,
            review_to_sales_ratio: 0.0,
            ..CostModelConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::Multiple(errors)) if errors.len() == 2
        ));
    }
}
