//! Allocator configuration

use std::path::Path;

use mulberry_types::{AccrualBasis, CategoryWeights};
use serde::{Deserialize, Serialize};

use crate::error::{DividendError, DividendResult};

/// Tolerance applied when checking that category weights sum to 1.0.
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// Allocator configuration.
///
/// ```toml
/// accrual_basis = "running_totals"
/// default_period_days = 30
///
/// [weights]
/// marketing = 0.45
/// work_hours = 0.30
/// revenue = 0.25
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Payout share per contribution category
    pub weights: CategoryWeights,

    /// Running totals or period-scoped sums
    pub accrual_basis: AccrualBasis,

    /// Length of the settlement period when the caller gives no start
    pub default_period_days: i64,

    /// How many distributions `cooperative_stats` lists
    pub recent_distribution_limit: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default(),
            accrual_basis: AccrualBasis::RunningTotals,
            default_period_days: 30,
            recent_distribution_limit: 5,
        }
    }
}

impl AllocatorConfig {
    /// Load configuration from a TOML file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> DividendResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| DividendError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> DividendResult<Self> {
        let config: AllocatorConfig =
            toml::from_str(contents).map_err(|e| DividendError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_weights(mut self, weights: CategoryWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_accrual_basis(mut self, basis: AccrualBasis) -> Self {
        self.accrual_basis = basis;
        self
    }

    pub fn validate(&self) -> DividendResult<()> {
        validate_weights(&self.weights)?;
        if self.default_period_days <= 0 {
            return Err(DividendError::Config(format!(
                "default_period_days must be positive, got {}",
                self.default_period_days
            )));
        }
        if self.recent_distribution_limit == 0 {
            return Err(DividendError::Config(
                "recent_distribution_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Reject weights that are negative, non-finite, or do not sum to 1.0.
pub fn validate_weights(weights: &CategoryWeights) -> DividendResult<()> {
    let sum = weights.sum();
    let parts = [weights.marketing, weights.work_hours, weights.revenue];

    if parts.iter().any(|w| !w.is_finite()) {
        return Err(DividendError::InvalidWeightConfiguration {
            sum,
            reason: "weights must be finite".into(),
        });
    }
    if parts.iter().any(|w| *w < 0.0) {
        return Err(DividendError::InvalidWeightConfiguration {
            sum,
            reason: "weights must be non-negative".into(),
        });
    }
    if (sum - 1.0).abs() > WEIGHT_EPSILON {
        return Err(DividendError::InvalidWeightConfiguration {
            sum,
            reason: format!("weights must sum to 1.0 (±{:e})", WEIGHT_EPSILON),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AllocatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.accrual_basis, AccrualBasis::RunningTotals);
        assert_eq!(config.default_period_days, 30);
    }

    #[test]
    fn overweight_configuration_is_rejected() {
        let weights = CategoryWeights {
            marketing: 0.5,
            work_hours: 0.3,
            revenue: 0.3,
        };
        assert!(matches!(
            validate_weights(&weights),
            Err(DividendError::InvalidWeightConfiguration { .. })
        ));
    }

    #[test]
    fn negative_weight_is_rejected_even_when_sum_is_one() {
        let weights = CategoryWeights {
            marketing: 1.2,
            work_hours: -0.2,
            revenue: 0.0,
        };
        let err = validate_weights(&weights).unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn nan_weight_is_rejected() {
        let weights = CategoryWeights {
            marketing: f64::NAN,
            work_hours: 0.5,
            revenue: 0.5,
        };
        assert!(validate_weights(&weights).is_err());
    }

    #[test]
    fn parse_partial_toml_keeps_defaults() {
        let config = AllocatorConfig::from_toml_str("accrual_basis = \"period_scoped\"").unwrap();
        assert_eq!(config.accrual_basis, AccrualBasis::PeriodScoped);
        assert_eq!(config.weights, CategoryWeights::default());
        assert_eq!(config.recent_distribution_limit, 5);
    }

    #[test]
    fn parse_custom_weights() {
        let toml = r#"
            [weights]
            marketing = 0.5
            work_hours = 0.25
            revenue = 0.25
        "#;
        let config = AllocatorConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.weights.marketing, 0.5);
    }

    #[test]
    fn invalid_weights_in_toml_fail_validation() {
        let toml = r#"
            [weights]
            marketing = 0.5
            work_hours = 0.3
            revenue = 0.3
        "#;
        assert!(matches!(
            AllocatorConfig::from_toml_str(toml),
            Err(DividendError::InvalidWeightConfiguration { .. })
        ));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        assert!(matches!(
            AllocatorConfig::from_toml_str("accrual_basis = [1, 2"),
            Err(DividendError::Config(_))
        ));
        assert!(matches!(
            AllocatorConfig::from_toml_str("accrual_basis = \"weekly\""),
            Err(DividendError::Config(_))
        ));
    }

    #[test]
    fn zero_period_is_rejected() {
        let config = AllocatorConfig {
            default_period_days: 0,
            ..AllocatorConfig::default()
        };
        assert!(matches!(config.validate(), Err(DividendError::Config(_))));
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let config = AllocatorConfig::load("/nonexistent/path/dividend.toml").unwrap();
        assert_eq!(config, AllocatorConfig::default());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_period_days = 7").unwrap();
        writeln!(file, "recent_distribution_limit = 3").unwrap();

        let config = AllocatorConfig::load(file.path()).unwrap();
        assert_eq!(config.default_period_days, 7);
        assert_eq!(config.recent_distribution_limit, 3);
    }
}
