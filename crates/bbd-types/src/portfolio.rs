use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Asset-class tag used to select survivorship-bias drag and fat-tail degrees
/// of freedom in the return generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    EquityStock,
    EquityIndex,
    FixedIncome,
    Commodity,
    Crypto,
}

/// A single position in the portfolio: a stable identifier, a target
/// weight, an asset-class tag, and its own historical annual-return series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub weight: f64,
    pub asset_class: AssetClass,
    /// Chronologically ordered annual simple returns, e.g. 0.1488 = +14.88%.
    pub historical_returns: Vec<f64>,
}

/// An ordered portfolio plus the correlation structure across its assets.
///
/// Asset order is stable for the lifetime of a run: it indexes both the
/// correlation matrix and every row the return generator produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub assets: Vec<Asset>,
    /// Square, symmetric, `assets.len() x assets.len()` correlation matrix.
    pub correlation: Vec<Vec<f64>>,
}

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;
const CORRELATION_TOLERANCE: f64 = 1e-9;
const MIN_HISTORY_LEN: usize = 5;

impl Portfolio {
    /// Validate the structural invariants a run requires before it begins.
    /// Returns the first violated invariant found; the core never attempts
    /// to repair an invalid portfolio.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.assets.is_empty() {
            return Err(ConfigurationError::EmptyPortfolio);
        }

        let weight_sum: f64 = self.assets.iter().map(|a| a.weight).sum();
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigurationError::WeightsDoNotSumToOne { actual: weight_sum });
        }

        for asset in &self.assets {
            if asset.historical_returns.len() < MIN_HISTORY_LEN {
                return Err(ConfigurationError::HistoryTooShort {
                    asset_id: asset.id.clone(),
                    len: asset.historical_returns.len(),
                });
            }
        }

        let n = self.assets.len();
        if self.correlation.len() != n || self.correlation.iter().any(|row| row.len() != n) {
            return Err(ConfigurationError::CorrelationMatrixWrongShape {
                rows: self.correlation.len(),
                cols: self.correlation.first().map(|r| r.len()).unwrap_or(0),
                expected: n,
            });
        }

        for i in 0..n {
            let diag = self.correlation[i][i];
            if (diag - 1.0).abs() > CORRELATION_TOLERANCE {
                return Err(ConfigurationError::CorrelationMatrixBadDiagonal { i, value: diag });
            }
            for j in 0..n {
                let value = self.correlation[i][j];
                if !(-1.0..=1.0).contains(&value) {
                    return Err(ConfigurationError::CorrelationEntryOutOfRange { i, j, value });
                }
                let transposed = self.correlation[j][i];
                if (value - transposed).abs() > CORRELATION_TOLERANCE {
                    return Err(ConfigurationError::CorrelationMatrixNotSymmetric {
                        i,
                        j,
                        a: value,
                        b: transposed,
                    });
                }
            }
        }

        Ok(())
    }

    /// Shortest historical series across all assets, `L = min_i L_i`.
    /// Callers validate the portfolio before relying on this.
    pub fn min_history_len(&self) -> usize {
        self.assets
            .iter()
            .map(|a| a.historical_returns.len())
            .min()
            .unwrap_or(0)
    }

    pub fn weights(&self) -> Vec<f64> {
        self.assets.iter().map(|a| a.weight).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str, weight: f64) -> Asset {
        Asset {
            id: id.to_string(),
            weight,
            asset_class: AssetClass::EquityIndex,
            historical_returns: vec![0.05, 0.07, -0.03, 0.12, 0.01],
        }
    }

    #[test]
    fn valid_portfolio_passes() {
        let p = Portfolio {
            assets: vec![asset("a", 0.6), asset("b", 0.4)],
            correlation: vec![vec![1.0, 0.3], vec![0.3, 1.0]],
        };
        assert!(p.validate().is_ok());
    }

    #[test]
    fn weights_must_sum_to_one() {
        let p = Portfolio {
            assets: vec![asset("a", 0.6), asset("b", 0.5)],
            correlation: vec![vec![1.0, 0.3], vec![0.3, 1.0]],
        };
        assert!(matches!(
            p.validate(),
            Err(ConfigurationError::WeightsDoNotSumToOne { .. })
        ));
    }

    #[test]
    fn history_too_short_is_rejected() {
        let mut a = asset("a", 1.0);
        a.historical_returns = vec![0.01, 0.02];
        let p = Portfolio {
            assets: vec![a],
            correlation: vec![vec![1.0]],
        };
        assert!(matches!(
            p.validate(),
            Err(ConfigurationError::HistoryTooShort { .. })
        ));
    }

    #[test]
    fn asymmetric_correlation_is_rejected() {
        let p = Portfolio {
            assets: vec![asset("a", 0.5), asset("b", 0.5)],
            correlation: vec![vec![1.0, 0.3], vec![0.4, 1.0]],
        };
        assert!(matches!(
            p.validate(),
            Err(ConfigurationError::CorrelationMatrixNotSymmetric { .. })
        ));
    }

    #[test]
    fn out_of_range_correlation_is_rejected() {
        let p = Portfolio {
            assets: vec![asset("a", 0.5), asset("b", 0.5)],
            correlation: vec![vec![1.0, 1.5], vec![1.5, 1.0]],
        };
        assert!(matches!(
            p.validate(),
            Err(ConfigurationError::CorrelationEntryOutOfRange { .. })
        ));
    }
}
