use bbd_types::{AssetClass, RegimeCalibrationMode};

/// Latent market state in the 4-regime Markov-switching model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegimeKind {
    Bull,
    Bear,
    Crash,
    Recovery,
}

impl RegimeKind {
    fn index(self) -> usize {
        match self {
            RegimeKind::Bull => 0,
            RegimeKind::Bear => 1,
            RegimeKind::Crash => 2,
            RegimeKind::Recovery => 3,
        }
    }

    fn from_index(i: usize) -> RegimeKind {
        match i {
            0 => RegimeKind::Bull,
            1 => RegimeKind::Bear,
            2 => RegimeKind::Crash,
            _ => RegimeKind::Recovery,
        }
    }
}

/// Row-stochastic 4x4 transition matrix, rows/cols ordered
/// `[bull, bear, crash, recovery]`. Each row sums to 1.
pub const TRANSITION_MATRIX: [[f64; 4]; 4] = [
    // from bull
    [0.92, 0.05, 0.01, 0.02],
    // from bear
    [0.15, 0.70, 0.10, 0.05],
    // from crash
    [0.05, 0.15, 0.50, 0.30],
    // from recovery
    [0.40, 0.10, 0.05, 0.45],
];

/// Samples the next regime from `TRANSITION_MATRIX[current]` using the
/// cumulative-sum-and-uniform method.
pub fn next_regime(current: RegimeKind, u: f64) -> RegimeKind {
    let row = &TRANSITION_MATRIX[current.index()];
    let mut cumulative = 0.0;
    for (i, p) in row.iter().enumerate() {
        cumulative += p;
        if u < cumulative {
            return RegimeKind::from_index(i);
        }
    }
    RegimeKind::from_index(row.len() - 1)
}

/// Per-asset-class mean/stddev for one regime, before survivorship drag.
#[derive(Debug, Clone, Copy)]
pub struct RegimeAssetParams {
    pub mean: f64,
    pub stddev: f64,
}

/// Historical-mode regime parameters by asset class, fitted loosely to
/// empirical regime periods (broad equity indices, single stocks,
/// investment-grade fixed income, commodities, and crypto).
fn historical_params(regime: RegimeKind, asset_class: AssetClass) -> RegimeAssetParams {
    use AssetClass::*;
    use RegimeKind::*;
    match (regime, asset_class) {
        (Bull, EquityIndex) => RegimeAssetParams { mean: 0.16, stddev: 0.11 },
        (Bull, EquityStock) => RegimeAssetParams { mean: 0.20, stddev: 0.22 },
        (Bull, FixedIncome) => RegimeAssetParams { mean: 0.04, stddev: 0.05 },
        (Bull, Commodity) => RegimeAssetParams { mean: 0.08, stddev: 0.18 },
        (Bull, Crypto) => RegimeAssetParams { mean: 0.45, stddev: 0.65 },

        (Bear, EquityIndex) => RegimeAssetParams { mean: -0.08, stddev: 0.18 },
        (Bear, EquityStock) => RegimeAssetParams { mean: -0.12, stddev: 0.32 },
        (Bear, FixedIncome) => RegimeAssetParams { mean: 0.02, stddev: 0.06 },
        (Bear, Commodity) => RegimeAssetParams { mean: -0.04, stddev: 0.22 },
        (Bear, Crypto) => RegimeAssetParams { mean: -0.30, stddev: 0.80 },

        (Crash, EquityIndex) => RegimeAssetParams { mean: -0.32, stddev: 0.30 },
        (Crash, EquityStock) => RegimeAssetParams { mean: -0.42, stddev: 0.48 },
        (Crash, FixedIncome) => RegimeAssetParams { mean: 0.01, stddev: 0.09 },
        (Crash, Commodity) => RegimeAssetParams { mean: -0.18, stddev: 0.35 },
        (Crash, Crypto) => RegimeAssetParams { mean: -0.65, stddev: 1.10 },

        (Recovery, EquityIndex) => RegimeAssetParams { mean: 0.24, stddev: 0.20 },
        (Recovery, EquityStock) => RegimeAssetParams { mean: 0.30, stddev: 0.35 },
        (Recovery, FixedIncome) => RegimeAssetParams { mean: 0.03, stddev: 0.06 },
        (Recovery, Commodity) => RegimeAssetParams { mean: 0.14, stddev: 0.26 },
        (Recovery, Crypto) => RegimeAssetParams { mean: 0.60, stddev: 0.90 },
    }
}

/// Regime parameters for the requested calibration mode. `conservative`
/// uniformly trims means, widens variances, and leans on heavier
/// survivorship drag (applied separately by `survivorship_drag`).
pub fn regime_params(
    regime: RegimeKind,
    asset_class: AssetClass,
    calibration: RegimeCalibrationMode,
) -> RegimeAssetParams {
    let base = historical_params(regime, asset_class);
    match calibration {
        RegimeCalibrationMode::Historical => base,
        RegimeCalibrationMode::Conservative => RegimeAssetParams {
            mean: base.mean * 0.85,
            stddev: base.stddev * 1.15,
        },
    }
}

/// Survivorship-bias drag subtracted from the regime mean, per asset
/// class. Broad indices carry a small drag; single stocks and crypto
/// carry a larger one. `conservative` calibration adds roughly half a
/// percentage point across the board.
pub fn survivorship_drag(asset_class: AssetClass, calibration: RegimeCalibrationMode) -> f64 {
    let base = match asset_class {
        AssetClass::EquityIndex => 0.001,
        AssetClass::EquityStock => 0.020,
        AssetClass::FixedIncome => 0.0005,
        AssetClass::Commodity => 0.003,
        AssetClass::Crypto => 0.030,
    };
    match calibration {
        RegimeCalibrationMode::Historical => base,
        RegimeCalibrationMode::Conservative => base + 0.005,
    }
}

/// Student-t degrees of freedom used for the fat-tail mixing term, per
/// asset class. Equity-like assets get heavier tails (lower dof); fixed
/// income gets lighter tails (higher dof).
pub fn fat_tail_degrees_of_freedom(asset_class: AssetClass) -> f64 {
    match asset_class {
        AssetClass::EquityIndex => 6.0,
        AssetClass::EquityStock => 5.0,
        AssetClass::FixedIncome => 12.0,
        AssetClass::Commodity => 6.0,
        AssetClass::Crypto => 4.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_rows_sum_to_one() {
        for row in TRANSITION_MATRIX.iter() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "row sum was {sum}");
        }
    }

    #[test]
    fn next_regime_picks_first_bucket_whose_cumulative_sum_exceeds_u() {
        // from bull: [0.92, 0.05, 0.01, 0.02]
        assert_eq!(next_regime(RegimeKind::Bull, 0.0), RegimeKind::Bull);
        assert_eq!(next_regime(RegimeKind::Bull, 0.93), RegimeKind::Bear);
        assert_eq!(next_regime(RegimeKind::Bull, 0.999), RegimeKind::Recovery);
    }

    #[test]
    fn conservative_calibration_reduces_mean_and_widens_stddev() {
        let h = regime_params(RegimeKind::Bull, AssetClass::EquityIndex, RegimeCalibrationMode::Historical);
        let c = regime_params(RegimeKind::Bull, AssetClass::EquityIndex, RegimeCalibrationMode::Conservative);
        assert!(c.mean < h.mean);
        assert!(c.stddev > h.stddev);
    }

    #[test]
    fn conservative_drag_exceeds_historical_drag() {
        let h = survivorship_drag(AssetClass::EquityStock, RegimeCalibrationMode::Historical);
        let c = survivorship_drag(AssetClass::EquityStock, RegimeCalibrationMode::Conservative);
        assert!(c > h);
    }
}
