use bbd_types::EstateAnalysis;

/// Inputs to the BBD-vs-Sell net-estate comparison. All values are drawn
/// from the same representative (median, rank-selected) path so the two
/// strategies are compared against identical market returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstateInputs {
    pub bbd_median_terminal_value: f64,
    pub bbd_median_loan_balance: f64,
    pub sell_terminal_value: f64,
    /// Cost basis as a fraction of terminal value. Default 0.4.
    pub cost_basis_ratio: f64,
    pub capital_gains_tax_rate: f64,
}

/// Builds the estate-analysis record: BBD's net estate (terminal value
/// minus outstanding loan, since death erases the embedded gain via
/// stepped-up basis), the Sell side's net estate (no loan, but every sale
/// along the way already paid capital-gains tax), and their difference.
/// Positive `bbd_advantage` means BBD wins; a large loan balance can invert
/// the sign.
pub fn estate_analysis(inputs: EstateInputs) -> EstateAnalysis {
    let bbd_net_estate = inputs.bbd_median_terminal_value - inputs.bbd_median_loan_balance;
    let sell_net_estate = inputs.sell_terminal_value;

    let embedded_capital_gains =
        (inputs.bbd_median_terminal_value - inputs.bbd_median_terminal_value * inputs.cost_basis_ratio).max(0.0);
    let stepped_up_basis_savings = embedded_capital_gains * inputs.capital_gains_tax_rate;

    EstateAnalysis {
        bbd_net_estate,
        sell_net_estate,
        bbd_advantage: bbd_net_estate - sell_net_estate,
        embedded_capital_gains,
        stepped_up_basis_savings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bbd_advantage_is_positive_when_bbd_net_estate_is_larger() {
        let result = estate_analysis(EstateInputs {
            bbd_median_terminal_value: 2_000_000.0,
            bbd_median_loan_balance: 300_000.0,
            sell_terminal_value: 1_200_000.0,
            cost_basis_ratio: 0.4,
            capital_gains_tax_rate: 0.238,
        });
        assert_relative_eq!(result.bbd_net_estate, 1_700_000.0);
        assert!(result.bbd_advantage > 0.0);
    }

    #[test]
    fn large_loan_can_invert_the_sign() {
        let result = estate_analysis(EstateInputs {
            bbd_median_terminal_value: 1_000_000.0,
            bbd_median_loan_balance: 900_000.0,
            sell_terminal_value: 1_200_000.0,
            cost_basis_ratio: 0.4,
            capital_gains_tax_rate: 0.238,
        });
        assert!(result.bbd_advantage < 0.0);
    }

    #[test]
    fn embedded_gains_floor_at_zero() {
        let result = estate_analysis(EstateInputs {
            bbd_median_terminal_value: 500_000.0,
            bbd_median_loan_balance: 0.0,
            sell_terminal_value: 500_000.0,
            cost_basis_ratio: 1.2,
            capital_gains_tax_rate: 0.238,
        });
        assert_eq!(result.embedded_capital_gains, 0.0);
        assert_eq!(result.stepped_up_basis_savings, 0.0);
    }
}
