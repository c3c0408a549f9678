//! Documented assumptions behind every modeled (non-measured) figure.
//!
//! Holder counts, transaction counts, and the synthetic growth series are
//! estimates derived from supply, not chain measurements. The constants live
//! here so consumers can see exactly what was assumed, and tests can pin them.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EstimationModel {
    /// Average holding assumed per holder in the synthetic growth series.
    pub tokens_per_holder: f64,
    /// Divisor for the headline holder-count estimate.
    pub holder_estimate_divisor: f64,
    /// Transactions assumed per token of supply.
    pub transactions_per_token: f64,
    /// Fraction of circulating supply assumed traded per day.
    pub daily_volume_ratio: f64,
    /// Fraction of current supply treated as the historical base of the series.
    pub historical_base_ratio: f64,
    /// Circulating fraction assumed when no wallet data has resolved.
    pub fallback_circulating_ratio: f64,
    /// Average balance assumed for untracked small holders.
    pub small_holder_avg_tokens: f64,
}

impl Default for EstimationModel {
    fn default() -> Self {
        Self {
            tokens_per_holder: 2_500.0,
            holder_estimate_divisor: 2_000.0,
            transactions_per_token: 0.001,
            daily_volume_ratio: 0.02,
            historical_base_ratio: 0.7,
            fallback_circulating_ratio: 0.3,
            small_holder_avg_tokens: 200.0,
        }
    }
}
