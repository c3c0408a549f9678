//! Pure derivation of dashboard metrics from a raw snapshot plus history.
//!
//! Everything in this module is synchronous and side-effect free: the same
//! `ComputeInput` always yields the same `DerivedMetrics`.

pub(crate) mod distribution;
pub(crate) mod growth;
pub(crate) mod health;
pub(crate) mod holders;
mod model;
pub(crate) mod vesting;

pub use distribution::{Availability, Distribution, DistributionCategory, SupplyStatus};
pub use growth::{Direction, GrowthMetrics, GrowthPoint, GrowthRates, Momentum, Trend};
pub use health::{Adjustment, Breakpoint, ColorTier, HealthReport, HealthScore, ScoreRule};
pub use holders::{HolderCategory, HolderDistribution, RiskTier};
pub use model::EstimationModel;
pub use vesting::{VestingSummary, VestingTranche};

use crate::token::{RawSnapshot, SupplyHistory};
use serde::{Deserialize, Serialize};

/// Ratio with the divide-by-zero guard every aggregator shares: 0 when the
/// denominator is 0.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Percentage form of [`safe_ratio`].
pub fn safe_pct(numerator: f64, denominator: f64) -> f64 {
    safe_ratio(numerator, denominator) * 100.0
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ComputeInput {
    pub snapshot: RawSnapshot,
    pub history: SupplyHistory,
    pub model: EstimationModel,
}

/// Supply-level figures straight off the snapshot.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SupplyMetrics {
    pub total: f64,
    pub max: f64,
    pub remaining: f64,
    pub utilization_pct: f64,
    pub max_supply_reached: bool,
    /// False flags `total > max`; surfaced, never corrected.
    pub supply_integrity_ok: bool,
}

/// Everything the dashboard renders, recomputed per poll.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub supply: SupplyMetrics,
    pub distribution: Distribution,
    pub vesting: VestingSummary,
    pub holders: HolderDistribution,
    pub health: HealthReport,
    pub growth: GrowthMetrics,
}

/// Derive all metrics from one snapshot and the retained history.
pub fn compute_metrics(input: &ComputeInput) -> DerivedMetrics {
    let snapshot = &input.snapshot;
    let total = snapshot.total_supply.value_or_zero();
    let max = snapshot.max_supply.value_or_zero();

    let supply = SupplyMetrics {
        total,
        max,
        remaining: max - total,
        utilization_pct: safe_pct(total, max),
        max_supply_reached: max > 0.0 && max - total <= 0.0,
        supply_integrity_ok: snapshot.supply_integrity_ok(),
    };

    let distribution = distribution::aggregate(snapshot);
    let vesting = vesting::aggregate(snapshot, &distribution);
    let holders = holders::estimate(snapshot, &distribution, &input.model);
    let health = health::score(snapshot, &distribution, &vesting);
    let growth = growth::estimate(snapshot, &distribution, &input.history, &input.model);

    DerivedMetrics {
        supply,
        distribution,
        vesting,
        holders,
        health,
        growth,
    }
}
