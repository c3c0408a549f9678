//! Growth and velocity estimation over the retained supply history, plus the
//! synthetic projection series anchored to the current snapshot.
//!
//! Everything here is deterministic: the modeled figures come from
//! `EstimationModel` constants, never from randomness.

use crate::compute::distribution::Distribution;
use crate::compute::model::EstimationModel;
use crate::token::{RawSnapshot, SupplyHistory};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

const HOUR_MS: i64 = 60 * 60 * 1000;

/// Synthetic series length in months.
const SERIES_PERIODS: usize = 6;

/// Sample windows for the point estimators.
const VELOCITY_SAMPLES: usize = 3;
const MOMENTUM_SAMPLES: usize = 5;
const VOLATILITY_SAMPLES: usize = 10;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GrowthRates {
    pub last_1h: f64,
    pub last_24h: f64,
    pub last_7d: f64,
    pub last_30d: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
    #[default]
    Neutral,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Momentum {
    /// Mean supply delta over the momentum window, token units per sample.
    pub value: f64,
    pub direction: Direction,
    /// "high" above 1000 tokens/sample, "medium" above 100, else "low".
    pub strength: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Trend {
    pub direction: String,
    pub strength: String,
    pub color: String,
}

/// One period of the synthetic projection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub period_label: String,
    pub supply: f64,
    pub circulating: f64,
    pub transactions: u64,
    pub holders: u64,
    pub volume: f64,
    pub growth_pct: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GrowthMetrics {
    /// Modeled projection, not a measurement.
    pub series: Vec<GrowthPoint>,
    pub rates: GrowthRates,
    /// Mean of consecutive supply deltas over the last 3 samples.
    pub velocity: f64,
    pub momentum: Momentum,
    /// Population standard deviation of per-step percentage changes.
    pub volatility: f64,
    pub is_stable: bool,
    pub trend: Trend,
    pub sample_count: usize,
}

pub fn estimate(
    snapshot: &RawSnapshot,
    distribution: &Distribution,
    history: &SupplyHistory,
    model: &EstimationModel,
) -> GrowthMetrics {
    let now_ms = snapshot.observed_at_ms;
    let rates = GrowthRates {
        last_1h: growth_rate(history, now_ms, HOUR_MS),
        last_24h: growth_rate(history, now_ms, 24 * HOUR_MS),
        last_7d: growth_rate(history, now_ms, 7 * 24 * HOUR_MS),
        last_30d: growth_rate(history, now_ms, 30 * 24 * HOUR_MS),
    };
    let volatility = volatility(history);

    GrowthMetrics {
        series: synthetic_series(snapshot, distribution, model),
        velocity: velocity(history),
        momentum: momentum(history),
        volatility,
        is_stable: volatility < 1.0,
        trend: trend(rates.last_24h),
        rates,
        sample_count: history.len(),
    }
}

/// Percentage change between the earliest and latest sample inside the window.
/// Returns 0 with fewer than two in-window samples or a zero base.
pub fn growth_rate(history: &SupplyHistory, now_ms: i64, window_ms: i64) -> f64 {
    let recent = history.within_window(now_ms, window_ms);
    if recent.len() < 2 {
        return 0.0;
    }
    let earliest = recent[0].supply;
    let latest = recent[recent.len() - 1].supply;
    if earliest == 0.0 {
        return 0.0;
    }
    (latest - earliest) / earliest * 100.0
}

fn consecutive_deltas(samples: &[&crate::token::SupplySample]) -> Vec<f64> {
    samples
        .windows(2)
        .map(|w| w[1].supply - w[0].supply)
        .collect()
}

/// Mean supply delta over the last three samples; 0 with fewer than three.
pub fn velocity(history: &SupplyHistory) -> f64 {
    let tail = history.tail(VELOCITY_SAMPLES);
    if tail.len() < VELOCITY_SAMPLES {
        return 0.0;
    }
    let deltas = consecutive_deltas(&tail);
    deltas.iter().sum::<f64>() / deltas.len() as f64
}

fn momentum(history: &SupplyHistory) -> Momentum {
    let tail = history.tail(MOMENTUM_SAMPLES);
    if tail.len() < MOMENTUM_SAMPLES {
        return Momentum::default();
    }
    let deltas = consecutive_deltas(&tail);
    let avg = deltas.iter().sum::<f64>() / deltas.len() as f64;
    let direction = if avg > 0.0 {
        Direction::Positive
    } else if avg < 0.0 {
        Direction::Negative
    } else {
        Direction::Neutral
    };
    let strength = if avg.abs() > 1_000.0 {
        "high"
    } else if avg.abs() > 100.0 {
        "medium"
    } else {
        "low"
    };
    Momentum {
        value: avg,
        direction,
        strength: strength.to_string(),
    }
}

/// Population standard deviation of per-step percentage changes over the last
/// ten samples; 0 with fewer than ten.
pub fn volatility(history: &SupplyHistory) -> f64 {
    let tail = history.tail(VOLATILITY_SAMPLES);
    if tail.len() < VOLATILITY_SAMPLES {
        return 0.0;
    }
    let changes: Vec<f64> = tail
        .windows(2)
        .filter(|w| w[0].supply != 0.0)
        .map(|w| (w[1].supply - w[0].supply) / w[0].supply * 100.0)
        .collect();
    if changes.is_empty() {
        return 0.0;
    }
    let mean = changes.iter().sum::<f64>() / changes.len() as f64;
    let variance =
        changes.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / changes.len() as f64;
    variance.sqrt()
}

fn trend(last_24h: f64) -> Trend {
    let (direction, strength, color) = if last_24h > 5.0 {
        ("up", "strong", "green")
    } else if last_24h > 1.0 {
        ("up", "moderate", "blue")
    } else if last_24h > -1.0 {
        ("stable", "steady", "gray")
    } else if last_24h > -5.0 {
        ("down", "moderate", "yellow")
    } else {
        ("down", "strong", "red")
    };
    Trend {
        direction: direction.to_string(),
        strength: strength.to_string(),
        color: color.to_string(),
    }
}

/// Six-period modeled progression from a historical base (a fixed fraction of
/// current supply) up to the current supply, labeled with the trailing month
/// abbreviations ending at the snapshot's observation time.
fn synthetic_series(
    snapshot: &RawSnapshot,
    distribution: &Distribution,
    model: &EstimationModel,
) -> Vec<GrowthPoint> {
    let current = snapshot.total_supply.value_or_zero();
    let base = current * model.historical_base_ratio;
    let labels = trailing_month_labels(snapshot.observed_at_ms, SERIES_PERIODS);

    (0..SERIES_PERIODS)
        .map(|i| {
            let progress = ((i + 1) as f64 / SERIES_PERIODS as f64).min(1.0);
            let supply = (base + (current - base) * progress).floor();
            let transactions = ((supply * model.transactions_per_token).floor() as u64).max(1);
            let holders = ((supply / model.tokens_per_holder).floor() as u64).max(1);
            let circulating = if i == SERIES_PERIODS - 1 {
                if distribution.circulating_supply > 0.0 {
                    distribution.circulating_supply
                } else {
                    current * model.fallback_circulating_ratio
                }
            } else {
                supply * 0.4
            };
            let volume = (circulating * model.daily_volume_ratio).floor();
            let growth_pct = if i > 0 && base > 0.0 {
                (supply - base) / base * 100.0
            } else {
                0.0
            };
            GrowthPoint {
                period_label: labels[i].clone(),
                supply,
                circulating,
                transactions,
                holders,
                volume,
                growth_pct,
            }
        })
        .collect()
}

/// Month abbreviations for the `periods` months ending at `anchor_ms`.
fn trailing_month_labels(anchor_ms: i64, periods: usize) -> Vec<String> {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let anchor = OffsetDateTime::from_unix_timestamp(anchor_ms / 1000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    let current = anchor.month() as usize - 1; // 0-based
    (0..periods)
        .map(|i| {
            let idx = (current + 12 - (periods - 1 - i)) % 12;
            MONTHS[idx].to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::distribution;
    use crate::token::{ReadState, SupplySample};

    fn sample(block: u64, ts_ms: i64, supply: f64) -> SupplySample {
        SupplySample {
            block,
            timestamp_ms: ts_ms,
            supply,
            circulating: supply * 0.5,
        }
    }

    fn history_of(samples: &[(u64, i64, f64)]) -> SupplyHistory {
        let mut h = SupplyHistory::new();
        for &(b, t, s) in samples {
            h.record(sample(b, t, s));
        }
        h
    }

    #[test]
    fn growth_rate_over_window() {
        let now = 100 * HOUR_MS;
        let h = history_of(&[
            (1, now - 20 * HOUR_MS, 1_000.0),
            (2, now - 10 * HOUR_MS, 1_100.0),
            (3, now - HOUR_MS, 1_200.0),
        ]);
        let r = growth_rate(&h, now, 24 * HOUR_MS);
        assert!((r - 20.0).abs() < 1e-9);
        // 1h window only contains the last sample.
        assert_eq!(growth_rate(&h, now, HOUR_MS + 1), 0.0);
    }

    #[test]
    fn growth_rate_single_sample_is_zero() {
        let h = history_of(&[(1, 1_000, 500.0)]);
        assert_eq!(growth_rate(&h, 2_000, HOUR_MS), 0.0);
    }

    #[test]
    fn growth_rate_zero_base_is_zero() {
        let h = history_of(&[(1, 1_000, 0.0), (2, 2_000, 100.0)]);
        assert_eq!(growth_rate(&h, 3_000, HOUR_MS), 0.0);
    }

    #[test]
    fn velocity_is_mean_of_deltas() {
        let h = history_of(&[(1, 1_000, 100.0), (2, 2_000, 130.0), (3, 3_000, 160.0)]);
        assert!((velocity(&h) - 30.0).abs() < 1e-9);
        let short = history_of(&[(1, 1_000, 100.0), (2, 2_000, 130.0)]);
        assert_eq!(velocity(&short), 0.0);
    }

    #[test]
    fn momentum_direction_and_strength() {
        let h = history_of(&[
            (1, 1_000, 100.0),
            (2, 2_000, 1_300.0),
            (3, 3_000, 2_500.0),
            (4, 4_000, 3_800.0),
            (5, 5_000, 5_000.0),
        ]);
        let m = momentum(&h);
        assert_eq!(m.direction, Direction::Positive);
        assert_eq!(m.strength, "high");
    }

    #[test]
    fn volatility_needs_ten_samples() {
        let mut points = vec![];
        for i in 0..9u64 {
            points.push((i, i as i64 * 1_000, 100.0 + i as f64));
        }
        assert_eq!(volatility(&history_of(&points)), 0.0);
    }

    #[test]
    fn volatility_of_steady_series_is_zero() {
        let mut points = vec![];
        for i in 0..10u64 {
            // Constant 10% growth per step: all pct changes equal, stdev 0.
            points.push((i, i as i64 * 1_000, 100.0 * 1.1f64.powi(i as i32)));
        }
        let v = volatility(&history_of(&points));
        assert!(v.abs() < 1e-9);
    }

    #[test]
    fn trend_tiers() {
        assert_eq!(trend(6.0).color, "green");
        assert_eq!(trend(2.0).color, "blue");
        assert_eq!(trend(0.0).color, "gray");
        assert_eq!(trend(-2.0).color, "yellow");
        assert_eq!(trend(-10.0).color, "red");
    }

    #[test]
    fn synthetic_series_is_anchored_and_deterministic() {
        let mut snap = RawSnapshot {
            total_supply: ReadState::Ready(1_000_000.0),
            observed_at_ms: 1_700_000_000_000,
            ..Default::default()
        };
        snap.wallets.team = ReadState::Ready(200_000.0);
        let dist = distribution::aggregate(&snap);
        let model = EstimationModel::default();
        let a = synthetic_series(&snap, &dist, &model);
        let b = synthetic_series(&snap, &dist, &model);
        assert_eq!(a.len(), SERIES_PERIODS);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        // Last period reaches current supply and measured circulating.
        assert_eq!(a[SERIES_PERIODS - 1].supply, 1_000_000.0);
        assert_eq!(a[SERIES_PERIODS - 1].circulating, 800_000.0);
        // First period sits above the historical base.
        assert!(a[0].supply > 700_000.0);
        assert!(a[0].supply < 1_000_000.0);
        assert_eq!(a[0].growth_pct, 0.0);
        assert!(a[1].growth_pct > 0.0);
    }

    #[test]
    fn trailing_month_labels_wrap_the_year() {
        // 2024-02-15 -> Sep Oct Nov Dec Jan Feb
        let anchor = OffsetDateTime::from_unix_timestamp(1_707_955_200).unwrap();
        let labels = trailing_month_labels(anchor.unix_timestamp() * 1000, 6);
        assert_eq!(labels, vec!["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
    }
}
