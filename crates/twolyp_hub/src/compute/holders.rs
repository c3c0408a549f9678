//! Holder distribution estimator: balance buckets, concentration, liquidity.
//!
//! Only the designated wallets are actually tracked; the small-holder long
//! tail is modeled from the untracked remainder (see `EstimationModel`).

use crate::compute::distribution::Distribution;
use crate::compute::model::EstimationModel;
use crate::compute::{safe_pct, safe_ratio};
use crate::token::RawSnapshot;
use serde::{Deserialize, Serialize};

/// Bucket thresholds in token units.
const WHALE_MIN: f64 = 100_000.0;
const LARGE_MIN: f64 = 10_000.0;
const MEDIUM_MIN: f64 = 1_000.0;

/// Floor for the modeled small-holder count and percentage.
const SMALL_HOLDER_MIN_COUNT: u64 = 50;
const SMALL_HOLDER_MIN_PCT: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Minimal,
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HolderCategory {
    pub name: String,
    pub count: u64,
    pub percentage_of_supply: f64,
    pub risk_tier: RiskTier,
    /// True when the figures are modeled rather than counted.
    pub estimated: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HolderDistribution {
    pub categories: Vec<HolderCategory>,
    /// Herfindahl-Hirschman index over tracked-wallet shares, scaled to 0-10000.
    pub concentration_index: f64,
    /// 10/30/60/90 tiers by the largest wallet's share of total supply.
    pub concentration_risk: u8,
    pub distribution_score: u8,
    /// Three fixed tiers by max tracked share: poor 30 / good 70 / excellent 90.
    pub distribution_health: u8,
    /// Four fixed tiers by circulating ratio.
    pub liquidity_score: u8,
    pub circulating_ratio_pct: f64,
    /// Modeled headline holder count.
    pub estimated_holders: u64,
}

pub fn estimate(
    snapshot: &RawSnapshot,
    distribution: &Distribution,
    model: &EstimationModel,
) -> HolderDistribution {
    let total = snapshot.total_supply.value_or_zero();
    let known: Vec<f64> = snapshot.wallets.known().iter().map(|(_, v)| *v).collect();
    let known_total: f64 = known.iter().sum();

    let bucket = |contains: &dyn Fn(f64) -> bool| -> (u64, f64) {
        let mut count = 0u64;
        let mut sum = 0.0;
        for &b in &known {
            if contains(b) {
                count += 1;
                sum += b;
            }
        }
        (count, sum)
    };

    // Whale strictly above 100k; large 10k..=100k inclusive; medium 1k..<10k.
    let (whale_count, whale_sum) = bucket(&|b| b > WHALE_MIN);
    let (large_count, large_sum) = bucket(&|b| (LARGE_MIN..=WHALE_MIN).contains(&b));
    let (medium_count, medium_sum) = bucket(&|b| b >= MEDIUM_MIN && b < LARGE_MIN);

    // Untracked long tail, assumed to hold `small_holder_avg_tokens` each.
    let untracked = (total - known_total).max(0.0);
    let small_count =
        ((untracked / model.small_holder_avg_tokens).floor() as u64).max(SMALL_HOLDER_MIN_COUNT);
    let known_pct = safe_pct(known_total, total);
    let small_pct = if total > 0.0 {
        (100.0 - known_pct).max(SMALL_HOLDER_MIN_PCT)
    } else {
        0.0
    };

    let categories = vec![
        HolderCategory {
            name: "Whales (>100K 2LYP)".to_string(),
            count: whale_count,
            percentage_of_supply: safe_pct(whale_sum, total),
            risk_tier: RiskTier::High,
            estimated: false,
        },
        HolderCategory {
            name: "Large (10K-100K 2LYP)".to_string(),
            count: large_count,
            percentage_of_supply: safe_pct(large_sum, total),
            risk_tier: RiskTier::Medium,
            estimated: false,
        },
        HolderCategory {
            name: "Medium (1K-10K 2LYP)".to_string(),
            count: medium_count,
            percentage_of_supply: safe_pct(medium_sum, total),
            risk_tier: RiskTier::Low,
            estimated: false,
        },
        HolderCategory {
            name: "Small (<1K 2LYP)".to_string(),
            count: small_count,
            percentage_of_supply: small_pct,
            risk_tier: RiskTier::Minimal,
            estimated: true,
        },
    ];

    let max_known = known.iter().copied().fold(0.0f64, f64::max);
    let max_share = safe_ratio(max_known, total);
    let concentration_risk: u8 = if known.is_empty() {
        0
    } else if max_share > 0.5 {
        90
    } else if max_share > 0.3 {
        60
    } else if max_share > 0.1 {
        30
    } else {
        10
    };

    let circulating_ratio = safe_ratio(distribution.circulating_supply, total);

    let estimated_holders = ((total / model.holder_estimate_divisor).floor() as u64)
        .max(snapshot.wallets.nonzero_count() as u64 * 2);

    HolderDistribution {
        categories,
        concentration_index: concentration_index(&known),
        concentration_risk,
        distribution_score: 100 - concentration_risk,
        distribution_health: distribution_health(&known, total),
        liquidity_score: liquidity_score(circulating_ratio, total),
        circulating_ratio_pct: circulating_ratio * 100.0,
        estimated_holders,
    }
}

/// HHI over tracked-wallet shares of tracked supply, scaled to 0-10000.
fn concentration_index(known: &[f64]) -> f64 {
    let tracked_total: f64 = known.iter().sum();
    if tracked_total == 0.0 {
        return 0.0;
    }
    let hhi: f64 = known
        .iter()
        .map(|&b| {
            let share = b / tracked_total;
            share * share
        })
        .sum();
    (hhi * 10_000.0).round()
}

/// Three fixed tiers, no interpolation: >50% single-wallet share is poor,
/// <30% is excellent, anything between is good.
fn distribution_health(known: &[f64], total: f64) -> u8 {
    if known.iter().all(|&b| b == 0.0) {
        return 0;
    }
    let max_share = safe_ratio(known.iter().copied().fold(0.0f64, f64::max), total);
    if max_share > 0.5 {
        30
    } else if max_share < 0.3 {
        90
    } else {
        70
    }
}

fn liquidity_score(circulating_ratio: f64, total: f64) -> u8 {
    if total == 0.0 {
        0
    } else if circulating_ratio > 0.7 {
        95
    } else if circulating_ratio > 0.5 {
        80
    } else if circulating_ratio > 0.3 {
        60
    } else {
        30
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::distribution;
    use crate::token::ReadState;

    fn snapshot(total: f64, balances: [f64; 5]) -> RawSnapshot {
        let [team, investor, airdrop, treasury, client] = balances;
        RawSnapshot {
            total_supply: ReadState::Ready(total),
            wallets: crate::token::WalletBalances {
                team: ReadState::Ready(team),
                investor: ReadState::Ready(investor),
                airdrop: ReadState::Ready(airdrop),
                treasury: ReadState::Ready(treasury),
                client: ReadState::Ready(client),
            },
            ..Default::default()
        }
    }

    fn estimate_for(snap: &RawSnapshot) -> HolderDistribution {
        let dist = distribution::aggregate(snap);
        estimate(snap, &dist, &EstimationModel::default())
    }

    #[test]
    fn buckets_by_threshold() {
        let snap = snapshot(
            1_000_000.0,
            [200_000.0, 50_000.0, 5_000.0, 500.0, 150_000.0],
        );
        let h = estimate_for(&snap);
        assert_eq!(h.categories[0].count, 2); // 200k, 150k
        assert_eq!(h.categories[1].count, 1); // 50k
        assert_eq!(h.categories[2].count, 1); // 5k
        assert!((h.categories[0].percentage_of_supply - 35.0).abs() < 1e-9);
    }

    #[test]
    fn small_holders_are_modeled_from_remainder() {
        let snap = snapshot(1_000_000.0, [200_000.0, 0.0, 0.0, 0.0, 0.0]);
        let h = estimate_for(&snap);
        let small = &h.categories[3];
        assert!(small.estimated);
        // (1,000,000 - 200,000) / 200 = 4,000
        assert_eq!(small.count, 4_000);
        assert!((small.percentage_of_supply - 80.0).abs() < 1e-9);
    }

    #[test]
    fn small_holder_count_floors_at_fifty() {
        let snap = snapshot(1_000.0, [999.0, 0.0, 0.0, 0.0, 0.0]);
        let h = estimate_for(&snap);
        assert_eq!(h.categories[3].count, 50);
    }

    #[test]
    fn single_wallet_hhi_is_maximal() {
        let snap = snapshot(1_000_000.0, [500_000.0, 0.0, 0.0, 0.0, 0.0]);
        let dist = distribution::aggregate(&snap);
        // Zero balances contribute zero share; one wallet holds all tracked supply.
        let h = estimate(&snap, &dist, &EstimationModel::default());
        assert_eq!(h.concentration_index, 10_000.0);
    }

    #[test]
    fn even_split_hhi() {
        let known = [100.0, 100.0, 100.0, 100.0];
        assert_eq!(concentration_index(&known), 2_500.0);
    }

    #[test]
    fn distribution_health_tiers() {
        assert_eq!(distribution_health(&[600.0], 1_000.0), 30);
        assert_eq!(distribution_health(&[100.0, 100.0], 1_000.0), 90);
        assert_eq!(distribution_health(&[400.0], 1_000.0), 70);
        assert_eq!(distribution_health(&[0.0], 1_000.0), 0);
    }

    #[test]
    fn zero_supply_guards_all_percentages() {
        let snap = snapshot(0.0, [0.0, 0.0, 0.0, 0.0, 0.0]);
        let h = estimate_for(&snap);
        for cat in &h.categories {
            assert_eq!(cat.percentage_of_supply, 0.0);
        }
        assert_eq!(h.liquidity_score, 0);
        assert_eq!(h.circulating_ratio_pct, 0.0);
    }

    #[test]
    fn concentration_risk_tiers() {
        let high = snapshot(1_000.0, [600.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(estimate_for(&high).concentration_risk, 90);
        let low = snapshot(1_000.0, [50.0, 50.0, 0.0, 0.0, 0.0]);
        assert_eq!(estimate_for(&low).concentration_risk, 10);
        assert_eq!(estimate_for(&low).distribution_score, 90);
    }

    #[test]
    fn holder_count_estimate() {
        let snap = snapshot(1_000_000.0, [200_000.0, 100_000.0, 0.0, 0.0, 0.0]);
        let h = estimate_for(&snap);
        // 1,000,000 / 2,000 = 500, well above 2 nonzero wallets * 2.
        assert_eq!(h.estimated_holders, 500);
    }
}
