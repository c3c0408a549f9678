//! Heuristic health scoring: security, governance, network, ecosystem, overall.
//!
//! Every score is a `ScoreRule` application: base points plus condition deltas,
//! clamped to [0, 100], labeled through the rule's breakpoint table. Two tables
//! coexist: the four-tier Excellent/Good/Fair/Poor table and the stricter
//! three-tier Good/Moderate/Risk table used by the additive schemes.

use crate::compute::distribution::Distribution;
use crate::compute::safe_ratio;
use crate::compute::vesting::VestingSummary;
use crate::token::RawSnapshot;
use serde::{Deserialize, Serialize};

/// Expected inter-block time the network score is anchored to.
const EXPECTED_BLOCK_TIME_MS: f64 = 12_000.0;
const NETWORK_SCORE_FLOOR: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTier {
    Green,
    Blue,
    Yellow,
    Red,
}

#[derive(Clone, Copy, Debug)]
pub struct Breakpoint {
    pub min: u8,
    pub label: &'static str,
    pub color: ColorTier,
}

/// Four-tier table for measured/graded scores.
pub const FOUR_TIER: &[Breakpoint] = &[
    Breakpoint { min: 90, label: "Excellent", color: ColorTier::Green },
    Breakpoint { min: 75, label: "Good", color: ColorTier::Blue },
    Breakpoint { min: 50, label: "Fair", color: ColorTier::Yellow },
    Breakpoint { min: 0, label: "Poor", color: ColorTier::Red },
];

/// Three-tier table for the additive (penalty) schemes.
pub const THREE_TIER: &[Breakpoint] = &[
    Breakpoint { min: 85, label: "Good", color: ColorTier::Green },
    Breakpoint { min: 65, label: "Moderate", color: ColorTier::Yellow },
    Breakpoint { min: 0, label: "Risk", color: ColorTier::Red },
];

/// One named scoring scheme: base points plus a breakpoint table.
#[derive(Clone, Copy, Debug)]
pub struct ScoreRule {
    pub name: &'static str,
    pub base: i32,
    pub breakpoints: &'static [Breakpoint],
}

/// One condition's contribution to a score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Adjustment {
    pub reason: String,
    pub delta: i32,
    pub met: bool,
}

impl Adjustment {
    fn new(reason: impl Into<String>, delta: i32, met: bool) -> Self {
        Self {
            reason: reason.into(),
            delta,
            met,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: u8,
    pub label: String,
    pub color: Option<ColorTier>,
    pub factors: Vec<Adjustment>,
}

impl ScoreRule {
    pub fn apply(&self, factors: Vec<Adjustment>) -> HealthScore {
        let sum: i32 = factors.iter().filter(|a| a.met).map(|a| a.delta).sum();
        let score = (self.base + sum).clamp(0, 100) as u8;
        self.label_for(score, factors)
    }

    fn label_for(&self, score: u8, factors: Vec<Adjustment>) -> HealthScore {
        let bp = self
            .breakpoints
            .iter()
            .find(|b| score >= b.min)
            .unwrap_or(&self.breakpoints[self.breakpoints.len() - 1]);
        HealthScore {
            score,
            label: bp.label.to_string(),
            color: Some(bp.color),
            factors,
        }
    }
}

const SECURITY: ScoreRule = ScoreRule {
    name: "security",
    base: 100,
    breakpoints: THREE_TIER,
};

const GOVERNANCE: ScoreRule = ScoreRule {
    name: "governance",
    base: 100,
    breakpoints: THREE_TIER,
};

const NETWORK: ScoreRule = ScoreRule {
    name: "network",
    base: 0,
    breakpoints: FOUR_TIER,
};

const ECOSYSTEM: ScoreRule = ScoreRule {
    name: "ecosystem",
    base: 0,
    breakpoints: FOUR_TIER,
};

const OVERALL: ScoreRule = ScoreRule {
    name: "overall",
    base: 0,
    breakpoints: FOUR_TIER,
};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HealthReport {
    pub security: HealthScore,
    pub governance: HealthScore,
    pub network: HealthScore,
    pub ecosystem: HealthScore,
    /// Unweighted mean of security, network, and ecosystem.
    pub overall: HealthScore,
    pub avg_block_time_ms: f64,
}

pub fn score(
    snapshot: &RawSnapshot,
    distribution: &Distribution,
    vesting: &VestingSummary,
) -> HealthReport {
    let security = SECURITY.apply(security_factors(snapshot, vesting));
    let governance = GOVERNANCE.apply(governance_factors(snapshot));
    let (network, avg_block_time_ms) = network_score(&snapshot.block_intervals_ms);
    let ecosystem = ECOSYSTEM.apply(ecosystem_factors(snapshot, distribution));

    let mean = f64::from(
        u32::from(security.score) + u32::from(network.score) + u32::from(ecosystem.score),
    ) / 3.0;
    let overall = OVERALL.label_for(mean.round() as u8, vec![]);

    HealthReport {
        security,
        governance,
        network,
        ecosystem,
        overall,
        avg_block_time_ms,
    }
}

fn security_factors(snapshot: &RawSnapshot, vesting: &VestingSummary) -> Vec<Adjustment> {
    vec![
        Adjustment::new("owner unset", -30, snapshot.owner.is_absent()),
        Adjustment::new(
            "wallet roles incomplete",
            -10,
            !snapshot.wallets.all_configured(),
        ),
        Adjustment::new(
            "supply exceeds max",
            -30,
            !snapshot.supply_integrity_ok(),
        ),
        Adjustment::new(
            "tokenomics not initialized",
            -10,
            !snapshot.tokenomics_initialized.is_true(),
        ),
        Adjustment::new(
            "vested exceeds allocation",
            -5,
            vesting.total_vested > vesting.total_allocated,
        ),
        Adjustment::new("contract paused", -5, snapshot.paused.is_true()),
    ]
}

fn governance_factors(snapshot: &RawSnapshot) -> Vec<Adjustment> {
    vec![
        Adjustment::new("owner unset", -30, snapshot.owner.is_absent()),
        Adjustment::new(
            "tokenomics not initialized",
            -10,
            !snapshot.tokenomics_initialized.is_true(),
        ),
        Adjustment::new(
            "wallet roles incomplete",
            -10,
            !snapshot.wallets.all_configured(),
        ),
        Adjustment::new("contract paused", -5, snapshot.paused.is_true()),
    ]
}

/// Network health from measured block cadence: distance of the average
/// inter-block gap from the 12s baseline, clamped to [10, 100]. Fewer than two
/// interval samples score a provisional 100.
fn network_score(intervals_ms: &[u64]) -> (HealthScore, f64) {
    if intervals_ms.len() < 2 {
        return (
            NETWORK.label_for(100, vec![]),
            EXPECTED_BLOCK_TIME_MS,
        );
    }
    let avg =
        intervals_ms.iter().map(|&v| v as f64).sum::<f64>() / intervals_ms.len() as f64;
    let deviation = (avg - EXPECTED_BLOCK_TIME_MS).abs() / EXPECTED_BLOCK_TIME_MS;
    let raw = 100.0 - deviation * 100.0;
    let score = raw.clamp(f64::from(NETWORK_SCORE_FLOOR), 100.0).round() as u8;
    (NETWORK.label_for(score, vec![]), avg)
}

/// Graded build-up: supply utilization, circulating balance, vesting activity,
/// wallet diversity.
fn ecosystem_factors(snapshot: &RawSnapshot, distribution: &Distribution) -> Vec<Adjustment> {
    let total = snapshot.total_supply.value_or_zero();
    let max = snapshot.max_supply.value_or_zero();

    let utilization = safe_ratio(total, max);
    let utilization_pts = if utilization > 0.0 && utilization < 0.9 {
        (utilization * 30.0).min(30.0).round() as i32
    } else {
        0
    };

    let circ_ratio = safe_ratio(distribution.circulating_supply, total);
    let circulation_pts = if total <= 0.0 {
        0
    } else if (0.2..=0.8).contains(&circ_ratio) {
        25
    } else {
        (25.0 - (circ_ratio - 0.5).abs() * 50.0).max(0.0).round() as i32
    };

    let vesting_count = snapshot.vesting_count() as i32;
    let vesting_pts = (vesting_count * 5).min(25);

    let diversity_pts = (snapshot.wallets.nonzero_count() as i32 * 4).min(20);

    vec![
        Adjustment::new("supply utilization", utilization_pts, utilization_pts > 0),
        Adjustment::new("circulating balance", circulation_pts, circulation_pts > 0),
        Adjustment::new("vesting activity", vesting_pts, vesting_pts > 0),
        Adjustment::new("wallet diversity", diversity_pts, diversity_pts > 0),
    ]
}
