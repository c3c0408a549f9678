//! Vesting aggregator: ecosystem-wide allocation/vested/remaining summary.
//!
//! An approximation over wallet balances, not a ledger read of per-beneficiary
//! schedules — those are read directly from contract state where individual
//! entries are displayed.

use crate::compute::distribution::Distribution;
use crate::compute::safe_pct;
use crate::token::RawSnapshot;
use serde::{Deserialize, Serialize};

/// Fixed heuristic split of the allocation between the two vesting tracks.
const TEAM_TRANCHE_SHARE: f64 = 0.6;
const INVESTOR_TRANCHE_SHARE: f64 = 0.4;

/// Fallback when no wallets are configured: assume 40% of supply is vesting.
const FALLBACK_ALLOCATED_RATIO: f64 = 0.4;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VestingTranche {
    pub name: String,
    pub allocated: f64,
    pub vested: f64,
    pub remaining: f64,
    pub progress_pct: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VestingSummary {
    pub total_allocated: f64,
    pub total_vested: f64,
    pub total_remaining: f64,
    pub vesting_count: usize,
    pub progress_pct: f64,
    pub tranches: Vec<VestingTranche>,
}

pub fn aggregate(snapshot: &RawSnapshot, distribution: &Distribution) -> VestingSummary {
    let total_supply = snapshot.total_supply.value_or_zero();

    let total_allocated = if distribution.locked_supply > 0.0 {
        distribution.locked_supply
    } else {
        total_supply * FALLBACK_ALLOCATED_RATIO
    };

    let team_vested = snapshot.wallets.team.value_or_zero();
    let investor_vested = snapshot.wallets.investor.value_or_zero();
    let total_vested = team_vested + investor_vested;
    let total_remaining = (total_allocated - total_vested).max(0.0);

    let tranches = vec![
        tranche(
            "Team Vesting",
            total_allocated * TEAM_TRANCHE_SHARE,
            team_vested,
        ),
        tranche(
            "Investor Vesting",
            total_allocated * INVESTOR_TRANCHE_SHARE,
            investor_vested,
        ),
    ];

    VestingSummary {
        total_allocated,
        total_vested,
        total_remaining,
        vesting_count: snapshot.vesting_count(),
        progress_pct: safe_pct(total_vested, total_allocated),
        tranches,
    }
}

fn tranche(name: &'static str, allocated: f64, vested: f64) -> VestingTranche {
    VestingTranche {
        name: name.to_string(),
        allocated,
        vested,
        remaining: (allocated - vested).max(0.0),
        progress_pct: safe_pct(vested, allocated),
    }
}
