//! Distribution aggregator: locked, distributed, and circulating supply plus
//! the six fixed display categories.

use crate::compute::safe_pct;
use crate::token::{RawSnapshot, ReadState, WalletRole};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyStatus {
    Locked,
    Circulating,
}

/// Whether a category's backing read has resolved. `Absent` renders "Not set",
/// `Pending` a loading placeholder; both contribute 0 to the arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Ready,
    Pending,
    Absent,
}

impl<T> From<&ReadState<T>> for Availability {
    fn from(state: &ReadState<T>) -> Self {
        match state {
            ReadState::Ready(_) => Availability::Ready,
            ReadState::Pending => Availability::Pending,
            ReadState::Absent => Availability::Absent,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistributionCategory {
    pub name: String,
    pub value: f64,
    pub percentage: f64,
    pub status: SupplyStatus,
    pub availability: Availability,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Distribution {
    pub total_supply: f64,
    /// Team + investor + treasury; non-circulating by convention.
    pub locked_supply: f64,
    /// Sum of all five designated wallets.
    pub distributed_supply: f64,
    /// Total minus locked. Kept signed; see `circulating_negative`.
    pub circulating_supply: f64,
    /// Raised when designated wallets exceed total supply — an upstream data
    /// inconsistency worth surfacing, not clamping.
    pub circulating_negative: bool,
    pub categories: Vec<DistributionCategory>,
    pub pending_roles: Vec<WalletRole>,
}

/// Combine wallet balances with total supply. Absence degrades to zero; there
/// is no failure path.
pub fn aggregate(snapshot: &RawSnapshot) -> Distribution {
    let total = snapshot.total_supply.value_or_zero();
    let w = &snapshot.wallets;

    let team = w.team.value_or_zero();
    let investor = w.investor.value_or_zero();
    let airdrop = w.airdrop.value_or_zero();
    let treasury = w.treasury.value_or_zero();
    let client = w.client.value_or_zero();

    let locked = team + investor + treasury;
    let distributed = team + investor + airdrop + treasury + client;
    let circulating = total - locked;

    let categories = vec![
        category("Team & Founders", team, total, SupplyStatus::Locked, &w.team),
        category("Investors", investor, total, SupplyStatus::Locked, &w.investor),
        category(
            "Community & Airdrop",
            airdrop,
            total,
            SupplyStatus::Circulating,
            &w.airdrop,
        ),
        category("Treasury", treasury, total, SupplyStatus::Locked, &w.treasury),
        category(
            "Client Allocation",
            client,
            total,
            SupplyStatus::Circulating,
            &w.client,
        ),
        DistributionCategory {
            name: "Public Circulating".to_string(),
            value: circulating,
            percentage: safe_pct(circulating, total),
            status: SupplyStatus::Circulating,
            availability: Availability::Ready,
        },
    ];

    Distribution {
        total_supply: total,
        locked_supply: locked,
        distributed_supply: distributed,
        circulating_supply: circulating,
        circulating_negative: circulating < 0.0,
        categories,
        pending_roles: w.pending_roles(),
    }
}

fn category(
    name: &'static str,
    value: f64,
    total: f64,
    status: SupplyStatus,
    state: &ReadState<f64>,
) -> DistributionCategory {
    DistributionCategory {
        name: name.to_string(),
        value,
        percentage: safe_pct(value, total),
        status,
        availability: Availability::from(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::WalletBalances;

    fn snapshot(total: f64, balances: [f64; 5]) -> RawSnapshot {
        let [team, investor, airdrop, treasury, client] = balances;
        RawSnapshot {
            total_supply: ReadState::Ready(total),
            wallets: WalletBalances {
                team: ReadState::Ready(team),
                investor: ReadState::Ready(investor),
                airdrop: ReadState::Ready(airdrop),
                treasury: ReadState::Ready(treasury),
                client: ReadState::Ready(client),
            },
            ..Default::default()
        }
    }

    #[test]
    fn locked_distributed_circulating() {
        let d = aggregate(&snapshot(
            1_000_000.0,
            [200_000.0, 150_000.0, 50_000.0, 100_000.0, 50_000.0],
        ));
        assert_eq!(d.locked_supply, 450_000.0);
        assert_eq!(d.distributed_supply, 550_000.0);
        assert_eq!(d.circulating_supply, 550_000.0);
        assert!(!d.circulating_negative);
    }

    #[test]
    fn conservation_of_supply() {
        let d = aggregate(&snapshot(
            1_000_000.0,
            [200_000.0, 150_000.0, 50_000.0, 100_000.0, 50_000.0],
        ));
        // Circulating is defined as total minus locked, so locked plus
        // circulating reconstructs the total exactly.
        let sum = d.locked_supply + d.circulating_supply;
        assert!((sum - d.total_supply).abs() / d.total_supply < 1e-9);
        // Airdrop and client balances are not locked; they sit inside
        // circulating as a tracked subset.
        let airdrop_client = 50_000.0 + 50_000.0;
        assert_eq!(d.distributed_supply - d.locked_supply, airdrop_client);
        assert!(airdrop_client <= d.circulating_supply);
    }

    #[test]
    fn six_categories_in_fixed_order() {
        let d = aggregate(&snapshot(100.0, [1.0, 2.0, 3.0, 4.0, 5.0]));
        let names: Vec<_> = d.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Team & Founders",
                "Investors",
                "Community & Airdrop",
                "Treasury",
                "Client Allocation",
                "Public Circulating"
            ]
        );
        assert_eq!(d.categories[0].status, SupplyStatus::Locked);
        assert_eq!(d.categories[5].status, SupplyStatus::Circulating);
    }

    #[test]
    fn zero_total_supply_has_zero_percentages() {
        let d = aggregate(&snapshot(0.0, [10.0, 0.0, 0.0, 0.0, 0.0]));
        for cat in &d.categories {
            assert_eq!(cat.percentage, 0.0);
        }
    }

    #[test]
    fn negative_circulating_is_flagged_not_clamped() {
        let d = aggregate(&snapshot(100.0, [80.0, 80.0, 0.0, 0.0, 0.0]));
        assert_eq!(d.circulating_supply, -60.0);
        assert!(d.circulating_negative);
    }

    #[test]
    fn pending_wallet_counts_as_zero_but_is_reported() {
        let mut snap = snapshot(1_000.0, [100.0, 0.0, 0.0, 0.0, 0.0]);
        snap.wallets.treasury = ReadState::Pending;
        snap.wallets.client = ReadState::Absent;
        let d = aggregate(&snap);
        assert_eq!(d.locked_supply, 100.0);
        assert_eq!(d.pending_roles, vec![WalletRole::Treasury]);
        assert_eq!(d.categories[3].availability, Availability::Pending);
        assert_eq!(d.categories[4].availability, Availability::Absent);
    }
}
