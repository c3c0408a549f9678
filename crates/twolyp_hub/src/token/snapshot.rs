//! Raw snapshot value objects: read states, wallet roles, per-poll contract state.
//!
//! A snapshot is recomputed wholesale on every poll; the aggregators must
//! tolerate any mix of pending and resolved fields and stay idempotent over
//! identical snapshots.

use serde::{Deserialize, Serialize};

/// State of one named contract read.
///
/// `Pending` — the read has not resolved (or resolved with an error upstream).
/// `Absent` — the read resolved but the contract has no value (e.g. a wallet
/// role left at the zero address). `Ready` — a usable value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ReadState<T> {
    #[default]
    Pending,
    Absent,
    Ready(T),
}

impl<T> ReadState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, ReadState::Pending)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ReadState::Absent)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ReadState::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ReadState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn from_option(opt: Option<T>) -> Self {
        match opt {
            Some(v) => ReadState::Ready(v),
            None => ReadState::Absent,
        }
    }
}

impl ReadState<f64> {
    /// Arithmetic default: pending/absent degrade to zero, never error.
    pub fn value_or_zero(&self) -> f64 {
        match self {
            ReadState::Ready(v) => *v,
            _ => 0.0,
        }
    }
}

impl ReadState<bool> {
    pub fn is_true(&self) -> bool {
        matches!(self, ReadState::Ready(true))
    }
}

/// The five designated wallet roles, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletRole {
    Team,
    Investor,
    Airdrop,
    Treasury,
    Client,
}

impl WalletRole {
    pub const ALL: [WalletRole; 5] = [
        WalletRole::Team,
        WalletRole::Investor,
        WalletRole::Airdrop,
        WalletRole::Treasury,
        WalletRole::Client,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WalletRole::Team => "team",
            WalletRole::Investor => "investor",
            WalletRole::Airdrop => "airdrop",
            WalletRole::Treasury => "treasury",
            WalletRole::Client => "client",
        }
    }
}

/// Per-role token balances in decimal token units.
///
/// A role whose address was never configured is `Absent`; a role whose
/// balance read has not resolved is `Pending`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WalletBalances {
    pub team: ReadState<f64>,
    pub investor: ReadState<f64>,
    pub airdrop: ReadState<f64>,
    pub treasury: ReadState<f64>,
    pub client: ReadState<f64>,
}

impl WalletBalances {
    pub fn get(&self, role: WalletRole) -> &ReadState<f64> {
        match role {
            WalletRole::Team => &self.team,
            WalletRole::Investor => &self.investor,
            WalletRole::Airdrop => &self.airdrop,
            WalletRole::Treasury => &self.treasury,
            WalletRole::Client => &self.client,
        }
    }

    pub fn set(&mut self, role: WalletRole, state: ReadState<f64>) {
        match role {
            WalletRole::Team => self.team = state,
            WalletRole::Investor => self.investor = state,
            WalletRole::Airdrop => self.airdrop = state,
            WalletRole::Treasury => self.treasury = state,
            WalletRole::Client => self.client = state,
        }
    }

    /// Resolved balances only, in role order.
    pub fn known(&self) -> Vec<(WalletRole, f64)> {
        WalletRole::ALL
            .iter()
            .filter_map(|&r| self.get(r).ready().map(|&v| (r, v)))
            .collect()
    }

    /// Sum of resolved balances; pending/absent count as zero.
    pub fn known_total(&self) -> f64 {
        WalletRole::ALL
            .iter()
            .map(|&r| self.get(r).value_or_zero())
            .sum()
    }

    /// True when every role has a configured address (no `Absent` entries).
    pub fn all_configured(&self) -> bool {
        WalletRole::ALL.iter().all(|&r| !self.get(r).is_absent())
    }

    /// Roles whose balance read has not resolved yet.
    pub fn pending_roles(&self) -> Vec<WalletRole> {
        WalletRole::ALL
            .iter()
            .copied()
            .filter(|&r| self.get(r).is_pending())
            .collect()
    }

    /// Count of roles holding a nonzero resolved balance.
    pub fn nonzero_count(&self) -> usize {
        self.known().iter().filter(|(_, v)| *v > 0.0).count()
    }
}

/// One poll's worth of raw contract reads, in decimal token units.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub total_supply: ReadState<f64>,
    pub max_supply: ReadState<f64>,
    pub wallets: WalletBalances,
    pub paused: ReadState<bool>,
    pub tokenomics_initialized: ReadState<bool>,
    /// Contract owner; `Absent` when ownership is renounced / zero address.
    pub owner: ReadState<String>,
    pub vesting_addresses: ReadState<Vec<String>>,
    /// Faucet parameters (token units / seconds), display-only.
    pub faucet_drip: ReadState<f64>,
    pub faucet_cooldown_secs: ReadState<u64>,
    pub block_number: ReadState<u64>,
    /// Most recent inter-block arrival gaps in milliseconds (at most 10).
    pub block_intervals_ms: Vec<u64>,
    /// Wall-clock time the snapshot was taken, Unix milliseconds.
    pub observed_at_ms: i64,
}

impl RawSnapshot {
    pub fn vesting_count(&self) -> usize {
        self.vesting_addresses.ready().map_or(0, Vec::len)
    }

    /// Supply integrity: total must not exceed max. Unknown inputs pass.
    pub fn supply_integrity_ok(&self) -> bool {
        match (self.total_supply.ready(), self.max_supply.ready()) {
            (Some(total), Some(max)) => total <= max,
            _ => true,
        }
    }
}
