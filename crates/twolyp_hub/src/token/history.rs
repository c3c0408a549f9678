//! Bounded supply-sample history, the only state carried across recomputations.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum retained samples; oldest evicted on overflow.
pub const HISTORY_CAPACITY: usize = 50;

/// One timestamped supply observation, keyed by source block.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupplySample {
    pub block: u64,
    pub timestamp_ms: i64,
    pub supply: f64,
    pub circulating: f64,
}

/// Insertion-ordered ring of recent supply samples.
///
/// Recording a sample for a block already present replaces it in place, so a
/// re-poll within the same block does not consume capacity.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SupplyHistory {
    samples: VecDeque<SupplySample>,
}

impl SupplyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: SupplySample) {
        if let Some(existing) = self.samples.iter_mut().find(|s| s.block == sample.block) {
            *existing = sample;
            return;
        }
        self.samples.push_back(sample);
        while self.samples.len() > HISTORY_CAPACITY {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SupplySample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&SupplySample> {
        self.samples.back()
    }

    /// The trailing `n` samples in insertion order.
    pub fn tail(&self, n: usize) -> Vec<&SupplySample> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).collect()
    }

    /// Samples whose timestamp falls within the last `window_ms` before `now_ms`.
    pub fn within_window(&self, now_ms: i64, window_ms: i64) -> Vec<&SupplySample> {
        let start = now_ms - window_ms;
        self.samples
            .iter()
            .filter(|s| s.timestamp_ms >= start)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(block: u64, ts: i64, supply: f64) -> SupplySample {
        SupplySample {
            block,
            timestamp_ms: ts,
            supply,
            circulating: supply * 0.5,
        }
    }

    #[test]
    fn record_evicts_oldest_at_capacity() {
        let mut h = SupplyHistory::new();
        for i in 0..(HISTORY_CAPACITY as u64 + 10) {
            h.record(sample(i, i as i64 * 1000, 100.0 + i as f64));
        }
        assert_eq!(h.len(), HISTORY_CAPACITY);
        assert_eq!(h.iter().next().unwrap().block, 10);
        assert_eq!(h.latest().unwrap().block, HISTORY_CAPACITY as u64 + 9);
    }

    #[test]
    fn same_block_replaces_in_place() {
        let mut h = SupplyHistory::new();
        h.record(sample(1, 1000, 100.0));
        h.record(sample(2, 2000, 110.0));
        h.record(sample(1, 1500, 105.0));
        assert_eq!(h.len(), 2);
        assert_eq!(h.iter().next().unwrap().supply, 105.0);
    }

    #[test]
    fn window_filter() {
        let mut h = SupplyHistory::new();
        h.record(sample(1, 1_000, 100.0));
        h.record(sample(2, 50_000, 110.0));
        h.record(sample(3, 90_000, 120.0));
        let recent = h.within_window(100_000, 60_000);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].block, 2);
    }

    #[test]
    fn history_serde_roundtrip() {
        let mut h = SupplyHistory::new();
        h.record(sample(7, 7_000, 700.0));
        let json = serde_json::to_string(&h).unwrap();
        let back: SupplyHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.latest().unwrap().block, 7);
    }
}
