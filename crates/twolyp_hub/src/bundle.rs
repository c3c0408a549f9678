//! Metrics bundle and SHA-256 reproducibility hash.
//!
//! A bundle packages the raw snapshot, the retained history, and the derived
//! metrics so that anyone can re-run the derivation and check the hash.

use crate::compute::DerivedMetrics;
use crate::token::{RawSnapshot, SupplySample};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Inputs plus derived outputs for one metrics run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsBundle {
    pub version: u32,
    /// Token contract address the snapshot was read from.
    pub contract: String,
    pub created_utc_rfc3339: String,
    pub snapshot: RawSnapshot,
    pub metrics: DerivedMetrics,
    /// History samples that fed the growth estimators, oldest first.
    pub history_samples: Vec<SupplySample>,
}

const BUNDLE_VERSION: u32 = 1;

impl MetricsBundle {
    pub fn new(
        contract: String,
        snapshot: RawSnapshot,
        metrics: DerivedMetrics,
        history_samples: Vec<SupplySample>,
    ) -> Self {
        let created_utc_rfc3339 = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| String::new());
        Self {
            version: BUNDLE_VERSION,
            contract,
            created_utc_rfc3339,
            snapshot,
            metrics,
            history_samples,
        }
    }

    /// Representative bundle with example figures, for demo reports.
    pub fn demo() -> Self {
        use crate::compute::{compute_metrics, ComputeInput};
        use crate::token::{ReadState, SupplySample};

        let mut input = ComputeInput::default();
        let snap = &mut input.snapshot;
        snap.total_supply = ReadState::Ready(1_000_000.0);
        snap.max_supply = ReadState::Ready(10_000_000.0);
        snap.wallets.team = ReadState::Ready(200_000.0);
        snap.wallets.investor = ReadState::Ready(150_000.0);
        snap.wallets.airdrop = ReadState::Ready(50_000.0);
        snap.wallets.treasury = ReadState::Ready(100_000.0);
        snap.wallets.client = ReadState::Ready(50_000.0);
        snap.paused = ReadState::Ready(false);
        snap.tokenomics_initialized = ReadState::Ready(true);
        snap.owner = ReadState::Ready("0x1111111111111111111111111111111111111111".to_string());
        snap.vesting_addresses = ReadState::Ready(vec![
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_string(),
            "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb".to_string(),
        ]);
        snap.faucet_drip = ReadState::Ready(100.0);
        snap.faucet_cooldown_secs = ReadState::Ready(86_400);
        snap.block_number = ReadState::Ready(4_210_000);
        snap.block_intervals_ms = vec![12_000, 12_000, 12_000, 12_000];
        snap.observed_at_ms = 1_700_000_000_000;

        for i in 0..10u64 {
            input.history.record(SupplySample {
                block: 4_209_991 + i,
                timestamp_ms: 1_699_920_000_000 + i as i64 * 8_000_000,
                supply: 910_000.0 + i as f64 * 10_000.0,
                circulating: 460_000.0 + i as f64 * 10_000.0,
            });
        }

        let metrics = compute_metrics(&input);
        let samples = input.history.iter().copied().collect();
        Self::new(
            "0x2222222222222222222222222222222222222222".to_string(),
            input.snapshot,
            metrics,
            samples,
        )
    }
}

/// Normalize JSON for hashing: sort keys and no whitespace.
pub fn normalize_for_hash(value: &serde_json::Value) -> Result<String, BundleError> {
    let sorted = sort_json_keys(value);
    Ok(serde_json::to_string(&sorted)?)
}

fn sort_json_keys(v: &serde_json::Value) -> serde_json::Value {
    match v {
        serde_json::Value::Object(m) => {
            let mut keys: Vec<_> = m.keys().collect();
            keys.sort();
            let out: std::collections::BTreeMap<String, serde_json::Value> = keys
                .into_iter()
                .map(|k| (k.clone(), sort_json_keys(&m[k])))
                .collect();
            serde_json::Value::Object(serde_json::Map::from_iter(out))
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(sort_json_keys).collect())
        }
        other => other.clone(),
    }
}

/// SHA-256 over the key-sorted, whitespace-free bundle JSON.
pub fn reproducibility_hash(bundle: &MetricsBundle) -> Result<String, BundleError> {
    let json = serde_json::to_value(bundle)?;
    let normalized = normalize_for_hash(&json)?;
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationResult {
    pub bundle_hash: String,
    pub expected_hash: Option<String>,
    pub matches: bool,
}

/// Check a bundle against the content of its companion .sha256 file.
pub fn verify_bundle_hash(
    bundle: &MetricsBundle,
    expected_hex: &str,
) -> Result<VerificationResult, BundleError> {
    let bundle_hash = reproducibility_hash(bundle)?;
    let expected = expected_hex.trim().to_lowercase();
    let matches = bundle_hash.to_lowercase() == expected;
    Ok(VerificationResult {
        bundle_hash,
        expected_hash: Some(expected),
        matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{compute_metrics, ComputeInput};
    use crate::token::ReadState;

    fn bundle() -> MetricsBundle {
        let mut input = ComputeInput::default();
        input.snapshot.total_supply = ReadState::Ready(1_000_000.0);
        input.snapshot.wallets.team = ReadState::Ready(200_000.0);
        let metrics = compute_metrics(&input);
        MetricsBundle::new(
            "0x00000000000000000000000000000000000002ff".to_string(),
            input.snapshot,
            metrics,
            vec![],
        )
    }

    #[test]
    fn normalize_deterministic() {
        let a = serde_json::json!({"z":1,"a":2});
        let b = serde_json::json!({"a":2,"z":1});
        let na = normalize_for_hash(&a).unwrap();
        let nb = normalize_for_hash(&b).unwrap();
        assert_eq!(na, nb);
    }

    #[test]
    fn hash_deterministic() {
        let b = bundle();
        let h1 = reproducibility_hash(&b).unwrap();
        let h2 = reproducibility_hash(&b).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn verify_round_trip() {
        let b = bundle();
        let hash = reproducibility_hash(&b).unwrap();
        let ok = verify_bundle_hash(&b, &format!("  {}\n", hash.to_uppercase())).unwrap();
        assert!(ok.matches);
        let bad = verify_bundle_hash(&b, "deadbeef").unwrap();
        assert!(!bad.matches);
    }

    #[test]
    fn bundle_survives_json_round_trip() {
        let b = bundle();
        let text = serde_json::to_string(&b).unwrap();
        let back: MetricsBundle = serde_json::from_str(&text).unwrap();
        assert_eq!(
            reproducibility_hash(&b).unwrap(),
            reproducibility_hash(&back).unwrap()
        );
    }
}
