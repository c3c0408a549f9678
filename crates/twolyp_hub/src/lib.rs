//! twolyp_hub — derived on-chain metrics for the 2LYP token hub.
//!
//! Snapshots the deployed token contract over JSON-RPC and turns the raw reads
//! into the dashboard's summary metrics: supply distribution, vesting summary,
//! holder-distribution estimates, health scores, and growth figures.
//! Read-only; all derivation is pure and reproducible.

pub mod bundle;
pub mod chain;
pub mod compute;
pub mod report;
pub mod token;

pub use bundle::{reproducibility_hash, BundleError, MetricsBundle, VerificationResult};
pub use chain::{Cache, RpcClient, RpcConfig};
pub use compute::{compute_metrics, ComputeInput, DerivedMetrics, EstimationModel};
pub use report::ReportData;
pub use token::{RawSnapshot, ReadState, SupplyHistory, SupplySample, TokenReader, WalletRole};
