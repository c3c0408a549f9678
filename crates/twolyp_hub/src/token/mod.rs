//! 2LYP contract specifics: named queries, typed snapshot, supply history.

pub(crate) mod contract;
mod history;
mod snapshot;

pub use contract::TokenReader;
pub use history::{SupplyHistory, SupplySample, HISTORY_CAPACITY};
pub use snapshot::{RawSnapshot, ReadState, WalletBalances, WalletRole};
