//! Named contract queries and one-pass snapshot collection.
//!
//! Selectors are the first four bytes of the keccak of each signature,
//! precomputed as constants. A failed individual read degrades that field to
//! `Pending`; a snapshot never aborts because one query errored.

use crate::chain::decode::{
    decode_address, decode_address_array, decode_bool, decode_uint, wei_to_tokens,
};
use crate::chain::fetch::{RpcClient, RpcError};
use crate::token::snapshot::{RawSnapshot, ReadState, WalletBalances, WalletRole};
use time::OffsetDateTime;
use tracing::{debug, warn};

// Selector constants, signature in the name.
const SEL_TOTAL_SUPPLY: &str = "0x18160ddd"; // totalSupply()
const SEL_MAX_SUPPLY: &str = "0x32cb6b0c"; // MAX_SUPPLY()
const SEL_TEAM_WALLET: &str = "0x59927044"; // teamWallet()
const SEL_INVESTOR_WALLET: &str = "0x79f049c9"; // investorWallet()
const SEL_AIRDROP_WALLET: &str = "0x0d8e0ca8"; // airdropWallet()
const SEL_TREASURY_WALLET: &str = "0x6f307dc3"; // treasuryWallet()
const SEL_CLIENT_WALLET: &str = "0x3c5a09f7"; // clientWallet()
const SEL_BALANCE_OF: &str = "0x70a08231"; // balanceOf(address)
const SEL_PAUSED: &str = "0x5c975abb"; // paused()
const SEL_TOKENOMICS_INITIALIZED: &str = "0x8c65c81f"; // tokenomicsInitialized()
const SEL_OWNER: &str = "0x8da5cb5b"; // owner()
const SEL_VESTING_ADDRESSES: &str = "0x3f4ba83a"; // getAllVestingAddresses()
const SEL_FAUCET_DRIP: &str = "0x8beb60b6"; // faucetDrip()
const SEL_FAUCET_COOLDOWN: &str = "0x7e0d9f14"; // faucetCoolDown()

/// How many inter-block gaps to sample for network health.
const BLOCK_INTERVAL_SAMPLES: u64 = 10;

/// Reader over the deployed 2LYP contract.
pub struct TokenReader<'a> {
    rpc: &'a RpcClient,
    contract: String,
}

impl<'a> TokenReader<'a> {
    pub fn new(rpc: &'a RpcClient, contract: impl Into<String>) -> Self {
        Self {
            rpc,
            contract: contract.into(),
        }
    }

    async fn call(&self, selector: &str, at: Option<u64>) -> Result<String, RpcError> {
        self.rpc.eth_call(&self.contract, selector, at).await
    }

    async fn call_balance_of(&self, address: &str, at: Option<u64>) -> Result<String, RpcError> {
        let arg = address.trim_start_matches("0x");
        let data = format!("{SEL_BALANCE_OF}{arg:0>64}");
        self.rpc.eth_call(&self.contract, &data, at).await
    }

    async fn read_tokens(&self, selector: &str, at: Option<u64>, what: &str) -> ReadState<f64> {
        match self.call(selector, at).await {
            Ok(hex) => match decode_uint(&hex) {
                Ok(wei) => ReadState::Ready(wei_to_tokens(wei)),
                Err(e) => {
                    warn!(what, error = %e, "undecodable uint read");
                    ReadState::Pending
                }
            },
            Err(e) => {
                warn!(what, error = %e, "read failed");
                ReadState::Pending
            }
        }
    }

    async fn read_bool(&self, selector: &str, at: Option<u64>, what: &str) -> ReadState<bool> {
        match self.call(selector, at).await {
            Ok(hex) => match decode_bool(&hex) {
                Ok(v) => ReadState::Ready(v),
                Err(e) => {
                    warn!(what, error = %e, "undecodable bool read");
                    ReadState::Pending
                }
            },
            Err(e) => {
                warn!(what, error = %e, "read failed");
                ReadState::Pending
            }
        }
    }

    async fn read_address(&self, selector: &str, at: Option<u64>, what: &str) -> ReadState<String> {
        match self.call(selector, at).await {
            Ok(hex) => match decode_address(&hex) {
                Ok(opt) => ReadState::from_option(opt),
                Err(e) => {
                    warn!(what, error = %e, "undecodable address read");
                    ReadState::Pending
                }
            },
            Err(e) => {
                warn!(what, error = %e, "read failed");
                ReadState::Pending
            }
        }
    }

    /// Balance of one wallet role: `Absent` role stays absent, a resolved
    /// address gets its `balanceOf` in token units.
    async fn role_balance(
        &self,
        role: WalletRole,
        address: &ReadState<String>,
        at: Option<u64>,
    ) -> ReadState<f64> {
        match address {
            ReadState::Absent => ReadState::Absent,
            ReadState::Pending => ReadState::Pending,
            ReadState::Ready(addr) => match self.call_balance_of(addr, at).await {
                Ok(hex) => match decode_uint(&hex) {
                    Ok(wei) => ReadState::Ready(wei_to_tokens(wei)),
                    Err(e) => {
                        warn!(role = role.label(), error = %e, "undecodable balance");
                        ReadState::Pending
                    }
                },
                Err(e) => {
                    warn!(role = role.label(), error = %e, "balance read failed");
                    ReadState::Pending
                }
            },
        }
    }

    /// Collect a full raw snapshot in one pass. The head block is resolved
    /// first and every contract read is pinned to it, so one snapshot is
    /// internally consistent and replayable from cache.
    pub async fn snapshot(&self) -> RawSnapshot {
        let (block_number, block_intervals_ms) = self.block_cadence().await;
        let at = block_number.ready().copied();

        let total_supply = self.read_tokens(SEL_TOTAL_SUPPLY, at, "totalSupply").await;
        let max_supply = self.read_tokens(SEL_MAX_SUPPLY, at, "MAX_SUPPLY").await;
        let paused = self.read_bool(SEL_PAUSED, at, "paused").await;
        let tokenomics_initialized = self
            .read_bool(SEL_TOKENOMICS_INITIALIZED, at, "tokenomicsInitialized")
            .await;
        let owner = self.read_address(SEL_OWNER, at, "owner").await;
        let faucet_drip = self.read_tokens(SEL_FAUCET_DRIP, at, "faucetDrip").await;
        let faucet_cooldown_secs = match self.call(SEL_FAUCET_COOLDOWN, at).await {
            Ok(hex) => match decode_uint(&hex) {
                Ok(v) => ReadState::Ready(v as u64),
                Err(e) => {
                    warn!(error = %e, "undecodable faucetCoolDown");
                    ReadState::Pending
                }
            },
            Err(e) => {
                warn!(error = %e, "faucetCoolDown read failed");
                ReadState::Pending
            }
        };

        let vesting_addresses = match self.call(SEL_VESTING_ADDRESSES, at).await {
            Ok(hex) => match decode_address_array(&hex) {
                Ok(addrs) => ReadState::Ready(addrs),
                Err(e) => {
                    warn!(error = %e, "undecodable vesting address list");
                    ReadState::Pending
                }
            },
            Err(e) => {
                warn!(error = %e, "getAllVestingAddresses failed");
                ReadState::Pending
            }
        };

        let mut wallets = WalletBalances::default();
        for (role, selector) in [
            (WalletRole::Team, SEL_TEAM_WALLET),
            (WalletRole::Investor, SEL_INVESTOR_WALLET),
            (WalletRole::Airdrop, SEL_AIRDROP_WALLET),
            (WalletRole::Treasury, SEL_TREASURY_WALLET),
            (WalletRole::Client, SEL_CLIENT_WALLET),
        ] {
            let address = self.read_address(selector, at, role.label()).await;
            let balance = self.role_balance(role, &address, at).await;
            wallets.set(role, balance);
        }

        debug!(
            pending = wallets.pending_roles().len(),
            "snapshot collected"
        );

        RawSnapshot {
            total_supply,
            max_supply,
            wallets,
            paused,
            tokenomics_initialized,
            owner,
            vesting_addresses,
            faucet_drip,
            faucet_cooldown_secs,
            block_number,
            block_intervals_ms,
            observed_at_ms: (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64,
        }
    }

    /// Current block number plus inter-block gaps over the trailing sample window.
    async fn block_cadence(&self) -> (ReadState<u64>, Vec<u64>) {
        let head = match self.rpc.block_number().await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "block number read failed");
                return (ReadState::Pending, vec![]);
            }
        };
        let first = head.saturating_sub(BLOCK_INTERVAL_SAMPLES);
        let mut timestamps = Vec::new();
        for block in first..=head {
            match self.rpc.block_timestamp(block).await {
                Ok(ts) => timestamps.push(ts),
                Err(e) => {
                    debug!(block, error = %e, "block timestamp unavailable");
                    break;
                }
            }
        }
        let intervals = timestamps
            .windows(2)
            .map(|w| (w[1] - w[0]).max(0) as u64 * 1000)
            .collect();
        (ReadState::Ready(head), intervals)
    }
}
