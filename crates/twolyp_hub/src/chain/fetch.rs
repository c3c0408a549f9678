//! JSON-RPC client with rate limiting, retries, and response caching.

use crate::chain::cache::Cache;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
const RATE_LIMIT_MS: u64 = 200;
const MAX_RETRIES: u32 = 3;
const RETRY_BACKOFF_MS: u64 = 500;

#[derive(Clone, Debug)]
pub struct RpcConfig {
    pub rpc_url: String,
    pub rate_limit_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub offline: bool,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            rate_limit_ms: RATE_LIMIT_MS,
            max_retries: MAX_RETRIES,
            retry_backoff_ms: RETRY_BACKOFF_MS,
            offline: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("cache: {0}")]
    Cache(#[from] crate::chain::cache::CacheError),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("http status {0} body {1}")]
    Http(u16, String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("offline mode: no cached data for request")]
    OfflineMiss,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// JSON-RPC client with rate limiting and optional SQLite cache.
pub struct RpcClient {
    config: RpcConfig,
    client: Option<reqwest::Client>,
    cache: Option<Cache>,
    last_request: std::sync::Mutex<Option<OffsetDateTime>>,
    request_count: AtomicU64,
}

impl RpcClient {
    pub fn new(config: RpcConfig, cache: Option<Cache>) -> Result<Self, RpcError> {
        let client = if config.offline {
            None
        } else {
            Some(
                reqwest::Client::builder()
                    .use_rustls_tls()
                    .timeout(Duration::from_secs(30))
                    .build()?,
            )
        };
        if !config.offline {
            // Unpinned entries describe mutable state from an earlier session;
            // a live session must not replay them.
            if let Some(cache) = &cache {
                match cache.prune_unpinned() {
                    Ok(removed) if removed > 0 => {
                        debug!(removed, "pruned stale unpinned cache entries");
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "cache prune failed"),
                }
            }
        }
        Ok(Self {
            config,
            client,
            cache,
            last_request: std::sync::Mutex::new(None),
            request_count: AtomicU64::new(0),
        })
    }

    async fn rate_limit(&self) {
        let sleep_ms = {
            let last = self.last_request.lock().unwrap();
            let prev = *last;
            drop(last);
            if let Some(prev) = prev {
                let elapsed = (OffsetDateTime::now_utc() - prev).whole_milliseconds();
                let need: i128 = i128::from(self.config.rate_limit_ms);
                if elapsed < need {
                    (need - elapsed).max(0) as u64
                } else {
                    0
                }
            } else {
                0
            }
        };
        if sleep_ms > 0 {
            tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
        }
        *self.last_request.lock().unwrap() = Some(OffsetDateTime::now_utc());
    }

    /// Issue one JSON-RPC request, returning the `result` value.
    ///
    /// `pinned_block` marks the request as immutable chain history; only
    /// pinned requests may be served from cache while online. Unpinned
    /// requests query mutable state and always hit the network when a
    /// client is available; their responses are cached for offline replay.
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
        pinned_block: Option<u64>,
    ) -> Result<serde_json::Value, RpcError> {
        let normalized = serde_json::json!({ "method": method, "params": params });
        let cache_key = Cache::key_for(&normalized.to_string());

        if let Some(cache) = &self.cache {
            if self.config.offline || pinned_block.is_some() {
                if let Some(cached) = cache.get_json(&cache_key)? {
                    debug!(method, key = %cache_key, "cache hit");
                    return serde_json::from_str(&cached)
                        .map_err(|e| RpcError::Malformed(e.to_string()));
                }
            }
            if self.config.offline {
                return Err(RpcError::OfflineMiss);
            }
        }

        let client = self.client.as_ref().ok_or(RpcError::OfflineMiss)?;
        self.rate_limit().await;

        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let mut last_err = None;
        for attempt in 0..=self.config.max_retries {
            match client.post(&self.config.rpc_url).json(&body).send().await {
                Ok(res) => {
                    let status = res.status();
                    let text = res.text().await.unwrap_or_default();
                    if !status.is_success() {
                        last_err = Some(RpcError::Http(status.as_u16(), text));
                        if attempt < self.config.max_retries {
                            let ms = self.config.retry_backoff_ms * (1 << attempt);
                            tokio::time::sleep(Duration::from_millis(ms)).await;
                        }
                        continue;
                    }
                    let parsed: JsonRpcResponse = serde_json::from_str(&text)
                        .map_err(|e| RpcError::Malformed(e.to_string()))?;
                    if let Some(err) = parsed.error {
                        return Err(RpcError::Rpc {
                            code: err.code,
                            message: err.message,
                        });
                    }
                    let result = parsed
                        .result
                        .ok_or_else(|| RpcError::Malformed("missing result".to_string()))?;
                    self.request_count.fetch_add(1, Ordering::Relaxed);
                    if let Some(cache) = &self.cache {
                        let _ =
                            cache.set_json(&cache_key, method, pinned_block, &result.to_string());
                    }
                    return Ok(result);
                }
                Err(e) => {
                    last_err = Some(RpcError::Request(e));
                    if attempt < self.config.max_retries {
                        let ms = self.config.retry_backoff_ms * (1 << attempt);
                        warn!(method, attempt, ms, "retry after transport error");
                        tokio::time::sleep(Duration::from_millis(ms)).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or(RpcError::Malformed("no attempts made".to_string())))
    }

    fn result_as_hex(value: serde_json::Value) -> Result<String, RpcError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::Malformed("expected hex string result".to_string()))
    }

    /// `eth_call` against `to` with pre-encoded calldata; returns the raw hex
    /// result. With `Some(block)` the call is pinned to that block and may be
    /// replayed from cache; `None` reads `"latest"` and always goes to the
    /// network while online.
    pub async fn eth_call(
        &self,
        to: &str,
        data: &str,
        block: Option<u64>,
    ) -> Result<String, RpcError> {
        let tag = match block {
            Some(b) => format!("0x{b:x}"),
            None => "latest".to_string(),
        };
        let params = serde_json::json!([{ "to": to, "data": data }, tag]);
        let result = self.request("eth_call", params, block).await?;
        Self::result_as_hex(result)
    }

    /// Current block number. Never read from cache while online.
    pub async fn block_number(&self) -> Result<u64, RpcError> {
        let result = self
            .request("eth_blockNumber", serde_json::json!([]), None)
            .await?;
        let hex = Self::result_as_hex(result)?;
        parse_hex_u64(&hex)
    }

    /// Unix timestamp (seconds) of `block`.
    pub async fn block_timestamp(&self, block: u64) -> Result<i64, RpcError> {
        let params = serde_json::json!([format!("0x{block:x}"), false]);
        let result = self
            .request("eth_getBlockByNumber", params, Some(block))
            .await?;
        let ts = result
            .get("timestamp")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RpcError::Malformed("block missing timestamp".to_string()))?;
        parse_hex_u64(ts).map(|v| v as i64)
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }
}

fn parse_hex_u64(s: &str) -> Result<u64, RpcError> {
    let trimmed = s.trim().trim_start_matches("0x");
    u64::from_str_radix(trimmed, 16).map_err(|e| RpcError::Malformed(format!("hex u64: {e}")))
}
