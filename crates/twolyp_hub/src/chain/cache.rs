//! SQLite cache of raw RPC responses, keyed by content hash of the request.
//!
//! Two kinds of entries coexist. Block-pinned responses are immutable chain
//! history and live indefinitely; they may be replayed even while online.
//! Unpinned responses (`"latest"`-tagged reads, head block lookups) describe
//! mutable state and are only good for offline replay of the session that
//! wrote them, so an online session prunes them on startup before writing
//! its own.

use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Content-addressed store of JSON-RPC `result` payloads.
pub struct Cache {
    conn: Mutex<Connection>,
}

impl Cache {
    /// Open or create cache at `path`. Creates parent dirs if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS rpc_cache (
                key TEXT PRIMARY KEY,
                method TEXT NOT NULL,
                block INTEGER,
                value TEXT NOT NULL,
                created_utc INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_rpc_cache_block ON rpc_cache(block);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Compute content-hash key from a normalized request identifier (e.g. JSON string).
    pub fn key_for(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Cached JSON payload for `key`, or None.
    pub fn get_json(&self, key: &str) -> Result<Option<String>, CacheError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let mut stmt = conn.prepare("SELECT value FROM rpc_cache WHERE key = ?1")?;
        let row = stmt
            .query_row([key], |r| r.get::<_, String>(0))
            .optional()?;
        Ok(row)
    }

    /// Insert or replace the payload for `key`. `block` is the pinned block
    /// for immutable reads; `None` marks a latest-tagged response that only
    /// survives until the next online session.
    pub fn set_json(
        &self,
        key: &str,
        method: &str,
        block: Option<u64>,
        json: &str,
    ) -> Result<(), CacheError> {
        let created = time::OffsetDateTime::now_utc().unix_timestamp();
        let conn = self
            .conn
            .lock()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO rpc_cache (key, method, block, value, created_utc)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![key, method, block.map(|b| b as i64), json, created],
        )?;
        Ok(())
    }

    /// Drop unpinned entries left behind by earlier sessions. Returns the
    /// number of rows removed.
    pub fn prune_unpinned(&self) -> Result<usize, CacheError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let removed = conn.execute("DELETE FROM rpc_cache WHERE block IS NULL", [])?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn cache_key_deterministic() {
        let k1 = Cache::key_for(r#"{"method":"eth_call","to":"0xabc"}"#);
        let k2 = Cache::key_for(r#"{"method":"eth_call","to":"0xabc"}"#);
        assert_eq!(k1, k2);
        assert_eq!(k1.len(), 64);
    }

    #[test]
    fn cache_json_roundtrip() {
        let tmp = NamedTempFile::new().unwrap();
        let cache = Cache::open(tmp.path()).unwrap();
        let key = Cache::key_for("req1");
        let json = r#""0x0""#;
        cache.set_json(&key, "eth_call", Some(42), json).unwrap();
        assert_eq!(cache.get_json(&key).unwrap(), Some(json.to_string()));
        assert!(cache.get_json("nonexistent").unwrap().is_none());
    }

    #[test]
    fn set_replaces_existing_entry() {
        let tmp = NamedTempFile::new().unwrap();
        let cache = Cache::open(tmp.path()).unwrap();
        let key = Cache::key_for("req2");
        cache.set_json(&key, "eth_blockNumber", None, r#""0x01""#).unwrap();
        cache.set_json(&key, "eth_blockNumber", None, r#""0x02""#).unwrap();
        assert_eq!(cache.get_json(&key).unwrap(), Some(r#""0x02""#.to_string()));
    }

    #[test]
    fn prune_removes_only_unpinned_entries() {
        let tmp = NamedTempFile::new().unwrap();
        let cache = Cache::open(tmp.path()).unwrap();
        let pinned = Cache::key_for("pinned");
        let latest = Cache::key_for("latest");
        cache.set_json(&pinned, "eth_call", Some(100), r#""0xaa""#).unwrap();
        cache.set_json(&latest, "eth_call", None, r#""0xbb""#).unwrap();

        assert_eq!(cache.prune_unpinned().unwrap(), 1);
        assert_eq!(cache.get_json(&pinned).unwrap(), Some(r#""0xaa""#.to_string()));
        assert!(cache.get_json(&latest).unwrap().is_none());
    }
}
