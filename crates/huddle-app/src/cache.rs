// SQLite cache in front of a player lookup.
//
// Answers are stored as JSON keyed by normalised player name with the time
// they were fetched. Entries older than `max_age` are refetched; "not found"
// answers are never stored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use huddle_core::{PlayerAttributes, PlayerLookup};

use crate::roster::normalize_name;

pub struct SqliteLookupCache {
    conn: Mutex<Connection>,
    inner: Arc<dyn PlayerLookup>,
    max_age: chrono::Duration,
}

impl SqliteLookupCache {
    /// Open (or create) the cache database at `path`. Pass `":memory:"` for
    /// an ephemeral cache.
    pub fn open(path: &str, inner: Arc<dyn PlayerLookup>, max_age_days: u32) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open lookup cache at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;

             CREATE TABLE IF NOT EXISTS player_cache (
                 name_key   TEXT PRIMARY KEY,
                 attributes TEXT NOT NULL,
                 fetched_at TEXT NOT NULL
             );",
        )
        .context("failed to create lookup cache schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
            inner,
            max_age: chrono::Duration::days(i64::from(max_age_days)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A cached answer fetched after `now - max_age`.
    pub fn get(&self, name: &str, now: DateTime<Utc>) -> Result<Option<PlayerAttributes>> {
        let conn = self.conn();
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT attributes, fetched_at FROM player_cache WHERE name_key = ?1",
                params![normalize_name(name)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("failed to query lookup cache")?;

        let Some((json, fetched_at)) = row else {
            return Ok(None);
        };
        let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
            .context("bad fetched_at in lookup cache")?
            .with_timezone(&Utc);
        if now - fetched_at > self.max_age {
            debug!(name, %fetched_at, "lookup cache entry expired");
            return Ok(None);
        }
        let attrs = serde_json::from_str(&json).context("failed to decode cached attributes")?;
        Ok(Some(attrs))
    }

    pub fn put(&self, name: &str, attrs: &PlayerAttributes, now: DateTime<Utc>) -> Result<()> {
        let json = serde_json::to_string(attrs).context("failed to encode attributes")?;
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO player_cache (name_key, attributes, fetched_at)
                 VALUES (?1, ?2, ?3)",
                params![normalize_name(name), json, now.to_rfc3339()],
            )
            .context("failed to write lookup cache")?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM player_cache", [], |row| row.get(0))
            .context("failed to count lookup cache rows")?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl PlayerLookup for SqliteLookupCache {
    async fn lookup_player_attributes(&self, name: &str) -> Result<Option<PlayerAttributes>> {
        match self.get(name, Utc::now()) {
            Ok(Some(attrs)) => {
                debug!(name, "lookup cache hit");
                return Ok(Some(attrs));
            }
            Ok(None) => {}
            Err(e) => warn!(name, error = %e, "lookup cache read failed"),
        }

        let found = self.inner.lookup_player_attributes(name).await?;
        if let Some(attrs) = found.as_ref().filter(|a| !a.is_empty()) {
            if let Err(e) = self.put(name, attrs, Utc::now()) {
                warn!(name, error = %e, "lookup cache write failed");
            }
        }
        Ok(found)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
