//! Cached response entries.
//!
//! Entries are fully buffered responses keyed by request URL within a
//! partition. Writing to a partition that does not exist creates it.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

/// A buffered response stored in a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub partition: String,
    pub key: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub response_type: String,
    pub stored_at: String,
}

/// Entry metadata without the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntrySummary {
    pub key: String,
    pub url: String,
    pub status: u16,
    pub response_type: String,
    pub size: u64,
    pub stored_at: String,
}

impl CachedResponse {
    /// Build an entry for `url`, deriving its cache key.
    pub fn new(
        partition: &str, url: &str, status: u16, headers: Vec<(String, String)>, body: Vec<u8>, response_type: &str,
    ) -> Self {
        Self {
            partition: partition.to_string(),
            key: compute_cache_key(url),
            url: url.to_string(),
            status,
            headers,
            body,
            response_type: response_type.to_string(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

const UPSERT_ENTRY: &str = "INSERT INTO entries (
        partition, key_hash, url, status, headers_json, body, response_type, stored_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    ON CONFLICT(partition, key_hash) DO UPDATE SET
        url = excluded.url,
        status = excluded.status,
        headers_json = excluded.headers_json,
        body = excluded.body,
        response_type = excluded.response_type,
        stored_at = excluded.stored_at";

const SELECT_ENTRY: &str = "SELECT partition, key_hash, url, status, headers_json, body, response_type, stored_at
    FROM entries WHERE partition = ?1 AND key_hash = ?2";

fn ensure_partition(conn: &rusqlite::Connection, name: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
        params![name, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn insert_entry(conn: &rusqlite::Connection, entry: &CachedResponse) -> Result<(), Error> {
    let headers_json =
        serde_json::to_string(&entry.headers).map_err(|e| Error::CorruptEntry(format!("headers: {e}")))?;
    conn.execute(
        UPSERT_ENTRY,
        params![
            &entry.partition,
            &entry.key,
            &entry.url,
            entry.status as i64,
            headers_json,
            &entry.body,
            &entry.response_type,
            &entry.stored_at,
        ],
    )?;
    Ok(())
}

fn select_entry(conn: &rusqlite::Connection, partition: &str, key: &str) -> Result<Option<CachedResponse>, Error> {
    let mut stmt = conn.prepare_cached(SELECT_ENTRY)?;
    let row = stmt.query_row(params![partition, key], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, Vec<u8>>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
        ))
    });

    let (partition, key, url, status, headers_json, body, response_type, stored_at) = match row {
        Ok(r) => r,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let headers = serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))?;
    let status = u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("{url}: status {status}")))?;

    Ok(Some(CachedResponse { partition, key, url, status, headers, body, response_type, stored_at }))
}

impl CacheDb {
    /// Insert or replace one entry, creating its partition if needed.
    pub async fn put_entry(&self, entry: &CachedResponse) -> Result<(), Error> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_partition(&tx, &entry.partition)?;
                insert_entry(&tx, &entry)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Write every entry into `partition` in one transaction.
    ///
    /// Either all entries are stored or none are.
    pub async fn add_all(&self, partition: &str, entries: Vec<CachedResponse>) -> Result<(), Error> {
        if let Some(stray) = entries.iter().find(|e| e.partition != partition) {
            return Err(Error::InvalidInput(format!(
                "entry {} targets partition {}, expected {partition}",
                stray.url, stray.partition
            )));
        }
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_partition(&tx, &partition)?;
                for entry in &entries {
                    insert_entry(&tx, entry)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up `url` in a single partition.
    pub async fn match_entry(&self, partition: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        self.match_first(&[partition], url).await
    }

    /// Look up `url` in each partition in turn, returning the first hit.
    pub async fn match_first(&self, partitions: &[&str], url: &str) -> Result<Option<CachedResponse>, Error> {
        let partitions: Vec<String> = partitions.iter().map(|p| p.to_string()).collect();
        let key = compute_cache_key(url);
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                for partition in &partitions {
                    if let Some(entry) = select_entry(conn, partition, &key)? {
                        return Ok(Some(entry));
                    }
                }
                Ok(None)
            })
            .await
            .map_err(Error::from)
    }

    /// Entry metadata for a partition, oldest first.
    pub async fn list_entries(&self, partition: &str) -> Result<Vec<EntrySummary>, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<EntrySummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key_hash, url, status, response_type, length(body), stored_at
                     FROM entries WHERE partition = ?1 ORDER BY stored_at, url",
                )?;
                let rows = stmt
                    .query_map(params![partition], |row| {
                        Ok(EntrySummary {
                            key: row.get(0)?,
                            url: row.get(1)?,
                            status: row.get::<_, i64>(2)? as u16,
                            response_type: row.get(3)?,
                            size: row.get::<_, i64>(4)? as u64,
                            stored_at: row.get(5)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }

    /// Remove one entry by cache key. Returns false if it was absent.
    pub async fn delete_entry(&self, partition: &str, key: &str) -> Result<bool, Error> {
        if !super::hash::is_valid_key(key) {
            return Err(Error::InvalidHash);
        }
        let partition = partition.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE partition = ?1 AND key_hash = ?2",
                    params![partition, key],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}
