//! Partition lifecycle: open, enumerate, delete.
//!
//! Mirrors the browser cache storage surface (`open`, `keys`, `has`,
//! `delete`). Deleting a partition drops all of its entries via the
//! foreign key cascade.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// A partition and how many entries it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PartitionInfo {
    pub name: String,
    pub created_at: String,
    pub entries: u64,
}

impl CacheDb {
    /// Open a partition by exact name, creating it if missing.
    pub async fn open_partition(&self, name: &str) -> Result<(), Error> {
        if name.is_empty() {
            return Err(Error::InvalidInput("partition name cannot be empty".into()));
        }
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Whether a partition with this exact name exists.
    pub async fn has_partition(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM partitions WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// All partition names in creation order.
    pub async fn partition_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM partitions ORDER BY rowid")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Partitions with entry counts, in creation order.
    pub async fn list_partitions(&self) -> Result<Vec<PartitionInfo>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<PartitionInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT p.name, p.created_at, COUNT(e.key_hash)
                     FROM partitions p LEFT JOIN entries e ON e.partition = p.name
                     GROUP BY p.name
                     ORDER BY p.rowid",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(PartitionInfo {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a partition and every entry in it.
    ///
    /// Returns false if no partition had that name.
    pub async fn delete_partition(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM partitions WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_partition("rex-ai-precache-v1").await.unwrap();
        db.open_partition("rex-ai-precache-v1").await.unwrap();

        assert_eq!(db.partition_names().await.unwrap(), vec!["rex-ai-precache-v1".to_string()]);
        assert!(db.has_partition("rex-ai-precache-v1").await.unwrap());
        assert!(!db.has_partition("rex-ai-runtime-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_open_rejects_empty_name() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(matches!(db.open_partition("").await, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_names_in_creation_order() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for name in ["b-runtime", "a-precache", "c-old"] {
            db.open_partition(name).await.unwrap();
        }
        assert_eq!(db.partition_names().await.unwrap(), vec!["b-runtime", "a-precache", "c-old"]);
    }

    #[tokio::test]
    async fn test_delete_partition() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_partition("v-old").await.unwrap();

        assert!(db.delete_partition("v-old").await.unwrap());
        assert!(!db.delete_partition("v-old").await.unwrap());
        assert!(db.partition_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_partitions_counts_empty() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_partition("v-new").await.unwrap();
        let list = db.list_partitions().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "v-new");
        assert_eq!(list[0].entries, 0);
    }
}
