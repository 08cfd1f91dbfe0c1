//! SQLite-backed storage for versioned cache partitions.
//!
//! This module provides named partitions of buffered responses using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Partition create/enumerate/delete (deletion cascades to entries)
//! - Atomic bulk insert for install-time precaching
//! - URL-keyed lookup using SHA-256 cache keys
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod partitions;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CachedResponse, EntrySummary};
pub use partitions::PartitionInfo;
