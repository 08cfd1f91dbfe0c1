//! Core types and shared functionality for shellcache.
//!
//! This crate provides:
//! - Versioned cache partitions with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CachedResponse, EntrySummary, PartitionInfo};
pub use config::{AppConfig, CacheNames, GatewayConfig};
pub use error::Error;
