//! cache_purge tool implementation.
//!
//! Deletes a partition, one entry of a partition, or every partition that does
//! not belong to the running version.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::Gateway;
use shellcache_core::Error;

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Delete this partition, or with `key`, one entry inside it.
    #[serde(default)]
    pub partition: Option<String>,

    /// Cache key (64 hex chars) of a single entry to delete.
    #[serde(default)]
    pub key: Option<String>,

    /// Delete every partition not owned by the running version.
    #[serde(default)]
    pub stale: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Partitions deleted.
    pub partitions: Vec<String>,
    /// Entries deleted by key.
    pub entries: u64,
}

pub async fn purge_impl(gateway: &Gateway, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.partition.is_none() && !params.stale {
        return Err(Error::InvalidInput("At least one of partition or stale must be specified".to_string()).into());
    }
    if params.key.is_some() && params.partition.is_none() {
        return Err(Error::InvalidInput("key requires partition".to_string()).into());
    }

    let cache = gateway.cache();
    let mut output = CachePurgeOutput { partitions: Vec::new(), entries: 0 };

    match (params.partition, params.key) {
        (Some(partition), Some(key)) => {
            if cache.delete_entry(&partition, &key).await? {
                output.entries += 1;
            }
        }
        (Some(partition), None) => {
            if gateway.config().names.contains(&partition) {
                tracing::warn!(%partition, "purging a partition of the running version");
            }
            if cache.delete_partition(&partition).await? {
                output.partitions.push(partition);
            }
        }
        (None, _) => {}
    }

    if params.stale {
        for name in cache.partition_names().await? {
            if !gateway.config().names.contains(&name) && cache.delete_partition(&name).await? {
                output.partitions.push(name);
            }
        }
    }

    tracing::info!(partitions = ?output.partitions, entries = output.entries, "cache purged");
    json_result(&output)
}
