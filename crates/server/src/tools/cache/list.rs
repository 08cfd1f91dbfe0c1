//! cache_list tool implementation.
//!
//! Lists partitions, or the entries inside one partition.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::Gateway;
use shellcache_core::{CacheNames, EntrySummary, Error, PartitionInfo};

use crate::tools::json_result;

/// Parameters for the cache_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheListParams {
    /// List the entries of this partition instead of all partitions.
    #[serde(default)]
    pub partition: Option<String>,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    /// Partitions owned by the running version.
    pub current: CacheNames,
    pub partitions: Vec<PartitionInfo>,
    /// Entry metadata, when a partition was requested.
    pub entries: Option<Vec<EntrySummary>>,
}

pub async fn list_impl(gateway: &Gateway, params: CacheListParams) -> Result<CallToolResult, McpError> {
    let cache = gateway.cache();
    let partitions = cache.list_partitions().await?;

    let entries = match params.partition {
        Some(name) => {
            if !partitions.iter().any(|p| p.name == name) {
                return Err(Error::CacheMiss(format!("no partition named {name}")).into());
            }
            Some(cache.list_entries(&name).await?)
        }
        None => None,
    };

    let output = CacheListOutput { current: gateway.config().names.clone(), partitions, entries };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{EchoNetwork, gateway, parse};

    #[tokio::test]
    async fn test_list_partitions_and_entries() {
        let (gateway, _host) = gateway(EchoNetwork::default()).await;
        gateway.start().await.unwrap();

        let output: CacheListOutput = parse(&list_impl(&gateway, CacheListParams::default()).await.unwrap());
        assert_eq!(output.partitions.len(), 1);
        assert_eq!(output.partitions[0].name, output.current.precache);
        assert_eq!(output.partitions[0].entries, 2);
        assert!(output.entries.is_none());

        let params = CacheListParams { partition: Some(output.current.precache.clone()) };
        let output: CacheListOutput = parse(&list_impl(&gateway, params).await.unwrap());
        let urls: Vec<String> = output.entries.unwrap().into_iter().map(|e| e.url).collect();
        assert!(urls.contains(&"http://localhost:8000/".to_string()));
        assert!(urls.contains(&"http://localhost:8000/static/style.css".to_string()));
    }

    #[tokio::test]
    async fn test_list_unknown_partition() {
        let (gateway, _host) = gateway(EchoNetwork::default()).await;
        let params = CacheListParams { partition: Some("nope".into()) };
        let err = list_impl(&gateway, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }
}
