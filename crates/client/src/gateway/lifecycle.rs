//! Install and activate phases.
//!
//! ### Install
//! - Fetch every precache URL first; any transport error or non-2xx status
//!   fails the whole install and nothing is written.
//! - Write all entries into the precache partition in one transaction.
//! - Signal skip-waiting so activation can follow immediately.
//! - A skip-waiting message that arrived before install finished activates
//!   the new version as soon as install succeeds.
//!
//! ### Activate
//! - Delete every partition not named for the current version.
//! - Claim all open clients.
//! - Running it again without a version change deletes nothing.

use std::fmt;

use futures_util::future::try_join_all;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use shellcache_core::{CachedResponse, Error};

use super::{Gateway, GatewayRequest, GatewayResponse, ResponseSource, ResponseType};

/// Worker version state. Fetches are only routed once `Activated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    #[default]
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// The last install attempt failed. Another attempt may be made.
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    pub(crate) state: WorkerState,
    pub(crate) skip_waiting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct InstallOutcome {
    pub partition: String,
    pub cached: usize,
    pub skip_waiting: bool,
    /// Set when a skip-waiting message arrived before install finished.
    pub activated: Option<ActivateOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ActivateOutcome {
    /// Partitions removed because they belong to another version.
    pub deleted: Vec<String>,
    pub claimed: usize,
}

impl Gateway {
    pub async fn state(&self) -> WorkerState {
        self.lifecycle.read().await.state
    }

    /// Precache the app shell.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallFailed` naming the first URL that could not be
    /// fetched, or `Error::InvalidState` if this version is already installed.
    pub async fn install(&self) -> Result<InstallOutcome, Error> {
        {
            let mut lifecycle = self.lifecycle.write().await;
            match lifecycle.state {
                WorkerState::Parsed | WorkerState::Redundant => lifecycle.state = WorkerState::Installing,
                state => return Err(Error::InvalidState(format!("cannot install while {state}"))),
            }
        }

        tracing::info!(partition = %self.config.names.precache, urls = self.config.precache_urls.len(), "installing");
        let result = self.precache().await;

        let (cached, requested) = {
            let mut lifecycle = self.lifecycle.write().await;
            match result {
                Ok(cached) => {
                    let requested = lifecycle.skip_waiting;
                    lifecycle.state = WorkerState::Installed;
                    lifecycle.skip_waiting = true;
                    tracing::info!(cached, version = %self.config.version, "installed");
                    (cached, requested)
                }
                Err(e) => {
                    lifecycle.state = WorkerState::Redundant;
                    tracing::error!(error = %e, "install failed");
                    return Err(e);
                }
            }
        };

        let activated = if requested {
            tracing::info!("skip-waiting was requested during install, activating");
            Some(self.activate().await?)
        } else {
            None
        };

        Ok(InstallOutcome { partition: self.config.names.precache.clone(), cached, skip_waiting: true, activated })
    }

    async fn precache(&self) -> Result<usize, Error> {
        let partition = &self.config.names.precache;
        self.cache.open_partition(partition).await?;

        let urls = self
            .config
            .precache_urls
            .iter()
            .map(|path| self.config.resolve(path))
            .collect::<Result<Vec<Url>, Error>>()?;

        let entries: Vec<CachedResponse> =
            try_join_all(urls.iter().map(|url| self.fetch_for_precache(partition, url))).await?;

        let cached = entries.len();
        self.cache.add_all(partition, entries).await?;
        Ok(cached)
    }

    async fn fetch_for_precache(&self, partition: &str, url: &Url) -> Result<CachedResponse, Error> {
        let install_failed = |reason: String| Error::InstallFailed { url: url.to_string(), reason };

        let response = self
            .network
            .fetch(&GatewayRequest::get(url.clone()))
            .await
            .map_err(|e| install_failed(e.to_string()))?;

        if !response.status.is_success() {
            return Err(install_failed(format!("status {}", response.status.as_u16())));
        }

        let response = GatewayResponse::from_network(response, &self.config.origin, ResponseSource::Network);
        if response.response_type != ResponseType::Basic {
            return Err(install_failed("redirected to another origin".into()));
        }

        Ok(response.to_cached(partition, url))
    }

    /// Drop stale partitions and take control of open pages.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` unless this version has installed.
    pub async fn activate(&self) -> Result<ActivateOutcome, Error> {
        let reactivating = {
            let mut lifecycle = self.lifecycle.write().await;
            match lifecycle.state {
                WorkerState::Installed => {
                    lifecycle.state = WorkerState::Activating;
                    false
                }
                WorkerState::Activated => true,
                state => return Err(Error::InvalidState(format!("cannot activate while {state}"))),
            }
        };

        let result = self.cleanup_and_claim().await;

        if !reactivating {
            let mut lifecycle = self.lifecycle.write().await;
            lifecycle.state = if result.is_ok() { WorkerState::Activated } else { WorkerState::Installed };
        }

        if let Ok(outcome) = &result {
            tracing::info!(deleted = outcome.deleted.len(), claimed = outcome.claimed, "activated");
        }
        result
    }

    async fn cleanup_and_claim(&self) -> Result<ActivateOutcome, Error> {
        let mut deleted = Vec::new();
        for name in self.cache.partition_names().await? {
            if self.config.names.contains(&name) {
                continue;
            }
            tracing::info!(partition = %name, "deleting stale partition");
            if self.cache.delete_partition(&name).await? {
                deleted.push(name);
            }
        }

        let claimed = self.host.claim_clients().await?;
        Ok(ActivateOutcome { deleted, claimed })
    }

    /// Handle a skip-waiting request from a page.
    ///
    /// An installed version activates right away; otherwise the request is
    /// remembered for when install finishes.
    pub async fn skip_waiting(&self) -> Result<Option<ActivateOutcome>, Error> {
        let installed = {
            let mut lifecycle = self.lifecycle.write().await;
            lifecycle.skip_waiting = true;
            lifecycle.state == WorkerState::Installed
        };

        if installed { self.activate().await.map(Some) } else { Ok(None) }
    }

    /// Install then activate, the sequence a fresh version goes through.
    pub async fn start(&self) -> Result<(InstallOutcome, ActivateOutcome), Error> {
        let installed = self.install().await?;
        let activated = self.activate().await?;
        Ok((installed, activated))
    }
}
