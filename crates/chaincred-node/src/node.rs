//! The ChainCred node orchestrator.
//!
//! Opens storage, wires the credential services over it, and serves the
//! HTTP API in a background task.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::ChainCredConfig;
use crate::state::NodeState;
use crate::storage::Storage;

/// A running ChainCred node.
pub struct ChainCredNode {
    /// Node configuration.
    config: ChainCredConfig,
    /// Persistent storage (None until started).
    storage: Option<Arc<Storage>>,
    /// The HTTP API server task.
    api_task: Option<JoinHandle<Result<()>>>,
}

impl ChainCredNode {
    /// Create a node with the given config. Nothing is opened until `start`.
    pub fn new(config: ChainCredConfig) -> Self {
        Self {
            config,
            storage: None,
            api_task: None,
        }
    }

    /// Open storage and start the HTTP API.
    pub async fn start(&mut self) -> Result<()> {
        tracing::info!("starting ChainCred node");

        let data_dir = &self.config.storage.data_dir;
        let storage = Arc::new(Storage::open(data_dir)?);
        tracing::info!(path = %data_dir.display(), "storage initialized");

        let node_state = Arc::new(NodeState::new(
            storage.clone(),
            storage.clone(),
            storage.clone(),
            &self.config.issuers.allowed,
            self.config.api.max_document_bytes,
        )?);
        if self.config.issuers.allowed.is_empty() {
            tracing::warn!("no issuer allow-list configured, any issuer may issue");
        } else {
            tracing::info!(
                count = self.config.issuers.allowed.len(),
                "issuer allow-list loaded"
            );
        }

        let api_addr: SocketAddr = self.config.api_addr().parse()?;
        self.api_task = Some(tokio::spawn(async move {
            crate::api::start_api_server(api_addr, node_state).await
        }));

        self.storage = Some(storage);
        Ok(())
    }

    /// Wait on the API server. Returns when it stops or fails.
    pub async fn run(&mut self) -> Result<()> {
        let task = self
            .api_task
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;
        let result = task.await;
        self.api_task = None;
        result?
    }

    /// Stop the API and flush storage.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("shutting down ChainCred node");
        if let Some(task) = self.api_task.take() {
            task.abort();
        }
        if let Some(storage) = self.storage.take() {
            storage.flush()?;
            tracing::info!("storage flushed");
        }
        Ok(())
    }
}
