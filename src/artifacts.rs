//! Failure artifact collection
//!
//! When a run fails and `HELIOS_WORKSPACES_ARTIFACTS` names a directory,
//! the runner drops a JSON snapshot of the run there: timestamp, network
//! mode, node status if the node is still answering, registered account
//! names, and the full error chain. Inert when the variable is unset.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::network::NetworkMode;
use crate::rpc::NodeInfo;
use crate::workspace::Workspace;

/// Environment variable naming the artifact output directory.
pub const ARTIFACTS_ENV: &str = "HELIOS_WORKSPACES_ARTIFACTS";

/// Snapshot of a failed run.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunArtifact {
    /// When the failure was recorded
    pub timestamp: DateTime<Utc>,
    /// Network mode of the run
    pub network: String,
    /// Node status at failure time, if the node still answered
    pub node: Option<NodeInfo>,
    /// Logical names of accounts registered in the workspace
    pub accounts: Vec<String>,
    /// Full error chain
    pub error: String,
}

impl RunArtifact {
    /// Snapshot the state of a failed run.
    pub async fn capture(
        error: &anyhow::Error,
        network: NetworkMode,
        workspace: Option<&Workspace>,
    ) -> Self {
        let node = match workspace {
            Some(ws) => ws.client().node_info().await.ok(),
            None => None,
        };
        Self {
            timestamp: Utc::now(),
            network: network.to_string(),
            node,
            accounts: workspace.map(|ws| ws.account_names()).unwrap_or_default(),
            error: format!("{:#}", error),
        }
    }

    /// Write the artifact as pretty JSON into `dir`.
    ///
    /// The filename embeds the timestamp so repeated failures do not
    /// clobber each other.
    pub async fn write_to(&self, dir: impl Into<PathBuf>) -> Result<PathBuf> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create artifact dir {}", dir.display()))?;

        let filename = format!(
            "run-failure-{}.json",
            self.timestamp.format("%Y%m%dT%H%M%S%3f")
        );
        let path = dir.join(filename);

        let json = serde_json::to_vec_pretty(self).context("failed to serialize artifact")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write artifact {}", path.display()))?;

        Ok(path)
    }
}

/// Capture and write an artifact for a failed run, if collection is
/// enabled. Best effort: artifact IO problems are logged, never allowed
/// to mask the run's own error.
pub(crate) async fn collect_run_failure(
    error: &anyhow::Error,
    network: NetworkMode,
    workspace: Option<&Workspace>,
) {
    let Ok(dir) = std::env::var(ARTIFACTS_ENV) else {
        return;
    };
    if dir.is_empty() {
        return;
    }

    let artifact = RunArtifact::capture(error, network, workspace).await;
    match artifact.write_to(dir).await {
        Ok(path) => log::info!("wrote failure artifact to {}", path.display()),
        Err(e) => log::warn!("failed to collect run artifact: {:#}", e),
    }
}
