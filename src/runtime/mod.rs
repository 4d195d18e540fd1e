// File: src/runtime/mod.rs
//
// Workspace runtime backends.
//
// The container is the piece the Runner awaits: it brings the chosen
// backend up (spawned sandbox process or shared testnet session), derives
// the per-run Workspace from it, and tears it down afterwards.

/// Sandbox node process management
pub mod sandbox;
/// Shared testnet session
pub mod testnet;

pub use sandbox::SandboxProcess;
pub use testnet::TestnetSession;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::account::Account;
use crate::clock::Clock;
use crate::config::WorkspaceConfig;
use crate::network::NetworkMode;
use crate::rpc::NodeClient;
use crate::workspace::Workspace;

enum Backend {
    Sandbox(SandboxProcess),
    Testnet(TestnetSession),
}

/// A started execution environment for one run.
pub(crate) struct WorkspaceContainer {
    backend: Backend,
    client: Arc<dyn NodeClient>,
    root: Account,
    network: NetworkMode,
}

impl WorkspaceContainer {
    /// Bring up the backend for `network` and wait until it is usable.
    pub(crate) async fn start(
        network: NetworkMode,
        config: &WorkspaceConfig,
        clock: &dyn Clock,
    ) -> Result<Self> {
        match network {
            NetworkMode::Sandbox => {
                let process = SandboxProcess::start(config, clock)
                    .await
                    .context("failed to start sandbox environment")?;
                let client = process.client();
                let root = Account::new(
                    process.root_id().clone(),
                    process.root_signer(),
                    client.clone(),
                );
                Ok(Self {
                    backend: Backend::Sandbox(process),
                    client,
                    root,
                    network,
                })
            }
            NetworkMode::Testnet => {
                let session = TestnetSession::connect(config)
                    .await
                    .context("failed to connect testnet environment")?;
                let client = session.client();
                let root = session.root();
                Ok(Self {
                    backend: Backend::Testnet(session),
                    client,
                    root,
                    network,
                })
            }
        }
    }

    /// Derive the workspace handed to user callbacks, creating the
    /// configured pre-funded accounts first.
    pub(crate) async fn build_workspace(&self, config: &WorkspaceConfig) -> Result<Workspace> {
        let workspace = Workspace::new(
            self.network,
            self.client.clone(),
            self.root.clone(),
            config.default_balance,
        );

        for i in 0..config.funded_accounts {
            let name = format!("test-{}", i);
            workspace
                .create_account(&name)
                .await
                .with_context(|| format!("failed to pre-fund account '{}'", name))?;
        }

        Ok(workspace)
    }

    /// Tear the environment down. Sandbox processes are killed; testnet
    /// sessions have nothing to release.
    pub(crate) async fn shutdown(self) -> Result<()> {
        match self.backend {
            Backend::Sandbox(process) => process.shutdown().await,
            Backend::Testnet(_) => Ok(()),
        }
    }
}
