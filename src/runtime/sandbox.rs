//! Sandbox node lifecycle
//!
//! Each sandbox run spawns one `heliosd` process in dev mode on a free
//! port with a throwaway home directory, waits for its RPC server to
//! answer, and kills it at teardown. `kill_on_drop` plus the tempdir's
//! RAII cleanup guarantee nothing outlives the test run even when a
//! callback panics.

use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result};
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tokio::time::Duration;

use crate::account::AccountId;
use crate::clock::Clock;
use crate::config::{WorkspaceConfig, SANDBOX_ROOT_BALANCE};
use crate::error::WorkspaceError;
use crate::rpc::{HttpClient, NodeClient};
use crate::signer::Signer;
use crate::waiters::wait_until_ok;

/// Interval between readiness probes while the node boots.
const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A running sandbox node owned by one test run.
pub struct SandboxProcess {
    child: Child,
    client: Arc<HttpClient>,
    rpc_url: String,
    root_id: AccountId,
    root_signer: Arc<Signer>,
    // Held for RAII cleanup of the node home directory.
    _home: TempDir,
}

impl std::fmt::Debug for SandboxProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxProcess")
            .field("rpc_url", &self.rpc_url)
            .field("root_id", &self.root_id)
            .finish_non_exhaustive()
    }
}

impl SandboxProcess {
    /// Spawn a sandbox node and wait until it serves RPC.
    ///
    /// The workspace root account is funded at genesis from a keypair
    /// generated here, so the harness owns the root without reading any
    /// key material back from the node.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::SandboxUnavailable`] if the binary cannot
    /// be spawned and [`WorkspaceError::NodeNotReady`] if RPC never comes
    /// up within the configured startup timeout.
    pub(crate) async fn start(config: &WorkspaceConfig, clock: &dyn Clock) -> Result<Self> {
        let binary = config.sandbox.resolve_binary();
        let port = match config.sandbox.rpc_port {
            0 => pick_free_port()?,
            fixed => fixed,
        };
        let home = tempfile::Builder::new()
            .prefix("helios_sandbox_")
            .tempdir()
            .context("failed to create sandbox home directory")?;

        let root_id = config.root_account_id()?;
        let root_signer = Arc::new(Signer::generate());
        let rpc_url = format!("http://127.0.0.1:{}", port);

        let mut command = Command::new(&binary);
        command
            .arg("--dev")
            .arg("--dir")
            .arg(home.path())
            .arg("--rpc-bind")
            .arg(format!("127.0.0.1:{}", port))
            .arg("--dev-account")
            .arg(format!(
                "{}:{}:{}",
                root_id,
                root_signer.public_key_hex(),
                SANDBOX_ROOT_BALANCE
            ))
            .kill_on_drop(true);

        if config.sandbox.inherit_output {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let child = command.spawn().map_err(|e| {
            WorkspaceError::SandboxUnavailable(format!("{}: {}", binary.display(), e))
        })?;

        log::info!(
            "spawned sandbox node {} (pid {:?}) on {}",
            binary.display(),
            child.id(),
            rpc_url
        );

        let client = Arc::new(HttpClient::new(rpc_url.clone())?);

        let timeout = config.sandbox.startup_timeout();
        let info = wait_until_ok(clock, timeout, READINESS_POLL_INTERVAL, || {
            let client = client.clone();
            async move { client.node_info().await }
        })
        .await
        .map_err(|_| WorkspaceError::NodeNotReady(timeout))?;

        log::debug!(
            "sandbox node ready: version {} network {} height {}",
            info.version,
            info.network,
            info.height
        );

        Ok(Self {
            child,
            client,
            rpc_url,
            root_id,
            root_signer,
            _home: home,
        })
    }

    /// RPC endpoint of this node.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Client bound to this node.
    pub(crate) fn client(&self) -> Arc<dyn NodeClient> {
        self.client.clone()
    }

    /// Id of the genesis-funded root account.
    pub(crate) fn root_id(&self) -> &AccountId {
        &self.root_id
    }

    /// Signer owning the root account.
    pub(crate) fn root_signer(&self) -> Arc<Signer> {
        self.root_signer.clone()
    }

    /// Kill the node and wait for it to exit.
    pub(crate) async fn shutdown(mut self) -> Result<()> {
        log::debug!("shutting down sandbox node on {}", self.rpc_url);

        // The node has no graceful-shutdown RPC in dev mode; SIGKILL is
        // the contract.
        self.child.start_kill().ok();
        self.child
            .wait()
            .await
            .context("failed to reap sandbox node process")?;
        Ok(())
    }
}

/// Ask the OS for a free TCP port on loopback.
fn pick_free_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0))
        .context("failed to probe for a free port")?;
    let port = listener
        .local_addr()
        .context("failed to read probed port")?
        .port();
    drop(listener);
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;

    #[test]
    fn test_pick_free_port_returns_usable_port() {
        let port = pick_free_port().unwrap();
        assert_ne!(port, 0);

        // The port is actually bindable right after probing.
        std::net::TcpListener::bind(("127.0.0.1", port)).unwrap();
    }

    #[tokio::test]
    async fn test_start_with_missing_binary_is_typed() {
        let mut config = WorkspaceConfig::default();
        config.sandbox.binary = Some("/nonexistent/path/to/heliosd".into());

        let err = SandboxProcess::start(&config, &SystemClock).await.unwrap_err();
        match err.downcast_ref::<WorkspaceError>() {
            Some(WorkspaceError::SandboxUnavailable(msg)) => {
                assert!(msg.contains("/nonexistent/path/to/heliosd"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
