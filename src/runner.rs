//! The test runner façade
//!
//! A [`Runner`] binds a network mode, a workspace configuration and an
//! *init callback* that provisions accounts and contracts. Each call to
//! [`Runner::run`] executes one isolated test: bring the environment up,
//! wait for readiness, derive a [`Workspace`] (pre-funded accounts, then
//! the init callback), hand it to the test callback, tear everything
//! down. In sandbox mode every run gets its own fresh chain.
//!
//! # Example
//!
//! ```rust,ignore
//! use helios_workspaces::prelude::*;
//!
//! #[tokio::test]
//! async fn test_transfer() -> anyhow::Result<()> {
//!     let runner = Runner::create(|ws| async move {
//!         ws.create_account("alice").await?;
//!         ws.create_account("bob").await?;
//!         Ok(())
//!     })?;
//!
//!     runner
//!         .run(|ws| async move {
//!             let alice = ws.account("alice")?;
//!             let bob = ws.account("bob")?;
//!             alice.transfer(bob.id(), 1_000).await?;
//!             assert_eq!(bob.balance().await? > 0, true);
//!             Ok(())
//!         })
//!         .await
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::BoxFuture;

use crate::artifacts;
use crate::clock::{Clock, SystemClock};
use crate::config::WorkspaceConfig;
use crate::network::NetworkMode;
use crate::runtime::WorkspaceContainer;
use crate::workspace::Workspace;

/// Stored provisioning callback, re-run for every isolated environment.
type InitFn = Arc<dyn Fn(Workspace) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Façade binding a network mode, a configuration and an init callback.
pub struct Runner {
    config: WorkspaceConfig,
    network: NetworkMode,
    init: InitFn,
    clock: Arc<dyn Clock>,
}

impl Runner {
    /// Create a runner with the default (empty) configuration.
    ///
    /// The init callback runs once per [`run`](Self::run) against the
    /// fresh workspace, before the test callback; anything it registers
    /// is visible to the test by logical name.
    ///
    /// # Errors
    ///
    /// Fails when `HELIOS_WORKSPACES_NETWORK` holds an unrecognized value.
    pub fn create<F, Fut>(init: F) -> Result<Self>
    where
        F: Fn(Workspace) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::create_with_config(WorkspaceConfig::default(), init)
    }

    /// Create a runner from an explicit configuration plus init callback.
    ///
    /// An explicit `config.network` takes precedence; the environment
    /// variable is only consulted (and only able to fail) when the
    /// config leaves the mode unset.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration or an unrecognized network value
    /// in the environment.
    pub fn create_with_config<F, Fut>(config: WorkspaceConfig, init: F) -> Result<Self>
    where
        F: Fn(Workspace) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        config.validate()?;

        let network = match config.network {
            Some(mode) => mode,
            None => NetworkMode::from_env()?,
        };

        log::debug!("runner created for {} mode", network);

        let init: InitFn =
            Arc::new(move |workspace| -> BoxFuture<'static, Result<()>> {
                Box::pin(init(workspace))
            });

        Ok(Self {
            config,
            network,
            init,
            clock: Arc::new(SystemClock),
        })
    }

    /// The network mode this runner is bound to.
    pub fn network(&self) -> NetworkMode {
        self.network
    }

    /// The configuration this runner was created with.
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Execute `test` in a fresh, initialized workspace.
    ///
    /// Environment startup, workspace derivation and the callback are
    /// awaited in sequence; teardown always happens, also when the init
    /// or test callback fails.
    pub async fn run<F, Fut>(&self, test: F) -> Result<()>
    where
        F: FnOnce(Workspace) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let container =
            WorkspaceContainer::start(self.network, &self.config, self.clock.as_ref()).await?;

        let result = self.run_in_container(&container, test).await;

        let teardown = container
            .shutdown()
            .await
            .context("failed to tear down environment");

        // A failing test wins over a failing teardown; a teardown failure
        // alone still fails the run.
        match (result, teardown) {
            (Err(e), _) => Err(e),
            (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    /// Execute `test` like [`run`](Self::run), but only in sandbox mode.
    ///
    /// On testnet this is a no-op returning success: the callback is for
    /// tests that rely on sandbox-only powers (fresh chains, unlimited
    /// funding) and cannot mean anything on a shared network.
    pub async fn run_sandbox<F, Fut>(&self, test: F) -> Result<()>
    where
        F: FnOnce(Workspace) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        if !self.network.is_sandbox() {
            log::debug!("skipping sandbox-only callback on {}", self.network);
            return Ok(());
        }
        self.run(test).await
    }

    async fn run_in_container<F, Fut>(&self, container: &WorkspaceContainer, test: F) -> Result<()>
    where
        F: FnOnce(Workspace) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let workspace = match container.build_workspace(&self.config).await {
            Ok(workspace) => workspace,
            Err(e) => {
                artifacts::collect_run_failure(&e, self.network, None).await;
                return Err(e);
            }
        };

        let init_result = (self.init)(workspace.clone())
            .await
            .context("workspace init callback failed");
        if let Err(e) = init_result {
            artifacts::collect_run_failure(&e, self.network, Some(&workspace)).await;
            return Err(e);
        }

        if let Err(e) = test(workspace.clone()).await {
            artifacts::collect_run_failure(&e, self.network, Some(&workspace)).await;
            return Err(e);
        }

        Ok(())
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("network", &self.network)
            .finish()
    }
}
