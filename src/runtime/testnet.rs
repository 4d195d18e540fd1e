//! Shared testnet session
//!
//! Testnet mode reuses a long-lived public network instead of spawning
//! anything: connect, verify the configured root account, and hand out a
//! client. There is deliberately no teardown: the network is shared and
//! persistent, which is also why created accounts carry random suffixes
//! (see the workspace module).

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::account::Account;
use crate::config::WorkspaceConfig;
use crate::rpc::{HttpClient, NodeClient};
use crate::signer::Signer;

/// A connection to the shared testnet for one run.
pub struct TestnetSession {
    client: Arc<HttpClient>,
    root: Account,
    rpc_url: String,
}

impl std::fmt::Debug for TestnetSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestnetSession")
            .field("rpc_url", &self.rpc_url)
            .finish_non_exhaustive()
    }
}

impl TestnetSession {
    /// Resolve credentials, connect, and verify the root account exists.
    ///
    /// Credentials are resolved before anything touches the network so a
    /// missing key fails fast with a typed error.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::MissingTestnetCredentials`] when no root
    /// credentials are configured, and connection/context errors when the
    /// endpoint is unreachable or the root account is absent on chain.
    ///
    /// [`WorkspaceError::MissingTestnetCredentials`]:
    /// crate::error::WorkspaceError::MissingTestnetCredentials
    pub(crate) async fn connect(config: &WorkspaceConfig) -> Result<Self> {
        let (root_id, secret) = config.testnet.resolve_credentials()?;
        let signer = Arc::new(Signer::from_secret_hex(&secret).context("testnet secret key")?);

        let rpc_url = config.testnet.resolve_rpc_url();
        let client = Arc::new(HttpClient::new(rpc_url.clone())?);

        let info = client
            .node_info()
            .await
            .with_context(|| format!("testnet endpoint {} is unreachable", rpc_url))?;
        log::info!(
            "connected to testnet {} (node {} at height {})",
            rpc_url,
            info.version,
            info.height
        );

        let exists = client.account_exists(&root_id).await?;
        if !exists {
            anyhow::bail!("testnet root account {} does not exist on chain", root_id);
        }

        let dyn_client: Arc<dyn NodeClient> = client.clone();
        let root = Account::new(root_id, signer, dyn_client);

        Ok(Self {
            client,
            root,
            rpc_url,
        })
    }

    /// RPC endpoint of this session.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Client bound to the testnet endpoint.
    pub(crate) fn client(&self) -> Arc<dyn NodeClient> {
        self.client.clone()
    }

    /// The configured root account.
    pub(crate) fn root(&self) -> Account {
        self.root.clone()
    }
}
