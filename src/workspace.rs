//! The per-run workspace container
//!
//! A [`Workspace`] is what user callbacks receive: the root account, a
//! registry of named accounts, and the client bound to this run's node.
//! Handles are cheap to clone and share one underlying state.
//!
//! Accounts are registered under *logical* names. In sandbox mode the
//! on-chain id is derived directly from the name (`alice` becomes
//! `alice.root`); on testnet a random suffix is appended so that runs
//! against the shared persistent network never collide. Test code looks
//! accounts up by logical name either way.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use parking_lot::RwLock;

use crate::account::{Account, Contract};
use crate::error::WorkspaceError;
use crate::network::NetworkMode;
use crate::rpc::NodeClient;

struct WorkspaceInner {
    network: NetworkMode,
    client: Arc<dyn NodeClient>,
    root: Account,
    default_balance: u64,
    accounts: RwLock<HashMap<String, Account>>,
}

/// Execution context for one test run.
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<WorkspaceInner>,
}

impl Workspace {
    pub(crate) fn new(
        network: NetworkMode,
        client: Arc<dyn NodeClient>,
        root: Account,
        default_balance: u64,
    ) -> Self {
        Self {
            inner: Arc::new(WorkspaceInner {
                network,
                client,
                root,
                default_balance,
                accounts: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Network mode this workspace is bound to.
    pub fn network(&self) -> NetworkMode {
        self.inner.network
    }

    /// Whether this run owns a disposable sandbox node.
    pub fn is_sandbox(&self) -> bool {
        self.inner.network.is_sandbox()
    }

    /// The node client for this run.
    pub fn client(&self) -> Arc<dyn NodeClient> {
        self.inner.client.clone()
    }

    /// The workspace root account. Funds everything else.
    pub fn root(&self) -> Account {
        self.inner.root.clone()
    }

    /// Look up a registered account by logical name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::UnknownAccount`] if nothing was
    /// registered under `name`.
    pub fn account(&self, name: &str) -> Result<Account> {
        self.inner
            .accounts
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| WorkspaceError::UnknownAccount(name.to_string()).into())
    }

    /// Logical names of all registered accounts, sorted.
    pub fn account_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.accounts.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Register an externally created account under a logical name.
    ///
    /// # Errors
    ///
    /// Fails if the name is already taken.
    pub fn register(&self, name: &str, account: Account) -> Result<()> {
        let mut accounts = self.inner.accounts.write();
        if accounts.contains_key(name) {
            bail!("account '{}' is already registered in this workspace", name);
        }
        accounts.insert(name.to_string(), account);
        Ok(())
    }

    /// Create a subaccount of root with the configured default balance and
    /// register it under `name`.
    pub async fn create_account(&self, name: &str) -> Result<Account> {
        self.create_account_with_balance(name, self.inner.default_balance)
            .await
    }

    /// Create a subaccount of root with an explicit balance and register
    /// it under `name`.
    pub async fn create_account_with_balance(&self, name: &str, balance: u64) -> Result<Account> {
        if self.inner.accounts.read().contains_key(name) {
            bail!("account '{}' is already registered in this workspace", name);
        }

        let label = self.on_chain_label(name);
        let account = self.inner.root.create_subaccount(&label, balance).await?;
        self.register(name, account.clone())?;
        Ok(account)
    }

    /// Create an account named `name` and deploy `code` to it.
    pub async fn deploy(&self, name: &str, code: &[u8]) -> Result<Contract> {
        let account = self.create_account(name).await?;
        account.deploy(code).await
    }

    /// On-chain label for a logical name. Testnet labels carry a random
    /// suffix because the chain outlives the test run.
    fn on_chain_label(&self, name: &str) -> String {
        match self.inner.network {
            NetworkMode::Sandbox => name.to_string(),
            NetworkMode::Testnet => format!("{}-{:08x}", name, rand::random::<u32>()),
        }
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("network", &self.inner.network)
            .field("root", self.inner.root.id())
            .field("accounts", &self.account_names())
            .finish()
    }
}
