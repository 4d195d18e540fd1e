//! Workspace configuration
//!
//! Configuration is plain data: serde structs with defaults that work out
//! of the box for sandbox mode. Testnet credentials and the sandbox binary
//! location can come from the environment so CI does not need a config
//! file, or from YAML for checked-in test profiles.
//!
//! # Example
//!
//! ```yaml
//! # workspaces.yaml
//! funded_accounts: 3
//! default_balance: 500000000000
//! sandbox:
//!   startup_timeout_secs: 60
//! testnet:
//!   rpc_url: "https://rpc.testnet.helios.network"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::error::WorkspaceError;
use crate::network::NetworkMode;

/// nanoHLS per HLS.
pub const COIN_VALUE: u64 = 1_000_000_000;

/// Default balance for pre-funded and created accounts: 100 HLS.
pub const DEFAULT_ACCOUNT_BALANCE: u64 = 100 * COIN_VALUE;

/// Balance granted to the sandbox root account at genesis.
///
/// Large enough to fund any realistic number of test accounts.
pub const SANDBOX_ROOT_BALANCE: u64 = 1_000_000 * COIN_VALUE;

/// Environment variable pointing at the sandbox node binary.
pub const SANDBOX_BIN_ENV: &str = "HELIOS_SANDBOX_BIN";

/// Node binary looked up on `PATH` when nothing else is configured.
pub const DEFAULT_SANDBOX_BIN: &str = "heliosd";

/// Environment variable overriding the testnet RPC endpoint.
pub const TESTNET_RPC_ENV: &str = "HELIOS_TESTNET_RPC";

/// Environment variable holding the testnet root account id.
pub const TESTNET_ACCOUNT_ENV: &str = "HELIOS_TESTNET_ACCOUNT";

/// Environment variable holding the testnet root secret key (hex).
pub const TESTNET_SECRET_KEY_ENV: &str = "HELIOS_TESTNET_SECRET_KEY";

/// Default public testnet RPC endpoint.
pub const DEFAULT_TESTNET_RPC: &str = "https://rpc.testnet.helios.network";

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Top-level workspace configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Explicit network mode. When unset, the environment decides
    /// (see [`NetworkMode::from_env`]).
    pub network: Option<NetworkMode>,

    /// Logical id of the workspace root account.
    pub root_account: String,

    /// Number of accounts pre-created before the init callback runs,
    /// registered as `test-0`, `test-1`, ...
    pub funded_accounts: usize,

    /// Balance for pre-funded accounts and the default for
    /// `create_account`, in nanoHLS.
    pub default_balance: u64,

    /// Sandbox-mode settings.
    pub sandbox: SandboxConfig,

    /// Testnet-mode settings.
    pub testnet: TestnetConfig,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            network: None,
            root_account: "root".to_string(),
            funded_accounts: 0,
            default_balance: DEFAULT_ACCOUNT_BALANCE,
            sandbox: SandboxConfig::default(),
            testnet: TestnetConfig::default(),
        }
    }
}

impl WorkspaceConfig {
    /// Parse a YAML configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).context("failed to parse workspace config YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and parse a YAML configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }

    /// Check the configuration for values that cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::InvalidConfig`] for an unusable root id,
    /// pre-funded accounts with a zero balance, or a zero startup timeout.
    pub fn validate(&self) -> Result<()> {
        self.root_account.parse::<AccountId>().map_err(|e| {
            WorkspaceError::InvalidConfig(format!("root_account: {}", e))
        })?;

        if self.funded_accounts > 0 && self.default_balance == 0 {
            return Err(WorkspaceError::InvalidConfig(
                "funded_accounts requested with default_balance of 0".to_string(),
            )
            .into());
        }

        if self.sandbox.startup_timeout_secs == 0 {
            return Err(WorkspaceError::InvalidConfig(
                "sandbox.startup_timeout_secs must be nonzero".to_string(),
            )
            .into());
        }

        if matches!(&self.testnet.rpc_url, Some(url) if url.is_empty()) {
            return Err(
                WorkspaceError::InvalidConfig("testnet.rpc_url is empty".to_string()).into(),
            );
        }

        Ok(())
    }

    /// The validated root account id.
    pub fn root_account_id(&self) -> Result<AccountId> {
        self.root_account.parse()
    }
}

/// Settings for the local sandbox node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SandboxConfig {
    /// Path to the node binary. Overrides `HELIOS_SANDBOX_BIN` and the
    /// `PATH` lookup.
    pub binary: Option<PathBuf>,

    /// RPC port to bind. 0 picks a free port per run, which is what
    /// parallel test execution wants.
    pub rpc_port: u16,

    /// How long to wait for the node to answer RPC after spawning.
    pub startup_timeout_secs: u64,

    /// Inherit the node's stdout/stderr instead of discarding it.
    /// Useful when debugging a sandbox that will not come up.
    pub inherit_output: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            binary: None,
            rpc_port: 0,
            startup_timeout_secs: 30,
            inherit_output: false,
        }
    }
}

impl SandboxConfig {
    /// Resolve the node binary: explicit config, then the environment,
    /// then `heliosd` on `PATH`.
    pub fn resolve_binary(&self) -> PathBuf {
        if let Some(path) = &self.binary {
            return path.clone();
        }
        if let Some(path) = env_nonempty(SANDBOX_BIN_ENV) {
            return PathBuf::from(path);
        }
        PathBuf::from(DEFAULT_SANDBOX_BIN)
    }

    /// Startup timeout as a [`Duration`].
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }
}

/// Settings for the shared testnet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestnetConfig {
    /// RPC endpoint. Falls back to `HELIOS_TESTNET_RPC`, then the public
    /// default.
    pub rpc_url: Option<String>,

    /// Root account id on testnet. Falls back to
    /// `HELIOS_TESTNET_ACCOUNT`.
    pub root_account: Option<String>,

    /// Hex secret key owning the root account. Falls back to
    /// `HELIOS_TESTNET_SECRET_KEY`. Never logged.
    pub secret_key: Option<String>,
}

impl TestnetConfig {
    /// Resolve the RPC endpoint.
    pub fn resolve_rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .or_else(|| env_nonempty(TESTNET_RPC_ENV))
            .unwrap_or_else(|| DEFAULT_TESTNET_RPC.to_string())
    }

    /// Resolve root credentials as `(account_id, secret_key_hex)`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::MissingTestnetCredentials`] when either
    /// half is absent from both config and environment.
    pub fn resolve_credentials(&self) -> Result<(AccountId, String)> {
        let account = self
            .root_account
            .clone()
            .or_else(|| env_nonempty(TESTNET_ACCOUNT_ENV));
        let secret = self
            .secret_key
            .clone()
            .or_else(|| env_nonempty(TESTNET_SECRET_KEY_ENV));

        match (account, secret) {
            (Some(account), Some(secret)) => Ok((account.parse()?, secret)),
            _ => Err(WorkspaceError::MissingTestnetCredentials.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ENV_LOCK;

    #[test]
    fn test_default_config_is_valid() {
        let config = WorkspaceConfig::default();
        config.validate().unwrap();

        assert_eq!(config.root_account, "root");
        assert_eq!(config.default_balance, DEFAULT_ACCOUNT_BALANCE);
        assert!(config.network.is_none());
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r#"
network: testnet
root_account: harness
funded_accounts: 3
default_balance: 500000000000
sandbox:
  startup_timeout_secs: 60
  inherit_output: true
testnet:
  rpc_url: "http://localhost:9999"
"#;
        let config = WorkspaceConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.network, Some(NetworkMode::Testnet));
        assert_eq!(config.root_account, "harness");
        assert_eq!(config.funded_accounts, 3);
        assert_eq!(config.sandbox.startup_timeout_secs, 60);
        assert!(config.sandbox.inherit_output);
        assert_eq!(config.testnet.rpc_url.as_deref(), Some("http://localhost:9999"));
    }

    #[test]
    fn test_yaml_rejects_unknown_fields() {
        let err = WorkspaceConfig::from_yaml_str("accounts: 3\n").unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_validate_rejects_bad_root_id() {
        let mut config = WorkspaceConfig::default();
        config.root_account = "Not Valid".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("root_account"));
    }

    #[test]
    fn test_validate_rejects_zero_balance_with_funded_accounts() {
        let mut config = WorkspaceConfig::default();
        config.funded_accounts = 5;
        config.default_balance = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_startup_timeout() {
        let mut config = WorkspaceConfig::default();
        config.sandbox.startup_timeout_secs = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sandbox_binary_resolution_order() {
        let _guard = ENV_LOCK.lock();
        std::env::remove_var(SANDBOX_BIN_ENV);

        // Default: PATH lookup of heliosd.
        let config = SandboxConfig::default();
        assert_eq!(config.resolve_binary(), PathBuf::from(DEFAULT_SANDBOX_BIN));

        // Env var beats the default.
        std::env::set_var(SANDBOX_BIN_ENV, "/opt/helios/heliosd");
        assert_eq!(config.resolve_binary(), PathBuf::from("/opt/helios/heliosd"));

        // Explicit config beats the env var.
        let explicit = SandboxConfig {
            binary: Some(PathBuf::from("/tmp/custom-node")),
            ..SandboxConfig::default()
        };
        assert_eq!(explicit.resolve_binary(), PathBuf::from("/tmp/custom-node"));

        std::env::remove_var(SANDBOX_BIN_ENV);
    }

    #[test]
    fn test_testnet_rpc_url_default() {
        let _guard = ENV_LOCK.lock();
        std::env::remove_var(TESTNET_RPC_ENV);

        assert_eq!(TestnetConfig::default().resolve_rpc_url(), DEFAULT_TESTNET_RPC);
    }

    #[test]
    fn test_testnet_credentials_missing_is_typed() {
        let _guard = ENV_LOCK.lock();
        std::env::remove_var(TESTNET_ACCOUNT_ENV);
        std::env::remove_var(TESTNET_SECRET_KEY_ENV);

        let err = TestnetConfig::default().resolve_credentials().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::error::WorkspaceError>(),
            Some(crate::error::WorkspaceError::MissingTestnetCredentials)
        ));
    }

    #[test]
    fn test_testnet_credentials_from_env() {
        let _guard = ENV_LOCK.lock();
        std::env::set_var(TESTNET_ACCOUNT_ENV, "ci-root");
        std::env::set_var(TESTNET_SECRET_KEY_ENV, "ab".repeat(32));

        let (account, secret) = TestnetConfig::default().resolve_credentials().unwrap();
        assert_eq!(account.as_str(), "ci-root");
        assert_eq!(secret.len(), 64);

        std::env::remove_var(TESTNET_ACCOUNT_ENV);
        std::env::remove_var(TESTNET_SECRET_KEY_ENV);
    }
}
