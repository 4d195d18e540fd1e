//! Network mode selection
//!
//! A workspace is bound to exactly one network mode for its whole lifetime:
//! either a disposable local sandbox node spawned per run, or the shared
//! persistent testnet. The mode comes from the configuration when set
//! explicitly, otherwise from the `HELIOS_WORKSPACES_NETWORK` environment
//! variable, defaulting to sandbox.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::WorkspaceError;

/// Environment variable selecting the network mode for all runners.
pub const NETWORK_ENV: &str = "HELIOS_WORKSPACES_NETWORK";

/// Which network a workspace executes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// Locally run, disposable node. One fresh chain per test run.
    Sandbox,
    /// Shared, persistent remote test network.
    Testnet,
}

impl NetworkMode {
    /// Resolve the mode from the environment.
    ///
    /// An unset (or empty) `HELIOS_WORKSPACES_NETWORK` yields [`Sandbox`];
    /// `"sandbox"` and `"testnet"` pass through unchanged; any other value
    /// is an error.
    ///
    /// [`Sandbox`]: NetworkMode::Sandbox
    pub fn from_env() -> Result<Self> {
        match std::env::var(NETWORK_ENV) {
            Ok(value) if value.is_empty() => Ok(NetworkMode::Sandbox),
            Ok(value) => value.parse(),
            Err(std::env::VarError::NotPresent) => Ok(NetworkMode::Sandbox),
            Err(e) => Err(WorkspaceError::InvalidNetwork(e.to_string()).into()),
        }
    }

    /// Whether this mode spawns a local sandbox node.
    pub fn is_sandbox(&self) -> bool {
        matches!(self, NetworkMode::Sandbox)
    }
}

impl FromStr for NetworkMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sandbox" => Ok(NetworkMode::Sandbox),
            "testnet" => Ok(NetworkMode::Testnet),
            other => Err(WorkspaceError::InvalidNetwork(other.to_string()).into()),
        }
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkMode::Sandbox => write!(f, "sandbox"),
            NetworkMode::Testnet => write!(f, "testnet"),
        }
    }
}
