//! Typed harness errors
//!
//! Public APIs in this crate return `anyhow::Result`; the variants below are
//! the classifiable failures raised inside those results. Tests and callers
//! that need to branch on a failure can `downcast_ref::<WorkspaceError>()`.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by the workspace harness.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// The network selector held a value other than `sandbox` or `testnet`.
    #[error("invalid network '{0}': expected 'sandbox' or 'testnet'")]
    InvalidNetwork(String),

    /// The workspace configuration failed validation.
    #[error("invalid workspace configuration: {0}")]
    InvalidConfig(String),

    /// An account id failed syntactic validation.
    #[error("invalid account id '{id}': {reason}")]
    InvalidAccountId {
        /// The rejected id
        id: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// A logical account name was not registered in the workspace.
    #[error("unknown account '{0}' in workspace")]
    UnknownAccount(String),

    /// The sandbox node binary could not be located or spawned.
    #[error("sandbox binary '{0}' could not be started")]
    SandboxUnavailable(String),

    /// The sandbox node never answered RPC within the startup timeout.
    #[error("sandbox node did not become ready within {0:?}")]
    NodeNotReady(Duration),

    /// A waiter predicate did not hold before its deadline.
    #[error("condition not met within {0:?}")]
    Timeout(Duration),

    /// The node returned a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Human readable message from the node
        message: String,
    },

    /// A submitted transaction executed but did not succeed.
    #[error("transaction {hash} failed: {reason}")]
    TransactionFailed {
        /// Hash of the failed transaction
        hash: String,
        /// Failure reason reported by the node
        reason: String,
    },

    /// Testnet mode was selected but no root credentials were provided.
    #[error(
        "testnet root account is not configured: set HELIOS_TESTNET_ACCOUNT and \
         HELIOS_TESTNET_SECRET_KEY or fill in the testnet config section"
    )]
    MissingTestnetCredentials,
}
