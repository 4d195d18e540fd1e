//! # Helios Workspaces
//!
//! Integration-test harness for Helios smart contracts.
//!
//! A [`Runner`] executes test callbacks against a set of pre-provisioned
//! accounts in one of two environments:
//!
//! - **Sandbox** (default): a disposable local `heliosd` node, spawned
//!   fresh for every run on a free port with a throwaway home directory.
//!   Total isolation, unlimited funding, killed at teardown.
//! - **Testnet**: the shared persistent test network, reused across runs.
//!   Requires root credentials; created accounts get collision-free ids.
//!
//! The mode comes from the `HELIOS_WORKSPACES_NETWORK` environment
//! variable (`sandbox` when unset) or an explicit config override.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use helios_workspaces::prelude::*;
//!
//! #[tokio::test]
//! async fn test_counter_contract() -> Result<()> {
//!     let runner = Runner::create(|ws| async move {
//!         ws.deploy("counter", include_bytes!("../fixtures/counter.bin"))
//!             .await?;
//!         ws.create_account("alice").await?;
//!         Ok(())
//!     })?;
//!
//!     runner
//!         .run(|ws| async move {
//!             let alice = ws.account("alice")?;
//!             let counter = ws.account("counter")?;
//!             alice
//!                 .call(counter.id(), "increment", serde_json::json!({}), 0)
//!                 .await?;
//!             Ok(())
//!         })
//!         .await
//! }
//! ```
//!
//! ## Design Principles
//!
//! 1. **Isolation**: sandbox runs never share chain state
//! 2. **Mode transparency**: tests address accounts by logical name and
//!    run unchanged against sandbox or testnet
//! 3. **No orphans**: RAII teardown of processes and home directories,
//!    also on panic
//! 4. **Deterministic waits**: all polling goes through an injectable
//!    clock

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Accounts, ids and contract handles
pub mod account;
/// Failure artifact collection
pub mod artifacts;
/// Clock abstraction for deterministic waiting
pub mod clock;
/// Workspace configuration
pub mod config;
/// Typed harness errors
pub mod error;
/// Network mode selection
pub mod network;
/// The runner façade
pub mod runner;
/// Node RPC client and the NodeClient seam
pub mod rpc;
/// Sandbox and testnet execution backends
pub mod runtime;
/// Account key management
pub mod signer;
/// Transaction construction and signing
pub mod transaction;
/// Waiter primitives for node state changes
pub mod waiters;
/// The per-run workspace container
pub mod workspace;

// Convenient re-exports for common usage
pub mod prelude;

#[cfg(test)]
mod testing;

// Re-export the types almost every test touches at crate root
pub use account::{Account, AccountId, Contract};
pub use config::WorkspaceConfig;
pub use error::WorkspaceError;
pub use network::NetworkMode;
pub use runner::Runner;
pub use workspace::Workspace;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Harness version descriptor
pub const HARNESS_VERSION: &str = "Helios Workspaces V1.0";
