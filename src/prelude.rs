//! Convenient re-exports for test files
//!
//! ```rust,ignore
//! use helios_workspaces::prelude::*;
//! ```

pub use std::sync::Arc;

pub use anyhow::Result;
pub use tokio::time::Duration;

pub use crate::account::{Account, AccountId, Contract};
pub use crate::clock::{Clock, PausedClock, SystemClock};
pub use crate::config::{SandboxConfig, TestnetConfig, WorkspaceConfig, COIN_VALUE};
pub use crate::error::WorkspaceError;
pub use crate::network::{NetworkMode, NETWORK_ENV};
pub use crate::runner::Runner;
pub use crate::signer::Signer;
pub use crate::transaction::TxOutcome;
pub use crate::waiters::{wait_for_balance_at_least, wait_for_height, wait_until};
pub use crate::workspace::Workspace;
