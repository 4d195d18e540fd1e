// File: src/rpc/mod.rs
//
// Node RPC abstractions.
//
// The harness talks to nodes through the NodeClient trait so that the same
// account and workspace code runs against a sandbox process, the shared
// testnet, or an in-memory mock in unit tests.

/// HTTP JSON-RPC client implementation
pub mod client;
/// Envelope and payload types for the node RPC surface
pub mod types;

pub use client::HttpClient;
pub use types::NodeInfo;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::account::AccountId;
use crate::transaction::{SignedTransaction, TxOutcome};

/// Operations the harness needs from a node.
///
/// Implementations should surface node-side failures as errors with enough
/// context to debug a failing test, and must be cheap to share behind an
/// `Arc`: every [`Account`](crate::account::Account) holds a handle.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Node status. Also used as the readiness probe while a sandbox
    /// process boots.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unreachable or not yet serving RPC.
    async fn node_info(&self) -> Result<NodeInfo>;

    /// Account balance in nanoHLS.
    async fn balance(&self, account: &AccountId) -> Result<u64>;

    /// Current account nonce.
    async fn nonce(&self, account: &AccountId) -> Result<u64>;

    /// Whether the account exists on chain.
    async fn account_exists(&self, account: &AccountId) -> Result<bool>;

    /// Submit a signed transaction and wait for its synchronous outcome.
    ///
    /// Dev and test nodes execute submissions immediately; the returned
    /// outcome reflects final execution state.
    async fn submit(&self, tx: &SignedTransaction) -> Result<TxOutcome>;

    /// Invoke a read-only contract method. No signature, no state change.
    async fn view(&self, contract: &AccountId, method: &str, args: &Value) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal in-memory node for exercising the trait surface.
    struct MockNode {
        height: u64,
    }

    #[async_trait]
    impl NodeClient for MockNode {
        async fn node_info(&self) -> Result<NodeInfo> {
            Ok(NodeInfo {
                version: "mock".to_string(),
                network: "devnet".to_string(),
                height: self.height,
                top_block_hash: None,
            })
        }

        async fn balance(&self, _account: &AccountId) -> Result<u64> {
            Ok(1_000_000)
        }

        async fn nonce(&self, _account: &AccountId) -> Result<u64> {
            Ok(0)
        }

        async fn account_exists(&self, _account: &AccountId) -> Result<bool> {
            Ok(true)
        }

        async fn submit(&self, tx: &SignedTransaction) -> Result<TxOutcome> {
            Ok(TxOutcome {
                hash: tx.hash()?,
                success: true,
                error: None,
                logs: vec![],
                gas_used: 0,
            })
        }

        async fn view(&self, _contract: &AccountId, method: &str, _args: &Value) -> Result<Value> {
            Ok(Value::String(method.to_string()))
        }
    }

    #[tokio::test]
    async fn test_mock_node_through_trait_object() {
        let node: std::sync::Arc<dyn NodeClient> = std::sync::Arc::new(MockNode { height: 12 });

        assert_eq!(node.node_info().await.unwrap().height, 12);

        let alice: AccountId = "alice".parse().unwrap();
        assert_eq!(node.balance(&alice).await.unwrap(), 1_000_000);
        assert!(node.account_exists(&alice).await.unwrap());
    }
}
