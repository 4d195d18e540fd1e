//! JSON-RPC 2.0 envelope and method payload types
//!
//! The node RPC surface the harness relies on is small: node status,
//! account balance/nonce/existence queries, synchronous transaction
//! submission, and read-only contract views.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::account::AccountId;
use crate::transaction::SignedTransaction;

/// JSON-RPC protocol version sent with every request.
pub const JSON_RPC_VERSION: &str = "2.0";

/// Outgoing JSON-RPC request envelope.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    /// Always [`JSON_RPC_VERSION`]
    pub jsonrpc: &'static str,
    /// Request id, unique per client
    pub id: u64,
    /// Method name
    pub method: &'a str,
    /// Method parameters
    pub params: Value,
}

/// Incoming JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    /// Echoed request id
    #[allow(dead_code)]
    pub id: Option<u64>,
    /// Present on success
    pub result: Option<Value>,
    /// Present on failure
    pub error: Option<RpcErrorObject>,
}

/// JSON-RPC error object returned by the node.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    /// Error code
    pub code: i64,
    /// Human readable message
    pub message: String,
}

/// Result of `get_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Node software version
    pub version: String,
    /// Network the node is running on
    pub network: String,
    /// Current chain height
    pub height: u64,
    /// Hash of the current top block, when the chain is non-empty
    #[serde(default)]
    pub top_block_hash: Option<String>,
}

/// Parameters for account-keyed queries (`get_balance`, `get_nonce`,
/// `has_account`).
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountParams {
    /// Account to query
    pub account: AccountId,
}

/// Result of `get_balance`.
#[derive(Debug, Deserialize)]
pub struct BalanceResult {
    /// Balance in nanoHLS
    pub balance: u64,
}

/// Result of `get_nonce`.
#[derive(Debug, Deserialize)]
pub struct NonceResult {
    /// Current account nonce
    pub nonce: u64,
}

/// Result of `has_account`.
#[derive(Debug, Deserialize)]
pub struct HasAccountResult {
    /// Whether the account exists on chain
    pub exists: bool,
}

/// Parameters for `submit_transaction`.
#[derive(Debug, Serialize)]
pub struct SubmitParams {
    /// The signed transaction
    pub tx: SignedTransaction,
}

/// Parameters for `view_contract`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ViewParams {
    /// Account the contract lives on
    pub contract: AccountId,
    /// Method to invoke
    pub method: String,
    /// JSON arguments
    pub args: Value,
}

/// Result of `view_contract`.
#[derive(Debug, Deserialize)]
pub struct ViewResult {
    /// JSON value returned by the view method
    pub result: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let req = RpcRequest {
            jsonrpc: JSON_RPC_VERSION,
            id: 3,
            method: "get_info",
            params: Value::Null,
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 3);
        assert_eq!(json["method"], "get_info");
    }

    #[test]
    fn test_response_error_parsing() {
        let raw = r#"{"id":1,"error":{"code":-32601,"message":"method not found"}}"#;
        let resp: RpcResponse = serde_json::from_str(raw).unwrap();

        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32601);
        assert_eq!(err.message, "method not found");
    }

    #[test]
    fn test_node_info_tolerates_missing_top_block() {
        let raw = r#"{"version":"0.9.1","network":"devnet","height":0}"#;
        let info: NodeInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(info.height, 0);
        assert!(info.top_block_hash.is_none());
    }
}
