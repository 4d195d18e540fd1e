//! HTTP JSON-RPC client
//!
//! One [`HttpClient`] per node endpoint. Requests are JSON-RPC 2.0 over
//! HTTP POST with a per-client monotonically increasing id. Node-side
//! errors surface as [`WorkspaceError::Rpc`] so tests can assert on them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{
    AccountParams, BalanceResult, HasAccountResult, NodeInfo, NonceResult, RpcRequest,
    RpcResponse, SubmitParams, ViewParams, ViewResult, JSON_RPC_VERSION,
};
use super::NodeClient;
use crate::account::AccountId;
use crate::error::WorkspaceError;
use crate::transaction::{SignedTransaction, TxOutcome};

/// Per-request timeout. Generous enough for synchronous transaction
/// execution on a loaded dev node, short enough that a dead node fails a
/// test quickly.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-RPC 2.0 client for a single node endpoint.
pub struct HttpClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpClient {
    /// Create a client for `url` (e.g. `http://127.0.0.1:18545`).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Perform one JSON-RPC call, decoding the result into `T`.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: JSON_RPC_VERSION,
            id,
            method,
            params,
        };

        if log::log_enabled!(log::Level::Trace) {
            log::trace!("rpc -> {} {} (id {})", self.url, method, id);
        }

        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("rpc request '{}' to {} failed", method, self.url))?
            .json()
            .await
            .with_context(|| format!("rpc response for '{}' was not valid JSON-RPC", method))?;

        if let Some(err) = response.error {
            return Err(WorkspaceError::Rpc {
                code: err.code,
                message: err.message,
            }
            .into());
        }

        let result = response
            .result
            .ok_or_else(|| anyhow!("rpc response for '{}' had neither result nor error", method))?;

        serde_json::from_value(result)
            .with_context(|| format!("unexpected result shape for '{}'", method))
    }
}

#[async_trait]
impl NodeClient for HttpClient {
    async fn node_info(&self) -> Result<NodeInfo> {
        self.call("get_info", Value::Null).await
    }

    async fn balance(&self, account: &AccountId) -> Result<u64> {
        let params = serde_json::to_value(AccountParams {
            account: account.clone(),
        })?;
        let result: BalanceResult = self.call("get_balance", params).await?;
        Ok(result.balance)
    }

    async fn nonce(&self, account: &AccountId) -> Result<u64> {
        let params = serde_json::to_value(AccountParams {
            account: account.clone(),
        })?;
        let result: NonceResult = self.call("get_nonce", params).await?;
        Ok(result.nonce)
    }

    async fn account_exists(&self, account: &AccountId) -> Result<bool> {
        let params = serde_json::to_value(AccountParams {
            account: account.clone(),
        })?;
        let result: HasAccountResult = self.call("has_account", params).await?;
        Ok(result.exists)
    }

    async fn submit(&self, tx: &SignedTransaction) -> Result<TxOutcome> {
        let params = serde_json::to_value(SubmitParams { tx: tx.clone() })?;
        self.call("submit_transaction", params).await
    }

    async fn view(&self, contract: &AccountId, method: &str, args: &Value) -> Result<Value> {
        let params = serde_json::to_value(ViewParams {
            contract: contract.clone(),
            method: method.to_string(),
            args: args.clone(),
        })?;
        let result: ViewResult = self.call("view_contract", params).await?;
        Ok(result.result)
    }
}
