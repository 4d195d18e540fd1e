//! Transaction construction and signing
//!
//! The harness builds JSON transactions, hashes them with sha3-256 and
//! signs the canonical body bytes with the sender's ed25519 key. Dev and
//! test nodes execute submissions synchronously, so the submit endpoint
//! returns a full [`TxOutcome`] rather than a pending hash.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha3::{Digest, Sha3_256};

use crate::account::AccountId;
use crate::error::WorkspaceError;
use crate::signer::Signer;

/// Flat fee attached to harness transactions, in nanoHLS.
///
/// Test workspaces care about balances they control, not fee markets; a
/// fixed fee keeps balance assertions predictable.
pub const DEFAULT_FEE: u64 = 10_000;

/// What a transaction does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Move `amount` nanoHLS from the signer to `to`.
    Transfer {
        /// Receiving account
        to: AccountId,
        /// Amount in nanoHLS
        amount: u64,
    },
    /// Create `new_account_id` owned by `public_key`, funded with `amount`
    /// from the signer.
    CreateAccount {
        /// Id of the account to create
        new_account_id: AccountId,
        /// Hex-encoded ed25519 public key owning the new account
        public_key: String,
        /// Initial balance transferred from the signer, in nanoHLS
        amount: u64,
    },
    /// Deploy contract bytecode to the signer's own account.
    DeployCode {
        /// Hex-encoded contract bytecode
        code_hex: String,
    },
    /// Invoke a method on a deployed contract.
    FunctionCall {
        /// Account the contract lives on
        contract: AccountId,
        /// Exported method name
        method: String,
        /// JSON arguments passed to the method
        args: Value,
        /// nanoHLS attached to the call
        deposit: u64,
    },
}

/// The signed-over portion of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionBody {
    /// Sending account
    pub signer_id: AccountId,
    /// Hex-encoded public key the signature must verify against
    pub public_key: String,
    /// Sender nonce; the node rejects reuse
    pub nonce: u64,
    /// Fee in nanoHLS
    pub fee: u64,
    /// The action to perform
    pub action: Action,
}

impl TransactionBody {
    /// Canonical bytes that are hashed and signed.
    fn canonical_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context("failed to serialize transaction body")
    }

    /// sha3-256 of the canonical body, hex-encoded.
    pub fn hash(&self) -> Result<String> {
        let digest = Sha3_256::digest(self.canonical_bytes()?);
        Ok(hex::encode(digest))
    }

    /// Sign the body, producing a submittable transaction.
    ///
    /// # Errors
    ///
    /// Fails only if the body cannot be serialized.
    pub fn sign(self, signer: &Signer) -> Result<SignedTransaction> {
        let signature = signer.sign(&self.canonical_bytes()?);
        Ok(SignedTransaction {
            body: self,
            signature,
        })
    }
}

/// A transaction ready for submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// The signed-over body
    pub body: TransactionBody,
    /// Hex-encoded ed25519 signature over the canonical body bytes
    pub signature: String,
}

impl SignedTransaction {
    /// Transaction hash, derived from the body.
    pub fn hash(&self) -> Result<String> {
        self.body.hash()
    }
}

/// Execution result of a submitted transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxOutcome {
    /// Transaction hash
    pub hash: String,
    /// Whether execution succeeded
    pub success: bool,
    /// Failure reason when `success` is false
    #[serde(default)]
    pub error: Option<String>,
    /// Log lines emitted by contract execution
    #[serde(default)]
    pub logs: Vec<String>,
    /// Gas consumed by execution
    #[serde(default)]
    pub gas_used: u64,
}

impl TxOutcome {
    /// Turn a failed outcome into a typed error, passing successes through.
    pub fn into_result(self) -> Result<TxOutcome> {
        if self.success {
            return Ok(self);
        }
        let reason = self
            .error
            .clone()
            .unwrap_or_else(|| "node reported failure without a reason".to_string());
        Err(WorkspaceError::TransactionFailed {
            hash: self.hash.clone(),
            reason,
        }
        .into())
    }
}
