//! In-memory mock node for unit tests
//!
//! `MockLedgerNode` implements [`NodeClient`] over a hash map ledger with
//! real signature and nonce checking, so account/workspace logic is
//! exercised end to end without a node process. Failed validation is
//! reported the way a node reports it: a successful RPC round trip whose
//! outcome has `success == false`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use parking_lot::Mutex;
use serde_json::Value;

use crate::account::AccountId;
use crate::rpc::{NodeClient, NodeInfo};
use crate::transaction::{Action, SignedTransaction, TxOutcome};

/// Process-wide lock for tests that mutate environment variables.
///
/// `std::env` is process global and `cargo test` runs tests in parallel;
/// every test that sets or removes a variable takes this lock first.
pub(crate) static ENV_LOCK: Mutex<()> = Mutex::new(());

#[derive(Debug, Clone)]
struct MockAccount {
    public_key: String,
    balance: u64,
    nonce: u64,
    code: Option<Vec<u8>>,
}

/// In-memory ledger implementing the node RPC surface.
pub(crate) struct MockLedgerNode {
    accounts: Mutex<HashMap<AccountId, MockAccount>>,
    height: AtomicU64,
}

impl MockLedgerNode {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self {
            accounts: Mutex::new(HashMap::new()),
            height: AtomicU64::new(0),
        })
    }

    /// Register an account directly in the ledger (genesis-style funding).
    pub(crate) fn register(&self, id: &AccountId, public_key_hex: &str, balance: u64) {
        self.accounts.lock().insert(
            id.clone(),
            MockAccount {
                public_key: public_key_hex.to_string(),
                balance,
                nonce: 0,
                code: None,
            },
        );
    }

    /// Advance the reported chain height (for waiter tests).
    pub(crate) fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::Relaxed);
    }

    fn failure(hash: String, reason: impl Into<String>) -> TxOutcome {
        TxOutcome {
            hash,
            success: false,
            error: Some(reason.into()),
            logs: vec![],
            gas_used: 0,
        }
    }

    fn verify_signature(tx: &SignedTransaction) -> std::result::Result<(), String> {
        let key_bytes =
            hex::decode(&tx.body.public_key).map_err(|_| "malformed public key".to_string())?;
        let key_bytes: [u8; 32] = key_bytes
            .try_into()
            .map_err(|_| "public key must be 32 bytes".to_string())?;
        let key =
            VerifyingKey::from_bytes(&key_bytes).map_err(|_| "invalid public key".to_string())?;

        let sig_bytes =
            hex::decode(&tx.signature).map_err(|_| "malformed signature".to_string())?;
        let sig =
            Signature::from_slice(&sig_bytes).map_err(|_| "invalid signature".to_string())?;

        let canonical =
            serde_json::to_vec(&tx.body).map_err(|_| "unserializable body".to_string())?;
        key.verify(&canonical, &sig)
            .map_err(|_| "signature verification failed".to_string())
    }

    fn apply(&self, tx: &SignedTransaction) -> Result<TxOutcome> {
        let hash = tx.hash()?;

        if let Err(reason) = Self::verify_signature(tx) {
            return Ok(Self::failure(hash, reason));
        }

        let mut accounts = self.accounts.lock();

        let signer = match accounts.get(&tx.body.signer_id) {
            Some(a) => a.clone(),
            None => return Ok(Self::failure(hash, "unknown signer account")),
        };
        if signer.public_key != tx.body.public_key {
            return Ok(Self::failure(hash, "public key does not own account"));
        }
        if tx.body.nonce != signer.nonce + 1 {
            return Ok(Self::failure(
                hash,
                format!("bad nonce {} (expected {})", tx.body.nonce, signer.nonce + 1),
            ));
        }

        let fee = tx.body.fee;
        let mut logs = Vec::new();

        match &tx.body.action {
            Action::Transfer { to, amount } => {
                if !accounts.contains_key(to) {
                    return Ok(Self::failure(hash, format!("unknown recipient {}", to)));
                }
                let total = amount.saturating_add(fee);
                if signer.balance < total {
                    return Ok(Self::failure(hash, "insufficient balance"));
                }
                accounts.get_mut(&tx.body.signer_id).unwrap().balance -= total;
                accounts.get_mut(to).unwrap().balance += amount;
            }
            Action::CreateAccount {
                new_account_id,
                public_key,
                amount,
            } => {
                if accounts.contains_key(new_account_id) {
                    return Ok(Self::failure(
                        hash,
                        format!("account {} already exists", new_account_id),
                    ));
                }
                let total = amount.saturating_add(fee);
                if signer.balance < total {
                    return Ok(Self::failure(hash, "insufficient balance"));
                }
                accounts.get_mut(&tx.body.signer_id).unwrap().balance -= total;
                accounts.insert(
                    new_account_id.clone(),
                    MockAccount {
                        public_key: public_key.clone(),
                        balance: *amount,
                        nonce: 0,
                        code: None,
                    },
                );
            }
            Action::DeployCode { code_hex } => {
                let code = match hex::decode(code_hex) {
                    Ok(code) => code,
                    Err(_) => return Ok(Self::failure(hash, "malformed code")),
                };
                if signer.balance < fee {
                    return Ok(Self::failure(hash, "insufficient balance"));
                }
                let entry = accounts.get_mut(&tx.body.signer_id).unwrap();
                entry.balance -= fee;
                entry.code = Some(code);
            }
            Action::FunctionCall {
                contract,
                method,
                args,
                deposit,
            } => {
                match accounts.get(contract) {
                    Some(target) if target.code.is_some() => {}
                    Some(_) => {
                        return Ok(Self::failure(
                            hash,
                            format!("account {} has no contract deployed", contract),
                        ))
                    }
                    None => {
                        return Ok(Self::failure(hash, format!("unknown contract {}", contract)))
                    }
                }
                if method == "fail" {
                    return Ok(Self::failure(hash, "contract method panicked"));
                }
                let total = deposit.saturating_add(fee);
                if signer.balance < total {
                    return Ok(Self::failure(hash, "insufficient balance"));
                }
                accounts.get_mut(&tx.body.signer_id).unwrap().balance -= total;
                accounts.get_mut(contract).unwrap().balance += deposit;
                logs.push(format!("{} called with {}", method, args));
            }
        }

        accounts.get_mut(&tx.body.signer_id).unwrap().nonce += 1;
        let height = self.height.fetch_add(1, Ordering::Relaxed) + 1;

        Ok(TxOutcome {
            hash,
            success: true,
            error: None,
            logs,
            gas_used: 1_000 + height, // nonzero, vaguely monotone
        })
    }
}

#[async_trait]
impl NodeClient for MockLedgerNode {
    async fn node_info(&self) -> Result<NodeInfo> {
        Ok(NodeInfo {
            version: "mock-0.1".to_string(),
            network: "devnet".to_string(),
            height: self.height.load(Ordering::Relaxed),
            top_block_hash: None,
        })
    }

    async fn balance(&self, account: &AccountId) -> Result<u64> {
        Ok(self
            .accounts
            .lock()
            .get(account)
            .map(|a| a.balance)
            .unwrap_or(0))
    }

    async fn nonce(&self, account: &AccountId) -> Result<u64> {
        Ok(self
            .accounts
            .lock()
            .get(account)
            .map(|a| a.nonce)
            .unwrap_or(0))
    }

    async fn account_exists(&self, account: &AccountId) -> Result<bool> {
        Ok(self.accounts.lock().contains_key(account))
    }

    async fn submit(&self, tx: &SignedTransaction) -> Result<TxOutcome> {
        self.apply(tx)
    }

    async fn view(&self, contract: &AccountId, method: &str, args: &Value) -> Result<Value> {
        let accounts = self.accounts.lock();
        match accounts.get(contract) {
            Some(a) if a.code.is_some() => Ok(serde_json::json!({
                "method": method,
                "args": args,
            })),
            _ => anyhow::bail!("no contract at {}", contract),
        }
    }
}
