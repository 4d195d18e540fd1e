//! Accounts and contracts
//!
//! An [`Account`] is the harness-side handle to an on-chain account: an id,
//! the ed25519 signer owning it, and a client bound to the run's node. All
//! state-changing operations fetch the current nonce, build a transaction,
//! sign it, and submit it through the client. A [`Contract`] is an account
//! with code deployed to it.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WorkspaceError;
use crate::rpc::NodeClient;
use crate::signer::Signer;
use crate::transaction::{Action, TransactionBody, TxOutcome, DEFAULT_FEE};

/// Maximum length of an account id, separators included.
pub const MAX_ACCOUNT_ID_LEN: usize = 64;

/// Minimum length of an account id.
pub const MIN_ACCOUNT_ID_LEN: usize = 2;

/// A syntactically valid account id.
///
/// Ids are lowercase alphanumerics with `.`, `_` and `-` as separators;
/// separators may not lead, trail, or repeat. Subaccounts are dot-scoped
/// under their parent (`alice.root` is a child of `root`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the id of a child account scoped under `self`.
    ///
    /// # Errors
    ///
    /// Fails if `label` is not a single valid id segment (no separators
    /// other than `-`/`_`, no dots) or if the combined id is too long.
    pub fn subaccount(&self, label: &str) -> Result<AccountId> {
        if label.contains('.') {
            return Err(WorkspaceError::InvalidAccountId {
                id: label.to_string(),
                reason: "subaccount label may not contain '.'",
            }
            .into());
        }
        format!("{}.{}", label, self.0).parse()
    }

    fn validate(s: &str) -> std::result::Result<(), &'static str> {
        if s.len() < MIN_ACCOUNT_ID_LEN {
            return Err("too short");
        }
        if s.len() > MAX_ACCOUNT_ID_LEN {
            return Err("too long");
        }

        let mut prev_separator = true; // rejects a leading separator
        for c in s.chars() {
            let is_separator = matches!(c, '.' | '_' | '-');
            match c {
                'a'..='z' | '0'..='9' => prev_separator = false,
                '.' | '_' | '-' if !prev_separator => prev_separator = true,
                _ if is_separator => return Err("leading, trailing or doubled separator"),
                _ => return Err("only lowercase alphanumerics and '.', '_', '-' are allowed"),
            }
        }
        if prev_separator {
            return Err("leading, trailing or doubled separator");
        }
        Ok(())
    }
}

impl FromStr for AccountId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::validate(s).map_err(|reason| WorkspaceError::InvalidAccountId {
            id: s.to_string(),
            reason,
        })?;
        Ok(AccountId(s.to_string()))
    }
}

impl TryFrom<String> for AccountId {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to an on-chain account the harness holds keys for.
#[derive(Clone)]
pub struct Account {
    id: AccountId,
    signer: Arc<Signer>,
    client: Arc<dyn NodeClient>,
}

impl Account {
    /// Bind an account handle to a node client.
    ///
    /// Normally accounts are created through
    /// [`Workspace::create_account`](crate::workspace::Workspace::create_account);
    /// this constructor exists for pre-existing accounts (testnet roots,
    /// imported keys).
    pub fn new(id: AccountId, signer: Arc<Signer>, client: Arc<dyn NodeClient>) -> Self {
        Self { id, signer, client }
    }

    /// The account id.
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// The signer owning this account.
    pub fn signer(&self) -> &Arc<Signer> {
        &self.signer
    }

    /// Current balance in nanoHLS.
    pub async fn balance(&self) -> Result<u64> {
        self.client
            .balance(&self.id)
            .await
            .with_context(|| format!("failed to get balance of {}", self.id))
    }

    /// Current nonce.
    pub async fn nonce(&self) -> Result<u64> {
        self.client
            .nonce(&self.id)
            .await
            .with_context(|| format!("failed to get nonce of {}", self.id))
    }

    /// Whether the account exists on chain.
    pub async fn exists(&self) -> Result<bool> {
        self.client.account_exists(&self.id).await
    }

    /// Transfer `amount` nanoHLS to `to`.
    pub async fn transfer(&self, to: &AccountId, amount: u64) -> Result<TxOutcome> {
        self.sign_and_submit(Action::Transfer {
            to: to.clone(),
            amount,
        })
        .await
        .with_context(|| format!("transfer {} -> {} failed", self.id, to))
    }

    /// Create a child account funded with `balance` from this account.
    ///
    /// A fresh keypair is generated for the child; the returned handle
    /// owns it.
    pub async fn create_subaccount(&self, label: &str, balance: u64) -> Result<Account> {
        let child_id = self.id.subaccount(label)?;
        let child_signer = Arc::new(Signer::generate());

        self.sign_and_submit(Action::CreateAccount {
            new_account_id: child_id.clone(),
            public_key: child_signer.public_key_hex(),
            amount: balance,
        })
        .await
        .with_context(|| format!("failed to create account {}", child_id))?;

        log::debug!("created account {} with {} nanoHLS", child_id, balance);

        Ok(Account::new(child_id, child_signer, self.client.clone()))
    }

    /// Deploy contract bytecode to this account, turning it into a
    /// [`Contract`].
    pub async fn deploy(&self, code: &[u8]) -> Result<Contract> {
        self.sign_and_submit(Action::DeployCode {
            code_hex: hex::encode(code),
        })
        .await
        .with_context(|| format!("failed to deploy code to {}", self.id))?;

        log::debug!("deployed {} bytes of code to {}", code.len(), self.id);

        Ok(Contract {
            account: self.clone(),
        })
    }

    /// Call a state-changing contract method as this account.
    pub async fn call(
        &self,
        contract: &AccountId,
        method: &str,
        args: Value,
        deposit: u64,
    ) -> Result<TxOutcome> {
        self.sign_and_submit(Action::FunctionCall {
            contract: contract.clone(),
            method: method.to_string(),
            args,
            deposit,
        })
        .await
        .with_context(|| format!("call {}::{} by {} failed", contract, method, self.id))
    }

    /// Invoke a read-only contract method. Unsigned, free, no state change.
    pub async fn view(&self, contract: &AccountId, method: &str, args: Value) -> Result<Value> {
        self.client.view(contract, method, &args).await
    }

    /// Fetch the nonce, build, sign and submit one transaction, failing on
    /// an unsuccessful outcome.
    async fn sign_and_submit(&self, action: Action) -> Result<TxOutcome> {
        let nonce = self.client.nonce(&self.id).await? + 1;

        let body = TransactionBody {
            signer_id: self.id.clone(),
            public_key: self.signer.public_key_hex(),
            nonce,
            fee: DEFAULT_FEE,
            action,
        };

        let tx = body.sign(&self.signer)?;
        let outcome = self.client.submit(&tx).await?;
        outcome.into_result()
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account").field("id", &self.id).finish()
    }
}

/// Handle to an account with deployed contract code.
#[derive(Debug, Clone)]
pub struct Contract {
    account: Account,
}

impl Contract {
    /// The contract's account id.
    pub fn id(&self) -> &AccountId {
        self.account.id()
    }

    /// The underlying account (the contract can sign for itself).
    pub fn as_account(&self) -> &Account {
        &self.account
    }

    /// Invoke a read-only method on this contract.
    pub async fn view(&self, method: &str, args: Value) -> Result<Value> {
        self.account.view(self.account.id(), method, args).await
    }
}
