//! Account key management
//!
//! Every workspace account owns an ed25519 keypair. Keys are generated
//! fresh for sandbox accounts and imported from hex for testnet roots.

use anyhow::{anyhow, Context, Result};
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;

/// An ed25519 signing identity for one account.
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Import a signer from a hex-encoded 32-byte secret key.
    ///
    /// This is how testnet root credentials are loaded from the
    /// environment or a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid hex or not exactly
    /// 32 bytes long.
    pub fn from_secret_hex(secret: &str) -> Result<Self> {
        let bytes = hex::decode(secret.trim()).context("secret key is not valid hex")?;
        let bytes: [u8; SECRET_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| anyhow!("secret key must be {} bytes", SECRET_KEY_LENGTH))?;

        Ok(Self {
            key: SigningKey::from_bytes(&bytes),
        })
    }

    /// Hex-encoded public key, as embedded in transactions and passed to
    /// the sandbox node for genesis funding.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.key.verifying_key().as_bytes())
    }

    /// Hex-encoded secret key. Only ever written to artifacts the user
    /// explicitly asks for; never logged.
    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.key.to_bytes())
    }

    /// The verifying half of the keypair.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Sign arbitrary bytes, returning the hex-encoded signature.
    pub fn sign(&self, message: &[u8]) -> String {
        hex::encode(self.key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secret material stays out of Debug output.
        f.debug_struct("Signer")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}
