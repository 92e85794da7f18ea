//! Wallet connector contract.
//!
//! A wallet exposes the acting identity and signs transaction messages. The
//! session never sees key material; it only asks for an address and a
//! signature.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

use crate::address::Address;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("wallet not connected")]
    NotConnected,
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),
}

/// Ed25519 signature over a transaction message. Doubles as the transaction id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

pub trait Wallet: Send + Sync {
    /// Current identity, `None` while disconnected
    fn address(&self) -> Option<Address>;

    fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError>;
}

/// Wallet backed by an in-process Ed25519 keypair
pub struct KeypairWallet {
    signing_key: SigningKey,
}

impl KeypairWallet {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_secret_bytes(secret: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }

    /// Load from a hex-encoded 32-byte secret key
    pub fn from_secret_hex(secret: &str) -> Result<Self, WalletError> {
        let bytes = hex::decode(secret.trim())
            .map_err(|e| WalletError::InvalidSecretKey(e.to_string()))?;
        let secret: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            WalletError::InvalidSecretKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_secret_bytes(secret))
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn pubkey(&self) -> Address {
        Address::new_from_array(self.signing_key.verifying_key().to_bytes())
    }
}

impl Wallet for KeypairWallet {
    fn address(&self) -> Option<Address> {
        Some(self.pubkey())
    }

    fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        Ok(Signature(self.signing_key.sign(message).to_bytes()))
    }
}

/// Placeholder used while no wallet is connected
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedWallet;

impl Wallet for DisconnectedWallet {
    fn address(&self) -> Option<Address> {
        None
    }

    fn sign_message(&self, _message: &[u8]) -> Result<Signature, WalletError> {
        Err(WalletError::NotConnected)
    }
}

/// Check that `signature` was produced over `message` by the key at `signer`
pub fn verify_signature(signer: &Address, message: &[u8], signature: &Signature) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(&signer.to_bytes()) else {
        return false;
    };
    let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
    key.verify(message, &signature).is_ok()
}
