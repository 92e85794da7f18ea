//! Account records as stored by the ledger.
//!
//! Every account starts with an 8-byte discriminator derived from its type
//! name, followed by the borsh encoding of its fields. The program allocates
//! each account at a fixed size, so stored data may carry zero padding after
//! the last field.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::constants::DISCRIMINATOR_LEN;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("account data shorter than its discriminator ({0} bytes)")]
    MissingDiscriminator(usize),
    #[error("discriminator does not match {0}")]
    DiscriminatorMismatch(&'static str),
    #[error("failed to decode {name}: {reason}")]
    Decode { name: &'static str, reason: String },
    #[error("failed to encode {name}: {reason}")]
    Encode { name: &'static str, reason: String },
}

/// First eight bytes of `sha256("<namespace>:<name>")`
pub fn discriminator(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let hash = Sha256::digest(format!("{}:{}", namespace, name).as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    out
}

/// A decoded account paired with the address it lives at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramAccount<T> {
    pub address: Address,
    pub account: T,
}

impl<T> ProgramAccount<T> {
    pub fn new(address: Address, account: T) -> Self {
        Self { address, account }
    }
}

pub trait AccountData: BorshSerialize + BorshDeserialize {
    /// Type name the discriminator is derived from
    const NAME: &'static str;

    /// Bytes the program allocates for this account, discriminator included
    const SPACE: usize;

    fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        discriminator("account", Self::NAME)
    }

    /// Discriminator plus fields, without padding
    fn to_account_data(&self) -> Result<Vec<u8>, AccountError> {
        let mut out = Self::discriminator().to_vec();
        self.serialize(&mut out).map_err(|e| AccountError::Encode {
            name: Self::NAME,
            reason: e.to_string(),
        })?;
        Ok(out)
    }

    /// Decode an account, ignoring any padding after the last field
    fn from_account_data(data: &[u8]) -> Result<Self, AccountError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(AccountError::MissingDiscriminator(data.len()));
        }
        let (prefix, mut fields) = data.split_at(DISCRIMINATOR_LEN);
        if prefix != Self::discriminator().as_slice() {
            return Err(AccountError::DiscriminatorMismatch(Self::NAME));
        }
        Self::deserialize(&mut fields).map_err(|e| AccountError::Decode {
            name: Self::NAME,
            reason: e.to_string(),
        })
    }

    fn has_discriminator(data: &[u8]) -> bool {
        data.len() >= DISCRIMINATOR_LEN && data[..DISCRIMINATOR_LEN] == Self::discriminator()[..]
    }
}
