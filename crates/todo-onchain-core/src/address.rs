//! Account addresses and program-derived address (PDA) derivation.
//!
//! Addresses are 32-byte Ed25519 public keys rendered as base58. Accounts owned
//! by the todo program live at addresses derived from fixed tag seeds plus the
//! owner's key, so any client can recompute them without asking the ledger.

use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use curve25519_dalek::edwards::CompressedEdwardsY;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::constants::{TODO_TAG, USER_TAG};

/// Maximum number of seeds accepted by the derivation, bump included
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed
pub const MAX_SEED_LEN: usize = 32;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("invalid base58: {0}")]
    InvalidBase58(String),
    #[error("address must be 32 bytes, got {0}")]
    InvalidLength(usize),
    #[error("seed length or count exceeds the maximum")]
    MaxSeedLengthExceeded,
    #[error("derived address lies on the ed25519 curve")]
    InvalidSeeds,
    #[error("no bump seed yields an off-curve address")]
    NoViableBump,
}

/// Stored on the ledger as 32 raw bytes, shown to people as base58
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct Address([u8; 32]);

impl Address {
    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Whether the bytes decode to a point on the Ed25519 curve, i.e. whether a
    /// private key could exist for this address.
    pub fn is_on_curve(&self) -> bool {
        CompressedEdwardsY(self.0).decompress().is_some()
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = AddressError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ===== Program-derived addresses =====

/// Hash the seeds into a candidate address. Fails if the result is on-curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<Address, AddressError> {
    if seeds.len() > MAX_SEEDS || seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(AddressError::MaxSeedLengthExceeded);
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);
    let hash: [u8; 32] = hasher.finalize().into();

    let candidate = Address(hash);
    if candidate.is_on_curve() {
        return Err(AddressError::InvalidSeeds);
    }
    Ok(candidate)
}

/// Find the canonical PDA for `seeds`: the first off-curve candidate when
/// trying bump seeds from 255 downwards.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<(Address, u8), AddressError> {
    if seeds.len() >= MAX_SEEDS {
        return Err(AddressError::MaxSeedLengthExceeded);
    }

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = seeds.to_vec();
        with_bump.push(&bump_seed);

        match create_program_address(&with_bump, program_id) {
            Ok(address) => return Ok((address, bump)),
            Err(AddressError::InvalidSeeds) => continue,
            Err(e) => return Err(e),
        }
    }

    Err(AddressError::NoViableBump)
}

/// Address of the profile account owned by `authority`
pub fn profile_address(authority: &Address, program_id: &Address) -> Result<Address, AddressError> {
    find_program_address(&[USER_TAG, authority.as_ref()], program_id).map(|(address, _)| address)
}

/// Address of the todo account with index `idx` owned by `authority`
pub fn todo_address(
    authority: &Address,
    idx: u8,
    program_id: &Address,
) -> Result<Address, AddressError> {
    find_program_address(&[TODO_TAG, authority.as_ref(), &[idx]], program_id)
        .map(|(address, _)| address)
}
