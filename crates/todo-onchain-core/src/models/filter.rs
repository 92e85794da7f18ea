use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::constants::AUTHORITY_OFFSET;

/// Server-side filter applied to raw account data when listing accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountFilter {
    /// Data at `offset` must equal `bytes`
    Memcmp { offset: usize, bytes: Vec<u8> },
    /// Data must be exactly this long
    DataSize(usize),
}

impl AccountFilter {
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            AccountFilter::Memcmp { offset, bytes } => data
                .get(*offset..offset.saturating_add(bytes.len()))
                .map(|window| window == bytes.as_slice())
                .unwrap_or(false),
            AccountFilter::DataSize(size) => data.len() == *size,
        }
    }
}

/// Select only accounts whose `authority` field equals `owner`
pub fn authority_filter(owner: &Address) -> AccountFilter {
    AccountFilter::Memcmp {
        offset: AUTHORITY_OFFSET,
        bytes: owner.to_bytes().to_vec(),
    }
}
