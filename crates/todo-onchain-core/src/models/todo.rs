use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::models::account::AccountData;

/// A single todo entry owned by `authority`
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct TodoAccount {
    pub authority: Address,
    /// Sequence index assigned at creation. Stable for the item's lifetime and
    /// never reused for the same owner.
    pub idx: u8,
    pub content: String,
    pub marked: bool,
}

impl TodoAccount {
    /// Longest content (in bytes) that still fits the allocated account
    pub const MAX_CONTENT_LEN: usize = Self::SPACE - 8 - 32 - 1 - 4 - 1;
}

impl AccountData for TodoAccount {
    const NAME: &'static str = "TodoAccount";
    // The program sizes todo accounts by the in-memory struct (64 bytes on
    // 64-bit targets), not by the encoded content.
    const SPACE: usize = 8 + 64;
}
