//! Program-wide constants
//!
//! Seeds, offsets and identifiers shared by the address derivation, the
//! account codec and the ledger simulator.

/// Published id of the on-chain todo program (base58)
pub const PROGRAM_ID: &str = "3frmuBcq8XhKsPCLYNr9cUoSr83y8kdj91bMptsDSaVp";

/// Seed tag for the per-user profile account
pub const USER_TAG: &[u8] = b"USER_STATE";

/// Seed tag for individual todo accounts
pub const TODO_TAG: &[u8] = b"TODO_STATE";

/// Length of the account/instruction discriminator prefix
pub const DISCRIMINATOR_LEN: usize = 8;

/// Byte offset of the `authority` field in every account owned by the program.
/// Accounts start with the discriminator, so the owner key follows right after it.
pub const AUTHORITY_OFFSET: usize = DISCRIMINATOR_LEN;

/// First custom error code emitted by the program
pub const PROGRAM_ERROR_BASE: u32 = 6000;

// Notice texts surfaced to the user after a write settles
pub mod notices {
    pub const INITIALIZE_OK: &str = "Successfully initialized user";
    pub const INITIALIZE_FAILED: &str = "Failed to initialize user";
    pub const ADD_OK: &str = "Successfully added todo";
    pub const ADD_FAILED: &str = "Failed to add todo";
    pub const MARK_OK: &str = "Successfully marked todo";
    pub const MARK_FAILED: &str = "Failed to mark todo";
    pub const REMOVE_OK: &str = "Successfully removed todo";
    pub const REMOVE_FAILED: &str = "Failed to remove todo";
}
