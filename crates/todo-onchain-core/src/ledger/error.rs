use crate::address::{Address, AddressError};
use crate::constants::PROGRAM_ERROR_BASE;
use crate::models::AccountError;
use crate::wallet::WalletError;

/// Custom errors raised by the todo program itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("You are not authorized to perform this action.")]
    Unauthorized,
    #[error("Not allowed")]
    NotAllowed,
    #[error("Math operation overflow")]
    MathOverflow,
    #[error("Already marked")]
    AlreadyMarked,
}

impl ProgramError {
    pub fn code(&self) -> u32 {
        let offset = match self {
            ProgramError::Unauthorized => 0,
            ProgramError::NotAllowed => 1,
            ProgramError::MathOverflow => 2,
            ProgramError::AlreadyMarked => 3,
        };
        PROGRAM_ERROR_BASE + offset
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("program error {code}: {0}", code = .0.code())]
    Program(ProgramError),
    #[error("account not found: {0}")]
    AccountNotFound(Address),
    #[error("account already in use: {0}")]
    AccountAlreadyInUse(Address),
    #[error("seeds constraint violated for {0}")]
    SeedsMismatch(Address),
    #[error("missing required account {0}")]
    MissingAccount(&'static str),
    #[error("transaction targets program {0}")]
    WrongProgram(Address),
    #[error("signature verification failed")]
    InvalidSignature,
    #[error("account {address} needs {needed} bytes but only {space} are allocated")]
    AccountDidNotSerialize {
        address: Address,
        needed: usize,
        space: usize,
    },
    #[error("invalid account data: {0}")]
    InvalidAccountData(#[from] AccountError),
    #[error("address derivation failed: {0}")]
    Address(#[from] AddressError),
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<ProgramError> for LedgerError {
    fn from(error: ProgramError) -> Self {
        LedgerError::Program(error)
    }
}
