pub mod address;
pub mod config;
pub mod constants;
pub mod ledger;
pub mod models;
pub mod session;
pub mod wallet;

pub use address::Address;
pub use config::CoreConfig;
pub use ledger::{InMemoryLedger, LedgerError, LedgerService, ProgramError, TodoClient};
pub use models::{ProgramAccount, TodoAccount, UserProfile};
pub use session::{Notice, NoticeLevel, TodoSession, TodoSnapshot};
pub use wallet::{DisconnectedWallet, KeypairWallet, Signature, Wallet};
