pub mod account;
pub mod filter;
pub mod profile;
pub mod todo;

pub use account::{discriminator, AccountData, AccountError, ProgramAccount};
pub use filter::{authority_filter, AccountFilter};
pub use profile::UserProfile;
pub use todo::TodoAccount;
