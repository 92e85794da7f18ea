use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::models::account::AccountData;

/// Per-user profile. One per authority, created by `initialize_user` and
/// never closed.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub authority: Address,
    /// Index the next todo will be created with
    pub last_todo: u8,
    /// Number of todos currently open (created minus removed)
    pub todo_count: u8,
}

impl UserProfile {
    pub fn new(authority: Address) -> Self {
        Self {
            authority,
            last_todo: 0,
            todo_count: 0,
        }
    }
}

impl AccountData for UserProfile {
    const NAME: &'static str = "UserProfile";
    // discriminator + authority + last_todo + todo_count
    const SPACE: usize = 8 + 32 + 1 + 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AUTHORITY_OFFSET;
    use crate::models::AccountError;

    #[test]
    fn test_discriminator_matches_published_interface() {
        assert_eq!(
            UserProfile::discriminator(),
            [32, 37, 119, 205, 179, 180, 13, 194]
        );
    }

    #[test]
    fn test_layout_places_authority_after_discriminator() {
        let owner = Address::new_from_array([9u8; 32]);
        let profile = UserProfile {
            authority: owner,
            last_todo: 4,
            todo_count: 2,
        };
        let data = profile.to_account_data().unwrap();
        assert_eq!(data.len(), UserProfile::SPACE);
        assert_eq!(&data[AUTHORITY_OFFSET..AUTHORITY_OFFSET + 32], owner.as_ref());
        assert_eq!(&data[40..], &[4, 2]);
        assert_eq!(UserProfile::from_account_data(&data).unwrap(), profile);
    }

    #[test]
    fn test_rejects_foreign_discriminator() {
        let mut data = UserProfile::default().to_account_data().unwrap();
        data[0] ^= 0xff;
        assert_eq!(
            UserProfile::from_account_data(&data),
            Err(AccountError::DiscriminatorMismatch("UserProfile"))
        );
    }

    #[test]
    fn test_rejects_data_without_discriminator() {
        assert_eq!(
            UserProfile::from_account_data(&[1, 2, 3]),
            Err(AccountError::MissingDiscriminator(3))
        );
    }
}
