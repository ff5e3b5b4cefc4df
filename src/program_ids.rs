//! Well-known account identifiers and fixed sizes used by system instructions

use crate::pubkey::Pubkey;

/// System program identifier (all zero bytes, `11111111111111111111111111111111`)
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0u8; 32]);

/// Recent blockhashes sysvar (`SysvarRecentB1ockHashes11111111111111111111`)
pub const SYSVAR_RECENT_BLOCKHASHES_ID: Pubkey = Pubkey::new_from_array([
    6, 167, 213, 23, 25, 44, 86, 142, 224, 138, 132, 95, 115, 210, 151, 136, 207, 3, 92, 49, 69,
    178, 26, 179, 68, 216, 6, 46, 169, 64, 0, 0,
]);

/// Rent sysvar (`SysvarRent111111111111111111111111111111111`)
pub const SYSVAR_RENT_ID: Pubkey = Pubkey::new_from_array([
    6, 167, 213, 23, 25, 44, 92, 81, 33, 140, 201, 76, 61, 74, 241, 127, 88, 218, 238, 8, 155,
    161, 253, 68, 227, 219, 217, 138, 0, 0, 0, 0,
]);

/// Size in bytes of an initialized nonce account's state
pub const NONCE_STATE_SIZE: u64 = 80;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_ids() {
        assert_eq!(
            SYSTEM_PROGRAM_ID.to_string(),
            "11111111111111111111111111111111"
        );
        assert_eq!(
            SYSVAR_RECENT_BLOCKHASHES_ID.to_string(),
            "SysvarRecentB1ockHashes11111111111111111111"
        );
        assert_eq!(
            SYSVAR_RENT_ID.to_string(),
            "SysvarRent111111111111111111111111111111111"
        );
    }

    #[test]
    fn test_well_known_ids_are_distinct() {
        assert_ne!(SYSTEM_PROGRAM_ID, SYSVAR_RECENT_BLOCKHASHES_ID);
        assert_ne!(SYSTEM_PROGRAM_ID, SYSVAR_RENT_ID);
        assert_ne!(SYSVAR_RECENT_BLOCKHASHES_ID, SYSVAR_RENT_ID);
    }
}
