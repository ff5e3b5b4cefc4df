//! Account addresses: a 32-byte key with a base58 text form.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub const PUBKEY_BYTES: usize = 32;
/// Longest seed, in bytes, accepted by [`Pubkey::create_with_seed`]
pub const MAX_SEED_LEN: usize = 32;
// 32 bytes of 0xff encode to 44 base58 digits
const MAX_BASE58_LEN: usize = 44;

// Owners ending in this marker would let a seed address collide with a program address.
const PDA_MARKER: &[u8; 21] = b"ProgramDerivedAddress";

/// Seed address derivation errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PubkeyError {
    #[error("Seed exceeds 32 bytes")]
    MaxSeedLengthExceeded,

    /// Owner keys reserved for program-derived addresses
    #[error("Owner cannot be used for seed addresses")]
    IllegalOwner,
}

/// Address string parsing errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePubkeyError {
    /// Decoded to something other than 32 bytes
    #[error("Address does not decode to 32 bytes")]
    WrongSize,
    #[error("Address is not valid base58")]
    Invalid,
}

/// A public key identifying an account on the ledger
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pubkey([u8; PUBKEY_BYTES]);

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }

    /// Build a key from a slice that must be exactly 32 bytes long
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, ParsePubkeyError> {
        let bytes: [u8; PUBKEY_BYTES] =
            bytes.try_into().map_err(|_| ParsePubkeyError::WrongSize)?;
        Ok(Self(bytes))
    }

    pub const fn to_bytes(self) -> [u8; PUBKEY_BYTES] {
        self.0
    }

    pub const fn as_array(&self) -> &[u8; PUBKEY_BYTES] {
        &self.0
    }

    /// Derive the address of a seed account
    ///
    /// The address is `sha256(base || seed || owner)`. The same triple must be
    /// passed to the seed-based system instructions that create or use it.
    ///
    /// # Errors
    /// Returns an error if the seed is longer than [`MAX_SEED_LEN`] bytes or
    /// the owner ends with the program-derived-address marker
    pub fn create_with_seed(
        base: &Pubkey,
        seed: &str,
        owner: &Pubkey,
    ) -> Result<Pubkey, PubkeyError> {
        if seed.len() > MAX_SEED_LEN {
            return Err(PubkeyError::MaxSeedLengthExceeded);
        }

        let owner = owner.as_ref();
        if owner.ends_with(PDA_MARKER) {
            return Err(PubkeyError::IllegalOwner);
        }

        let mut hasher = Sha256::new();
        hasher.update(base.as_ref());
        hasher.update(seed.as_bytes());
        hasher.update(owner);

        let mut derived = [0u8; PUBKEY_BYTES];
        derived.copy_from_slice(&hasher.finalize());
        Ok(Pubkey(derived))
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; PUBKEY_BYTES]> for Pubkey {
    fn from(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Pubkey {
    type Err = ParsePubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_BASE58_LEN {
            return Err(ParsePubkeyError::WrongSize);
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| ParsePubkeyError::Invalid)?;
        Self::try_from_slice(&bytes)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_pubkey_string_roundtrip() {
        let mut rng = rand::rng();
        let mut bytes = [0u8; PUBKEY_BYTES];
        for _ in 0..1_000 {
            rng.fill_bytes(&mut bytes);
            let pubkey = Pubkey::new_from_array(bytes);
            let parsed: Pubkey = pubkey.to_string().parse().unwrap();
            assert_eq!(parsed, pubkey);
        }
    }

    #[test]
    fn test_pubkey_display() {
        assert_eq!(
            Pubkey::default().to_string(),
            "11111111111111111111111111111111"
        );
        assert_eq!(
            Pubkey::new_from_array([1u8; 32]).to_string(),
            "4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi"
        );
    }

    #[test]
    fn test_pubkey_parse_errors() {
        // Too long to be a key
        let too_long = "1".repeat(MAX_BASE58_LEN + 1);
        assert_eq!(
            too_long.parse::<Pubkey>(),
            Err(ParsePubkeyError::WrongSize)
        );

        // Valid base58 but only a few bytes
        assert_eq!("abc".parse::<Pubkey>(), Err(ParsePubkeyError::WrongSize));

        // '0', 'O', 'I' and 'l' are not in the base58 alphabet
        assert_eq!(
            "0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl".parse::<Pubkey>(),
            Err(ParsePubkeyError::Invalid)
        );
    }

    #[test]
    fn test_try_from_slice() {
        assert!(Pubkey::try_from_slice(&[7u8; 32]).is_ok());
        assert_eq!(
            Pubkey::try_from_slice(&[7u8; 31]),
            Err(ParsePubkeyError::WrongSize)
        );
        assert_eq!(
            Pubkey::try_from_slice(&[7u8; 33]),
            Err(ParsePubkeyError::WrongSize)
        );
    }

    #[test]
    fn test_create_with_seed() {
        let escrow = Pubkey::create_with_seed(
            &Pubkey::new_from_array([7u8; 32]),
            "escrow-2024",
            &Pubkey::new_from_array([9u8; 32]),
        )
        .unwrap();
        assert_eq!(
            escrow.to_string(),
            "4gtSCs3GwGRSgUo89VQbDMovRdy7jHRaufnhANEjwxxU"
        );

        let base = Pubkey::new_from_array([1u8; 32]);
        assert_eq!(
            Pubkey::create_with_seed(&base, "nonce", &Pubkey::default()),
            Ok("78rY6AGVhAG6EBHyMg1d5QqzyTkL155xjf3GTUhbwpbg"
                .parse()
                .unwrap())
        );
    }

    #[test]
    fn test_create_with_seed_limits() {
        let base = Pubkey::new_from_array([1u8; 32]);
        let owner = Pubkey::new_from_array([2u8; 32]);

        let max_seed = "x".repeat(MAX_SEED_LEN);
        assert!(Pubkey::create_with_seed(&base, &max_seed, &owner).is_ok());

        let long_seed = "x".repeat(MAX_SEED_LEN + 1);
        assert_eq!(
            Pubkey::create_with_seed(&base, &long_seed, &owner),
            Err(PubkeyError::MaxSeedLengthExceeded)
        );

        // Seed length is measured in bytes: 11 three-byte chars exceed the limit
        let wide_seed = "\u{2603}".repeat(11);
        assert_eq!(
            Pubkey::create_with_seed(&base, &wide_seed, &owner),
            Err(PubkeyError::MaxSeedLengthExceeded)
        );

        let mut marked_owner = [0u8; 32];
        marked_owner[32 - PDA_MARKER.len()..].copy_from_slice(PDA_MARKER);
        assert_eq!(
            Pubkey::create_with_seed(&base, "seed", &Pubkey::new_from_array(marked_owner)),
            Err(PubkeyError::IllegalOwner)
        );
    }

    #[test]
    fn test_pubkey_serializes_as_raw_bytes() {
        let pubkey = Pubkey::new_from_array([9u8; 32]);
        let bytes = bincode::serialize(&pubkey).unwrap();
        assert_eq!(bytes, vec![9u8; 32]);
    }
}
