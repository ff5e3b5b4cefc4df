//! Instruction values handed to a transaction-assembly layer

use crate::pubkey::Pubkey;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from reading an instruction back into its operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstructionError {
    /// The instruction targets a different program
    #[error("Incorrect program id: {0}")]
    IncorrectProgramId(Pubkey),

    /// The payload does not decode under the program's layout
    #[error("Invalid instruction data: {0}")]
    InvalidInstructionData(String),

    /// Fewer accounts than the operation binds positionally
    #[error("Not enough account keys: expected {expected}, found {found}")]
    NotEnoughAccountKeys { expected: usize, found: usize },
}

/// Describes how an instruction references one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    /// An account's public key
    pub pubkey: Pubkey,
    /// True if the transaction must carry a signature matching `pubkey`
    pub is_signer: bool,
    /// True if the account's data or balance may be modified
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account reference
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account reference
    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A program invocation: target program, ordered accounts and opaque data
///
/// Account order is part of the program's contract; the runtime binds
/// accounts by position, not by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Program that executes this instruction
    pub program_id: Pubkey,
    /// Accounts passed to the program, in order
    pub accounts: Vec<AccountMeta>,
    /// Opaque data passed to the program
    pub data: Vec<u8>,
}

impl Instruction {
    /// Build an instruction whose data is the bincode encoding of `data`
    ///
    /// # Panics
    /// Panics if `data` cannot be serialized. Instruction payloads here are
    /// fixed-width or length-prefixed, so a failure means the payload type
    /// itself is wrong.
    pub fn new_with_bincode<T: Serialize>(
        program_id: Pubkey,
        data: &T,
        accounts: Vec<AccountMeta>,
    ) -> Self {
        let data = bincode::serialize(data).expect("instruction data must serialize");
        Self::new_with_bytes(program_id, &data, accounts)
    }

    /// Build an instruction from an already encoded payload
    pub fn new_with_bytes(program_id: Pubkey, data: &[u8], accounts: Vec<AccountMeta>) -> Self {
        debug!(
            "Built instruction for program {} with {} accounts, data {}",
            program_id,
            accounts.len(),
            hex::encode(data)
        );
        Self {
            program_id,
            accounts,
            data: data.to_vec(),
        }
    }

    /// Keys that must sign a transaction carrying this instruction, in account order
    pub fn signers(&self) -> impl Iterator<Item = &Pubkey> {
        self.accounts
            .iter()
            .filter(|meta| meta.is_signer)
            .map(|meta| &meta.pubkey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_meta_flags() {
        let key = Pubkey::new_from_array([1u8; 32]);

        let meta = AccountMeta::new(key, true);
        assert!(meta.is_signer && meta.is_writable);

        let meta = AccountMeta::new(key, false);
        assert!(!meta.is_signer && meta.is_writable);

        let meta = AccountMeta::new_readonly(key, true);
        assert!(meta.is_signer && !meta.is_writable);

        let meta = AccountMeta::new_readonly(key, false);
        assert!(!meta.is_signer && !meta.is_writable);
    }

    #[test]
    fn test_new_with_bincode() {
        let program_id = Pubkey::new_from_array([3u8; 32]);
        let ix = Instruction::new_with_bincode(program_id, &(7u32, 42u64), vec![]);

        let mut expected = 7u32.to_le_bytes().to_vec();
        expected.extend_from_slice(&42u64.to_le_bytes());
        assert_eq!(ix.program_id, program_id);
        assert_eq!(ix.data, expected);
        assert!(ix.accounts.is_empty());
    }

    #[test]
    fn test_signers_in_account_order() {
        let a = Pubkey::new_from_array([1u8; 32]);
        let b = Pubkey::new_from_array([2u8; 32]);
        let c = Pubkey::new_from_array([3u8; 32]);
        let ix = Instruction::new_with_bytes(
            Pubkey::default(),
            &[],
            vec![
                AccountMeta::new_readonly(c, true),
                AccountMeta::new(b, false),
                AccountMeta::new(a, true),
            ],
        );

        let signers: Vec<&Pubkey> = ix.signers().collect();
        assert_eq!(signers, vec![&c, &a]);
    }

    #[test]
    fn test_instruction_json_roundtrip() {
        let ix = Instruction::new_with_bytes(
            Pubkey::new_from_array([5u8; 32]),
            &[1, 2, 3],
            vec![AccountMeta::new(Pubkey::new_from_array([6u8; 32]), true)],
        );
        let json = serde_json::to_string(&ix).unwrap();
        let decoded: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, ix);
    }
}
