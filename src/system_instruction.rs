//! System program instructions: account creation, transfers, ownership,
//! allocation, seed-derived variants and nonce account management.
//!
//! Payload layout (bincode, fixed-int little-endian):
//! - Discriminant: u32 (4 bytes), one of the `SYSTEM_INSTRUCTION_*` constants
//! - u64 fields: 8 bytes each
//! - Pubkey fields: 32 raw bytes
//! - Seed strings: u64 byte length followed by the UTF-8 bytes
//!
//! Fields follow the discriminant in declaration order with no padding.

use crate::{
    instruction::{AccountMeta, Instruction, InstructionError},
    program_ids::{
        NONCE_STATE_SIZE, SYSTEM_PROGRAM_ID, SYSVAR_RECENT_BLOCKHASHES_ID, SYSVAR_RENT_ID,
    },
    pubkey::Pubkey,
};
use bincode::Options;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const SYSTEM_INSTRUCTION_CREATE_ACCOUNT: u32 = 0x00;
pub const SYSTEM_INSTRUCTION_ASSIGN: u32 = 0x01;
pub const SYSTEM_INSTRUCTION_TRANSFER: u32 = 0x02;
pub const SYSTEM_INSTRUCTION_CREATE_ACCOUNT_WITH_SEED: u32 = 0x03;
pub const SYSTEM_INSTRUCTION_ADVANCE_NONCE_ACCOUNT: u32 = 0x04;
pub const SYSTEM_INSTRUCTION_WITHDRAW_NONCE_ACCOUNT: u32 = 0x05;
pub const SYSTEM_INSTRUCTION_INITIALIZE_NONCE_ACCOUNT: u32 = 0x06;
pub const SYSTEM_INSTRUCTION_AUTHORIZE_NONCE_ACCOUNT: u32 = 0x07;
pub const SYSTEM_INSTRUCTION_ALLOCATE: u32 = 0x08;
pub const SYSTEM_INSTRUCTION_ALLOCATE_WITH_SEED: u32 = 0x09;
pub const SYSTEM_INSTRUCTION_ASSIGN_WITH_SEED: u32 = 0x0A;
pub const SYSTEM_INSTRUCTION_TRANSFER_WITH_SEED: u32 = 0x0B;

/// A system program operation and its payload fields
///
/// Variant order is the wire discriminant and must never change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum SystemInstruction {
    /// Create a new account
    ///
    /// Accounts:
    ///   0. `[WRITE, SIGNER]` Funding account
    ///   1. `[WRITE, SIGNER]` New account
    CreateAccount {
        /// Lamports to transfer to the new account
        lamports: u64,
        /// Bytes of memory to allocate
        space: u64,
        /// Program that will own the new account
        owner: Pubkey,
    },

    /// Assign account to a program
    ///
    /// Accounts:
    ///   0. `[WRITE, SIGNER]` Assigned account
    Assign { owner: Pubkey },

    /// Transfer lamports
    ///
    /// Accounts:
    ///   0. `[WRITE, SIGNER]` Funding account
    ///   1. `[WRITE]` Recipient account
    Transfer { lamports: u64 },

    /// Create a new account at an address derived from a base key and a seed
    ///
    /// Accounts:
    ///   0. `[WRITE, SIGNER]` Funding account
    ///   1. `[WRITE]` Created account
    ///   2. `[SIGNER]` (optional) Base account; omitted when it is the funding account
    CreateAccountWithSeed {
        base: Pubkey,
        seed: String,
        lamports: u64,
        space: u64,
        owner: Pubkey,
    },

    /// Consume the stored nonce, replacing it with a successor
    ///
    /// Accounts:
    ///   0. `[WRITE]` Nonce account
    ///   1. `[]` Recent blockhashes sysvar
    ///   2. `[SIGNER]` Nonce authority
    AdvanceNonceAccount,

    /// Withdraw lamports from a nonce account
    ///
    /// Accounts:
    ///   0. `[WRITE]` Nonce account
    ///   1. `[WRITE]` Recipient account
    ///   2. `[]` Recent blockhashes sysvar
    ///   3. `[]` Rent sysvar
    ///   4. `[SIGNER]` Nonce authority
    ///
    /// The `u64` parameter is the lamports to withdraw, which must leave the
    /// account balance above the rent exempt reserve or at zero.
    WithdrawNonceAccount(u64),

    /// Drive an uninitialized nonce account to the initialized state
    ///
    /// Accounts:
    ///   0. `[WRITE]` Nonce account
    ///   1. `[]` Recent blockhashes sysvar
    ///   2. `[]` Rent sysvar
    ///
    /// The `Pubkey` parameter is the entity authorized to operate the account.
    InitializeNonceAccount(Pubkey),

    /// Change the entity authorized to operate a nonce account
    ///
    /// Accounts:
    ///   0. `[WRITE]` Nonce account
    ///   1. `[SIGNER]` Current nonce authority
    AuthorizeNonceAccount(Pubkey),

    /// Allocate space in a (possibly new) account without funding
    ///
    /// Accounts:
    ///   0. `[WRITE, SIGNER]` New account
    Allocate { space: u64 },

    /// Allocate space for and assign an account at an address derived from a base key and a seed
    ///
    /// Accounts:
    ///   0. `[WRITE]` Allocated account
    ///   1. `[SIGNER]` Base account
    AllocateWithSeed {
        base: Pubkey,
        seed: String,
        space: u64,
        owner: Pubkey,
    },

    /// Assign an account at a seed-derived address to a program
    ///
    /// Accounts:
    ///   0. `[WRITE]` Assigned account
    ///   1. `[SIGNER]` Base account
    AssignWithSeed {
        base: Pubkey,
        seed: String,
        owner: Pubkey,
    },

    /// Transfer lamports from a seed-derived address
    ///
    /// Accounts:
    ///   0. `[WRITE]` Funding account
    ///   1. `[SIGNER]` Base for the funding account
    ///   2. `[WRITE]` Recipient account
    TransferWithSeed {
        lamports: u64,
        from_seed: String,
        from_owner: Pubkey,
    },
}

impl SystemInstruction {
    /// Wire discriminant of this operation
    pub fn tag(&self) -> u32 {
        match self {
            Self::CreateAccount { .. } => SYSTEM_INSTRUCTION_CREATE_ACCOUNT,
            Self::Assign { .. } => SYSTEM_INSTRUCTION_ASSIGN,
            Self::Transfer { .. } => SYSTEM_INSTRUCTION_TRANSFER,
            Self::CreateAccountWithSeed { .. } => SYSTEM_INSTRUCTION_CREATE_ACCOUNT_WITH_SEED,
            Self::AdvanceNonceAccount => SYSTEM_INSTRUCTION_ADVANCE_NONCE_ACCOUNT,
            Self::WithdrawNonceAccount(_) => SYSTEM_INSTRUCTION_WITHDRAW_NONCE_ACCOUNT,
            Self::InitializeNonceAccount(_) => SYSTEM_INSTRUCTION_INITIALIZE_NONCE_ACCOUNT,
            Self::AuthorizeNonceAccount(_) => SYSTEM_INSTRUCTION_AUTHORIZE_NONCE_ACCOUNT,
            Self::Allocate { .. } => SYSTEM_INSTRUCTION_ALLOCATE,
            Self::AllocateWithSeed { .. } => SYSTEM_INSTRUCTION_ALLOCATE_WITH_SEED,
            Self::AssignWithSeed { .. } => SYSTEM_INSTRUCTION_ASSIGN_WITH_SEED,
            Self::TransferWithSeed { .. } => SYSTEM_INSTRUCTION_TRANSFER_WITH_SEED,
        }
    }

    /// Number of accounts the operation always binds
    ///
    /// `CreateAccountWithSeed` binds a third (base) account only when the base
    /// differs from the funding account.
    pub fn min_accounts(&self) -> usize {
        match self {
            Self::Assign { .. } | Self::Allocate { .. } => 1,
            Self::CreateAccount { .. }
            | Self::Transfer { .. }
            | Self::CreateAccountWithSeed { .. }
            | Self::AuthorizeNonceAccount(_)
            | Self::AllocateWithSeed { .. }
            | Self::AssignWithSeed { .. } => 2,
            Self::AdvanceNonceAccount
            | Self::InitializeNonceAccount(_)
            | Self::TransferWithSeed { .. } => 3,
            Self::WithdrawNonceAccount(_) => 5,
        }
    }

    /// Encode the payload bytes
    pub fn pack(&self) -> Vec<u8> {
        bincode::serialize(self).expect("system instruction must serialize")
    }

    /// Decode payload bytes produced by [`SystemInstruction::pack`]
    ///
    /// # Errors
    /// Returns `InvalidInstructionData` for unknown discriminants, truncated
    /// fields, non UTF-8 seeds, or trailing bytes
    pub fn unpack(data: &[u8]) -> Result<Self, InstructionError> {
        // A length prefix can never claim more bytes than the input holds
        bincode::DefaultOptions::new()
            .with_limit(data.len() as u64)
            .with_fixint_encoding()
            .reject_trailing_bytes()
            .deserialize(data)
            .map_err(|e| {
                debug!("Rejected system instruction data {}: {}", hex::encode(data), e);
                InstructionError::InvalidInstructionData(e.to_string())
            })
    }
}

/// Read a system program instruction back into its operation
///
/// # Errors
/// Fails if the instruction targets another program, its data does not
/// decode, or it carries fewer accounts than the operation binds
pub fn parse_instruction(instruction: &Instruction) -> Result<SystemInstruction, InstructionError> {
    if instruction.program_id != SYSTEM_PROGRAM_ID {
        return Err(InstructionError::IncorrectProgramId(instruction.program_id));
    }
    let system_instruction = SystemInstruction::unpack(&instruction.data)?;
    let expected = system_instruction.min_accounts();
    if instruction.accounts.len() < expected {
        return Err(InstructionError::NotEnoughAccountKeys {
            expected,
            found: instruction.accounts.len(),
        });
    }
    Ok(system_instruction)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccountParams {
    pub from_pubkey: Pubkey,
    pub new_account_pubkey: Pubkey,
    pub lamports: u64,
    pub space: u64,
    pub owner: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignParams {
    pub account_pubkey: Pubkey,
    pub owner: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferParams {
    pub from_pubkey: Pubkey,
    pub to_pubkey: Pubkey,
    pub lamports: u64,
}

/// Parameters for [`create_account_with_seed`]
///
/// `to_pubkey` is normally `Pubkey::create_with_seed(&base, &seed, &owner)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccountWithSeedParams {
    pub from_pubkey: Pubkey,
    pub to_pubkey: Pubkey,
    pub base: Pubkey,
    pub seed: String,
    pub lamports: u64,
    pub space: u64,
    pub owner: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceNonceAccountParams {
    pub nonce_pubkey: Pubkey,
    pub authorized_pubkey: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawNonceAccountParams {
    pub nonce_pubkey: Pubkey,
    pub authorized_pubkey: Pubkey,
    pub to_pubkey: Pubkey,
    pub lamports: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeNonceAccountParams {
    pub nonce_pubkey: Pubkey,
    pub authority: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeNonceAccountParams {
    pub nonce_pubkey: Pubkey,
    pub authorized_pubkey: Pubkey,
    pub new_authority: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocateParams {
    pub account_pubkey: Pubkey,
    pub space: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocateWithSeedParams {
    pub address: Pubkey,
    pub base: Pubkey,
    pub seed: String,
    pub space: u64,
    pub owner: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignWithSeedParams {
    pub address: Pubkey,
    pub base: Pubkey,
    pub seed: String,
    pub owner: Pubkey,
}

/// Parameters for [`transfer_with_seed`]
///
/// `from_pubkey` is normally `Pubkey::create_with_seed(&from_base, &from_seed, &from_owner)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferWithSeedParams {
    pub from_pubkey: Pubkey,
    pub from_base: Pubkey,
    pub from_seed: String,
    pub from_owner: Pubkey,
    pub to_pubkey: Pubkey,
    pub lamports: u64,
}

pub fn create_account(params: CreateAccountParams) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(params.from_pubkey, true),
        AccountMeta::new(params.new_account_pubkey, true),
    ];
    Instruction::new_with_bincode(
        SYSTEM_PROGRAM_ID,
        &SystemInstruction::CreateAccount {
            lamports: params.lamports,
            space: params.space,
            owner: params.owner,
        },
        account_metas,
    )
}

pub fn assign(params: AssignParams) -> Instruction {
    let account_metas = vec![AccountMeta::new(params.account_pubkey, true)];
    Instruction::new_with_bincode(
        SYSTEM_PROGRAM_ID,
        &SystemInstruction::Assign {
            owner: params.owner,
        },
        account_metas,
    )
}

pub fn transfer(params: TransferParams) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(params.from_pubkey, true),
        AccountMeta::new(params.to_pubkey, false),
    ];
    Instruction::new_with_bincode(
        SYSTEM_PROGRAM_ID,
        &SystemInstruction::Transfer {
            lamports: params.lamports,
        },
        account_metas,
    )
}

/// Create an account at a seed-derived address
///
/// The base account is only listed when it differs from the funding account,
/// which already carries its signature.
pub fn create_account_with_seed(params: CreateAccountWithSeedParams) -> Instruction {
    let mut account_metas = Vec::with_capacity(3);
    account_metas.push(AccountMeta::new(params.from_pubkey, true));
    account_metas.push(AccountMeta::new(params.to_pubkey, false));
    if params.base != params.from_pubkey {
        account_metas.push(AccountMeta::new_readonly(params.base, true));
    }

    Instruction::new_with_bincode(
        SYSTEM_PROGRAM_ID,
        &SystemInstruction::CreateAccountWithSeed {
            base: params.base,
            seed: params.seed,
            lamports: params.lamports,
            space: params.space,
            owner: params.owner,
        },
        account_metas,
    )
}

pub fn advance_nonce_account(params: AdvanceNonceAccountParams) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(params.nonce_pubkey, false),
        AccountMeta::new_readonly(SYSVAR_RECENT_BLOCKHASHES_ID, false),
        AccountMeta::new_readonly(params.authorized_pubkey, true),
    ];
    Instruction::new_with_bincode(
        SYSTEM_PROGRAM_ID,
        &SystemInstruction::AdvanceNonceAccount,
        account_metas,
    )
}

pub fn withdraw_nonce_account(params: WithdrawNonceAccountParams) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(params.nonce_pubkey, false),
        AccountMeta::new(params.to_pubkey, false),
        AccountMeta::new_readonly(SYSVAR_RECENT_BLOCKHASHES_ID, false),
        AccountMeta::new_readonly(SYSVAR_RENT_ID, false),
        AccountMeta::new_readonly(params.authorized_pubkey, true),
    ];
    Instruction::new_with_bincode(
        SYSTEM_PROGRAM_ID,
        &SystemInstruction::WithdrawNonceAccount(params.lamports),
        account_metas,
    )
}

pub fn initialize_nonce_account(params: InitializeNonceAccountParams) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(params.nonce_pubkey, false),
        AccountMeta::new_readonly(SYSVAR_RECENT_BLOCKHASHES_ID, false),
        AccountMeta::new_readonly(SYSVAR_RENT_ID, false),
    ];
    Instruction::new_with_bincode(
        SYSTEM_PROGRAM_ID,
        &SystemInstruction::InitializeNonceAccount(params.authority),
        account_metas,
    )
}

pub fn authorize_nonce_account(params: AuthorizeNonceAccountParams) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(params.nonce_pubkey, false),
        AccountMeta::new_readonly(params.authorized_pubkey, true),
    ];
    Instruction::new_with_bincode(
        SYSTEM_PROGRAM_ID,
        &SystemInstruction::AuthorizeNonceAccount(params.new_authority),
        account_metas,
    )
}

pub fn allocate(params: AllocateParams) -> Instruction {
    let account_metas = vec![AccountMeta::new(params.account_pubkey, true)];
    Instruction::new_with_bincode(
        SYSTEM_PROGRAM_ID,
        &SystemInstruction::Allocate {
            space: params.space,
        },
        account_metas,
    )
}

pub fn allocate_with_seed(params: AllocateWithSeedParams) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(params.address, false),
        AccountMeta::new_readonly(params.base, true),
    ];
    Instruction::new_with_bincode(
        SYSTEM_PROGRAM_ID,
        &SystemInstruction::AllocateWithSeed {
            base: params.base,
            seed: params.seed,
            space: params.space,
            owner: params.owner,
        },
        account_metas,
    )
}

pub fn assign_with_seed(params: AssignWithSeedParams) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(params.address, false),
        AccountMeta::new_readonly(params.base, true),
    ];
    Instruction::new_with_bincode(
        SYSTEM_PROGRAM_ID,
        &SystemInstruction::AssignWithSeed {
            base: params.base,
            seed: params.seed,
            owner: params.owner,
        },
        account_metas,
    )
}

/// Transfer lamports out of a seed-derived account
///
/// The base key is a signer but is not part of the payload; the runtime
/// reads it from account 1.
pub fn transfer_with_seed(params: TransferWithSeedParams) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(params.from_pubkey, false),
        AccountMeta::new_readonly(params.from_base, true),
        AccountMeta::new(params.to_pubkey, false),
    ];
    Instruction::new_with_bincode(
        SYSTEM_PROGRAM_ID,
        &SystemInstruction::TransferWithSeed {
            lamports: params.lamports,
            from_seed: params.from_seed,
            from_owner: params.from_owner,
        },
        account_metas,
    )
}

/// Create and initialize a nonce account owned by the system program
pub fn create_nonce_account(
    from_pubkey: &Pubkey,
    nonce_pubkey: &Pubkey,
    authority: &Pubkey,
    lamports: u64,
) -> Vec<Instruction> {
    vec![
        create_account(CreateAccountParams {
            from_pubkey: *from_pubkey,
            new_account_pubkey: *nonce_pubkey,
            lamports,
            space: NONCE_STATE_SIZE,
            owner: SYSTEM_PROGRAM_ID,
        }),
        initialize_nonce_account(InitializeNonceAccountParams {
            nonce_pubkey: *nonce_pubkey,
            authority: *authority,
        }),
    ]
}

/// Create and initialize a nonce account at a seed-derived address
pub fn create_nonce_account_with_seed(
    from_pubkey: &Pubkey,
    nonce_pubkey: &Pubkey,
    base: &Pubkey,
    seed: &str,
    authority: &Pubkey,
    lamports: u64,
) -> Vec<Instruction> {
    vec![
        create_account_with_seed(CreateAccountWithSeedParams {
            from_pubkey: *from_pubkey,
            to_pubkey: *nonce_pubkey,
            base: *base,
            seed: seed.to_string(),
            lamports,
            space: NONCE_STATE_SIZE,
            owner: SYSTEM_PROGRAM_ID,
        }),
        initialize_nonce_account(InitializeNonceAccountParams {
            nonce_pubkey: *nonce_pubkey,
            authority: *authority,
        }),
    ]
}

/// One transfer instruction per `(recipient, lamports)` pair, in order
pub fn transfer_many(from_pubkey: &Pubkey, to_lamports: &[(Pubkey, u64)]) -> Vec<Instruction> {
    to_lamports
        .iter()
        .map(|(to_pubkey, lamports)| {
            transfer(TransferParams {
                from_pubkey: *from_pubkey,
                to_pubkey: *to_pubkey,
                lamports: *lamports,
            })
        })
        .collect()
}
