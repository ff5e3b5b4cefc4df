pub mod instruction;
pub mod program_ids;
pub mod pubkey;
pub mod system_instruction;


// re-export types
pub use instruction::{AccountMeta, Instruction, InstructionError};
pub use pubkey::{ParsePubkeyError, Pubkey, PubkeyError};
pub use system_instruction::SystemInstruction;

// re-export well-known ids
pub use program_ids::{SYSTEM_PROGRAM_ID, SYSVAR_RECENT_BLOCKHASHES_ID, SYSVAR_RENT_ID};
