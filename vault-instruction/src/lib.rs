pub mod accounts;
pub mod instruction;

pub use instruction::{
    decode, encode, DecodeError, DepositInstruction, VaultInstruction, WithdrawInstruction,
    INSTRUCTION_LEN,
};
