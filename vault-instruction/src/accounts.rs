use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::instruction::{DepositInstruction, WithdrawInstruction};

pub const VAULT_SEED: &[u8] = b"vault";

/// Vault PDA owned by `owner`, with its bump seed.
pub fn vault_address(owner: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, owner.as_ref()], program_id)
}

/// 0. `[signer, writable]` owner
/// 1. `[writable]` vault
/// 2. `[]` system program
fn vault_accounts(owner: &Pubkey, vault: &Pubkey) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(*owner, true),
        AccountMeta::new(*vault, false),
        AccountMeta::new_readonly(system_program::ID, false),
    ]
}

pub fn withdraw(program_id: &Pubkey, owner: &Pubkey, vault: &Pubkey, amount: u64) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vault_accounts(owner, vault),
        data: WithdrawInstruction::new(amount).encode().to_vec(),
    }
}

pub fn deposit(program_id: &Pubkey, owner: &Pubkey, vault: &Pubkey, amount: u64) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vault_accounts(owner, vault),
        data: DepositInstruction::new(amount).encode().to_vec(),
    }
}
