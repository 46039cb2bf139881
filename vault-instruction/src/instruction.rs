use arrayref::{array_ref, array_refs, mut_array_refs};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::program_error::ProgramError;
use thiserror::Error;

/// Every vault instruction is one tag byte followed by a little-endian `u64`.
pub const INSTRUCTION_LEN: usize = 9;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid instruction length: expected 9 bytes, got {len}")]
    InvalidLength { len: usize },
    #[error("invalid instruction tag: {tag}")]
    InvalidTag { tag: u8 },
}

impl From<DecodeError> for ProgramError {
    fn from(_: DecodeError) -> Self {
        ProgramError::InvalidInstructionData
    }
}

fn pack_tagged(tag: u8, amount: u64) -> [u8; INSTRUCTION_LEN] {
    let mut dst = [0u8; INSTRUCTION_LEN];
    let (tag_dst, amount_dst) = mut_array_refs![&mut dst, 1, 8];
    tag_dst[0] = tag;
    *amount_dst = amount.to_le_bytes();
    dst
}

fn unpack_tagged(src: &[u8]) -> Result<(u8, u64), DecodeError> {
    if src.len() != INSTRUCTION_LEN {
        return Err(DecodeError::InvalidLength { len: src.len() });
    }
    let src = array_ref![src, 0, INSTRUCTION_LEN];
    let (tag, amount) = array_refs![src, 1, 8];
    Ok((tag[0], u64::from_le_bytes(*amount)))
}

/// Withdraw request as carried in instruction data.
///
/// The tag is fixed, so the only way to get a value is through
/// [`WithdrawInstruction::new`] or a successful [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawInstruction {
    tag: u8,
    amount: u64,
}

impl WithdrawInstruction {
    pub const TAG: u8 = 1;

    pub fn new(amount: u64) -> Self {
        Self {
            tag: Self::TAG,
            amount,
        }
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn encode(&self) -> [u8; INSTRUCTION_LEN] {
        pack_tagged(self.tag, self.amount)
    }

    /// Checks the length first, then the tag.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let (tag, amount) = unpack_tagged(data)?;
        if tag != Self::TAG {
            return Err(DecodeError::InvalidTag { tag });
        }
        Ok(Self { tag, amount })
    }
}

/// Encodes a withdraw of `amount` as `[1] ++ amount.to_le_bytes()`.
pub fn encode(amount: u64) -> [u8; INSTRUCTION_LEN] {
    WithdrawInstruction::new(amount).encode()
}

pub fn decode(data: &[u8]) -> Result<WithdrawInstruction, DecodeError> {
    WithdrawInstruction::decode(data)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositInstruction {
    amount: u64,
}

impl DepositInstruction {
    pub const TAG: u8 = 0;

    pub fn new(amount: u64) -> Self {
        Self { amount }
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn encode(&self) -> [u8; INSTRUCTION_LEN] {
        pack_tagged(Self::TAG, self.amount)
    }

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let (tag, amount) = unpack_tagged(data)?;
        if tag != Self::TAG {
            return Err(DecodeError::InvalidTag { tag });
        }
        Ok(Self { amount })
    }
}

/// Full instruction set of the vault program.
///
/// Variant order matters: the Borsh variant index is the wire tag, so
/// `borsh::to_vec` and [`VaultInstruction::pack`] produce the same bytes.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultInstruction {
    Deposit { amount: u64 },
    Withdraw { amount: u64 },
}

impl VaultInstruction {
    pub fn tag(&self) -> u8 {
        match self {
            VaultInstruction::Deposit { .. } => DepositInstruction::TAG,
            VaultInstruction::Withdraw { .. } => WithdrawInstruction::TAG,
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            VaultInstruction::Deposit { amount } | VaultInstruction::Withdraw { amount } => *amount,
        }
    }

    pub fn pack(&self) -> [u8; INSTRUCTION_LEN] {
        pack_tagged(self.tag(), self.amount())
    }

    pub fn unpack(data: &[u8]) -> Result<Self, DecodeError> {
        let (tag, amount) = unpack_tagged(data)?;
        match tag {
            DepositInstruction::TAG => Ok(VaultInstruction::Deposit { amount }),
            WithdrawInstruction::TAG => Ok(VaultInstruction::Withdraw { amount }),
            _ => Err(DecodeError::InvalidTag { tag }),
        }
    }
}

impl From<WithdrawInstruction> for VaultInstruction {
    fn from(ix: WithdrawInstruction) -> Self {
        VaultInstruction::Withdraw { amount: ix.amount }
    }
}

impl From<DepositInstruction> for VaultInstruction {
    fn from(ix: DepositInstruction) -> Self {
        VaultInstruction::Deposit { amount: ix.amount }
    }
}
