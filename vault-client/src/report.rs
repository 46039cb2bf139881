//! Human-readable diagnostics for instruction payloads.

use std::io::{self, Write};

use vault_instruction::{decode, encode, DecodeError, WithdrawInstruction, INSTRUCTION_LEN};

pub fn write_generate(out: &mut impl Write, amount: u64) -> io::Result<()> {
    let data = encode(amount);
    writeln!(out, "Withdraw instruction data")?;
    writeln!(out, "Length: {} bytes", data.len())?;
    writeln!(out, "Hex: {}", hex::encode(data))?;
    writeln!(out, "Bytes: {:?}", data)?;
    writeln!(out)?;
    writeln!(out, "- byte 0 ({}) is the withdraw tag", data[0])?;
    writeln!(
        out,
        "- bytes 1..9 ({}) are amount {} in little-endian order",
        hex::encode(&data[1..]),
        amount
    )?;
    Ok(())
}

/// Prints each validation step for `data` and returns the decode result.
/// With `expected` set, the parsed amount is also compared against it.
pub fn write_validation(
    out: &mut impl Write,
    data: &[u8],
    expected: Option<u64>,
) -> io::Result<Result<WithdrawInstruction, DecodeError>> {
    writeln!(out, "Instruction data: {}", hex::encode(data))?;
    writeln!(out, "Length: {}", data.len())?;

    let result = decode(data);
    match &result {
        Err(DecodeError::InvalidLength { len }) => {
            writeln!(out, "FAIL: length is {len}, expected {INSTRUCTION_LEN} (1 tag byte + 8 amount bytes)")?;
        }
        Err(DecodeError::InvalidTag { tag }) => {
            writeln!(out, "OK: length is {INSTRUCTION_LEN} bytes")?;
            writeln!(out, "FAIL: tag is {tag}, expected {}", WithdrawInstruction::TAG)?;
        }
        Ok(ix) => {
            writeln!(out, "OK: length is {INSTRUCTION_LEN} bytes")?;
            writeln!(out, "OK: tag is {}", ix.tag())?;
            writeln!(out)?;
            writeln!(out, "Parsed:")?;
            writeln!(out, "Tag: {}", ix.tag())?;
            writeln!(out, "Amount (little-endian): {}", hex::encode(&data[1..]))?;
            writeln!(out, "Amount (decimal): {}", ix.amount())?;
            match expected {
                Some(expected) if expected == ix.amount() => {
                    writeln!(out, "OK: parsed amount matches input amount {expected}")?;
                }
                Some(expected) => {
                    writeln!(
                        out,
                        "FAIL: parsed amount {} does not match input amount {expected}",
                        ix.amount()
                    )?;
                }
                None => {}
            }
        }
    }
    Ok(result)
}
