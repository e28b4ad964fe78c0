//! System Transfer Instruction Module
//!
//! Layout of the native value-transfer instruction and a helper to compile
//! a message carrying exactly one such transfer.
//!
//! # Data Layout
//! The instruction payload is a fixed 8-byte little-endian `u64` holding the
//! amount in lamports. Any other length is not a transfer.

use crate::{
    CompiledInstruction, CompiledMessage, Hash, MessageHeader, Pubkey, ValidationError,
};

/// Address of the native system program (32 zero bytes)
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new([0u8; 32]);

/// Exact length of a transfer instruction payload
pub const TRANSFER_DATA_LEN: usize = 8;

/// Decode the lamport amount from a transfer instruction payload
///
/// # Returns
/// * `Ok(amount)` if `data` is exactly 8 bytes
/// * `Err(ValidationError::InvalidDataLength)` carrying the actual length otherwise
pub fn decode_transfer_amount(data: &[u8]) -> Result<u64, ValidationError> {
    let bytes: [u8; TRANSFER_DATA_LEN] = data
        .try_into()
        .map_err(|_| ValidationError::InvalidDataLength(data.len()))?;
    Ok(u64::from_le_bytes(bytes))
}

pub fn encode_transfer_amount(lamports: u64) -> [u8; TRANSFER_DATA_LEN] {
    lamports.to_le_bytes()
}

/// Compile a legacy message with a single system transfer
///
/// The sender is the only signer and pays the fee. Keys are ordered
/// `[from, to, system_program]`; a transfer to oneself collapses the
/// duplicate key so both account indices point at slot 0.
///
/// # Arguments
/// * `from` - Funding account, first signer
/// * `to` - Recipient account
/// * `lamports` - Amount to move
/// * `recent_blockhash` - Blockhash the message is bound to
pub fn transfer_message(
    from: Pubkey,
    to: Pubkey,
    lamports: u64,
    recent_blockhash: Hash,
) -> CompiledMessage {
    let (account_keys, accounts) = if from == to {
        (vec![from, SYSTEM_PROGRAM_ID], vec![0, 0])
    } else {
        (vec![from, to, SYSTEM_PROGRAM_ID], vec![0, 1])
    };

    // System program is always the last key
    let program_id_index = (account_keys.len() - 1) as u8;

    CompiledMessage {
        header: MessageHeader {
            num_required_signatures: 1,
            num_readonly_signed_accounts: 0,
            num_readonly_unsigned_accounts: 1,
        },
        account_keys,
        recent_blockhash,
        instructions: vec![CompiledInstruction {
            program_id_index,
            accounts,
            data: encode_transfer_amount(lamports).to_vec(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_program_id_is_base58_ones() {
        assert_eq!(
            SYSTEM_PROGRAM_ID.to_string(),
            "11111111111111111111111111111111"
        );
        let parsed: Pubkey = "11111111111111111111111111111111".parse().unwrap();
        assert_eq!(parsed, SYSTEM_PROGRAM_ID);
    }

    #[test]
    fn test_decode_is_little_endian() {
        assert_eq!(decode_transfer_amount(&[0x01, 0, 0, 0, 0, 0, 0, 0]), Ok(1));
        assert_eq!(decode_transfer_amount(&[0; 8]), Ok(0));
        assert_eq!(decode_transfer_amount(&[0xFF; 8]), Ok(u64::MAX));
        assert_eq!(
            decode_transfer_amount(&[0x40, 0x42, 0x0F, 0, 0, 0, 0, 0]),
            Ok(1_000_000)
        );
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        for len in [0usize, 1, 7, 9, 12] {
            let data = vec![0xAB; len];
            assert_eq!(
                decode_transfer_amount(&data),
                Err(ValidationError::InvalidDataLength(len))
            );
        }
    }

    #[test]
    fn test_transfer_message_layout() {
        let from = Pubkey::new([1; 32]);
        let to = Pubkey::new([2; 32]);
        let message = transfer_message(from, to, 42, Hash::new([9; 32]));

        assert_eq!(message.account_keys, vec![from, to, SYSTEM_PROGRAM_ID]);
        assert_eq!(message.header.num_required_signatures, 1);
        assert_eq!(message.header.num_readonly_unsigned_accounts, 1);
        assert_eq!(message.instructions.len(), 1);

        let ix = &message.instructions[0];
        assert_eq!(message.program_id(ix), Some(&SYSTEM_PROGRAM_ID));
        assert_eq!(ix.accounts, vec![0, 1]);
        assert_eq!(decode_transfer_amount(&ix.data), Ok(42));
    }

    #[test]
    fn test_self_transfer_dedups_key() {
        let key = Pubkey::new([7; 32]);
        let message = transfer_message(key, key, 5, Hash::new([0; 32]));

        assert_eq!(message.account_keys, vec![key, SYSTEM_PROGRAM_ID]);
        let ix = &message.instructions[0];
        assert_eq!(ix.program_id_index, 1);
        assert_eq!(ix.accounts, vec![0, 0]);
    }
}
