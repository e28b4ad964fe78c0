use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::debug;

use super::CodecError;
use crate::{
    CompiledInstruction, CompiledMessage, HASH_LEN, Hash, MessageHeader, PUBKEY_LEN, Pubkey,
    SIGNATURE_LEN, Signature, Transaction,
};

/// High bit of the first message byte marks a versioned message
const VERSION_PREFIX_MASK: u8 = 0x80;

/// Cursor over an input buffer
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn peek_u8(&self) -> Result<u8, CodecError> {
        self.bytes
            .get(self.offset)
            .copied()
            .ok_or(CodecError::UnexpectedEof {
                needed: 1,
                remaining: 0,
            })
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a compact-u16: 7 bits per byte, low bits first, at most 3 bytes
    ///
    /// Alias encodings (a continuation byte of zero) are rejected so every
    /// length has exactly one encoding.
    fn read_compact_u16(&mut self) -> Result<u16, CodecError> {
        let mut value: u32 = 0;
        for i in 0..3 {
            let byte = self.read_u8()?;
            if i > 0 && byte == 0 {
                return Err(CodecError::InvalidCompactU16);
            }
            value |= u32::from(byte & 0x7f) << (i * 7);
            if byte & 0x80 == 0 {
                return u16::try_from(value).map_err(|_| CodecError::InvalidCompactU16);
            }
        }
        Err(CodecError::InvalidCompactU16)
    }

    fn read_len(&mut self) -> Result<usize, CodecError> {
        self.read_compact_u16().map(usize::from)
    }
}

fn write_compact_u16(out: &mut Vec<u8>, len: usize) -> Result<(), CodecError> {
    let mut value = u16::try_from(len).map_err(|_| CodecError::LengthOverflow(len))?;
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return Ok(());
        }
        out.push(byte | 0x80);
    }
}

fn read_message(reader: &mut Reader<'_>) -> Result<CompiledMessage, CodecError> {
    let first = reader.peek_u8()?;
    if first & VERSION_PREFIX_MASK != 0 {
        return Err(CodecError::UnsupportedVersion(first & !VERSION_PREFIX_MASK));
    }

    let header = MessageHeader {
        num_required_signatures: reader.read_u8()?,
        num_readonly_signed_accounts: reader.read_u8()?,
        num_readonly_unsigned_accounts: reader.read_u8()?,
    };

    let key_count = reader.read_len()?;
    let mut account_keys = Vec::with_capacity(key_count);
    for _ in 0..key_count {
        account_keys.push(Pubkey::new(reader.read_array::<PUBKEY_LEN>()?));
    }

    let recent_blockhash = Hash::new(reader.read_array::<HASH_LEN>()?);

    let instruction_count = reader.read_len()?;
    let mut instructions = Vec::with_capacity(instruction_count);
    for _ in 0..instruction_count {
        let program_id_index = reader.read_u8()?;
        let account_count = reader.read_len()?;
        let accounts = reader.read_slice(account_count)?.to_vec();
        let data_len = reader.read_len()?;
        let data = reader.read_slice(data_len)?.to_vec();
        instructions.push(CompiledInstruction {
            program_id_index,
            accounts,
            data,
        });
    }

    Ok(CompiledMessage {
        header,
        account_keys,
        recent_blockhash,
        instructions,
    })
}

fn write_message(out: &mut Vec<u8>, message: &CompiledMessage) -> Result<(), CodecError> {
    out.push(message.header.num_required_signatures);
    out.push(message.header.num_readonly_signed_accounts);
    out.push(message.header.num_readonly_unsigned_accounts);

    write_compact_u16(out, message.account_keys.len())?;
    for key in &message.account_keys {
        out.extend_from_slice(key.as_bytes());
    }

    out.extend_from_slice(message.recent_blockhash.as_bytes());

    write_compact_u16(out, message.instructions.len())?;
    for ix in &message.instructions {
        out.push(ix.program_id_index);
        write_compact_u16(out, ix.accounts.len())?;
        out.extend_from_slice(&ix.accounts);
        write_compact_u16(out, ix.data.len())?;
        out.extend_from_slice(&ix.data);
    }
    Ok(())
}

fn ensure_consumed(reader: &Reader<'_>) -> Result<(), CodecError> {
    match reader.remaining() {
        0 => Ok(()),
        n => Err(CodecError::TrailingBytes(n)),
    }
}

/// Decode a serialized legacy message
pub fn decode_message(bytes: &[u8]) -> Result<CompiledMessage, CodecError> {
    let mut reader = Reader::new(bytes);
    let message = read_message(&mut reader)?;
    ensure_consumed(&reader)?;
    Ok(message)
}

pub fn encode_message(message: &CompiledMessage) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    write_message(&mut out, message)?;
    Ok(out)
}

/// Decode a serialized legacy transaction
///
/// All-zero signatures are placeholders for signers that have not signed
/// yet and decode as `None`.
///
/// # Returns
/// * `Ok(Transaction)` if the whole buffer is one well-formed transaction
/// * `Err(CodecError)` on truncation, bad length prefixes, versioned
///   messages, a signature count that disagrees with the header, or
///   trailing bytes
pub fn decode_transaction(bytes: &[u8]) -> Result<Transaction, CodecError> {
    let mut reader = Reader::new(bytes);

    let signature_count = reader.read_len()?;
    let mut signatures = Vec::with_capacity(signature_count);
    for _ in 0..signature_count {
        let signature = Signature::new(reader.read_array::<SIGNATURE_LEN>()?);
        signatures.push((!signature.is_placeholder()).then_some(signature));
    }

    let message = read_message(&mut reader)?;
    ensure_consumed(&reader)?;

    let required = usize::from(message.header.num_required_signatures);
    if signatures.len() != required {
        return Err(CodecError::SignatureCountMismatch {
            signatures: signatures.len(),
            required,
        });
    }

    debug!(
        "Decoded transaction with {} signatures, {} keys, {} instructions",
        signatures.len(),
        message.account_keys.len(),
        message.instructions.len()
    );

    Ok(Transaction {
        signatures,
        message,
    })
}

/// Encode a transaction; empty signer slots are written as 64 zero bytes
pub fn encode_transaction(tx: &Transaction) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    write_compact_u16(&mut out, tx.signatures.len())?;
    for slot in &tx.signatures {
        match slot {
            Some(signature) => out.extend_from_slice(signature.as_bytes()),
            None => out.extend_from_slice(&[0u8; SIGNATURE_LEN]),
        }
    }
    write_message(&mut out, &tx.message)?;
    Ok(out)
}

/// Decode a standard-alphabet base64 wire transaction
pub fn decode_transaction_base64(encoded: &str) -> Result<Transaction, CodecError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    decode_transaction(&bytes)
}

pub fn encode_transaction_base64(tx: &Transaction) -> Result<String, CodecError> {
    Ok(STANDARD.encode(encode_transaction(tx)?))
}
