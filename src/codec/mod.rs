//! Wire Codec Module
//!
//! Decodes and encodes legacy transactions in their binary wire format.
//!
//! # Binary Format
//! ```text
//! compact-u16 signature count
//! [u8; 64] x signature count
//! message:
//!   header (3 x u8)
//!   compact-u16 key count, [u8; 32] x key count
//!   [u8; 32] recent blockhash
//!   compact-u16 instruction count, then per instruction:
//!     u8 program id index
//!     compact-u16 account count, u8 x account count
//!     compact-u16 data length, u8 x data length
//! ```
//!
//! Versioned messages (first message byte with the high bit set) are rejected.

mod wire;

pub use wire::{
    decode_message, decode_transaction, decode_transaction_base64, encode_message,
    encode_transaction, encode_transaction_base64,
};

use thiserror::Error;

/// Wire decoding and encoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("invalid compact-u16 length prefix")]
    InvalidCompactU16,
    #[error("unsupported message version {0}")]
    UnsupportedVersion(u8),
    #[error("{signatures} signatures present but header requires {required}")]
    SignatureCountMismatch { signatures: usize, required: usize },
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),
    #[error("length {0} does not fit a compact-u16 prefix")]
    LengthOverflow(usize),
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}
