use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::codec::CodecError;

pub const PUBKEY_LEN: usize = 32;
pub const HASH_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;

/// Defines a fixed-size byte newtype that displays, parses and serializes as base58.
macro_rules! base58_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn to_bytes(self) -> [u8; $len] {
                self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = ParseKeyError;

            fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
                let bytes: [u8; $len] = slice.try_into().map_err(|_| ParseKeyError::WrongLength {
                    expected: $len,
                    actual: slice.len(),
                })?;
                Ok(Self(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&bs58::encode(&self.0).into_string())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = ParseKeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = bs58::decode(s)
                    .into_vec()
                    .map_err(|_| ParseKeyError::InvalidBase58)?;
                Self::try_from(bytes.as_slice())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

base58_bytes!(
    /// Account address (ed25519 public key)
    Pubkey,
    PUBKEY_LEN
);

base58_bytes!(
    /// Recent blockhash referenced by a message
    Hash,
    HASH_LEN
);

base58_bytes!(
    /// Transaction signature (ed25519)
    Signature,
    SIGNATURE_LEN
);

impl Signature {
    /// Standard-alphabet base64, the form handed to status lookups
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// True for the all-zero placeholder written into unsigned slots
    pub fn is_placeholder(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseKeyError {
    #[error("invalid base58 string")]
    InvalidBase58,
    #[error("expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

/// Message header: how many leading keys sign, and how many keys are read-only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// Instruction whose program and accounts are indices into the message key table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// Compiled (legacy) transaction message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledMessage {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

impl CompiledMessage {
    /// Resolve an index into the account key table
    pub fn account_key(&self, index: u8) -> Option<&Pubkey> {
        self.account_keys.get(usize::from(index))
    }

    /// Resolve the program id an instruction invokes
    pub fn program_id(&self, instruction: &CompiledInstruction) -> Option<&Pubkey> {
        self.account_key(instruction.program_id_index)
    }
}

/// Transaction as submitted: one optional signature per required signer, plus the message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub signatures: Vec<Option<Signature>>,
    pub message: CompiledMessage,
}

impl Transaction {
    /// Wrap a message with every signer slot left empty
    pub fn unsigned(message: CompiledMessage) -> Self {
        let slots = usize::from(message.header.num_required_signatures);
        Self {
            signatures: vec![None; slots],
            message,
        }
    }

    /// Signature of the fee payer, if that slot has been signed
    pub fn first_signature(&self) -> Option<&Signature> {
        self.signatures.first().and_then(Option::as_ref)
    }
}

/// Commitment tier reported for a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    Processed,
    Confirmed,
    Finalized,
}

/// Status of a signature as reported by an RPC node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub confirmation_status: Option<ConfirmationStatus>,
}

impl SignatureStatus {
    pub fn is_finalized(&self) -> bool {
        self.confirmation_status == Some(ConfirmationStatus::Finalized)
    }
}

/// What a transfer transaction is expected to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedTransfer {
    pub recipient: Pubkey,
    pub lamports: u64,
}

/// Transfer resolved from a message that passed the structural checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedTransfer {
    pub sender: Pubkey,
    pub recipient: Pubkey,
    pub lamports: u64,
}

/// Validation errors
///
/// Every variant means "reject this transaction" and carries the offending values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing transaction")]
    MissingInput,
    #[error("Transaction must contain exactly one instruction, found {0}")]
    UnexpectedInstructionCount(usize),
    #[error(
        "Instruction is not a system transfer: program index {program_index} resolves to {}",
        describe_key(.program_id)
    )]
    WrongProgram {
        program_index: u8,
        program_id: Option<Pubkey>,
    },
    #[error("Malformed transfer instruction: {0}")]
    MalformedInstruction(MalformedReason),
    #[error("Invalid instruction data length: expected 8, got {0}")]
    InvalidDataLength(usize),
    #[error("Recipient mismatch. Expected {expected}, got {actual}")]
    RecipientMismatch { expected: Pubkey, actual: Pubkey },
    #[error("Amount mismatch. Expected {expected}, got {actual}")]
    AmountMismatch { expected: u64, actual: u64 },
    #[error("Transaction {signature} has already been finalized")]
    AlreadyFinalized { signature: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("expected at least 2 account indices, found {found}")]
    MissingAccounts { found: usize },
    #[error("account index {index} out of range for {keys} account keys")]
    AccountIndexOutOfRange { index: u8, keys: usize },
}

fn describe_key(key: &Option<Pubkey>) -> String {
    match key {
        Some(key) => key.to_string(),
        None => "no account key".to_string(),
    }
}

/// Failure of the status lookup collaborator itself
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Status lookup transport failure: {0}")]
    Transport(String),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Malformed status response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Top-level error for a validation call
///
/// Keeps "the transaction is invalid" apart from "the transaction could not be
/// decoded" and "its status could not be determined".
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Could not decode transaction: {0}")]
    Decode(#[from] CodecError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl TransferError {
    /// The validation kind, if this is a validation failure
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            TransferError::Invalid(err) => Some(err),
            _ => None,
        }
    }
}
