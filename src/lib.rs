//! This crate validates that a submitted transaction is exactly one expected
//! native value transfer: a single system transfer instruction, the right
//! recipient, the right amount, and not already finalized.
//! It includes modules for data types, the transfer instruction layout, wire
//! decoding, signature status lookups, validation, and configuration.

pub mod types; // Keys, signatures, compiled messages and the error taxonomy.
pub mod instruction; // System program id and the 8-byte transfer payload layout.
pub mod codec; // Legacy wire-format decoding and encoding.
pub mod lookup; // Signature status lookup capability and implementations.
pub mod validation; // The transfer validator itself.
pub mod config; // Defines and loads validator configuration.

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::{Config, FinalizedPolicy, ValidatorConfig};
pub use codec::CodecError;
pub use lookup::{SignatureStatusLookup, StatusCache};
pub use validation::{TransferValidator, validate_transfer};
