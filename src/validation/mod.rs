//! Transfer Validation Module
//!
//! This module checks that a submitted transaction is exactly the expected
//! native transfer before it is accepted as payment.
//! Performs structural checks on the compiled message, decodes the transfer
//! amount, compares recipient and amount, and optionally asks a status
//! lookup whether the transaction is already finalized.

mod validator;


pub use validator::{TransferValidator, inspect_transfer, validate_transfer};
