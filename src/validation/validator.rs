use crate::{
    ExpectedTransfer, MalformedReason, Pubkey, Transaction, TransferError, ValidatedTransfer,
    ValidationError,
    codec::decode_transaction_base64,
    config::{FinalizedPolicy, ValidatorConfig},
    instruction::{SYSTEM_PROGRAM_ID, decode_transfer_amount},
    lookup::SignatureStatusLookup,
    types::CompiledMessage,
};
use tracing::{debug, warn};

/// Validates that a transaction is exactly the expected single transfer
///
/// Holds only its configuration; calls are independent and the validator
/// can be shared across tasks.
#[derive(Debug, Clone, Default)]
pub struct TransferValidator {
    config: ValidatorConfig,
}

impl TransferValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a transaction against the expected transfer
    /// Returns Ok(()) if valid, Err(TransferError) otherwise
    ///
    /// # Arguments
    /// * `transaction` - The submitted transaction; `None` fails with `MissingInput`
    /// * `expected` - Recipient and lamport amount the transfer must carry
    /// * `lookup` - Optional status lookup, queried only when the first signer slot is signed
    pub async fn validate(
        &self,
        transaction: Option<&Transaction>,
        expected: &ExpectedTransfer,
        lookup: Option<&dyn SignatureStatusLookup>,
    ) -> Result<(), TransferError> {
        // 1. Require a transaction
        let Some(tx) = transaction else {
            warn!("Rejecting transfer: missing transaction");
            return Err(ValidationError::MissingInput.into());
        };

        // 2. Structural and value checks on the message
        let transfer = self.check_message(&tx.message, expected)?;

        // 3. Finality of the first signature
        self.check_finality(tx, lookup).await?;

        debug!(
            "Transfer of {} lamports from {} to {} validated",
            transfer.lamports, transfer.sender, transfer.recipient
        );
        Ok(())
    }

    /// Validate a standard-base64 wire transaction
    ///
    /// Blank input fails with `MissingInput`; input that does not decode
    /// fails with `TransferError::Decode`.
    pub async fn validate_encoded(
        &self,
        encoded: &str,
        expected: &ExpectedTransfer,
        lookup: Option<&dyn SignatureStatusLookup>,
    ) -> Result<(), TransferError> {
        if encoded.trim().is_empty() {
            warn!("Rejecting transfer: empty transaction payload");
            return Err(ValidationError::MissingInput.into());
        }
        let tx = decode_transaction_base64(encoded).inspect_err(|e| {
            warn!("Rejecting transfer: undecodable transaction: {}", e);
        })?;
        self.validate(Some(&tx), expected, lookup).await
    }

    /// Run every synchronous check on a compiled message
    ///
    /// Checks run in order and stop at the first failure: instruction count,
    /// program id, account indices, data length, recipient, amount.
    pub fn check_message(
        &self,
        message: &CompiledMessage,
        expected: &ExpectedTransfer,
    ) -> Result<ValidatedTransfer, ValidationError> {
        let result = inspect_transfer(message).and_then(|transfer| {
            if transfer.recipient != expected.recipient {
                return Err(ValidationError::RecipientMismatch {
                    expected: expected.recipient,
                    actual: transfer.recipient,
                });
            }
            if transfer.lamports != expected.lamports {
                return Err(ValidationError::AmountMismatch {
                    expected: expected.lamports,
                    actual: transfer.lamports,
                });
            }
            Ok(transfer)
        });

        if let Err(e) = &result {
            warn!("Rejecting transfer: {}", e);
        }
        result
    }

    async fn check_finality(
        &self,
        tx: &Transaction,
        lookup: Option<&dyn SignatureStatusLookup>,
    ) -> Result<(), TransferError> {
        if !self.config.check_finality {
            return Ok(());
        }
        let Some(signature) = tx.first_signature() else {
            debug!("No first signature, skipping finality check");
            return Ok(());
        };
        let Some(lookup) = lookup else {
            debug!("No status lookup supplied, skipping finality check");
            return Ok(());
        };

        let encoded = signature.to_base64();
        let status = lookup.get_signature_status(&encoded).await?;

        if status.as_ref().is_some_and(|s| s.is_finalized()) {
            match self.config.finalized_policy {
                FinalizedPolicy::Reject => {
                    warn!("Rejecting transfer: {} already finalized", signature);
                    return Err(ValidationError::AlreadyFinalized { signature: encoded }.into());
                }
                FinalizedPolicy::Warn => {
                    warn!("Accepting transfer {} although it is already finalized", signature);
                }
            }
        }
        Ok(())
    }
}

/// Decode the single system transfer in a message without comparing it to anything
///
/// # Returns
/// * `Ok(ValidatedTransfer)` with sender, recipient and amount
/// * `Err(ValidationError)` for the first structural problem found
pub fn inspect_transfer(message: &CompiledMessage) -> Result<ValidatedTransfer, ValidationError> {
    let [instruction] = message.instructions.as_slice() else {
        return Err(ValidationError::UnexpectedInstructionCount(
            message.instructions.len(),
        ));
    };

    let program_id = message.program_id(instruction).copied();
    if program_id != Some(SYSTEM_PROGRAM_ID) {
        return Err(ValidationError::WrongProgram {
            program_index: instruction.program_id_index,
            program_id,
        });
    }

    // Index 0 is the sender, index 1 the recipient
    let [from_index, to_index, ..] = instruction.accounts[..] else {
        return Err(ValidationError::MalformedInstruction(
            MalformedReason::MissingAccounts {
                found: instruction.accounts.len(),
            },
        ));
    };
    let sender = resolve_account(message, from_index)?;
    let recipient = resolve_account(message, to_index)?;

    let lamports = decode_transfer_amount(&instruction.data)?;

    Ok(ValidatedTransfer {
        sender,
        recipient,
        lamports,
    })
}

fn resolve_account(message: &CompiledMessage, index: u8) -> Result<Pubkey, ValidationError> {
    message.account_key(index).copied().ok_or(
        ValidationError::MalformedInstruction(MalformedReason::AccountIndexOutOfRange {
            index,
            keys: message.account_keys.len(),
        }),
    )
}

/// Validate with the default configuration
///
/// # Arguments
/// * `lookup` - Optional status lookup for the finality check
/// * `transaction` - The submitted transaction
/// * `expected_recipient` - Address that must receive the transfer
/// * `expected_amount` - Lamports that must be transferred
pub async fn validate_transfer(
    lookup: Option<&dyn SignatureStatusLookup>,
    transaction: Option<&Transaction>,
    expected_recipient: &Pubkey,
    expected_amount: u64,
) -> Result<(), TransferError> {
    let expected = ExpectedTransfer {
        recipient: *expected_recipient,
        lamports: expected_amount,
    };
    TransferValidator::default()
        .validate(transaction, &expected, lookup)
        .await
}
