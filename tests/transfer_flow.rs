//! End-to-end validation of base64 wire transactions against a pre-fetched
//! status table.

use transfer_validator::{
    Config, Hash, Pubkey, Signature, SignatureStatusLookup, StatusCache, Transaction,
    TransferError, TransferValidator, ValidationError,
    codec::encode_transaction_base64,
    instruction::transfer_message,
    lookup::parse_status_response,
    types::ExpectedTransfer,
};

const PAYER: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";
const MERCHANT: &str = "8qbHbw2BbbTHBW1sbeqakYXVKRQM8Ne7pLK7m6CVfeR";

fn setup() -> (Pubkey, Pubkey) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    (PAYER.parse().unwrap(), MERCHANT.parse().unwrap())
}

fn encoded_payment(payer: Pubkey, merchant: Pubkey, lamports: u64, signed: bool) -> String {
    let mut tx = Transaction::unsigned(transfer_message(
        payer,
        merchant,
        lamports,
        Hash::new([7; 32]),
    ));
    if signed {
        tx.signatures[0] = Some(Signature::new([0x11; 64]));
    }
    encode_transaction_base64(&tx).unwrap()
}

#[tokio::test]
async fn test_wire_payment_accepted_then_rejected_once_finalized() {
    let (payer, merchant) = setup();
    let config = Config::from_toml_str("[validator]\nfinalized_policy = \"reject\"\n").unwrap();
    let validator = TransferValidator::new(config.validator);
    let expected = ExpectedTransfer {
        recipient: merchant,
        lamports: 2_500_000,
    };
    let encoded = encoded_payment(payer, merchant, 2_500_000, true);
    let statuses = StatusCache::new();
    let lookup: &dyn SignatureStatusLookup = &statuses;

    // Not yet known to the cluster
    assert!(
        validator
            .validate_encoded(&encoded, &expected, Some(lookup))
            .await
            .is_ok()
    );

    // Confirmed is still acceptable
    let body = r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":90},
        "value":[{"slot":88,"confirmations":1,"err":null,"confirmationStatus":"confirmed"}]}}"#;
    let signature = Signature::new([0x11; 64]).to_base64();
    statuses
        .insert(signature.clone(), parse_status_response(body).unwrap().unwrap())
        .await;
    assert!(
        validator
            .validate_encoded(&encoded, &expected, Some(lookup))
            .await
            .is_ok()
    );

    // Finalized is rejected
    let body = r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":140},
        "value":[{"slot":88,"confirmations":null,"err":null,"confirmationStatus":"finalized"}]}}"#;
    statuses
        .insert(signature.clone(), parse_status_response(body).unwrap().unwrap())
        .await;
    let result = validator
        .validate_encoded(&encoded, &expected, Some(lookup))
        .await;
    match result {
        Err(TransferError::Invalid(ValidationError::AlreadyFinalized { signature: found })) => {
            assert_eq!(found, signature);
        }
        other => panic!("Expected AlreadyFinalized, got {other:?}"),
    }
}

#[tokio::test]
async fn test_wire_payment_wrong_amount() {
    let (payer, merchant) = setup();
    let encoded = encoded_payment(payer, merchant, 999, false);
    let expected = ExpectedTransfer {
        recipient: merchant,
        lamports: 1_000,
    };

    let err = TransferValidator::default()
        .validate_encoded(&encoded, &expected, None)
        .await
        .unwrap_err();
    assert_eq!(
        err.validation(),
        Some(&ValidationError::AmountMismatch {
            expected: 1_000,
            actual: 999
        })
    );
}

#[tokio::test]
async fn test_wire_payment_to_someone_else() {
    let (payer, merchant) = setup();
    let encoded = encoded_payment(payer, payer, 1_000, false);
    let expected = ExpectedTransfer {
        recipient: merchant,
        lamports: 1_000,
    };

    let err = TransferValidator::default()
        .validate_encoded(&encoded, &expected, None)
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Recipient mismatch. Expected 8qbHbw2B"));
}
