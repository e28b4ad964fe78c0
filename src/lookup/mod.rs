//! Signature Status Lookup Module
//!
//! The validator consults an external collaborator (usually an RPC client)
//! to learn whether a signature is already finalized. This module defines
//! that capability, an in-memory implementation, and a parser for the
//! `getSignatureStatuses` JSON-RPC response body so callers can plug in
//! whatever HTTP client they already use.

mod cache;
pub use cache::StatusCache;

use crate::{LookupError, SignatureStatus};
use async_trait::async_trait;
use serde::Deserialize;

/// Capability to query the status of a transaction signature
///
/// Timeouts, retries and cancellation belong to the implementor.
#[async_trait]
pub trait SignatureStatusLookup: Send + Sync {
    /// Look up a signature given in standard base64
    ///
    /// # Returns
    /// * `Ok(Some(status))` if the node knows the signature
    /// * `Ok(None)` if it does not
    /// * `Err(LookupError)` if the status could not be determined
    async fn get_signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, LookupError>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<RpcResult>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcResult {
    value: Vec<Option<SignatureStatus>>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Parse a `getSignatureStatuses` response for a single signature
///
/// # Example body
/// ```json
/// {"jsonrpc":"2.0","id":1,"result":{"context":{"slot":82},
///  "value":[{"slot":72,"confirmations":null,"err":null,"confirmationStatus":"finalized"}]}}
/// ```
pub fn parse_status_response(body: &str) -> Result<Option<SignatureStatus>, LookupError> {
    let response: RpcResponse = serde_json::from_str(body)
        .map_err(|e| LookupError::MalformedResponse(e.to_string()))?;

    if let Some(RpcError { code, message }) = response.error {
        return Err(LookupError::Rpc { code, message });
    }

    let result = response
        .result
        .ok_or_else(|| LookupError::MalformedResponse("missing result".to_string()))?;

    match result.value.len() {
        0 => Ok(None),
        1 => Ok(result.value.into_iter().next().flatten()),
        n => Err(LookupError::MalformedResponse(format!(
            "expected 1 status, got {n}"
        ))),
    }
}
