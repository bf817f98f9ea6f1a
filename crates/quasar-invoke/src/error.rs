//! Error types for the RPC gateway and wallet layers.

use thiserror::Error;

/// Errors raised while talking to a Soroban RPC endpoint.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// Failed to reach the RPC endpoint, or it answered with a non-2xx status
    #[error("network error: {0}")]
    Network(String),
    /// The endpoint returned a JSON-RPC error object
    #[error("RPC error (code {code}): {message}")]
    Rpc { code: i64, message: String },
    /// Invalid or unexpected response format
    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),
    /// XDR serialization/deserialization error
    #[error("XDR error: {0}")]
    Xdr(String),
    /// Account has not been created on the network
    #[error("account not found: {0}")]
    AccountNotFound(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        RpcError::Network(e.to_string())
    }
}

impl From<stellar_xdr::curr::Error> for RpcError {
    fn from(e: stellar_xdr::curr::Error) -> Self {
        RpcError::Xdr(e.to_string())
    }
}

/// Errors raised by a wallet capability.
#[derive(Debug, Clone, Error)]
pub enum WalletError {
    /// Secret key decoding or format error
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),
    /// The wallet could not produce a signature
    #[error("signing failed: {0}")]
    SigningFailed(String),
    /// The wallet refused the request (not connected, user declined)
    #[error("wallet rejected request: {0}")]
    Rejected(String),
}
