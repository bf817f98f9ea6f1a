//! Error types for the invocation pipeline.

use thiserror::Error;

use crate::error::{RpcError, WalletError};

/// Errors that abort an invocation.
///
/// Degraded outcomes (poll deadline exceeded, failed on-chain status,
/// unrecognized response shape) are not errors; they come back as
/// [`crate::InvokeOutput::Submission`] so the caller can inspect them.
#[derive(Debug, Clone, Error)]
pub enum InvokeError {
    /// Wraps gateway failures, propagated unchanged
    #[error(transparent)]
    Rpc(#[from] RpcError),
    /// Wraps wallet failures, propagated unchanged
    #[error(transparent)]
    Wallet(#[from] WalletError),
    /// simulateTransaction reported an error for this call
    #[error("simulation failed: {0}")]
    SimulationFailed(String),
    /// Simulation succeeded but carried no invocation result
    #[error("invalid simulation: no result in {0}")]
    InvalidSimulation(String),
    /// The call needs a flow this crate does not implement
    #[error("not supported: {0}")]
    NotSupported(String),
    /// Signing was required but the wallet is not connected
    #[error("not connected to a wallet; signing is required for this call")]
    NotConnected,
    /// The response type needs a result parser and none was supplied
    #[error("a result parser is required unless the response type is `full` or `simulated`")]
    MissingResultParser,
    /// Contract or account address could not be decoded
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
    /// XDR assembly/serialization error
    #[error("XDR error: {0}")]
    Xdr(String),
    /// The result parser rejected the payload
    #[error("failed to parse result: {0}")]
    Parse(String),
}

impl From<stellar_xdr::curr::Error> for InvokeError {
    fn from(e: stellar_xdr::curr::Error) -> Self {
        InvokeError::Xdr(e.to_string())
    }
}
