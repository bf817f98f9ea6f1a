//! JSON-RPC gateway for Soroban RPC endpoints.

use log::debug;
use serde::Serialize;
use serde_json::{json, Value};
use stellar_xdr::curr::TransactionEnvelope;

use crate::error::RpcError;
use crate::simulator::parse_simulation_outcome;
use crate::transaction::envelope_to_base64;
use crate::types::{AccountInfo, SimulationOutcome};

/// `sendTransaction` accepted the transaction and it awaits inclusion.
pub const STATUS_PENDING: &str = "PENDING";
/// `sendTransaction` rejected the transaction.
pub const STATUS_ERROR: &str = "ERROR";
/// `getTransaction` found the transaction applied successfully.
pub const STATUS_SUCCESS: &str = "SUCCESS";
/// `getTransaction` found the transaction applied but failed.
pub const STATUS_FAILED: &str = "FAILED";
/// `getTransaction` has no record of the hash (yet).
pub const STATUS_NOT_FOUND: &str = "NOT_FOUND";

/// Response from `sendTransaction` RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendTransactionResponse {
    /// Transaction hash
    pub hash: String,
    /// Status: "PENDING", "DUPLICATE", "ERROR", "TRY_AGAIN_LATER"
    pub status: String,
    /// Error result XDR (present when status is "ERROR")
    pub error_result_xdr: Option<String>,
    /// Diagnostic events XDR (present when status is "ERROR")
    pub diagnostic_events_xdr: Vec<String>,
}

impl SendTransactionResponse {
    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }
}

/// Response from `getTransaction` RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetTransactionResponse {
    /// Status: "SUCCESS", "FAILED", "NOT_FOUND"
    pub status: String,
    /// Ledger number where the transaction was included
    pub ledger: Option<u64>,
    /// Transaction result XDR
    pub result_xdr: Option<String>,
    /// Transaction result meta XDR
    pub result_meta_xdr: Option<String>,
    /// Transaction envelope XDR
    pub envelope_xdr: Option<String>,
}

impl GetTransactionResponse {
    pub fn is_not_found(&self) -> bool {
        self.status == STATUS_NOT_FOUND
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// The gateway operations an invocation needs.
pub trait RpcGateway {
    /// Fetch account information (id + sequence number).
    fn get_account(&self, account_id: &str) -> Result<AccountInfo, RpcError>;

    /// Dry-run a transaction against current ledger state.
    fn simulate_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SimulationOutcome, RpcError>;

    /// Submit a signed transaction.
    fn send_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SendTransactionResponse, RpcError>;

    /// Look up a submitted transaction by hash.
    fn get_transaction(&self, hash: &str) -> Result<GetTransactionResponse, RpcError>;
}

/// JSON-RPC client for communicating with a Soroban RPC server.
pub struct RpcClient {
    client: reqwest::blocking::Client,
    url: String,
}

impl RpcClient {
    /// Create a new RPC client pointing at the given URL.
    pub fn new(url: &str) -> Self {
        RpcClient {
            client: reqwest::blocking::Client::new(),
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a JSON-RPC request and return the parsed JSON body.
    fn send_request(&self, body: &Value) -> Result<Value, RpcError> {
        debug!("rpc {} -> {}", body["method"], self.url);
        let resp = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| RpcError::Network(format!("reading response body: {}", e)))?;

        if !status.is_success() {
            return Err(RpcError::Network(format!("HTTP {}: {}", status, text)));
        }

        serde_json::from_str(&text)
            .map_err(|e| RpcError::InvalidResponse(format!("invalid JSON: {}", e)))
    }
}

impl RpcGateway for RpcClient {
    fn get_account(&self, account_id: &str) -> Result<AccountInfo, RpcError> {
        let body = build_jsonrpc_request("getAccount", json!({ "address": account_id }));
        let response = self.send_request(&body)?;
        parse_account_response(&response, account_id)
    }

    fn simulate_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SimulationOutcome, RpcError> {
        let tx = envelope_to_base64(envelope)?;
        let body = build_jsonrpc_request("simulateTransaction", json!({ "transaction": tx }));
        let response = self.send_request(&body)?;
        let result = extract_result(&response)?;
        parse_simulation_outcome(result)
    }

    fn send_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SendTransactionResponse, RpcError> {
        let tx = envelope_to_base64(envelope)?;
        let body = build_jsonrpc_request("sendTransaction", json!({ "transaction": tx }));
        let response = self.send_request(&body)?;
        parse_send_transaction_response(&response)
    }

    fn get_transaction(&self, hash: &str) -> Result<GetTransactionResponse, RpcError> {
        let body = build_jsonrpc_request("getTransaction", json!({ "hash": hash }));
        let response = self.send_request(&body)?;
        parse_get_transaction_response(&response)
    }
}

/// Build a JSON-RPC 2.0 request body.
pub(crate) fn build_jsonrpc_request(method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params
    })
}

/// Turn a JSON-RPC `error` object into an `RpcError::Rpc`.
fn rpc_error(error: &Value) -> RpcError {
    let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("unknown error")
        .to_string();
    RpcError::Rpc { code, message }
}

/// Return the `result` member, or the error the node sent instead.
fn extract_result(response: &Value) -> Result<&Value, RpcError> {
    if let Some(error) = response.get("error") {
        return Err(rpc_error(error));
    }
    response
        .get("result")
        .ok_or_else(|| RpcError::InvalidResponse("missing 'result' field".to_string()))
}

fn optional_string(result: &Value, field: &str) -> Option<String> {
    result.get(field).and_then(|v| v.as_str()).map(String::from)
}

/// Parse a `getAccount` response into `AccountInfo`.
pub(crate) fn parse_account_response(
    response: &Value,
    account_id: &str,
) -> Result<AccountInfo, RpcError> {
    if let Some(error) = response.get("error") {
        let err = rpc_error(error);
        // Unfunded accounts come back as -32600 or a "not found" message
        if let RpcError::Rpc { code, message } = &err {
            if message.contains("not found") || *code == -32600 {
                return Err(RpcError::AccountNotFound(account_id.to_string()));
            }
        }
        return Err(err);
    }

    let result = extract_result(response)?;

    let id = result
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or(account_id)
        .to_string();

    let sequence = result
        .get("sequence")
        .and_then(|v| {
            v.as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .or_else(|| v.as_i64())
        })
        .ok_or_else(|| {
            RpcError::InvalidResponse("missing or invalid 'sequence' field".to_string())
        })?;

    Ok(AccountInfo {
        account_id: id,
        sequence,
    })
}

/// Parse a `sendTransaction` response.
pub(crate) fn parse_send_transaction_response(
    response: &Value,
) -> Result<SendTransactionResponse, RpcError> {
    let result = extract_result(response)?;

    let hash = result
        .get("hash")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let status = result
        .get("status")
        .and_then(|v| v.as_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let diagnostic_events_xdr: Vec<String> = result
        .get("diagnosticEventsXdr")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|e| e.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    Ok(SendTransactionResponse {
        hash,
        status,
        error_result_xdr: optional_string(result, "errorResultXdr"),
        diagnostic_events_xdr,
    })
}

/// Parse a `getTransaction` response.
pub(crate) fn parse_get_transaction_response(
    response: &Value,
) -> Result<GetTransactionResponse, RpcError> {
    let result = extract_result(response)?;

    let status = result
        .get("status")
        .and_then(|v| v.as_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let ledger = result.get("ledger").and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
    });

    Ok(GetTransactionResponse {
        status,
        ledger,
        result_xdr: optional_string(result, "resultXdr"),
        result_meta_xdr: optional_string(result, "resultMetaXdr"),
        envelope_xdr: optional_string(result, "envelopeXdr"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
