//! Parsing of `simulateTransaction` results.

use serde_json::Value;

use crate::error::RpcError;
use crate::types::{CostBreakdown, SimulatedInvocation, SimulationOutcome, SimulationSuccess};

/// Parse a simulateTransaction result JSON into a `SimulationOutcome`.
pub(crate) fn parse_simulation_outcome(result: &Value) -> Result<SimulationOutcome, RpcError> {
    if !result.is_object() {
        return Err(RpcError::InvalidResponse(format!(
            "simulateTransaction result is not an object: {}",
            result
        )));
    }

    // Simulation-level error, distinct from a JSON-RPC error
    if let Some(error) = result.get("error").filter(|e| !e.is_null()) {
        let error_str = error.as_str().unwrap_or("unknown simulation error");
        return Ok(SimulationOutcome::Failed {
            error: error_str.to_string(),
        });
    }

    let restore_preamble = result
        .get("restorePreamble")
        .filter(|restore| !restore.is_null())
        .map(|restore| restore.to_string());

    let transaction_data = result
        .get("transactionData")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let events: Vec<String> = result
        .get("events")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|e| e.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    // First entry of `results` carries auth and the return value
    let invocation = result
        .get("results")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|first| {
            let retval = first.get("xdr").and_then(|v| v.as_str())?.to_string();
            let auth = first
                .get("auth")
                .and_then(|v| v.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|e| e.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default();
            Some(SimulatedInvocation { auth, retval })
        });

    let cost = result
        .get("cost")
        .map(|cost_obj| CostBreakdown {
            cpu_instructions: parse_u64(cost_obj.get("cpuInsns")).unwrap_or(0),
            memory_bytes: parse_u64(cost_obj.get("memBytes")).unwrap_or(0),
        })
        .unwrap_or_default();

    Ok(SimulationOutcome::Success(SimulationSuccess {
        result: invocation,
        transaction_data,
        min_resource_fee: parse_u64(result.get("minResourceFee")).unwrap_or(0),
        cost,
        events,
        latest_ledger: parse_u64(result.get("latestLedger")).unwrap_or(0),
        restore_preamble,
    }))
}

/// Soroban RPC encodes 64-bit numbers as strings, but older nodes send JSON numbers.
fn parse_u64(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| value.as_u64())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
