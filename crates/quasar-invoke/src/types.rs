//! Data types shared across the invocation pipeline.

use serde::Serialize;
use stellar_xdr::curr::{Limits, ReadXdr, SorobanTransactionData};

use crate::rpc::{GetTransactionResponse, SendTransactionResponse};

/// Account information from the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    /// Account ID (G... address)
    pub account_id: String,
    /// Current sequence number
    pub sequence: i64,
}

/// Source account chosen for an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAccount {
    /// The connected wallet's account, as reported by the network
    Wallet(AccountInfo),
    /// Stand-in account with sequence 0, only good for read-only simulation
    Placeholder(AccountInfo),
}

impl ResolvedAccount {
    /// All-zero ed25519 key used when no wallet is connected.
    pub const PLACEHOLDER_ACCOUNT_ID: &'static str =
        "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

    pub fn placeholder() -> Self {
        ResolvedAccount::Placeholder(AccountInfo {
            account_id: Self::PLACEHOLDER_ACCOUNT_ID.to_string(),
            sequence: 0,
        })
    }

    pub fn info(&self) -> &AccountInfo {
        match self {
            ResolvedAccount::Wallet(info) | ResolvedAccount::Placeholder(info) => info,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ResolvedAccount::Placeholder(_))
    }
}

/// Whether the simulation succeeded or failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum SimulationOutcome {
    /// Simulation succeeded
    #[serde(rename = "success")]
    Success(SimulationSuccess),
    /// Simulation failed
    #[serde(rename = "failed")]
    Failed {
        /// Error message from the RPC
        error: String,
    },
}

/// Successful `simulateTransaction` result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSuccess {
    /// Result of the host function invocation, absent if the node returned none
    pub result: Option<SimulatedInvocation>,
    /// Soroban transaction data as base64 XDR
    pub transaction_data: String,
    /// Minimum resource fee in stroops
    pub min_resource_fee: u64,
    /// Resource cost breakdown
    pub cost: CostBreakdown,
    /// Diagnostic/contract events
    pub events: Vec<String>,
    /// Latest ledger number at simulation time
    pub latest_ledger: u64,
    /// Restore preamble as raw JSON, present when archived entries must be restored
    pub restore_preamble: Option<String>,
}

/// The host function result reported by a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulatedInvocation {
    /// Authorization entries as base64 XDR
    pub auth: Vec<String>,
    /// Return value as base64 XDR (ScVal)
    pub retval: String,
}

impl SimulationSuccess {
    /// Number of authorization entries the invocation requires.
    pub fn auth_count(&self) -> usize {
        self.result.as_ref().map_or(0, |r| r.auth.len())
    }

    /// Number of ledger entries in the read/write footprint.
    pub fn read_write_len(&self) -> Result<usize, stellar_xdr::curr::Error> {
        if self.transaction_data.is_empty() {
            return Ok(0);
        }
        let data = SorobanTransactionData::from_xdr_base64(&self.transaction_data, Limits::none())?;
        Ok(data.resources.footprint.read_write.len())
    }

    /// A view call needs no authorization and writes nothing.
    pub fn is_view_call(&self) -> Result<bool, stellar_xdr::curr::Error> {
        Ok(self.auth_count() == 0 && self.read_write_len()? == 0)
    }
}

/// CPU and memory cost breakdown from simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    /// CPU instructions consumed
    pub cpu_instructions: u64,
    /// Memory bytes consumed
    pub memory_bytes: u64,
}

/// Selects what `invoke` hands back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseType {
    /// Parsed return value
    #[default]
    Value,
    /// The full simulation (view calls) or submission result
    Full,
    /// The raw simulation outcome, whatever it contains
    Simulated,
}

/// Outcome of submitting a signed transaction.
///
/// `Pending` is the soft-timeout case: the wait expired while the node still
/// answered `NOT_FOUND`. It is a valid result, not an error, and the
/// transaction may still land; callers can re-poll `hash` themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionResult {
    /// `sendTransaction` response returned as-is, without polling
    Sent(SendTransactionResponse),
    /// `sendTransaction` refused the transaction and returned `errorResultXdr`
    Rejected(SendTransactionResponse),
    /// The ledger recorded an outcome for the transaction
    Completed {
        hash: String,
        response: GetTransactionResponse,
    },
    /// Still unknown to the ledger when the wait ran out
    Pending {
        hash: String,
        last: GetTransactionResponse,
    },
}

impl SubmissionResult {
    /// Hash of the submitted transaction.
    pub fn hash(&self) -> &str {
        match self {
            SubmissionResult::Sent(r) | SubmissionResult::Rejected(r) => &r.hash,
            SubmissionResult::Completed { hash, .. } | SubmissionResult::Pending { hash, .. } => {
                hash
            }
        }
    }
}

/// What `invoke` returns.
#[derive(Debug, Clone, PartialEq)]
pub enum InvokeOutput<T> {
    /// Value produced by the caller's result parser
    Value(T),
    /// Simulation outcome (response type `simulated`, or `full` on a view call)
    Simulation(SimulationOutcome),
    /// Submission result (response type `full`, or a fallback the parser couldn't handle)
    Submission(SubmissionResult),
}

impl<T> InvokeOutput<T> {
    /// The parsed value, if that's what came back.
    pub fn into_value(self) -> Option<T> {
        match self {
            InvokeOutput::Value(v) => Some(v),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::{
        ContractDataDurability, ContractId, Hash, LedgerFootprint, LedgerKey,
        LedgerKeyContractData, ScAddress, ScVal, SorobanResources, SorobanTransactionDataExt,
        VecM, WriteXdr,
    };

    fn tx_data_b64(read_write: usize) -> String {
        let key = LedgerKey::ContractData(LedgerKeyContractData {
            contract: ScAddress::Contract(ContractId(Hash([7u8; 32]))),
            key: ScVal::LedgerKeyContractInstance,
            durability: ContractDataDurability::Persistent,
        });
        let data = SorobanTransactionData {
            ext: SorobanTransactionDataExt::V0,
            resources: SorobanResources {
                footprint: LedgerFootprint {
                    read_only: VecM::default(),
                    read_write: vec![key; read_write].try_into().unwrap(),
                },
                instructions: 1_000,
                disk_read_bytes: 0,
                write_bytes: 0,
            },
            resource_fee: 10,
        };
        data.to_xdr_base64(Limits::none()).unwrap()
    }

    fn success(auth: usize, read_write: usize) -> SimulationSuccess {
        SimulationSuccess {
            result: Some(SimulatedInvocation {
                auth: vec!["AAAA".to_string(); auth],
                retval: "AAAAAQ==".to_string(),
            }),
            transaction_data: tx_data_b64(read_write),
            min_resource_fee: 0,
            cost: CostBreakdown::default(),
            events: vec![],
            latest_ledger: 1,
            restore_preamble: None,
        }
    }

    #[test]
    fn view_call_needs_no_auth_and_no_writes() {
        assert!(success(0, 0).is_view_call().unwrap());
        assert!(!success(1, 0).is_view_call().unwrap());
        assert!(!success(0, 2).is_view_call().unwrap());
    }

    #[test]
    fn read_write_len_counts_footprint() {
        assert_eq!(success(0, 3).read_write_len().unwrap(), 3);
    }

    #[test]
    fn empty_transaction_data_has_no_footprint() {
        let mut sim = success(0, 0);
        sim.transaction_data.clear();
        assert_eq!(sim.read_write_len().unwrap(), 0);
    }

    #[test]
    fn garbage_transaction_data_is_an_error() {
        let mut sim = success(0, 0);
        sim.transaction_data = "not-xdr".to_string();
        assert!(sim.read_write_len().is_err());
    }

    #[test]
    fn placeholder_account_has_sequence_zero() {
        let account = ResolvedAccount::placeholder();
        assert!(account.is_placeholder());
        assert_eq!(account.info().sequence, 0);
        assert_eq!(
            account.info().account_id,
            ResolvedAccount::PLACEHOLDER_ACCOUNT_ID
        );
    }
}
