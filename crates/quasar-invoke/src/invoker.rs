//! Contract method invocation: simulate, then sign, submit and confirm
//! when the call changes state.

use log::{debug, info, warn};
use stellar_xdr::curr::ScVal;

use crate::config::{NetworkConfig, PollingConfig};
use crate::invoke_error::InvokeError;
use crate::poller::{Clock, ConfirmationPoller, SystemClock};
use crate::rpc::{RpcClient, RpcGateway};
use crate::transaction::{
    assemble_transaction, build_invoke_transaction, transaction_result_payload,
};
use crate::types::{
    InvokeOutput, ResolvedAccount, ResponseType, SimulationOutcome, SubmissionResult,
};
use crate::values::ResultParser;
use crate::wallet::{default_wallet, sign_tx, Wallet};

/// Base fee in stroops used when the caller doesn't set one.
pub const DEFAULT_FEE: u32 = 100;

/// Seconds to wait for confirmation when the caller doesn't set a limit.
pub const DEFAULT_SECONDS_TO_WAIT: u64 = 10;

/// One contract method call.
pub struct InvocationRequest<T> {
    pub method: String,
    pub args: Vec<ScVal>,
    /// Base fee in stroops, before the simulated resource fee is added
    pub fee: u32,
    pub response_type: ResponseType,
    /// Decodes a base64 XDR payload. Required when `response_type` is `Value`.
    pub parse_result_xdr: Option<ResultParser<T>>,
    /// 0 returns right after `sendTransaction` without polling
    pub seconds_to_wait: u64,
    pub rpc_url: String,
    pub network_passphrase: String,
    /// `C...` contract address
    pub contract_id: String,
}

impl<T> InvocationRequest<T> {
    pub fn new(
        method: impl Into<String>,
        contract_id: impl Into<String>,
        rpc_url: impl Into<String>,
        network_passphrase: impl Into<String>,
    ) -> Self {
        InvocationRequest {
            method: method.into(),
            args: Vec::new(),
            fee: DEFAULT_FEE,
            response_type: ResponseType::default(),
            parse_result_xdr: None,
            seconds_to_wait: DEFAULT_SECONDS_TO_WAIT,
            rpc_url: rpc_url.into(),
            network_passphrase: network_passphrase.into(),
            contract_id: contract_id.into(),
        }
    }

    pub fn for_network(
        method: impl Into<String>,
        contract_id: impl Into<String>,
        network: &NetworkConfig,
    ) -> Self {
        Self::new(
            method,
            contract_id,
            network.rpc_url.clone(),
            network.network_passphrase.clone(),
        )
    }

    pub fn args(mut self, args: Vec<ScVal>) -> Self {
        self.args = args;
        self
    }

    pub fn fee(mut self, fee: u32) -> Self {
        self.fee = fee;
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn parser(mut self, parser: ResultParser<T>) -> Self {
        self.parse_result_xdr = Some(parser);
        self
    }

    pub fn seconds_to_wait(mut self, seconds: u64) -> Self {
        self.seconds_to_wait = seconds;
        self
    }

    fn parse(&self, xdr: &str) -> Result<T, InvokeError> {
        let parser = self
            .parse_result_xdr
            .as_ref()
            .ok_or(InvokeError::MissingResultParser)?;
        parser(xdr)
    }
}

/// Drives invocations against one gateway on behalf of one wallet.
///
/// The request's `rpc_url` is not consulted here; the gateway passed to
/// [`Invoker::new`] is used for every call.
pub struct Invoker<'a> {
    rpc: &'a dyn RpcGateway,
    wallet: &'a dyn Wallet,
    clock: &'a dyn Clock,
    polling: PollingConfig,
}

impl<'a> Invoker<'a> {
    pub fn new(rpc: &'a dyn RpcGateway, wallet: &'a dyn Wallet) -> Self {
        Invoker {
            rpc,
            wallet,
            clock: &SystemClock,
            polling: PollingConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    /// The wallet's account when it is connected, allowed and names a key;
    /// the placeholder account otherwise.
    pub fn resolve_account(&self) -> Result<ResolvedAccount, InvokeError> {
        if !self.wallet.is_connected()? || !self.wallet.is_allowed()? {
            debug!("wallet not connected or not allowed; using placeholder account");
            return Ok(ResolvedAccount::placeholder());
        }

        let public_key = self
            .wallet
            .get_user_info()?
            .public_key
            .filter(|key| !key.is_empty());
        let Some(public_key) = public_key else {
            debug!("wallet exposes no public key; using placeholder account");
            return Ok(ResolvedAccount::placeholder());
        };

        let account = self.rpc.get_account(&public_key)?;
        debug!(
            "source account {} (sequence {})",
            account.account_id, account.sequence
        );
        Ok(ResolvedAccount::Wallet(account))
    }

    /// Invoke `request.method` on `request.contract_id`.
    ///
    /// View calls (no auth entries, empty read/write footprint) return straight
    /// from simulation. Everything else is signed by the wallet and submitted.
    pub fn invoke<T>(&self, request: InvocationRequest<T>) -> Result<InvokeOutput<T>, InvokeError> {
        if request.response_type == ResponseType::Value && request.parse_result_xdr.is_none() {
            return Err(InvokeError::MissingResultParser);
        }

        let account = self.resolve_account()?;
        let tx = build_invoke_transaction(
            account.info(),
            &request.contract_id,
            &request.method,
            &request.args,
            request.fee,
        )?;

        let outcome = self.rpc.simulate_transaction(&tx)?;
        let simulation = match outcome {
            SimulationOutcome::Failed { error } => {
                return Err(InvokeError::SimulationFailed(error));
            }
            SimulationOutcome::Success(_) if request.response_type == ResponseType::Simulated => {
                return Ok(InvokeOutput::Simulation(outcome));
            }
            SimulationOutcome::Success(simulation) => simulation,
        };

        if let Some(preamble) = &simulation.restore_preamble {
            warn!(
                "{} touches archived ledger entries; a restore may be needed \
                 (restorePreamble: {})",
                request.method, preamble
            );
        }

        let Some(invocation) = &simulation.result else {
            let diagnostic =
                serde_json::to_string(&simulation).unwrap_or_else(|_| format!("{:?}", simulation));
            return Err(InvokeError::InvalidSimulation(diagnostic));
        };
        let auth_count = invocation.auth.len();
        let retval = invocation.retval.clone();

        if simulation.is_view_call()? {
            debug!("{} is a view call; skipping submission", request.method);
            if request.response_type == ResponseType::Full {
                return Ok(InvokeOutput::Simulation(SimulationOutcome::Success(simulation)));
            }
            return Ok(InvokeOutput::Value(request.parse(&retval)?));
        }

        if auth_count > 1 {
            return Err(InvokeError::NotSupported(format!(
                "multiple auths not yet supported; {} needs {} authorization entries",
                request.method, auth_count
            )));
        }
        if auth_count == 1 {
            debug!(
                "{} needs one authorization entry; assumed self-authorized, not verified",
                request.method
            );
        }

        if account.is_placeholder() {
            return Err(InvokeError::NotConnected);
        }

        let assembled = assemble_transaction(tx, &simulation, request.fee)?;
        let signed = sign_tx(self.wallet, &assembled, &request.network_passphrase)?;

        let result = ConfirmationPoller::new(self.rpc, self.clock, self.polling)
            .submit_and_confirm(&signed, request.seconds_to_wait)?;
        info!("submitted {} (hash: {})", request.method, result.hash());

        if request.response_type == ResponseType::Full {
            return Ok(InvokeOutput::Submission(result));
        }
        shape_result(&request, result)
    }
}

/// Decode a submission result through the request's parser, or hand it back
/// raw when there is nothing to decode.
fn shape_result<T>(
    request: &InvocationRequest<T>,
    result: SubmissionResult,
) -> Result<InvokeOutput<T>, InvokeError> {
    match result {
        SubmissionResult::Completed { hash, response } => {
            let Some(result_xdr) = response.result_xdr.clone() else {
                return Ok(unrecognized(SubmissionResult::Completed { hash, response }));
            };
            if !response.is_success() {
                warn!(
                    "Transaction submission failed (status {}, hash {})! \
                     Returning full RPC response.",
                    response.status, hash
                );
                let raw = SubmissionResult::Completed { hash, response };
                return Ok(InvokeOutput::Submission(raw));
            }
            let payload = transaction_result_payload(&result_xdr)?;
            Ok(InvokeOutput::Value(request.parse(&payload)?))
        }
        SubmissionResult::Rejected(sent) => {
            let Some(error_xdr) = sent.error_result_xdr.clone() else {
                return Ok(unrecognized(SubmissionResult::Rejected(sent)));
            };
            Ok(InvokeOutput::Value(request.parse(&error_xdr)?))
        }
        other => Ok(unrecognized(other)),
    }
}

fn unrecognized<T>(result: SubmissionResult) -> InvokeOutput<T> {
    warn!(
        "Don't know how to parse result! Returning full RPC response (hash: {}).",
        result.hash()
    );
    InvokeOutput::Submission(result)
}

/// Invoke through an [`RpcClient`] for `request.rpc_url`.
///
/// When `wallet` is `None` the wallet from [`default_wallet`] is used.
pub fn invoke<T>(
    request: InvocationRequest<T>,
    wallet: Option<&dyn Wallet>,
) -> Result<InvokeOutput<T>, InvokeError> {
    let rpc = RpcClient::new(&request.rpc_url);
    match wallet {
        Some(wallet) => Invoker::new(&rpc, wallet).invoke(request),
        None => {
            let wallet = default_wallet()?;
            Invoker::new(&rpc, wallet.as_ref()).invoke(request)
        }
    }
}
