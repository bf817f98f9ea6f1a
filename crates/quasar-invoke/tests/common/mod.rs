//! In-memory collaborators for driving invocations without a network.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use quasar_invoke::rpc::{STATUS_NOT_FOUND, STATUS_PENDING, STATUS_SUCCESS};
use quasar_invoke::{
    AccountInfo, Clock, CostBreakdown, GetTransactionResponse, InvokeError, KeypairWallet,
    ResultParser, RpcError, RpcGateway, SendTransactionResponse, SignOptions, SimulatedInvocation,
    SimulationOutcome, SimulationSuccess, SubmissionResult, UserInfo, Wallet, WalletError,
};
use stellar_xdr::curr::{
    ContractDataDurability, ContractId, Hash, Int128Parts, InvokeContractArgs,
    InvokeHostFunctionResult, LedgerFootprint, LedgerKey, LedgerKeyContractData, Limits,
    OperationResult, OperationResultTr, ScAddress, ScSymbol, ScVal, SorobanAuthorizationEntry,
    SorobanAuthorizedFunction, SorobanAuthorizedInvocation, SorobanCredentials, SorobanResources,
    SorobanTransactionData, SorobanTransactionDataExt, TransactionEnvelope, TransactionResult,
    TransactionResultExt, TransactionResultResult, VecM, WriteXdr,
};

/// Contract address over 32 zero bytes.
pub const CONTRACT: &str = "CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSC4";
pub const PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const RPC_URL: &str = "http://localhost:8000/soroban/rpc";
pub const TX_HASH: &str = "3389e9f0f1a65f19736cacf544c2e825313e8447f569233bb8db39aa607c8889";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Clock that only moves when slept on.
pub struct VirtualClock {
    base: Instant,
    offset: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl VirtualClock {
    pub fn new() -> Rc<Self> {
        Rc::new(VirtualClock {
            base: Instant::now(),
            offset: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        })
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }

    pub fn sleeps_ms(&self) -> Vec<u128> {
        self.sleeps.borrow().iter().map(|d| d.as_millis()).collect()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }

    fn sleep(&self, duration: Duration) {
        self.offset.set(self.offset.get() + duration);
        self.sleeps.borrow_mut().push(duration);
    }
}

// ---------------------------------------------------------------------------
// RPC gateway
// ---------------------------------------------------------------------------

/// Gateway answering from a script. The last `getTransaction` answer repeats
/// once the queue runs dry; with nothing queued it answers `NOT_FOUND`.
pub struct FakeRpc {
    account: Result<AccountInfo, RpcError>,
    simulation: SimulationOutcome,
    send_response: SendTransactionResponse,
    get_responses: RefCell<VecDeque<GetTransactionResponse>>,
    last_get: RefCell<Option<GetTransactionResponse>>,
    clock: Option<Rc<VirtualClock>>,

    pub get_account_calls: Cell<usize>,
    pub simulate_calls: Cell<usize>,
    pub send_calls: Cell<usize>,
    pub get_calls: Cell<usize>,
    /// Virtual time of each `getTransaction` call
    pub get_times: RefCell<Vec<Duration>>,
    pub sent: RefCell<Vec<TransactionEnvelope>>,
}

impl FakeRpc {
    pub fn new(simulation: SimulationOutcome) -> Self {
        FakeRpc {
            account: Err(RpcError::AccountNotFound("unset".to_string())),
            simulation,
            send_response: send_response(STATUS_PENDING, None),
            get_responses: RefCell::new(VecDeque::new()),
            last_get: RefCell::new(None),
            clock: None,
            get_account_calls: Cell::new(0),
            simulate_calls: Cell::new(0),
            send_calls: Cell::new(0),
            get_calls: Cell::new(0),
            get_times: RefCell::new(Vec::new()),
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn with_account(mut self, account: AccountInfo) -> Self {
        self.account = Ok(account);
        self
    }

    pub fn with_send(mut self, response: SendTransactionResponse) -> Self {
        self.send_response = response;
        self
    }

    pub fn with_gets(self, responses: Vec<GetTransactionResponse>) -> Self {
        self.get_responses.borrow_mut().extend(responses);
        self
    }

    pub fn with_clock(mut self, clock: Rc<VirtualClock>) -> Self {
        self.clock = Some(clock);
        self
    }
}

impl RpcGateway for FakeRpc {
    fn get_account(&self, _account_id: &str) -> Result<AccountInfo, RpcError> {
        self.get_account_calls.set(self.get_account_calls.get() + 1);
        self.account.clone()
    }

    fn simulate_transaction(
        &self,
        _envelope: &TransactionEnvelope,
    ) -> Result<SimulationOutcome, RpcError> {
        self.simulate_calls.set(self.simulate_calls.get() + 1);
        Ok(self.simulation.clone())
    }

    fn send_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SendTransactionResponse, RpcError> {
        self.send_calls.set(self.send_calls.get() + 1);
        self.sent.borrow_mut().push(envelope.clone());
        Ok(self.send_response.clone())
    }

    fn get_transaction(&self, _hash: &str) -> Result<GetTransactionResponse, RpcError> {
        self.get_calls.set(self.get_calls.get() + 1);
        if let Some(clock) = &self.clock {
            self.get_times.borrow_mut().push(clock.elapsed());
        }
        let next = self.get_responses.borrow_mut().pop_front();
        let response = match next {
            Some(response) => response,
            None => self
                .last_get
                .borrow()
                .clone()
                .unwrap_or_else(|| get_response(STATUS_NOT_FOUND, None)),
        };
        *self.last_get.borrow_mut() = Some(response.clone());
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// Wallet that counts signing requests. Connected wallets sign for real.
pub struct FakeWallet {
    keypair: Option<KeypairWallet>,
    pub sign_calls: Cell<usize>,
}

impl FakeWallet {
    pub fn connected() -> Self {
        let secret = stellar_strkey::Strkey::PrivateKeyEd25519(
            stellar_strkey::ed25519::PrivateKey([5u8; 32]),
        )
        .to_string()
        .as_str()
        .to_string();
        FakeWallet {
            keypair: Some(KeypairWallet::from_secret(&secret).unwrap()),
            sign_calls: Cell::new(0),
        }
    }

    pub fn disconnected() -> Self {
        FakeWallet {
            keypair: None,
            sign_calls: Cell::new(0),
        }
    }

    pub fn public_key(&self) -> String {
        self.keypair
            .as_ref()
            .map(|k| k.public_key().to_string())
            .unwrap_or_default()
    }

    /// The account the network reports for this wallet.
    pub fn account(&self, sequence: i64) -> AccountInfo {
        AccountInfo {
            account_id: self.public_key(),
            sequence,
        }
    }
}

impl Wallet for FakeWallet {
    fn is_connected(&self) -> Result<bool, WalletError> {
        Ok(self.keypair.is_some())
    }

    fn is_allowed(&self) -> Result<bool, WalletError> {
        Ok(self.keypair.is_some())
    }

    fn get_user_info(&self) -> Result<UserInfo, WalletError> {
        match &self.keypair {
            Some(keypair) => keypair.get_user_info(),
            None => Ok(UserInfo::default()),
        }
    }

    fn sign_transaction(&self, xdr: &str, opts: &SignOptions) -> Result<String, WalletError> {
        self.sign_calls.set(self.sign_calls.get() + 1);
        match &self.keypair {
            Some(keypair) => keypair.sign_transaction(xdr, opts),
            None => Err(WalletError::Rejected("disconnected".to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn i128_b64(value: i128) -> String {
    ScVal::I128(Int128Parts {
        hi: (value >> 64) as i64,
        lo: value as u64,
    })
    .to_xdr_base64(Limits::none())
    .unwrap()
}

pub fn tx_data_b64(read_write: usize) -> String {
    let key = LedgerKey::ContractData(LedgerKeyContractData {
        contract: ScAddress::Contract(ContractId(Hash([0u8; 32]))),
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
            instructions: 1_000_000,
            disk_read_bytes: 0,
            write_bytes: 128,
        },
        resource_fee: 5_000,
    };
    data.to_xdr_base64(Limits::none()).unwrap()
}

pub fn auth_entry_b64() -> String {
    let entry = SorobanAuthorizationEntry {
        credentials: SorobanCredentials::SourceAccount,
        root_invocation: SorobanAuthorizedInvocation {
            function: SorobanAuthorizedFunction::ContractFn(InvokeContractArgs {
                contract_address: ScAddress::Contract(ContractId(Hash([0u8; 32]))),
                function_name: ScSymbol("transfer".to_string().try_into().unwrap()),
                args: VecM::default(),
            }),
            sub_invocations: VecM::default(),
        },
    };
    entry.to_xdr_base64(Limits::none()).unwrap()
}

pub fn success_simulation(auth: usize, read_write: usize, retval: String) -> SimulationSuccess {
    SimulationSuccess {
        result: Some(SimulatedInvocation {
            auth: vec![auth_entry_b64(); auth],
            retval,
        }),
        transaction_data: tx_data_b64(read_write),
        min_resource_fee: 5_000,
        cost: CostBreakdown {
            cpu_instructions: 1_000_000,
            memory_bytes: 2_048,
        },
        events: vec![],
        latest_ledger: 1_234,
        restore_preamble: None,
    }
}

pub fn simulation(auth: usize, read_write: usize, retval: String) -> SimulationOutcome {
    SimulationOutcome::Success(success_simulation(auth, read_write, retval))
}

pub fn send_response(status: &str, error_result_xdr: Option<&str>) -> SendTransactionResponse {
    SendTransactionResponse {
        hash: TX_HASH.to_string(),
        status: status.to_string(),
        error_result_xdr: error_result_xdr.map(String::from),
        diagnostic_events_xdr: vec![],
    }
}

pub fn get_response(status: &str, result_xdr: Option<String>) -> GetTransactionResponse {
    GetTransactionResponse {
        status: status.to_string(),
        ledger: if status == STATUS_NOT_FOUND { None } else { Some(1_240) },
        result_xdr,
        result_meta_xdr: None,
        envelope_xdr: None,
    }
}

pub fn not_found() -> GetTransactionResponse {
    get_response(STATUS_NOT_FOUND, None)
}

/// A successful `TransactionResult` for one host function call.
pub fn transaction_result() -> TransactionResult {
    TransactionResult {
        fee_charged: 5_100,
        result: TransactionResultResult::TxSuccess(
            vec![OperationResult::OpInner(
                OperationResultTr::InvokeHostFunction(InvokeHostFunctionResult::Success(Hash(
                    [9u8; 32],
                ))),
            )]
            .try_into()
            .unwrap(),
        ),
        ext: TransactionResultExt::V0,
    }
}

pub fn success_get() -> GetTransactionResponse {
    let result_xdr = transaction_result().to_xdr_base64(Limits::none()).unwrap();
    get_response(STATUS_SUCCESS, Some(result_xdr))
}

pub fn completed(response: GetTransactionResponse) -> SubmissionResult {
    SubmissionResult::Completed {
        hash: TX_HASH.to_string(),
        response,
    }
}

/// Parser handing the payload back untouched.
pub fn passthrough() -> ResultParser<String> {
    Box::new(|xdr: &str| Ok::<_, InvokeError>(xdr.to_string()))
}
