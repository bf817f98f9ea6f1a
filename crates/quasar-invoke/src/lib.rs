pub mod config;
pub mod error;
pub mod invoke_error;
pub mod invoker;
pub mod poller;
pub mod rpc;
pub mod sign;
pub mod simulator;
pub mod transaction;
pub mod types;
pub mod values;
pub mod wallet;

pub use config::{ConfigError, NetworkConfig, PollingConfig};
pub use error::{RpcError, WalletError};
pub use invoke_error::InvokeError;
pub use invoker::{invoke, InvocationRequest, Invoker};
pub use poller::{send_tx, Clock, ConfirmationPoller, SystemClock};
pub use rpc::{GetTransactionResponse, RpcClient, RpcGateway, SendTransactionResponse};
pub use types::{
    AccountInfo, CostBreakdown, InvokeOutput, ResolvedAccount, ResponseType, SimulatedInvocation,
    SimulationOutcome, SimulationSuccess, SubmissionResult,
};
pub use values::{i128_parser, parse_scval, scval_parser, ResultParser};
pub use wallet::{
    default_wallet, sign_tx, DisconnectedWallet, KeypairWallet, SignOptions, UserInfo, Wallet,
};
