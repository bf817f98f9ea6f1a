//! Build, assemble and (de)serialize Soroban invocation transactions.

use stellar_strkey::Strkey;
use stellar_xdr::curr::{
    AccountId, ContractId, Hash, HostFunction, InvokeContractArgs, InvokeHostFunctionOp, Limits,
    Memo, MuxedAccount, Operation, OperationBody, Preconditions, PublicKey, ReadXdr, ScAddress,
    ScSymbol, ScVal, SequenceNumber, SorobanAuthorizationEntry, SorobanTransactionData,
    TimeBounds, TimePoint, Transaction, TransactionEnvelope, TransactionExt, TransactionResult,
    TransactionV1Envelope, Uint256, VecM, WriteXdr,
};

use crate::invoke_error::InvokeError;
use crate::types::{AccountInfo, SimulationSuccess};

/// Build an unsigned single-operation transaction calling `method` on `contract_id`.
///
/// The sequence number is the account's current sequence plus one, and the
/// time bounds are `0..0` (no expiry). The envelope has no signatures and no
/// Soroban data yet, so it is only fit for `simulateTransaction`.
pub fn build_invoke_transaction(
    source: &AccountInfo,
    contract_id: &str,
    method: &str,
    args: &[ScVal],
    fee: u32,
) -> Result<TransactionEnvelope, InvokeError> {
    let invoke_args = InvokeContractArgs {
        contract_address: decode_contract_address(contract_id)?,
        function_name: ScSymbol(method.to_string().try_into().map_err(|e| {
            InvokeError::Xdr(format!("method name '{}': {}", method, e))
        })?),
        args: args
            .to_vec()
            .try_into()
            .map_err(|e| InvokeError::Xdr(format!("arguments: {}", e)))?,
    };

    let invoke_op = InvokeHostFunctionOp {
        host_function: HostFunction::InvokeContract(invoke_args),
        auth: VecM::default(),
    };

    let operation = Operation {
        source_account: None,
        body: OperationBody::InvokeHostFunction(invoke_op),
    };

    let operations = vec![operation]
        .try_into()
        .map_err(|e| InvokeError::Xdr(format!("operations: {}", e)))?;

    let AccountId(PublicKey::PublicKeyTypeEd25519(account_key)) =
        decode_account_id(&source.account_id)?;

    let tx = Transaction {
        source_account: MuxedAccount::Ed25519(account_key),
        fee,
        seq_num: SequenceNumber(source.sequence.saturating_add(1)),
        cond: Preconditions::Time(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(0),
        }),
        memo: Memo::None,
        operations,
        ext: TransactionExt::V0,
    };

    Ok(TransactionEnvelope::Tx(TransactionV1Envelope {
        tx,
        signatures: VecM::default(),
    }))
}

/// Assemble a transaction by applying simulation results.
///
/// Takes the unsigned envelope and the simulation output, then:
/// 1. Sets `SorobanTransactionData` on the transaction extension
/// 2. Updates the fee to `base_fee + min_resource_fee`
/// 3. Populates auth entries on the `InvokeHostFunctionOp` if it has none
pub fn assemble_transaction(
    envelope: TransactionEnvelope,
    simulation: &SimulationSuccess,
    base_fee: u32,
) -> Result<TransactionEnvelope, InvokeError> {
    let TransactionEnvelope::Tx(mut v1) = envelope else {
        return Err(InvokeError::Xdr("expected Tx envelope variant".to_string()));
    };

    if !simulation.transaction_data.is_empty() {
        let soroban_data =
            SorobanTransactionData::from_xdr_base64(&simulation.transaction_data, Limits::none())
                .map_err(|e| InvokeError::Xdr(format!("transaction data: {}", e)))?;
        v1.tx.ext = TransactionExt::V1(soroban_data);
    }

    // Capped at u32::MAX
    let total_fee = (base_fee as u64).saturating_add(simulation.min_resource_fee);
    v1.tx.fee = u32::try_from(total_fee).unwrap_or(u32::MAX);

    let auth_entries = simulation
        .result
        .as_ref()
        .map(|r| r.auth.as_slice())
        .unwrap_or_default();

    // VecM doesn't implement DerefMut, so the operations vec is rebuilt.
    if !auth_entries.is_empty() {
        let mut ops: Vec<Operation> = v1.tx.operations.to_vec();
        if let Some(OperationBody::InvokeHostFunction(op)) = ops.first_mut().map(|o| &mut o.body)
        {
            if op.auth.is_empty() {
                let mut auth_vec = Vec::with_capacity(auth_entries.len());
                for auth_b64 in auth_entries {
                    let entry =
                        SorobanAuthorizationEntry::from_xdr_base64(auth_b64, Limits::none())
                            .map_err(|e| InvokeError::Xdr(format!("auth entry: {}", e)))?;
                    auth_vec.push(entry);
                }
                op.auth = auth_vec
                    .try_into()
                    .map_err(|e| InvokeError::Xdr(format!("auth vec: {}", e)))?;
            }
        }
        v1.tx.operations = ops
            .try_into()
            .map_err(|e| InvokeError::Xdr(format!("operations: {}", e)))?;
    }

    Ok(TransactionEnvelope::Tx(v1))
}

/// Serialize a `TransactionEnvelope` to base64 XDR.
pub fn envelope_to_base64(
    envelope: &TransactionEnvelope,
) -> Result<String, stellar_xdr::curr::Error> {
    envelope.to_xdr_base64(Limits::none())
}

/// Parse a base64 XDR `TransactionEnvelope`.
pub fn envelope_from_base64(xdr: &str) -> Result<TransactionEnvelope, stellar_xdr::curr::Error> {
    TransactionEnvelope::from_xdr_base64(xdr, Limits::none())
}

/// Extract the `result` arm of a base64 `TransactionResult`, re-encoded as base64.
pub fn transaction_result_payload(result_xdr: &str) -> Result<String, stellar_xdr::curr::Error> {
    let result = TransactionResult::from_xdr_base64(result_xdr, Limits::none())?;
    result.result.to_xdr_base64(Limits::none())
}

/// Decode a `C...` contract address.
pub fn decode_contract_address(contract_id: &str) -> Result<ScAddress, InvokeError> {
    match Strkey::from_string(contract_id) {
        Ok(Strkey::Contract(c)) => Ok(ScAddress::Contract(ContractId(Hash(c.0)))),
        Ok(_) => Err(InvokeError::InvalidAddress {
            address: contract_id.to_string(),
            reason: "expected a C... contract address".to_string(),
        }),
        Err(e) => Err(InvokeError::InvalidAddress {
            address: contract_id.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Decode a `G...` account address.
pub fn decode_account_id(account_id: &str) -> Result<AccountId, InvokeError> {
    match Strkey::from_string(account_id) {
        Ok(Strkey::PublicKeyEd25519(pk)) => {
            Ok(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(pk.0))))
        }
        Ok(_) => Err(InvokeError::InvalidAddress {
            address: account_id.to_string(),
            reason: "source must be a G... account address".to_string(),
        }),
        Err(e) => Err(InvokeError::InvalidAddress {
            address: account_id.to_string(),
            reason: e.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
