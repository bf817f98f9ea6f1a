//! Result parsers for common contract return types.

use stellar_xdr::curr::{Int128Parts, Limits, ReadXdr, ScVal};

use crate::invoke_error::InvokeError;

/// Turns a base64 XDR payload into the caller's result type.
pub type ResultParser<T> = Box<dyn Fn(&str) -> Result<T, InvokeError>>;

/// Decode a base64 XDR `ScVal`.
pub fn parse_scval(xdr: &str) -> Result<ScVal, InvokeError> {
    ScVal::from_xdr_base64(xdr, Limits::none())
        .map_err(|e| InvokeError::Parse(format!("ScVal: {}", e)))
}

/// Parser returning the raw `ScVal`.
pub fn scval_parser() -> ResultParser<ScVal> {
    Box::new(parse_scval)
}

/// Parser for integer return values, widened to `i128`.
pub fn i128_parser() -> ResultParser<i128> {
    Box::new(|xdr| scval_to_i128(&parse_scval(xdr)?))
}

pub fn scval_to_i128(value: &ScVal) -> Result<i128, InvokeError> {
    match value {
        ScVal::I128(Int128Parts { hi, lo }) => Ok(((*hi as i128) << 64) | (*lo as i128)),
        ScVal::I64(v) => Ok(*v as i128),
        ScVal::U64(v) => Ok(*v as i128),
        ScVal::I32(v) => Ok(*v as i128),
        ScVal::U32(v) => Ok(*v as i128),
        other => Err(InvokeError::Parse(format!(
            "expected an integer, got {:?}",
            other
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
