//! Wallet capability and the wallets shipped with this crate.
//!
//! A wallet answers whether it is connected and allowed to act for the
//! caller, exposes the public key of the selected account, and signs
//! base64 transaction envelopes for a given network.

use ed25519_dalek::SigningKey;
use log::debug;
use stellar_xdr::curr::TransactionEnvelope;

use crate::error::WalletError;
use crate::invoke_error::InvokeError;
use crate::sign::{decode_secret_key, public_key_strkey, sign_transaction_envelope};
use crate::transaction::{envelope_from_base64, envelope_to_base64};

/// Environment variable holding the secret key of the default wallet.
pub const SECRET_KEY_ENV: &str = "QUASAR_SECRET_KEY";

/// Account details the wallet exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    /// `G...` address of the selected account, if any
    pub public_key: Option<String>,
}

/// Options passed along with a signing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOptions {
    pub network_passphrase: String,
}

pub trait Wallet {
    fn is_connected(&self) -> Result<bool, WalletError>;

    /// Whether the user allowed this application to use the wallet.
    fn is_allowed(&self) -> Result<bool, WalletError>;

    fn get_user_info(&self) -> Result<UserInfo, WalletError>;

    /// Sign a base64 XDR envelope, returning the signed envelope as base64 XDR.
    fn sign_transaction(&self, xdr: &str, opts: &SignOptions) -> Result<String, WalletError>;
}

/// Sign `envelope` through `wallet` and parse the signed envelope it returns.
pub fn sign_tx(
    wallet: &dyn Wallet,
    envelope: &TransactionEnvelope,
    network_passphrase: &str,
) -> Result<TransactionEnvelope, InvokeError> {
    let xdr = envelope_to_base64(envelope)?;
    let opts = SignOptions {
        network_passphrase: network_passphrase.to_string(),
    };
    let signed = wallet.sign_transaction(&xdr, &opts)?;
    Ok(envelope_from_base64(&signed)?)
}

/// Wallet backed by a local ed25519 secret key. Always connected.
pub struct KeypairWallet {
    signing_key: SigningKey,
    public_key: String,
}

impl KeypairWallet {
    pub fn new(signing_key: SigningKey) -> Self {
        let public_key = public_key_strkey(&signing_key);
        KeypairWallet {
            signing_key,
            public_key,
        }
    }

    /// Build from an `S...` secret key.
    pub fn from_secret(secret: &str) -> Result<Self, WalletError> {
        Ok(Self::new(decode_secret_key(secret)?))
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }
}

impl std::fmt::Debug for KeypairWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairWallet")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl Wallet for KeypairWallet {
    fn is_connected(&self) -> Result<bool, WalletError> {
        Ok(true)
    }

    fn is_allowed(&self) -> Result<bool, WalletError> {
        Ok(true)
    }

    fn get_user_info(&self) -> Result<UserInfo, WalletError> {
        Ok(UserInfo {
            public_key: Some(self.public_key.clone()),
        })
    }

    fn sign_transaction(&self, xdr: &str, opts: &SignOptions) -> Result<String, WalletError> {
        let envelope = envelope_from_base64(xdr)
            .map_err(|e| WalletError::SigningFailed(format!("decode envelope: {}", e)))?;
        let signed =
            sign_transaction_envelope(envelope, &self.signing_key, &opts.network_passphrase)?;
        envelope_to_base64(&signed)
            .map_err(|e| WalletError::SigningFailed(format!("encode envelope: {}", e)))
    }
}

/// Wallet that is never connected. Invocations through it can only run view calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedWallet;

impl Wallet for DisconnectedWallet {
    fn is_connected(&self) -> Result<bool, WalletError> {
        Ok(false)
    }

    fn is_allowed(&self) -> Result<bool, WalletError> {
        Ok(false)
    }

    fn get_user_info(&self) -> Result<UserInfo, WalletError> {
        Ok(UserInfo::default())
    }

    fn sign_transaction(&self, _xdr: &str, _opts: &SignOptions) -> Result<String, WalletError> {
        Err(WalletError::Rejected("no wallet connected".into()))
    }
}

/// The wallet used when the caller doesn't supply one.
///
/// A `KeypairWallet` when `QUASAR_SECRET_KEY` is set, otherwise a
/// `DisconnectedWallet`.
pub fn default_wallet() -> Result<Box<dyn Wallet>, WalletError> {
    let secret = std::env::var(SECRET_KEY_ENV).ok();
    wallet_from_secret(secret.as_deref())
}

fn wallet_from_secret(secret: Option<&str>) -> Result<Box<dyn Wallet>, WalletError> {
    match secret {
        Some(secret) if !secret.is_empty() => {
            let wallet = KeypairWallet::from_secret(secret)?;
            debug!("default wallet: keypair {}", wallet.public_key());
            Ok(Box::new(wallet))
        }
        _ => {
            debug!("default wallet: disconnected ({} not set)", SECRET_KEY_ENV);
            Ok(Box::new(DisconnectedWallet))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
