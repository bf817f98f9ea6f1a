//! Transaction signing with ed25519 keypairs.

use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use stellar_strkey::Strkey;
use stellar_xdr::curr::{
    DecoratedSignature, Limits, Signature, SignatureHint, Transaction, TransactionEnvelope,
    WriteXdr,
};

use crate::error::WalletError;

/// `ENVELOPE_TYPE_TX` discriminant, big-endian.
const ENVELOPE_TYPE_TX: [u8; 4] = 2_i32.to_be_bytes();

/// Decode a Stellar secret key (`S...` format) into an ed25519 `SigningKey`.
pub fn decode_secret_key(secret: &str) -> Result<SigningKey, WalletError> {
    match Strkey::from_string(secret) {
        Ok(Strkey::PrivateKeyEd25519(sk)) => Ok(SigningKey::from_bytes(&sk.0)),
        Ok(_) => Err(WalletError::InvalidSecretKey(
            "expected S... secret key, got different key type".into(),
        )),
        Err(e) => Err(WalletError::InvalidSecretKey(format!(
            "invalid secret key format: {}",
            e
        ))),
    }
}

/// `G...` address of the key's public half.
pub fn public_key_strkey(signing_key: &SigningKey) -> String {
    let pk = stellar_strkey::ed25519::PublicKey(signing_key.verifying_key().to_bytes());
    Strkey::PublicKeyEd25519(pk).to_string().as_str().to_string()
}

/// Sign a `TransactionEnvelope` with the given keypair and network passphrase.
///
/// Computes `SHA256(SHA256(passphrase) || EnvelopeTypeTx [0x00000002] || tx_xdr)`,
/// signs the 32-byte hash with ed25519, and appends a `DecoratedSignature` to
/// any signatures already present.
pub fn sign_transaction_envelope(
    envelope: TransactionEnvelope,
    signing_key: &SigningKey,
    network_passphrase: &str,
) -> Result<TransactionEnvelope, WalletError> {
    let TransactionEnvelope::Tx(mut v1) = envelope else {
        return Err(WalletError::SigningFailed(
            "expected Tx envelope variant".into(),
        ));
    };

    let tx_hash = transaction_hash(&v1.tx, network_passphrase)?;
    let signature = signing_key.sign(&tx_hash);

    // Hint is the last 4 bytes of the public key
    let pk_bytes = signing_key.verifying_key().to_bytes();
    let hint = SignatureHint([pk_bytes[28], pk_bytes[29], pk_bytes[30], pk_bytes[31]]);

    let decorated = DecoratedSignature {
        hint,
        signature: Signature(
            signature
                .to_bytes()
                .to_vec()
                .try_into()
                .map_err(|e| WalletError::SigningFailed(format!("signature: {}", e)))?,
        ),
    };

    let mut sigs: Vec<DecoratedSignature> = v1.signatures.to_vec();
    sigs.push(decorated);
    v1.signatures = sigs
        .try_into()
        .map_err(|e| WalletError::SigningFailed(format!("signatures vec: {}", e)))?;

    Ok(TransactionEnvelope::Tx(v1))
}

/// Compute the Stellar transaction hash:
/// `SHA256( SHA256(network_passphrase) || EnvelopeTypeTx (0x00000002 BE) || tx_xdr )`
pub fn transaction_hash(
    tx: &Transaction,
    network_passphrase: &str,
) -> Result<[u8; 32], WalletError> {
    let network_id: [u8; 32] = Sha256::digest(network_passphrase.as_bytes()).into();

    let tx_xdr = tx
        .to_xdr(Limits::none())
        .map_err(|e| WalletError::SigningFailed(format!("serialize tx: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(network_id);
    hasher.update(ENVELOPE_TYPE_TX);
    hasher.update(&tx_xdr);
    Ok(hasher.finalize().into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
