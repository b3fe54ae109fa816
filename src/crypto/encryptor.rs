use std::convert::TryFrom;

use aes_gcm::{aead::generic_array::GenericArray, Aes256Gcm};
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305,
    XNonce,
};

use super::*;

/// Plugable closure generator enum, which creates instance of crypto function
///     based on selected algorythm types.
/// # Attention:
/// Immutable and should be instance per invocation to make sure no
///     sensitive data is been stored in memory longer than necessary.
/// Underlying algorithms are implemented by Rust-crypto crate family.
///
/// Allowed (and implemented) content encryption algorithms (JWA).
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CryptoAlgorithm {
    #[default]
    XC20P,
    A256GCM,
}

impl CryptoAlgorithm {
    /// JWA `enc` identifier.
    pub fn jwa_name(&self) -> &'static str {
        match self {
            CryptoAlgorithm::XC20P => "XC20P",
            CryptoAlgorithm::A256GCM => "A256GCM",
        }
    }

    /// Suffix of the matching key wrapping `alg`, as in `ECDH-ES+XC20PKW`.
    pub fn key_wrap_name(&self) -> &'static str {
        match self {
            CryptoAlgorithm::XC20P => "XC20PKW",
            CryptoAlgorithm::A256GCM => "A256KW",
        }
    }

    pub fn nonce_len(&self) -> usize {
        match self {
            CryptoAlgorithm::XC20P => 24,
            CryptoAlgorithm::A256GCM => 12,
        }
    }
}

impl Cypher for CryptoAlgorithm {
    /// Generates + invokes crypto of `SymmetricCypherMethod` which perfoms encryption.
    /// Algorithm selected is based on struct's `CryptoAlgorithm` property.
    fn encryptor(&self) -> SymmetricCypherMethod {
        match self {
            CryptoAlgorithm::XC20P => Box::new(
                |nonce: &[u8], key: &[u8], message: &[u8], aad: &[u8]| -> Result<Vec<u8>, Error> {
                    check_nonce(nonce, 24)?;
                    let aead = XChaCha20Poly1305::new_from_slice(key)
                        .map_err(|_| Error::PlugCryptoFailure)?;
                    aead.encrypt(XNonce::from_slice(nonce), Payload { msg: message, aad })
                        .map_err(|_| Error::PlugCryptoFailure)
                },
            ),
            CryptoAlgorithm::A256GCM => Box::new(
                |nonce: &[u8], key: &[u8], message: &[u8], aad: &[u8]| -> Result<Vec<u8>, Error> {
                    check_nonce(nonce, 12)?;
                    let aead =
                        Aes256Gcm::new_from_slice(key).map_err(|_| Error::PlugCryptoFailure)?;
                    aead.encrypt(GenericArray::from_slice(nonce), Payload { msg: message, aad })
                        .map_err(|_| Error::PlugCryptoFailure)
                },
            ),
        }
    }

    /// Generates + invokes crypto of `SymmetricCypherMethod` which perfoms decryption.
    /// Authentication failures surface as `Error::DecryptionFailed`.
    fn decryptor(&self) -> SymmetricCypherMethod {
        match self {
            CryptoAlgorithm::XC20P => Box::new(
                |nonce: &[u8], key: &[u8], message: &[u8], aad: &[u8]| -> Result<Vec<u8>, Error> {
                    check_nonce(nonce, 24)?;
                    let aead = XChaCha20Poly1305::new_from_slice(key)
                        .map_err(|_| Error::PlugCryptoFailure)?;
                    aead.decrypt(XNonce::from_slice(nonce), Payload { msg: message, aad })
                        .map_err(|_| Error::DecryptionFailed)
                },
            ),
            CryptoAlgorithm::A256GCM => Box::new(
                |nonce: &[u8], key: &[u8], message: &[u8], aad: &[u8]| -> Result<Vec<u8>, Error> {
                    check_nonce(nonce, 12)?;
                    let aead =
                        Aes256Gcm::new_from_slice(key).map_err(|_| Error::PlugCryptoFailure)?;
                    aead.decrypt(GenericArray::from_slice(nonce), Payload { msg: message, aad })
                        .map_err(|_| Error::DecryptionFailed)
                },
            ),
        }
    }
}

impl TryFrom<&str> for CryptoAlgorithm {
    type Error = Error;
    fn try_from(incoming: &str) -> Result<Self, Error> {
        match incoming {
            "XC20P" => Ok(Self::XC20P),
            "A256GCM" => Ok(Self::A256GCM),
            _ => Err(Error::Generic(format!(
                "content encryption '{}' not implemented",
                incoming
            ))),
        }
    }
}

// inner helper function
fn check_nonce(nonce: &[u8], expected_len: usize) -> Result<(), Error> {
    if nonce.len() != expected_len {
        return Err(Error::PlugCryptoFailure);
    }
    Ok(())
}
