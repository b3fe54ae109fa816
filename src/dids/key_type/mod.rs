//! Per algorithm family conversions between [`Key`]s and verification methods.
mod bls12381;
mod ed25519;
mod jwk;
mod x25519;

pub use bls12381::{Bls12381G1G2KeyType, Bls12381G1KeyType, Bls12381G2KeyType};
pub use ed25519::Ed25519KeyType;
pub use jwk::JsonWebKeyType;
pub use x25519::X25519KeyType;

use crate::{
    dids::VerificationMethod,
    keys::{Key, KeyAlgorithm},
    Error,
    Result,
};

/// Strategy converting keys of some algorithms to and from verification methods.
///
/// Implementations are stateless and registered once in a
/// [`KeyDidRegistry`](crate::dids::KeyDidRegistry).
pub trait KeyTypeCapability: Send + Sync {
    /// Algorithms whose keys this capability turns into verification methods.
    fn key_algorithms(&self) -> &'static [KeyAlgorithm];

    /// Verification method types this capability reads, preferred first.
    fn supported_verification_method_types(&self) -> &'static [&'static str];

    /// Verification methods describing `key` in the document of `did`.
    /// The first entry is the canonical representation.
    fn verification_methods(&self, did: &str, key: &Key) -> Result<Vec<VerificationMethod>>;

    fn key_from_verification_method(&self, verification_method: &VerificationMethod) -> Result<Key>;
}

/// Fails unless `key` has `algorithm`.
pub(crate) fn expect_algorithm(key: &Key, algorithm: KeyAlgorithm) -> Result<()> {
    if key.algorithm() != algorithm {
        return Err(Error::UnsupportedKeyAlgorithm(key.algorithm()));
    }
    Ok(())
}

/// Reads a key encoded as `publicKeyBase58`.
pub(crate) fn key_from_base58(
    verification_method: &VerificationMethod,
    algorithm: KeyAlgorithm,
) -> Result<Key> {
    let base58 = verification_method
        .public_key_base58
        .as_ref()
        .ok_or_else(|| Error::MissingPublicKeyMaterial(verification_method.id.clone()))?;
    Key::from_base58(algorithm, base58)
}

/// Reads a key encoded as `publicKeyMultibase`, which must carry `algorithm`.
pub(crate) fn key_from_multibase(
    verification_method: &VerificationMethod,
    algorithm: KeyAlgorithm,
) -> Result<Key> {
    let multibase = verification_method
        .public_key_multibase
        .as_ref()
        .ok_or_else(|| Error::MissingPublicKeyMaterial(verification_method.id.clone()))?;
    let key = Key::from_multibase(multibase)?;
    if key.algorithm() != algorithm {
        return Err(Error::InvalidKeyEncoding(format!(
            "{} multibase key found in a {} verification method",
            key.algorithm(),
            verification_method.type_
        )));
    }
    Ok(key)
}

pub(crate) fn unsupported_type(verification_method: &VerificationMethod) -> Error {
    Error::UnsupportedVerificationMethodType(verification_method.type_.clone())
}
