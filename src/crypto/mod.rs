//! Collection of utilities for cryptography related components.
pub mod encryptor;
pub(crate) mod key_wrap;

pub use encryptor::CryptoAlgorithm;

pub use crate::Error;

/// Return `Fn` signature definition for symmetric cryptography method.
/// Arguments sequence: Nonce, Key, Message, Additional authenticated data.
pub type SymmetricCypherMethod =
    Box<dyn Fn(&[u8], &[u8], &[u8], &[u8]) -> Result<Vec<u8>, Error> + Send + Sync>;

/// Trait must be implemented for pluggable content encryption.
/// Implemented by `CryptoAlgorithm`.
pub trait Cypher {
    fn encryptor(&self) -> SymmetricCypherMethod;
    fn decryptor(&self) -> SymmetricCypherMethod;
}
