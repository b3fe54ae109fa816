//! Boundary to whatever holds the private keys.
//!
//! The envelope layer never sees private key bytes: it asks a [`KeyManager`]
//! which keys are held and has it run X25519 agreements and signatures with
//! them.
mod in_memory;

use zeroize::Zeroizing;

pub use in_memory::InMemoryKeyManager;

use crate::keys::{Key, KeyAlgorithm};

#[derive(Debug, thiserror::Error)]
pub enum KeyManagerError {
    #[error("no private key held for `{0}`")]
    KeyNotFound(String),
    #[error("operation is not available for {0} keys")]
    UnsupportedKeyAlgorithm(KeyAlgorithm),
    #[error("key agreement produced a non-contributory shared secret")]
    NonContributory,
    #[error("key manager failure: `{0}`")]
    Failed(String),
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait KeyManager: Send + Sync {
    /// Public halves of every private key available locally.
    async fn held_keys(&self) -> Result<Vec<Key>, KeyManagerError>;

    /// X25519 agreement between the private half of `key` and `peer`.
    ///
    /// Ed25519 keys take part through their X25519 form.
    async fn key_agreement(
        &self,
        key: &Key,
        peer: &[u8; 32],
    ) -> Result<Zeroizing<[u8; 32]>, KeyManagerError>;

    /// Ed25519 signature over `message` with the private half of `key`.
    ///
    /// Check it with [`Key::verify_signature`].
    async fn sign(&self, key: &Key, message: &[u8]) -> Result<Vec<u8>, KeyManagerError>;
}
