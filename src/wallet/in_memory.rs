use ed25519_dalek::{Signer, SigningKey};
use rand_core::OsRng;
use sha2::{Digest, Sha512};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use super::{KeyManager, KeyManagerError};
use crate::keys::{Key, KeyAlgorithm};

/// Process local [`KeyManager`] keeping X25519 agreement secrets and Ed25519
/// signing keys in memory.
///
/// Secrets are zeroized on drop. Keys are set up through `&mut self` before
/// the manager is shared, after which it is read only.
#[derive(Default)]
pub struct InMemoryKeyManager {
    keys: Vec<(Key, StaticSecret)>,
    signing_keys: Vec<(Key, SigningKey)>,
}

impl InMemoryKeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&mut self, algorithm: KeyAlgorithm) -> Result<Key, KeyManagerError> {
        match algorithm {
            KeyAlgorithm::Ed25519 => {
                let signing_key = SigningKey::generate(&mut OsRng);
                self.import_ed25519_seed(&signing_key.to_bytes())
            }
            KeyAlgorithm::X25519 => {
                let secret = StaticSecret::random_from_rng(OsRng);
                self.import_x25519_secret(&secret.to_bytes())
            }
            other => Err(KeyManagerError::UnsupportedKeyAlgorithm(other)),
        }
    }

    /// Imports an Ed25519 private key given as its 32 byte seed.
    pub fn import_ed25519_seed(&mut self, seed: &[u8; 32]) -> Result<Key, KeyManagerError> {
        let signing_key = SigningKey::from_bytes(seed);
        let key = Key::from_public_bytes(KeyAlgorithm::Ed25519, signing_key.verifying_key().as_bytes())
            .map_err(|e| KeyManagerError::Failed(e.to_string()))?;
        self.signing_keys.retain(|(held, _)| held != &key);
        self.signing_keys.push((key.clone(), signing_key));

        // the X25519 scalar is the lower half of the expanded Ed25519 secret
        let mut scalar = Zeroizing::new([0u8; 32]);
        scalar.copy_from_slice(&Sha512::digest(seed)[..32]);
        self.insert(key.clone(), StaticSecret::from(*scalar));
        Ok(key)
    }

    pub fn import_x25519_secret(&mut self, secret: &[u8; 32]) -> Result<Key, KeyManagerError> {
        let secret = StaticSecret::from(*secret);
        let key = Key::from_public_bytes(KeyAlgorithm::X25519, PublicKey::from(&secret).as_bytes())
            .map_err(|e| KeyManagerError::Failed(e.to_string()))?;
        self.insert(key.clone(), secret);
        Ok(key)
    }

    fn insert(&mut self, key: Key, secret: StaticSecret) {
        self.keys.retain(|(held, _)| held != &key);
        debug!("holding {} key {}", key.algorithm(), key);
        self.keys.push((key, secret));
    }
}

#[async_trait::async_trait]
impl KeyManager for InMemoryKeyManager {
    async fn held_keys(&self) -> Result<Vec<Key>, KeyManagerError> {
        Ok(self.keys.iter().map(|(key, _)| key.clone()).collect())
    }

    async fn key_agreement(
        &self,
        key: &Key,
        peer: &[u8; 32],
    ) -> Result<Zeroizing<[u8; 32]>, KeyManagerError> {
        let (_, secret) = self
            .keys
            .iter()
            .find(|(held, _)| held == key)
            .ok_or_else(|| KeyManagerError::KeyNotFound(key.to_string()))?;
        let shared = secret.diffie_hellman(&PublicKey::from(*peer));
        if !shared.was_contributory() {
            return Err(KeyManagerError::NonContributory);
        }
        Ok(Zeroizing::new(*shared.as_bytes()))
    }

    async fn sign(&self, key: &Key, message: &[u8]) -> Result<Vec<u8>, KeyManagerError> {
        if key.algorithm() != KeyAlgorithm::Ed25519 {
            return Err(KeyManagerError::UnsupportedKeyAlgorithm(key.algorithm()));
        }
        let (_, signing_key) = self
            .signing_keys
            .iter()
            .find(|(held, _)| held == key)
            .ok_or_else(|| KeyManagerError::KeyNotFound(key.to_string()))?;
        Ok(signing_key.sign(message).to_bytes().to_vec())
    }
}
