use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use super::{
    key_type::{
        Bls12381G1G2KeyType,
        Bls12381G1KeyType,
        Bls12381G2KeyType,
        Ed25519KeyType,
        JsonWebKeyType,
        KeyTypeCapability,
        X25519KeyType,
    },
    VerificationMethod,
    JSON_WEB_KEY_2020,
};
use crate::{
    keys::{Key, KeyAlgorithm},
    Error,
    Result,
};

/// Lookup tables from key algorithm and from verification method type to the
/// capability handling them.
///
/// Built once and read only afterwards; a type string or algorithm claimed by
/// two capabilities fails construction instead of shadowing the first claim.
pub struct KeyDidRegistry {
    by_algorithm: HashMap<KeyAlgorithm, Arc<dyn KeyTypeCapability>>,
    by_verification_method_type: HashMap<&'static str, Arc<dyn KeyTypeCapability>>,
}

impl KeyDidRegistry {
    pub fn new(capabilities: Vec<Arc<dyn KeyTypeCapability>>) -> Result<Self> {
        let mut by_algorithm = HashMap::new();
        let mut by_verification_method_type = HashMap::new();
        for capability in capabilities {
            for algorithm in capability.key_algorithms() {
                match by_algorithm.entry(*algorithm) {
                    Entry::Occupied(_) => return Err(Error::DuplicateKeyAlgorithm(*algorithm)),
                    Entry::Vacant(slot) => {
                        slot.insert(capability.clone());
                    }
                }
            }
            for type_ in capability.supported_verification_method_types() {
                match by_verification_method_type.entry(*type_) {
                    Entry::Occupied(_) => {
                        return Err(Error::DuplicateVerificationMethodType(type_.to_string()))
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(capability.clone());
                    }
                }
            }
        }
        debug!(
            "key registry built with {} algorithms and {} verification method types",
            by_algorithm.len(),
            by_verification_method_type.len()
        );
        Ok(Self {
            by_algorithm,
            by_verification_method_type,
        })
    }

    /// Registry over every built-in key type.
    pub fn with_default_capabilities() -> Result<Self> {
        Self::new(vec![
            Arc::new(Ed25519KeyType),
            Arc::new(X25519KeyType),
            Arc::new(Bls12381G1KeyType),
            Arc::new(Bls12381G2KeyType),
            Arc::new(Bls12381G1G2KeyType),
            Arc::new(JsonWebKeyType),
        ])
    }

    pub fn lookup_by_algorithm(&self, algorithm: KeyAlgorithm) -> Result<Arc<dyn KeyTypeCapability>> {
        self.by_algorithm
            .get(&algorithm)
            .cloned()
            .ok_or(Error::UnsupportedKeyAlgorithm(algorithm))
    }

    pub fn key_from_verification_method(&self, verification_method: &VerificationMethod) -> Result<Key> {
        if verification_method.type_ == JSON_WEB_KEY_2020 && verification_method.public_key_jwk.is_none() {
            return Err(Error::MissingPublicKeyMaterial(verification_method.id.clone()));
        }
        let capability = self
            .by_verification_method_type
            .get(verification_method.type_.as_str())
            .ok_or_else(|| Error::UnsupportedVerificationMethodType(verification_method.type_.clone()))?;
        capability.key_from_verification_method(verification_method)
    }

    /// Verification methods for `key`, canonical representation first.
    pub fn verification_methods_from_key(&self, did: &str, key: &Key) -> Result<Vec<VerificationMethod>> {
        self.lookup_by_algorithm(key.algorithm())?
            .verification_methods(did, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DID: &str = "did:example:registry";

    struct ShadowingKeyType;

    impl KeyTypeCapability for ShadowingKeyType {
        fn key_algorithms(&self) -> &'static [KeyAlgorithm] {
            &[]
        }

        fn supported_verification_method_types(&self) -> &'static [&'static str] {
            &[JSON_WEB_KEY_2020]
        }

        fn verification_methods(&self, _did: &str, key: &Key) -> Result<Vec<VerificationMethod>> {
            Err(Error::UnsupportedKeyAlgorithm(key.algorithm()))
        }

        fn key_from_verification_method(&self, verification_method: &VerificationMethod) -> Result<Key> {
            Err(Error::UnsupportedVerificationMethodType(verification_method.type_.clone()))
        }
    }

    #[test]
    fn every_algorithm_is_covered() {
        let registry = KeyDidRegistry::with_default_capabilities().expect("no collisions");
        for algorithm in KeyAlgorithm::ALL {
            assert!(registry.lookup_by_algorithm(algorithm).is_ok(), "{}", algorithm);
        }
    }

    #[test]
    fn second_claim_on_a_type_is_fatal() {
        let result = KeyDidRegistry::new(vec![Arc::new(JsonWebKeyType), Arc::new(ShadowingKeyType)]);
        assert!(matches!(
            result,
            Err(Error::DuplicateVerificationMethodType(type_)) if type_ == JSON_WEB_KEY_2020
        ));
    }

    #[test]
    fn second_claim_on_an_algorithm_is_fatal() {
        let result = KeyDidRegistry::new(vec![Arc::new(Ed25519KeyType), Arc::new(Ed25519KeyType)]);
        assert!(matches!(
            result,
            Err(Error::DuplicateKeyAlgorithm(KeyAlgorithm::Ed25519))
        ));
    }

    #[test]
    fn unknown_type_differs_from_missing_jwk() {
        let registry = KeyDidRegistry::with_default_capabilities().expect("no collisions");

        let unknown = VerificationMethod::new(DID, "k1", "EcdsaSecp256k1VerificationKey2019")
            .with_public_key_base58("abc".into());
        assert!(matches!(
            registry.key_from_verification_method(&unknown),
            Err(Error::UnsupportedVerificationMethodType(_))
        ));

        let jwk_without_key = VerificationMethod::new(DID, "k2", JSON_WEB_KEY_2020);
        assert!(matches!(
            registry.key_from_verification_method(&jwk_without_key),
            Err(Error::MissingPublicKeyMaterial(_))
        ));
    }

    #[test]
    fn jwk_method_may_carry_an_okp_key() -> Result<()> {
        let registry = KeyDidRegistry::with_default_capabilities()?;
        let key = Key::from_public_bytes(KeyAlgorithm::X25519, &[5u8; 32])?;
        let method = VerificationMethod::new(DID, "x", JSON_WEB_KEY_2020).with_public_key_jwk(key.to_jwk()?);
        assert_eq!(registry.key_from_verification_method(&method)?, key);
        Ok(())
    }
}
