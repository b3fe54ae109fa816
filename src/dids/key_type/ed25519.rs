use super::{expect_algorithm, key_from_base58, key_from_multibase, unsupported_type, KeyTypeCapability};
use crate::{
    dids::{VerificationMethod, ED25519_VERIFICATION_KEY_2018, ED25519_VERIFICATION_KEY_2020},
    keys::{Key, KeyAlgorithm},
    Result,
};

pub struct Ed25519KeyType;

impl KeyTypeCapability for Ed25519KeyType {
    fn key_algorithms(&self) -> &'static [KeyAlgorithm] {
        &[KeyAlgorithm::Ed25519]
    }

    fn supported_verification_method_types(&self) -> &'static [&'static str] {
        &[ED25519_VERIFICATION_KEY_2018, ED25519_VERIFICATION_KEY_2020]
    }

    fn verification_methods(&self, did: &str, key: &Key) -> Result<Vec<VerificationMethod>> {
        expect_algorithm(key, KeyAlgorithm::Ed25519)?;
        Ok(vec![VerificationMethod::new(
            did,
            &key.to_multibase(),
            ED25519_VERIFICATION_KEY_2018,
        )
        .with_public_key_base58(key.to_base58())])
    }

    fn key_from_verification_method(&self, verification_method: &VerificationMethod) -> Result<Key> {
        match verification_method.type_.as_str() {
            ED25519_VERIFICATION_KEY_2018 => key_from_base58(verification_method, KeyAlgorithm::Ed25519),
            ED25519_VERIFICATION_KEY_2020 => key_from_multibase(verification_method, KeyAlgorithm::Ed25519),
            _ => Err(unsupported_type(verification_method)),
        }
    }
}
