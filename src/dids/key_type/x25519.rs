use super::{expect_algorithm, key_from_base58, key_from_multibase, unsupported_type, KeyTypeCapability};
use crate::{
    dids::{VerificationMethod, X25519_KEY_AGREEMENT_KEY_2019, X25519_KEY_AGREEMENT_KEY_2020},
    keys::{Key, KeyAlgorithm},
    Result,
};

pub struct X25519KeyType;

impl KeyTypeCapability for X25519KeyType {
    fn key_algorithms(&self) -> &'static [KeyAlgorithm] {
        &[KeyAlgorithm::X25519]
    }

    fn supported_verification_method_types(&self) -> &'static [&'static str] {
        &[X25519_KEY_AGREEMENT_KEY_2019, X25519_KEY_AGREEMENT_KEY_2020]
    }

    fn verification_methods(&self, did: &str, key: &Key) -> Result<Vec<VerificationMethod>> {
        expect_algorithm(key, KeyAlgorithm::X25519)?;
        Ok(vec![VerificationMethod::new(
            did,
            &key.to_multibase(),
            X25519_KEY_AGREEMENT_KEY_2019,
        )
        .with_public_key_base58(key.to_base58())])
    }

    fn key_from_verification_method(&self, verification_method: &VerificationMethod) -> Result<Key> {
        match verification_method.type_.as_str() {
            X25519_KEY_AGREEMENT_KEY_2019 => key_from_base58(verification_method, KeyAlgorithm::X25519),
            X25519_KEY_AGREEMENT_KEY_2020 => key_from_multibase(verification_method, KeyAlgorithm::X25519),
            _ => Err(unsupported_type(verification_method)),
        }
    }
}
