use super::{expect_algorithm, key_from_base58, unsupported_type, KeyTypeCapability};
use crate::{
    dids::{VerificationMethod, BLS12381_G1_KEY_2020, BLS12381_G2_KEY_2020},
    keys::{Key, KeyAlgorithm},
    Result,
};

const G1_LEN: usize = 48;

pub struct Bls12381G1KeyType;

impl KeyTypeCapability for Bls12381G1KeyType {
    fn key_algorithms(&self) -> &'static [KeyAlgorithm] {
        &[KeyAlgorithm::Bls12381G1]
    }

    fn supported_verification_method_types(&self) -> &'static [&'static str] {
        &[BLS12381_G1_KEY_2020]
    }

    fn verification_methods(&self, did: &str, key: &Key) -> Result<Vec<VerificationMethod>> {
        expect_algorithm(key, KeyAlgorithm::Bls12381G1)?;
        Ok(vec![VerificationMethod::new(did, &key.to_multibase(), BLS12381_G1_KEY_2020)
            .with_public_key_base58(key.to_base58())])
    }

    fn key_from_verification_method(&self, verification_method: &VerificationMethod) -> Result<Key> {
        match verification_method.type_.as_str() {
            BLS12381_G1_KEY_2020 => key_from_base58(verification_method, KeyAlgorithm::Bls12381G1),
            _ => Err(unsupported_type(verification_method)),
        }
    }
}

pub struct Bls12381G2KeyType;

impl KeyTypeCapability for Bls12381G2KeyType {
    fn key_algorithms(&self) -> &'static [KeyAlgorithm] {
        &[KeyAlgorithm::Bls12381G2]
    }

    fn supported_verification_method_types(&self) -> &'static [&'static str] {
        &[BLS12381_G2_KEY_2020]
    }

    fn verification_methods(&self, did: &str, key: &Key) -> Result<Vec<VerificationMethod>> {
        expect_algorithm(key, KeyAlgorithm::Bls12381G2)?;
        Ok(vec![VerificationMethod::new(did, &key.to_multibase(), BLS12381_G2_KEY_2020)
            .with_public_key_base58(key.to_base58())])
    }

    fn key_from_verification_method(&self, verification_method: &VerificationMethod) -> Result<Key> {
        match verification_method.type_.as_str() {
            BLS12381_G2_KEY_2020 => key_from_base58(verification_method, KeyAlgorithm::Bls12381G2),
            _ => Err(unsupported_type(verification_method)),
        }
    }
}

/// Concatenated G1 and G2 keys.
///
/// There is no combined verification method type: a G1G2 key is published
/// as its G1 and G2 halves and cannot be read back from either of them.
pub struct Bls12381G1G2KeyType;

impl KeyTypeCapability for Bls12381G1G2KeyType {
    fn key_algorithms(&self) -> &'static [KeyAlgorithm] {
        &[KeyAlgorithm::Bls12381G1G2]
    }

    fn supported_verification_method_types(&self) -> &'static [&'static str] {
        &[]
    }

    fn verification_methods(&self, did: &str, key: &Key) -> Result<Vec<VerificationMethod>> {
        expect_algorithm(key, KeyAlgorithm::Bls12381G1G2)?;
        let (g1, g2) = key.public_key().split_at(G1_LEN);
        let g1 = Key::from_public_bytes(KeyAlgorithm::Bls12381G1, g1)?;
        let g2 = Key::from_public_bytes(KeyAlgorithm::Bls12381G2, g2)?;

        let mut methods = Bls12381G1KeyType.verification_methods(did, &g1)?;
        methods.extend(Bls12381G2KeyType.verification_methods(did, &g2)?);
        Ok(methods)
    }

    fn key_from_verification_method(&self, verification_method: &VerificationMethod) -> Result<Key> {
        Err(unsupported_type(verification_method))
    }
}
