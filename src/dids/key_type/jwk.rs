use super::{unsupported_type, KeyTypeCapability};
use crate::{
    dids::{VerificationMethod, JSON_WEB_KEY_2020},
    keys::{Key, KeyAlgorithm},
    Error,
    Result,
};

/// `JsonWebKey2020` methods. Reading one yields a key tagged with whatever
/// algorithm the JWK describes, not only the NIST curves this type publishes.
pub struct JsonWebKeyType;

impl KeyTypeCapability for JsonWebKeyType {
    fn key_algorithms(&self) -> &'static [KeyAlgorithm] {
        &[KeyAlgorithm::P256, KeyAlgorithm::P384, KeyAlgorithm::P521]
    }

    fn supported_verification_method_types(&self) -> &'static [&'static str] {
        &[JSON_WEB_KEY_2020]
    }

    fn verification_methods(&self, did: &str, key: &Key) -> Result<Vec<VerificationMethod>> {
        if !self.key_algorithms().contains(&key.algorithm()) {
            return Err(Error::UnsupportedKeyAlgorithm(key.algorithm()));
        }
        Ok(vec![VerificationMethod::new(did, &key.to_multibase(), JSON_WEB_KEY_2020)
            .with_public_key_jwk(key.to_jwk()?)])
    }

    fn key_from_verification_method(&self, verification_method: &VerificationMethod) -> Result<Key> {
        if verification_method.type_ != JSON_WEB_KEY_2020 {
            return Err(unsupported_type(verification_method));
        }
        let jwk = verification_method
            .public_key_jwk
            .as_ref()
            .ok_or_else(|| Error::MissingPublicKeyMaterial(verification_method.id.clone()))?;
        Key::from_jwk(jwk)
    }
}
