use std::collections::HashMap;

use serde_json::Value;

use crate::keys::Jwk;

pub const ED25519_VERIFICATION_KEY_2018: &str = "Ed25519VerificationKey2018";
pub const ED25519_VERIFICATION_KEY_2020: &str = "Ed25519VerificationKey2020";
pub const X25519_KEY_AGREEMENT_KEY_2019: &str = "X25519KeyAgreementKey2019";
pub const X25519_KEY_AGREEMENT_KEY_2020: &str = "X25519KeyAgreementKey2020";
pub const BLS12381_G1_KEY_2020: &str = "Bls12381G1Key2020";
pub const BLS12381_G2_KEY_2020: &str = "Bls12381G2Key2020";
pub const JSON_WEB_KEY_2020: &str = "JsonWebKey2020";

/// Verification method entry of a DID document.
///
/// Only the key carrying members are interpreted, everything else passes
/// through `other` untouched.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub controller: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_base58: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Jwk>,
    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

impl VerificationMethod {
    /// Creates a method with id `{did}#{fragment}` controlled by `did`.
    pub fn new(did: &str, fragment: &str, type_: &str) -> Self {
        VerificationMethod {
            id: format!("{}#{}", did, fragment),
            type_: type_.into(),
            controller: did.into(),
            ..Default::default()
        }
    }

    pub fn with_public_key_base58(mut self, base58: String) -> Self {
        self.public_key_base58 = Some(base58);
        self
    }

    pub fn with_public_key_multibase(mut self, multibase: String) -> Self {
        self.public_key_multibase = Some(multibase);
        self
    }

    pub fn with_public_key_jwk(mut self, jwk: Jwk) -> Self {
        self.public_key_jwk = Some(jwk);
        self
    }
}
