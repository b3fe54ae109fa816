use std::collections::HashMap;

use serde_json::Value;

use super::{nist, Key, KeyAlgorithm};
use crate::{Error, Result};

/// Public JSON Web Key as found in `publicKeyJwk` of a verification method.
///
/// Private parameters are never produced; unknown members are kept in `other`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Jwk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

impl Jwk {
    /// Creates an `OKP` key, as used for ephemeral X25519 keys in JWE headers.
    pub fn okp(crv: &str, x: &[u8]) -> Self {
        Jwk {
            kty: Some("OKP".into()),
            crv: Some(crv.into()),
            x: Some(base64_url::encode(x)),
            ..Default::default()
        }
    }

    fn field(value: &Option<String>, name: &'static str) -> Result<Vec<u8>> {
        let encoded = value.as_ref().ok_or(Error::MissingJwkField(name))?;
        base64_url::decode(encoded)
            .map_err(|e| Error::InvalidKeyEncoding(format!("JWK '{}': {}", name, e)))
    }
}

impl Key {
    /// Resolves a JWK into a key tagged with the concrete algorithm named by
    /// its `kty` and `crv`.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self> {
        let kty = jwk.kty.as_deref().ok_or(Error::MissingJwkField("kty"))?;
        let crv = jwk.crv.as_deref().ok_or(Error::MissingJwkField("crv"))?;
        match (kty, crv) {
            ("OKP", "Ed25519") => Key::from_public_bytes(KeyAlgorithm::Ed25519, &Jwk::field(&jwk.x, "x")?),
            ("OKP", "X25519") => Key::from_public_bytes(KeyAlgorithm::X25519, &Jwk::field(&jwk.x, "x")?),
            ("EC", "P-256") | ("EC", "P-384") | ("EC", "P-521") => {
                let x = Jwk::field(&jwk.x, "x")?;
                let y = Jwk::field(&jwk.y, "y")?;
                let (algorithm, compressed) = match crv {
                    "P-256" => (KeyAlgorithm::P256, nist::p256::compress(&x, &y)?),
                    "P-384" => (KeyAlgorithm::P384, nist::p384::compress(&x, &y)?),
                    _ => (KeyAlgorithm::P521, nist::p521::compress(&x, &y)?),
                };
                Key::from_public_bytes(algorithm, &compressed)
            }
            (kty, crv) => Err(Error::UnsupportedJwkCurve(format!("{}/{}", kty, crv))),
        }
    }

    pub fn to_jwk(&self) -> Result<Jwk> {
        match self.algorithm {
            KeyAlgorithm::Ed25519 => Ok(Jwk::okp("Ed25519", &self.public_key)),
            KeyAlgorithm::X25519 => Ok(Jwk::okp("X25519", &self.public_key)),
            KeyAlgorithm::P256 | KeyAlgorithm::P384 | KeyAlgorithm::P521 => {
                let (x, y) = self.nist_coordinates()?;
                Ok(Jwk {
                    kty: Some("EC".into()),
                    crv: Some(self.algorithm.to_string()),
                    x: Some(base64_url::encode(&x)),
                    y: Some(base64_url::encode(&y)),
                    ..Default::default()
                })
            }
            other => Err(Error::UnsupportedKeyAlgorithm(other)),
        }
    }
}
