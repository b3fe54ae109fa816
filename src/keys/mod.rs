//! Public keys tagged with their algorithm and the encodings they travel in:
//! multibase (base58btc with a multicodec prefix), raw base58, JWK and `did:key`.
mod jwk;
mod nist;

use std::fmt;

use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::{Signature, VerifyingKey};

pub use jwk::Jwk;

use crate::{Error, Result};

const MULTIBASE_BASE58_BTC: char = 'z';
const DID_KEY_PREFIX: &str = "did:key:";

/// Closed set of key algorithms a [`Key`] can carry.
///
/// There is no JWK variant: `JsonWebKey2020` is a verification method type,
/// never the algorithm of a key.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Ed25519,
    X25519,
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "P-521")]
    P521,
    Bls12381G1,
    Bls12381G2,
    Bls12381G1G2,
}

impl KeyAlgorithm {
    pub const ALL: [KeyAlgorithm; 8] = [
        KeyAlgorithm::Ed25519,
        KeyAlgorithm::X25519,
        KeyAlgorithm::P256,
        KeyAlgorithm::P384,
        KeyAlgorithm::P521,
        KeyAlgorithm::Bls12381G1,
        KeyAlgorithm::Bls12381G2,
        KeyAlgorithm::Bls12381G1G2,
    ];

    /// Unsigned-varint encoded multicodec prefix.
    pub fn multicodec_prefix(&self) -> [u8; 2] {
        match self {
            KeyAlgorithm::Ed25519 => [0xed, 0x01],
            KeyAlgorithm::X25519 => [0xec, 0x01],
            KeyAlgorithm::P256 => [0x80, 0x24],
            KeyAlgorithm::P384 => [0x81, 0x24],
            KeyAlgorithm::P521 => [0x82, 0x24],
            KeyAlgorithm::Bls12381G1 => [0xea, 0x01],
            KeyAlgorithm::Bls12381G2 => [0xeb, 0x01],
            KeyAlgorithm::Bls12381G1G2 => [0xee, 0x01],
        }
    }

    pub fn from_multicodec_prefix(prefix: &[u8]) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|alg| alg.multicodec_prefix() == prefix)
            .copied()
    }

    /// Length of the public key in its canonical (compressed) form.
    pub fn public_key_len(&self) -> usize {
        match self {
            KeyAlgorithm::Ed25519 | KeyAlgorithm::X25519 => 32,
            KeyAlgorithm::P256 => 33,
            KeyAlgorithm::P384 => 49,
            KeyAlgorithm::P521 => 67,
            KeyAlgorithm::Bls12381G1 => 48,
            KeyAlgorithm::Bls12381G2 => 96,
            KeyAlgorithm::Bls12381G1G2 => 144,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyAlgorithm::Ed25519 => "Ed25519",
            KeyAlgorithm::X25519 => "X25519",
            KeyAlgorithm::P256 => "P-256",
            KeyAlgorithm::P384 => "P-384",
            KeyAlgorithm::P521 => "P-521",
            KeyAlgorithm::Bls12381G1 => "Bls12381G1",
            KeyAlgorithm::Bls12381G2 => "Bls12381G2",
            KeyAlgorithm::Bls12381G1G2 => "Bls12381G1G2",
        };
        f.write_str(name)
    }
}

/// Immutable public key. Equality is structural over algorithm and bytes.
///
/// Every constructor validates the bytes against the algorithm, so a `Key`
/// in hand is always well formed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    algorithm: KeyAlgorithm,
    public_key: Vec<u8>,
}

impl Key {
    /// Validates `bytes` as the canonical public key encoding of `algorithm`.
    ///
    /// NIST curve keys must be SEC1 compressed points on the curve, Ed25519
    /// keys must decompress to an Edwards point, the rest are length checked.
    pub fn from_public_bytes(algorithm: KeyAlgorithm, bytes: &[u8]) -> Result<Self> {
        let expected = algorithm.public_key_len();
        if bytes.len() != expected {
            return Err(Error::InvalidKeyEncoding(format!(
                "{} public key must be {} bytes, got {}",
                algorithm,
                expected,
                bytes.len()
            )));
        }
        match algorithm {
            KeyAlgorithm::Ed25519 => {
                let mut compressed = [0u8; 32];
                compressed.copy_from_slice(bytes);
                if CompressedEdwardsY(compressed).decompress().is_none() {
                    return Err(Error::InvalidKeyEncoding(
                        "Ed25519 public key is not a valid curve point".into(),
                    ));
                }
            }
            KeyAlgorithm::P256 => nist::p256::validate(bytes)?,
            KeyAlgorithm::P384 => nist::p384::validate(bytes)?,
            KeyAlgorithm::P521 => nist::p521::validate(bytes)?,
            KeyAlgorithm::X25519
            | KeyAlgorithm::Bls12381G1
            | KeyAlgorithm::Bls12381G2
            | KeyAlgorithm::Bls12381G1G2 => {}
        }
        Ok(Self {
            algorithm,
            public_key: bytes.to_vec(),
        })
    }

    /// Decodes a base58btc multibase string (`z...`) carrying a multicodec prefix.
    pub fn from_multibase(multibase: &str) -> Result<Self> {
        let encoded = multibase
            .strip_prefix(MULTIBASE_BASE58_BTC)
            .ok_or_else(|| Error::InvalidKeyEncoding("only base58btc multibase is supported".into()))?;
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| Error::InvalidKeyEncoding(e.to_string()))?;
        if bytes.len() < 2 {
            return Err(Error::InvalidKeyEncoding("multibase value too short".into()));
        }
        let (prefix, public_key) = bytes.split_at(2);
        let algorithm = KeyAlgorithm::from_multicodec_prefix(prefix).ok_or_else(|| {
            Error::UnsupportedAlgorithmTag(format!("0x{:02x}{:02x}", prefix[0], prefix[1]))
        })?;
        Self::from_public_bytes(algorithm, public_key)
    }

    pub fn from_base58(algorithm: KeyAlgorithm, base58: &str) -> Result<Self> {
        let bytes = bs58::decode(base58)
            .into_vec()
            .map_err(|e| Error::InvalidKeyEncoding(e.to_string()))?;
        Self::from_public_bytes(algorithm, &bytes)
    }

    /// Parses a `did:key` DID or DID URL; a fragment, if any, is ignored.
    pub fn from_did_key(did: &str) -> Result<Self> {
        let identifier = did
            .strip_prefix(DID_KEY_PREFIX)
            .ok_or_else(|| Error::InvalidKeyEncoding(format!("'{}' is not a did:key", did)))?;
        let multibase = identifier.split('#').next().unwrap_or(identifier);
        Self::from_multibase(multibase)
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn to_multibase(&self) -> String {
        let mut prefixed = self.algorithm.multicodec_prefix().to_vec();
        prefixed.extend_from_slice(&self.public_key);
        format!("{}{}", MULTIBASE_BASE58_BTC, bs58::encode(prefixed).into_string())
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(&self.public_key).into_string()
    }

    pub fn to_did_key(&self) -> String {
        format!("{}{}", DID_KEY_PREFIX, self.to_multibase())
    }

    /// X25519 public key used for key agreement with this key.
    ///
    /// Ed25519 keys are mapped to their birationally equivalent Montgomery form.
    pub fn key_agreement_public_key(&self) -> Result<[u8; 32]> {
        let mut bytes = [0u8; 32];
        match self.algorithm {
            KeyAlgorithm::X25519 => {
                bytes.copy_from_slice(&self.public_key);
                Ok(bytes)
            }
            KeyAlgorithm::Ed25519 => {
                bytes.copy_from_slice(&self.public_key);
                let point = CompressedEdwardsY(bytes).decompress().ok_or_else(|| {
                    Error::InvalidKeyEncoding("Ed25519 public key is not a valid curve point".into())
                })?;
                Ok(point.to_montgomery().to_bytes())
            }
            other => Err(Error::UnsupportedKeyAlgorithm(other)),
        }
    }

    /// Checks an Ed25519 `signature` over `message` made with this key.
    pub fn verify_signature(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        if self.algorithm != KeyAlgorithm::Ed25519 {
            return Err(Error::UnsupportedKeyAlgorithm(self.algorithm));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&self.public_key);
        let verifying_key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| Error::InvalidKeyEncoding(e.to_string()))?;
        let signature =
            Signature::from_slice(signature).map_err(|_| Error::SignatureVerificationFailed)?;
        verifying_key
            .verify_strict(message, &signature)
            .map_err(|_| Error::SignatureVerificationFailed)
    }

    pub(crate) fn nist_coordinates(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        match self.algorithm {
            KeyAlgorithm::P256 => nist::p256::coordinates(&self.public_key),
            KeyAlgorithm::P384 => nist::p384::coordinates(&self.public_key),
            KeyAlgorithm::P521 => nist::p521::coordinates(&self.public_key),
            other => Err(Error::UnsupportedKeyAlgorithm(other)),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_multibase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // did:key test vector from the W3C did:key method spec
    const ED25519_DID_KEY: &str = "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK";

    #[test]
    fn multibase_round_trip_ed25519() -> Result<()> {
        let key = Key::from_did_key(ED25519_DID_KEY)?;
        assert_eq!(key.algorithm(), KeyAlgorithm::Ed25519);
        assert_eq!(key.public_key().len(), 32);
        assert_eq!(key.to_did_key(), ED25519_DID_KEY);
        Ok(())
    }

    #[test]
    fn multibase_round_trip_x25519() -> Result<()> {
        let key = Key::from_public_bytes(KeyAlgorithm::X25519, &[9u8; 32])?;
        let multibase = key.to_multibase();
        assert!(multibase.starts_with("z6LS"));
        assert_eq!(Key::from_multibase(&multibase)?, key);
        Ok(())
    }

    #[test]
    fn did_url_fragment_is_ignored() -> Result<()> {
        let url = format!("{}#{}", ED25519_DID_KEY, &ED25519_DID_KEY[8..]);
        assert_eq!(Key::from_did_key(&url)?, Key::from_did_key(ED25519_DID_KEY)?);
        Ok(())
    }

    #[test]
    fn bls_keys_are_length_checked() {
        for alg in [
            KeyAlgorithm::Bls12381G1,
            KeyAlgorithm::Bls12381G2,
            KeyAlgorithm::Bls12381G1G2,
        ] {
            let bytes = vec![7u8; alg.public_key_len()];
            let key = Key::from_public_bytes(alg, &bytes).expect("valid length");
            assert_eq!(Key::from_multibase(&key.to_multibase()).expect("decodes"), key);
            assert!(matches!(
                Key::from_public_bytes(alg, &bytes[1..]),
                Err(Error::InvalidKeyEncoding(_))
            ));
        }
    }

    #[test]
    fn wrong_length_is_rejected() {
        let result = Key::from_public_bytes(KeyAlgorithm::X25519, &[1u8; 31]);
        assert!(matches!(result, Err(Error::InvalidKeyEncoding(_))));
    }

    #[test]
    fn p256_point_must_be_on_curve() {
        let mut bytes = [0xffu8; 33];
        bytes[0] = 0x02;
        assert!(matches!(
            Key::from_public_bytes(KeyAlgorithm::P256, &bytes),
            Err(Error::InvalidKeyEncoding(_))
        ));
    }

    #[test]
    fn unknown_multicodec_prefix() {
        let mut bytes = vec![0x12, 0x34];
        bytes.extend_from_slice(&[0u8; 32]);
        let multibase = format!("z{}", bs58::encode(bytes).into_string());
        assert!(matches!(
            Key::from_multibase(&multibase),
            Err(Error::UnsupportedAlgorithmTag(_))
        ));
    }

    #[test]
    fn non_base58btc_multibase_is_rejected() {
        assert!(matches!(
            Key::from_multibase("mAAAA"),
            Err(Error::InvalidKeyEncoding(_))
        ));
    }

    #[test]
    fn ed25519_maps_to_x25519() -> Result<()> {
        let key = Key::from_did_key(ED25519_DID_KEY)?;
        let x25519 = key.key_agreement_public_key()?;
        assert_ne!(&x25519[..], key.public_key());
        let bls = Key::from_public_bytes(KeyAlgorithm::Bls12381G1, &[1u8; 48])?;
        assert!(matches!(
            bls.key_agreement_public_key(),
            Err(Error::UnsupportedKeyAlgorithm(KeyAlgorithm::Bls12381G1))
        ));
        Ok(())
    }

    #[test]
    fn only_ed25519_signatures_are_checked() -> Result<()> {
        let key = Key::from_did_key(ED25519_DID_KEY)?;
        assert!(matches!(
            key.verify_signature(b"message", &[0u8; 12]),
            Err(Error::SignatureVerificationFailed)
        ));
        let x25519 = Key::from_public_bytes(KeyAlgorithm::X25519, &[9u8; 32])?;
        assert!(matches!(
            x25519.verify_signature(b"message", &[0u8; 64]),
            Err(Error::UnsupportedKeyAlgorithm(KeyAlgorithm::X25519))
        ));
        Ok(())
    }
}
