use crate::{keys::KeyAlgorithm, wallet::KeyManagerError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),
    #[error("unsupported multicodec algorithm tag {0}")]
    UnsupportedAlgorithmTag(String),
    #[error("unsupported JWK curve '{0}'")]
    UnsupportedJwkCurve(String),
    #[error("JWK is missing required field '{0}'")]
    MissingJwkField(&'static str),
    #[error("key algorithm {0} is not supported here")]
    UnsupportedKeyAlgorithm(KeyAlgorithm),
    #[error("verification method {0} carries no usable public key material")]
    MissingPublicKeyMaterial(String),
    #[error("unsupported verification method type '{0}'")]
    UnsupportedVerificationMethodType(String),
    #[error("verification method type '{0}' is claimed by more than one key type")]
    DuplicateVerificationMethodType(String),
    #[error("key algorithm {0} is claimed by more than one key type")]
    DuplicateKeyAlgorithm(KeyAlgorithm),
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("at least one recipient key is required")]
    NoRecipients,
    #[error("no recipient of the envelope matches a locally held key")]
    NoMatchingRecipientKey,
    #[error("envelope decryption failed")]
    DecryptionFailed,
    #[error("signature verification failed")]
    SignatureVerificationFailed,
    #[error("plugged cryptography failure")]
    PlugCryptoFailure,
    #[error(transparent)]
    KeyManager(#[from] KeyManagerError),
    #[error("{0}")]
    Generic(String),
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    RegexError(#[from] regex::Error),
}

impl Error {
    /// `true` for failures an untrusted peer must not be able to tell apart.
    pub fn is_unpack_failure(&self) -> bool {
        matches!(
            self,
            Error::MalformedEnvelope(_) | Error::NoMatchingRecipientKey | Error::DecryptionFailed
        )
    }
}
