//! Wire envelopes of both DIDComm versions and their normalized form.
//!
//! A receiver cannot know which version a peer speaks, so [`parse`] tells the
//! two apart by the shape of the JSON alone: v2 envelopes list `recipients`
//! at the top level, v1 envelopes list them inside the protected header.
pub(crate) mod serialization;
mod v1;
mod v2;

use std::convert::TryFrom;

use serde_json::value::RawValue;

pub use v1::V1Codec;
pub use v2::V2Codec;

use self::serialization::decode_protected;
use crate::{
    crypto::{key_wrap::WrappedKey, CryptoAlgorithm},
    keys::Key,
    Error,
    Result,
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DidCommVersion {
    V1,
    V2,
}

/// Where an authenticated envelope discloses its sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderDisclosure {
    /// Key id in the protected header, readable by anyone.
    Protected,
    /// Encrypted separately for every recipient.
    Sealed,
}

/// One recipient's share of the content encryption key.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientEntry {
    pub kid: String,
    /// Ephemeral X25519 public key of the sender side agreement.
    pub epk: [u8; 32],
    pub iv: Vec<u8>,
    pub encrypted_key: Vec<u8>,
    pub tag: Vec<u8>,
    /// Sealed sender key id, only in versions disclosing the sender that way.
    pub sender: Option<Vec<u8>>,
}

impl RecipientEntry {
    pub(crate) fn wrapped_key(&self) -> WrappedKey {
        WrappedKey {
            iv: self.iv.clone(),
            encrypted_key: self.encrypted_key.clone(),
            tag: self.tag.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeHeader {
    pub content_encryption: CryptoAlgorithm,
    pub authenticated: bool,
    /// Sender key id when disclosed in the protected header.
    pub sender_kid: Option<String>,
    pub apu: Vec<u8>,
    pub apv: Vec<u8>,
    pub recipients: Vec<RecipientEntry>,
}

/// Version independent view of an encrypted envelope.
///
/// `protected` is kept exactly as found on the wire, it is the additional
/// authenticated data of the content encryption.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub version: DidCommVersion,
    pub header: EnvelopeHeader,
    pub protected: String,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Translation between [`Envelope`] and the wire JSON of one protocol version.
pub trait EnvelopeCodec: Send + Sync {
    fn version(&self) -> DidCommVersion;

    /// Identifier naming `key` in recipient entries and sender fields.
    fn key_id(&self, key: &Key) -> Result<String>;

    fn resolve_key_id(&self, kid: &str) -> Result<Key>;

    /// Algorithm identifier written to the envelope and fed to the KDF.
    fn key_wrap_algorithm(&self, content_encryption: CryptoAlgorithm, authenticated: bool) -> String;

    /// `apu` and `apv` for the key derivation.
    fn party_info(&self, sender_kid: Option<&str>, recipient_kids: &[String]) -> (Vec<u8>, Vec<u8>);

    fn sender_disclosure(&self) -> SenderDisclosure;

    /// Encodes the protected header of an envelope carrying `header`.
    fn protect(&self, header: &EnvelopeHeader) -> Result<String>;

    fn serialize(&self, envelope: &Envelope) -> Result<Vec<u8>>;

    fn parse(&self, bytes: &[u8]) -> Result<Envelope>;
}

static V1: V1Codec = V1Codec;
static V2: V2Codec = V2Codec;

pub fn codec_for(version: DidCommVersion) -> &'static dyn EnvelopeCodec {
    match version {
        DidCommVersion::V1 => &V1,
        DidCommVersion::V2 => &V2,
    }
}

/// Helper type to check which version produced an envelope
#[derive(Deserialize, Debug)]
struct EnvelopeShape<'a> {
    #[serde(borrow)]
    recipients: Option<&'a RawValue>,
    protected: Option<String>,
}

/// Derives the protocol version from field presence.
pub fn detect_version(bytes: &[u8]) -> Result<DidCommVersion> {
    let shape: EnvelopeShape =
        serde_json::from_slice(bytes).map_err(|e| Error::MalformedEnvelope(e.to_string()))?;
    if shape.recipients.is_some() {
        return Ok(DidCommVersion::V2);
    }
    if let Some(protected) = shape.protected {
        let header: serde_json::Value = decode_protected(&protected)?;
        if header.get("recipients").is_some() {
            return Ok(DidCommVersion::V1);
        }
    }
    Err(Error::MalformedEnvelope(
        "no recipients in envelope or protected header".into(),
    ))
}

/// Parses an envelope of either version.
pub fn parse(bytes: &[u8]) -> Result<Envelope> {
    let envelope = codec_for(detect_version(bytes)?).parse(bytes)?;
    if envelope.header.recipients.is_empty() {
        return Err(Error::MalformedEnvelope("empty recipient list".into()));
    }
    Ok(envelope)
}

/// Serializes with the codec of the envelope's own version.
pub fn serialize(envelope: &Envelope) -> Result<Vec<u8>> {
    codec_for(envelope.version).serialize(envelope)
}

pub(crate) fn content_encryption_from_jwa(enc: &str) -> Result<CryptoAlgorithm> {
    CryptoAlgorithm::try_from(enc)
        .map_err(|_| Error::MalformedEnvelope(format!("unsupported enc '{}'", enc)))
}
