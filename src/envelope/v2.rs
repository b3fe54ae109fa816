//! DIDComm v2 envelopes: JWE in general JSON serialization.
//!
//! Recipients sit at the top level next to the content, keys are named by
//! `did:key` URLs and an authenticated envelope names its sender in the
//! protected `skid`.
use sha2::{Digest, Sha256};

use super::{
    content_encryption_from_jwa,
    serialization::{
        decode_json,
        decode_protected,
        encode_protected,
        serialization_base64_buffer,
        serialization_base64_option,
        x25519_bytes,
    },
    DidCommVersion,
    Envelope,
    EnvelopeCodec,
    EnvelopeHeader,
    RecipientEntry,
    SenderDisclosure,
};
use crate::{
    crypto::CryptoAlgorithm,
    keys::{Jwk, Key, KeyAlgorithm},
    Error,
    Result,
};

pub const ENCRYPTED_MEDIA_TYPE: &str = "application/didcomm-encrypted+json";
const ANONYMOUS_KEY_AGREEMENT: &str = "ECDH-ES";
const AUTHENTICATED_KEY_AGREEMENT: &str = "ECDH-1PU";

#[derive(Serialize, Deserialize, Debug)]
struct WireEnvelope {
    protected: String,
    recipients: Vec<WireRecipient>,
    #[serde(with = "serialization_base64_buffer")]
    iv: Vec<u8>,
    #[serde(with = "serialization_base64_buffer")]
    ciphertext: Vec<u8>,
    #[serde(with = "serialization_base64_buffer")]
    tag: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug)]
struct ProtectedHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
    alg: String,
    enc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    skid: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serialization_base64_option"
    )]
    apu: Option<Vec<u8>>,
    #[serde(default, with = "serialization_base64_buffer")]
    apv: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug)]
struct WireRecipient {
    header: WireRecipientHeader,
    #[serde(with = "serialization_base64_buffer")]
    encrypted_key: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug)]
struct WireRecipientHeader {
    kid: String,
    epk: Jwk,
    #[serde(with = "serialization_base64_buffer")]
    iv: Vec<u8>,
    #[serde(with = "serialization_base64_buffer")]
    tag: Vec<u8>,
}

fn epk_from_jwk(jwk: &Jwk) -> Result<[u8; 32]> {
    let key = Key::from_jwk(jwk).map_err(|e| Error::MalformedEnvelope(format!("epk: {}", e)))?;
    if key.algorithm() != KeyAlgorithm::X25519 {
        return Err(Error::MalformedEnvelope("epk must be an X25519 key".into()));
    }
    x25519_bytes(key.public_key(), "epk")
}

pub struct V2Codec;

impl EnvelopeCodec for V2Codec {
    fn version(&self) -> DidCommVersion {
        DidCommVersion::V2
    }

    /// `did:key:{multibase}#{multibase}`
    fn key_id(&self, key: &Key) -> Result<String> {
        Ok(format!("{}#{}", key.to_did_key(), key.to_multibase()))
    }

    fn resolve_key_id(&self, kid: &str) -> Result<Key> {
        Key::from_did_key(kid)
    }

    fn key_wrap_algorithm(&self, content_encryption: CryptoAlgorithm, authenticated: bool) -> String {
        let agreement = if authenticated {
            AUTHENTICATED_KEY_AGREEMENT
        } else {
            ANONYMOUS_KEY_AGREEMENT
        };
        format!("{}+{}", agreement, content_encryption.key_wrap_name())
    }

    /// `apu` is the sender kid, `apv` the SHA-256 of the sorted recipient
    /// kids joined by `.`.
    fn party_info(&self, sender_kid: Option<&str>, recipient_kids: &[String]) -> (Vec<u8>, Vec<u8>) {
        let apu = sender_kid.map(|kid| kid.as_bytes().to_vec()).unwrap_or_default();
        let mut kids: Vec<&str> = recipient_kids.iter().map(String::as_str).collect();
        kids.sort_unstable();
        let apv = Sha256::digest(kids.join(".").as_bytes()).to_vec();
        (apu, apv)
    }

    fn sender_disclosure(&self) -> SenderDisclosure {
        SenderDisclosure::Protected
    }

    fn protect(&self, header: &EnvelopeHeader) -> Result<String> {
        if header.authenticated && header.sender_kid.is_none() {
            return Err(Error::Generic("authenticated envelope without skid".into()));
        }
        encode_protected(&ProtectedHeader {
            typ: Some(ENCRYPTED_MEDIA_TYPE.into()),
            alg: self.key_wrap_algorithm(header.content_encryption, header.authenticated),
            enc: header.content_encryption.jwa_name().into(),
            skid: header.sender_kid.clone(),
            apu: if header.authenticated {
                Some(header.apu.clone())
            } else {
                None
            },
            apv: header.apv.clone(),
        })
    }

    fn serialize(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        let recipients = envelope
            .header
            .recipients
            .iter()
            .map(|recipient| WireRecipient {
                header: WireRecipientHeader {
                    kid: recipient.kid.clone(),
                    epk: Jwk::okp("X25519", &recipient.epk),
                    iv: recipient.iv.clone(),
                    tag: recipient.tag.clone(),
                },
                encrypted_key: recipient.encrypted_key.clone(),
            })
            .collect();
        Ok(serde_json::to_vec(&WireEnvelope {
            protected: envelope.protected.clone(),
            recipients,
            iv: envelope.iv.clone(),
            ciphertext: envelope.ciphertext.clone(),
            tag: envelope.tag.clone(),
        })?)
    }

    fn parse(&self, bytes: &[u8]) -> Result<Envelope> {
        let wire: WireEnvelope = decode_json(bytes)?;
        let protected: ProtectedHeader = decode_protected(&wire.protected)?;

        let content_encryption = content_encryption_from_jwa(&protected.enc)?;
        let authenticated = match protected.alg.split_once('+') {
            Some((agreement, wrap)) if wrap == content_encryption.key_wrap_name() => {
                match agreement {
                    AUTHENTICATED_KEY_AGREEMENT => true,
                    ANONYMOUS_KEY_AGREEMENT => false,
                    _ => return Err(Error::MalformedEnvelope(format!("unsupported alg '{}'", protected.alg))),
                }
            }
            _ => {
                return Err(Error::MalformedEnvelope(format!(
                    "alg '{}' does not match enc '{}'",
                    protected.alg, protected.enc
                )))
            }
        };
        if authenticated && protected.skid.is_none() {
            return Err(Error::MalformedEnvelope("authenticated envelope without skid".into()));
        }

        let recipients = wire
            .recipients
            .into_iter()
            .map(|recipient| {
                Ok(RecipientEntry {
                    epk: epk_from_jwk(&recipient.header.epk)?,
                    kid: recipient.header.kid,
                    iv: recipient.header.iv,
                    encrypted_key: recipient.encrypted_key,
                    tag: recipient.header.tag,
                    sender: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Envelope {
            version: self.version(),
            header: EnvelopeHeader {
                content_encryption,
                authenticated,
                sender_kid: protected.skid,
                apu: protected.apu.unwrap_or_default(),
                apv: protected.apv,
                recipients,
            },
            protected: wire.protected,
            iv: wire.iv,
            ciphertext: wire.ciphertext,
            tag: wire.tag,
        })
    }
}
