//! DIDComm v1 envelopes in the Aries RFC 0019 shape.
//!
//! Everything but the content lives in the base64url `protected` header,
//! recipients included. Keys are named by base58 Ed25519 verkeys and the
//! sender of an `Authcrypt` envelope is sealed separately for each recipient.
use super::{
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
    keys::{Key, KeyAlgorithm},
    Error,
    Result,
};

const TYP: &str = "JWM/1.0";
const AUTHCRYPT: &str = "Authcrypt";
const ANONCRYPT: &str = "Anoncrypt";

#[derive(Serialize, Deserialize, Debug)]
struct WireEnvelope {
    protected: String,
    #[serde(with = "serialization_base64_buffer")]
    iv: Vec<u8>,
    #[serde(with = "serialization_base64_buffer")]
    ciphertext: Vec<u8>,
    #[serde(with = "serialization_base64_buffer")]
    tag: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug)]
struct ProtectedHeader {
    enc: String,
    typ: String,
    alg: String,
    recipients: Vec<WireRecipient>,
}

#[derive(Serialize, Deserialize, Debug)]
struct WireRecipient {
    #[serde(with = "serialization_base64_buffer")]
    encrypted_key: Vec<u8>,
    header: WireRecipientHeader,
}

#[derive(Serialize, Deserialize, Debug)]
struct WireRecipientHeader {
    kid: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serialization_base64_option"
    )]
    sender: Option<Vec<u8>>,
    #[serde(with = "serialization_base64_buffer")]
    iv: Vec<u8>,
    #[serde(with = "serialization_base64_buffer")]
    tag: Vec<u8>,
    #[serde(with = "serialization_base64_buffer")]
    epk: Vec<u8>,
}

fn enc_name(content_encryption: CryptoAlgorithm) -> &'static str {
    match content_encryption {
        CryptoAlgorithm::XC20P => "xchacha20poly1305_ietf",
        CryptoAlgorithm::A256GCM => "aes256gcm",
    }
}

fn enc_from_name(enc: &str) -> Result<CryptoAlgorithm> {
    match enc {
        "xchacha20poly1305_ietf" => Ok(CryptoAlgorithm::XC20P),
        "aes256gcm" => Ok(CryptoAlgorithm::A256GCM),
        other => Err(Error::MalformedEnvelope(format!("unsupported enc '{}'", other))),
    }
}

pub struct V1Codec;

impl EnvelopeCodec for V1Codec {
    fn version(&self) -> DidCommVersion {
        DidCommVersion::V1
    }

    fn key_id(&self, key: &Key) -> Result<String> {
        if key.algorithm() != KeyAlgorithm::Ed25519 {
            return Err(Error::UnsupportedKeyAlgorithm(key.algorithm()));
        }
        Ok(key.to_base58())
    }

    fn resolve_key_id(&self, kid: &str) -> Result<Key> {
        Key::from_base58(KeyAlgorithm::Ed25519, kid)
    }

    fn key_wrap_algorithm(&self, _content_encryption: CryptoAlgorithm, authenticated: bool) -> String {
        let alg = if authenticated { AUTHCRYPT } else { ANONCRYPT };
        alg.to_string()
    }

    fn party_info(&self, _sender_kid: Option<&str>, _recipient_kids: &[String]) -> (Vec<u8>, Vec<u8>) {
        (Vec::new(), Vec::new())
    }

    fn sender_disclosure(&self) -> SenderDisclosure {
        SenderDisclosure::Sealed
    }

    fn protect(&self, header: &EnvelopeHeader) -> Result<String> {
        let recipients = header
            .recipients
            .iter()
            .map(|recipient| WireRecipient {
                encrypted_key: recipient.encrypted_key.clone(),
                header: WireRecipientHeader {
                    kid: recipient.kid.clone(),
                    sender: recipient.sender.clone(),
                    iv: recipient.iv.clone(),
                    tag: recipient.tag.clone(),
                    epk: recipient.epk.to_vec(),
                },
            })
            .collect();
        encode_protected(&ProtectedHeader {
            enc: enc_name(header.content_encryption).into(),
            typ: TYP.into(),
            alg: self.key_wrap_algorithm(header.content_encryption, header.authenticated),
            recipients,
        })
    }

    fn serialize(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&WireEnvelope {
            protected: envelope.protected.clone(),
            iv: envelope.iv.clone(),
            ciphertext: envelope.ciphertext.clone(),
            tag: envelope.tag.clone(),
        })?)
    }

    fn parse(&self, bytes: &[u8]) -> Result<Envelope> {
        let wire: WireEnvelope = decode_json(bytes)?;
        let protected: ProtectedHeader = decode_protected(&wire.protected)?;

        let authenticated = match protected.alg.as_str() {
            AUTHCRYPT => true,
            ANONCRYPT => false,
            other => return Err(Error::MalformedEnvelope(format!("unsupported alg '{}'", other))),
        };
        let recipients = protected
            .recipients
            .into_iter()
            .map(|recipient| {
                let header = recipient.header;
                if authenticated != header.sender.is_some() {
                    return Err(Error::MalformedEnvelope(format!(
                        "sender field does not match alg {}",
                        protected.alg
                    )));
                }
                Ok(RecipientEntry {
                    epk: x25519_bytes(&header.epk, "epk")?,
                    kid: header.kid,
                    iv: header.iv,
                    encrypted_key: recipient.encrypted_key,
                    tag: header.tag,
                    sender: header.sender,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Envelope {
            version: self.version(),
            header: EnvelopeHeader {
                content_encryption: enc_from_name(&protected.enc)?,
                authenticated,
                sender_kid: None,
                apu: Vec::new(),
                apv: Vec::new(),
                recipients,
            },
            protected: wire.protected,
            iv: wire.iv,
            ciphertext: wire.ciphertext,
            tag: wire.tag,
        })
    }
}
