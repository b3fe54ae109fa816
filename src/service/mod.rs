//! Packing plaintext messages into envelopes and unpacking them again.
//!
//! [`DidCommService`] is what applications call. It owns no private keys:
//! every agreement with a held key goes through the [`KeyManager`].
use std::sync::Arc;

use rand_core::OsRng;
use serde_json::Value;
use x25519_dalek::{EphemeralSecret, PublicKey};
use zeroize::Zeroizing;

use crate::{
    config::DidCommConfig,
    crypto::{key_wrap, CryptoAlgorithm, Cypher},
    dids::{KeyDidRegistry, VerificationMethod},
    envelope::{
        self,
        DidCommVersion,
        Envelope,
        EnvelopeCodec,
        EnvelopeHeader,
        RecipientEntry,
        SenderDisclosure,
    },
    keys::Key,
    messages::{replace_legacy_prefix, ProtocolRegistry},
    wallet::{KeyManager, KeyManagerError},
    Error,
    Result,
};


/// Serialized envelope, ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage(Vec<u8>);

impl EncryptedMessage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for EncryptedMessage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for EncryptedMessage {
    fn from(bytes: Vec<u8>) -> Self {
        EncryptedMessage(bytes)
    }
}

/// Outcome of a successful [`DidCommService::unpack`].
#[derive(Debug, Clone, PartialEq)]
pub struct UnpackedMessageContext {
    pub protocol_version: DidCommVersion,
    pub plaintext_message: Value,
    /// Present only for authenticated envelopes.
    pub sender_key: Option<Key>,
    /// Held key that opened the envelope.
    pub recipient_key: Key,
}

pub struct DidCommService {
    registry: Arc<KeyDidRegistry>,
    key_manager: Arc<dyn KeyManager>,
    config: DidCommConfig,
    protocols: ProtocolRegistry,
}

impl DidCommService {
    pub fn new(
        registry: Arc<KeyDidRegistry>,
        key_manager: Arc<dyn KeyManager>,
        config: DidCommConfig,
    ) -> Self {
        Self {
            registry,
            key_manager,
            config,
            protocols: ProtocolRegistry::aries_legacy(),
        }
    }

    /// Replaces the protocols allowed to use the legacy message type prefix.
    pub fn with_protocol_registry(mut self, protocols: ProtocolRegistry) -> Self {
        self.protocols = protocols;
        self
    }

    pub fn config(&self) -> &DidCommConfig {
        &self.config
    }

    /// Encrypts `message` for every key in `recipient_keys`.
    ///
    /// Without a `sender_key` the envelope is anonymous. With one, the key
    /// manager must hold its private half, and recipients can authenticate
    /// the sender.
    pub async fn pack(
        &self,
        message: &Value,
        recipient_keys: &[Key],
        sender_key: Option<&Key>,
        version: DidCommVersion,
    ) -> Result<EncryptedMessage> {
        if recipient_keys.is_empty() {
            return Err(Error::NoRecipients);
        }
        let codec = envelope::codec_for(version);
        let content_encryption = self.config.content_encryption;
        let authenticated = sender_key.is_some();

        let mut message = message.clone();
        if version == DidCommVersion::V1
            && self.config.use_did_sov_prefix_where_allowed
            && self.protocols.to_legacy(&mut message)
        {
            debug!("using legacy message type prefix for {}", message["@type"]);
        }

        let kids = recipient_keys
            .iter()
            .map(|key| codec.key_id(key))
            .collect::<Result<Vec<_>>>()?;
        let sender_kid = sender_key.map(|key| codec.key_id(key)).transpose()?;
        let (apu, apv) = codec.party_info(sender_kid.as_deref(), &kids);
        let alg = codec.key_wrap_algorithm(content_encryption, authenticated);
        let cek = key_wrap::generate_cek();

        let mut recipients = Vec::with_capacity(kids.len());
        for (key, kid) in recipient_keys.iter().zip(kids) {
            let peer = key.key_agreement_public_key()?;
            let ephemeral = EphemeralSecret::random_from_rng(OsRng);
            let epk = PublicKey::from(&ephemeral).to_bytes();
            let ze = ephemeral.diffie_hellman(&PublicKey::from(peer));
            if !ze.was_contributory() {
                return Err(Error::InvalidKeyEncoding(format!(
                    "recipient key {} is a low order point",
                    kid
                )));
            }
            let zs = match sender_key {
                Some(sender) => Some(self.key_manager.key_agreement(sender, &peer).await?),
                None => None,
            };
            let kek = key_wrap::derive_kek(
                &alg,
                ze.as_bytes(),
                zs.as_ref().map(|zs| zs.as_slice()),
                &apu,
                &apv,
            )?;
            let wrapped = key_wrap::wrap(content_encryption, &kek, &cek)?;
            let sender = match (&sender_kid, codec.sender_disclosure()) {
                (Some(sender_kid), SenderDisclosure::Sealed) => Some(key_wrap::seal_sender(
                    content_encryption,
                    ze.as_bytes(),
                    sender_kid.as_bytes(),
                )?),
                _ => None,
            };
            recipients.push(RecipientEntry {
                kid,
                epk,
                iv: wrapped.iv,
                encrypted_key: wrapped.encrypted_key,
                tag: wrapped.tag,
                sender,
            });
        }

        let header = EnvelopeHeader {
            content_encryption,
            authenticated,
            sender_kid: match codec.sender_disclosure() {
                SenderDisclosure::Protected => sender_kid,
                SenderDisclosure::Sealed => None,
            },
            apu,
            apv,
            recipients,
        };
        let protected = codec.protect(&header)?;
        let iv = key_wrap::random_bytes(content_encryption.nonce_len());
        let mut ciphertext = content_encryption.encryptor()(
            &iv,
            &cek,
            &serde_json::to_vec(&message)?,
            protected.as_bytes(),
        )?;
        let tag = ciphertext.split_off(ciphertext.len() - key_wrap::TAG_LEN);

        trace!(
            "packed {:?} envelope for {} recipient(s), authenticated: {}",
            version,
            header.recipients.len(),
            authenticated
        );
        let envelope = Envelope {
            version: codec.version(),
            header,
            protected,
            iv,
            ciphertext,
            tag,
        };
        Ok(EncryptedMessage(codec.serialize(&envelope)?))
    }

    /// Resolves `recipients` through the registry and packs for their keys.
    pub async fn pack_for_verification_methods(
        &self,
        message: &Value,
        recipients: &[VerificationMethod],
        sender_key: Option<&Key>,
        version: DidCommVersion,
    ) -> Result<EncryptedMessage> {
        let keys = recipients
            .iter()
            .map(|verification_method| self.registry.key_from_verification_method(verification_method))
            .collect::<Result<Vec<_>>>()?;
        self.pack(message, &keys, sender_key, version).await
    }

    /// Opens an envelope of either version with the first held key it names.
    ///
    /// Fails with `NoMatchingRecipientKey` when no entry names a held key and
    /// with `DecryptionFailed` when one does but cannot be opened. Which entry
    /// came close is never reported.
    pub async fn unpack(&self, encrypted: &[u8]) -> Result<UnpackedMessageContext> {
        let envelope = envelope::parse(encrypted)?;
        let codec = envelope::codec_for(envelope.version);
        trace!(
            "unpacking {:?} envelope with {} recipient(s)",
            envelope.version,
            envelope.header.recipients.len()
        );

        let protected_sender = match &envelope.header.sender_kid {
            Some(skid) if envelope.header.authenticated => Some(
                resolve_sender(codec, skid)
                    .map_err(|e| Error::MalformedEnvelope(format!("sender key: {}", e)))?,
            ),
            _ => None,
        };

        let held: Vec<(String, Key)> = self
            .key_manager
            .held_keys()
            .await?
            .into_iter()
            .filter_map(|key| codec.key_id(&key).ok().map(|kid| (kid, key)))
            .collect();

        let mut attempted = false;
        for entry in &envelope.header.recipients {
            for (_, key) in held.iter().filter(|(kid, _)| kid == &entry.kid) {
                attempted = true;
                match self
                    .open_entry(codec, &envelope, entry, key, protected_sender.as_ref())
                    .await
                {
                    Ok(context) => return Ok(context),
                    Err(Error::DecryptionFailed) => continue,
                    Err(e) => return Err(e),
                }
            }
        }

        if attempted {
            debug!("no held key could open the envelope");
            Err(Error::DecryptionFailed)
        } else {
            Err(Error::NoMatchingRecipientKey)
        }
    }

    pub fn resolve_key_from_verification_method(
        &self,
        verification_method: &VerificationMethod,
    ) -> Result<Key> {
        self.registry.key_from_verification_method(verification_method)
    }

    pub fn resolve_verification_methods_for_key(
        &self,
        did: &str,
        key: &Key,
    ) -> Result<Vec<VerificationMethod>> {
        self.registry.verification_methods_from_key(did, key)
    }

    /// `true` if the authenticated sender of `context` is one of
    /// `verification_methods`, directly or through its key agreement form.
    pub fn sender_matches(
        &self,
        context: &UnpackedMessageContext,
        verification_methods: &[VerificationMethod],
    ) -> bool {
        let sender = match &context.sender_key {
            Some(sender) => sender,
            None => return false,
        };
        let sender_agreement = sender.key_agreement_public_key().ok();
        verification_methods.iter().any(|verification_method| {
            match self.registry.key_from_verification_method(verification_method) {
                Ok(key) if &key == sender => true,
                Ok(key) => sender_agreement.is_some() && key.key_agreement_public_key().ok() == sender_agreement,
                Err(e) => {
                    debug!("skipping verification method {}: {}", verification_method.id, e);
                    false
                }
            }
        })
    }

    async fn open_entry(
        &self,
        codec: &dyn EnvelopeCodec,
        envelope: &Envelope,
        entry: &RecipientEntry,
        recipient_key: &Key,
        protected_sender: Option<&(Key, [u8; 32])>,
    ) -> Result<UnpackedMessageContext> {
        let header = &envelope.header;
        let content_encryption = header.content_encryption;
        let ze = self
            .key_manager
            .key_agreement(recipient_key, &entry.epk)
            .await
            .map_err(agreement_failure)?;

        let sender = match (protected_sender, &entry.sender) {
            (Some(sender), _) => Some(sender.clone()),
            (None, Some(sealed)) => Some(open_sealed_sender(codec, content_encryption, ze.as_slice(), sealed)?),
            (None, None) => None,
        };
        let zs = match &sender {
            Some((_, sender_public)) => Some(
                self.key_manager
                    .key_agreement(recipient_key, sender_public)
                    .await
                    .map_err(agreement_failure)?,
            ),
            None => None,
        };

        let alg = codec.key_wrap_algorithm(content_encryption, header.authenticated);
        let kek = key_wrap::derive_kek(
            &alg,
            ze.as_slice(),
            zs.as_ref().map(|zs| zs.as_slice()),
            &header.apu,
            &header.apv,
        )?;
        let cek = key_wrap::unwrap(content_encryption, &kek, &entry.wrapped_key())?;

        let mut sealed = envelope.ciphertext.clone();
        sealed.extend_from_slice(&envelope.tag);
        let plaintext = Zeroizing::new(
            content_encryption.decryptor()(&envelope.iv, &cek, &sealed, envelope.protected.as_bytes())
                .map_err(|_| Error::DecryptionFailed)?,
        );
        let mut message: Value = serde_json::from_slice(&plaintext)
            .map_err(|e| Error::MalformedEnvelope(format!("plaintext: {}", e)))?;
        if replace_legacy_prefix(&mut message) {
            debug!("normalized legacy message type prefix");
        }

        Ok(UnpackedMessageContext {
            protocol_version: envelope.version,
            plaintext_message: message,
            sender_key: sender.map(|(key, _)| key),
            recipient_key: recipient_key.clone(),
        })
    }
}

/// Sender key and its X25519 agreement form.
fn resolve_sender(codec: &dyn EnvelopeCodec, kid: &str) -> Result<(Key, [u8; 32])> {
    let key = codec.resolve_key_id(kid)?;
    let public = key.key_agreement_public_key()?;
    Ok((key, public))
}

fn open_sealed_sender(
    codec: &dyn EnvelopeCodec,
    content_encryption: CryptoAlgorithm,
    ze: &[u8],
    sealed: &[u8],
) -> Result<(Key, [u8; 32])> {
    let kid = key_wrap::open_sender(content_encryption, ze, sealed)?;
    let kid = String::from_utf8(kid).map_err(|_| Error::DecryptionFailed)?;
    resolve_sender(codec, &kid).map_err(|_| Error::DecryptionFailed)
}

// a low order ephemeral key is the peer's fault, not the key manager's
fn agreement_failure(error: KeyManagerError) -> Error {
    match error {
        KeyManagerError::NonContributory => Error::DecryptionFailed,
        other => Error::KeyManager(other),
    }
}
