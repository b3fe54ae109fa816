//! Key agreement derived key encryption keys and content encryption key wrapping.
use std::convert::TryFrom;

use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{CryptoAlgorithm, Cypher};
use crate::Error;

pub(crate) const TAG_LEN: usize = 16;
const SENDER_SEAL_ALG: &str = "DIDComm-sender";

/// Content encryption key sealed for one recipient.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WrappedKey {
    pub iv: Vec<u8>,
    pub encrypted_key: Vec<u8>,
    pub tag: Vec<u8>,
}

pub(crate) fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Fresh 256 bit content encryption key.
pub(crate) fn generate_cek() -> Zeroizing<Vec<u8>> {
    Zeroizing::new(random_bytes(32))
}

/// Concat KDF (NIST SP 800-56A) with SHA-256, single round for a 256 bit key.
fn concat_kdf(
    secret: &[u8],
    alg: &str,
    producer_info: &[u8],
    consumer_info: &[u8],
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let mut value = get_length_and_input(alg.as_bytes())?;
    value.extend(get_length_and_input(producer_info)?);
    value.extend(get_length_and_input(consumer_info)?);
    // only key length 256 is supported
    value.extend(&[0, 0, 1, 0]);

    let mut hasher = Sha256::new();
    hasher.update([0u8, 0, 0, 1]);
    hasher.update(secret);
    hasher.update(&value);
    Ok(Zeroizing::new(hasher.finalize().to_vec()))
}

/// Creates a key used to encrypt/decrypt keys (key encryption key).
///
/// # Arguments
///
/// * `alg` - key wrapping algorithm identifier written to the envelope
///
/// * `ze` - ephemeral-static agreement
///
/// * `zs` - static-static agreement, present only for authenticated envelopes
///
/// * `apu` / `apv` - party u and party v info
pub(crate) fn derive_kek(
    alg: &str,
    ze: &[u8],
    zs: Option<&[u8]>,
    apu: &[u8],
    apv: &[u8],
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let mut shared_secret = Zeroizing::new(ze.to_vec());
    if let Some(zs) = zs {
        shared_secret.extend_from_slice(zs);
    }
    concat_kdf(&shared_secret, alg, apu, apv)
}

/// Seals `cek` under `kek` with a fresh iv.
pub(crate) fn wrap(alg: CryptoAlgorithm, kek: &[u8], cek: &[u8]) -> Result<WrappedKey, Error> {
    let iv = random_bytes(alg.nonce_len());
    let mut sealed = alg.encryptor()(&iv, kek, cek, &[])?;
    let tag = sealed.split_off(sealed.len() - TAG_LEN);
    Ok(WrappedKey {
        iv,
        encrypted_key: sealed,
        tag,
    })
}

/// Any failure, including a malformed iv, is reported as `DecryptionFailed`.
pub(crate) fn unwrap(
    alg: CryptoAlgorithm,
    kek: &[u8],
    wrapped: &WrappedKey,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    if wrapped.iv.len() != alg.nonce_len() || wrapped.tag.len() != TAG_LEN {
        return Err(Error::DecryptionFailed);
    }
    let mut sealed = wrapped.encrypted_key.clone();
    sealed.extend_from_slice(&wrapped.tag);
    alg.decryptor()(&wrapped.iv, kek, &sealed, &[])
        .map(Zeroizing::new)
        .map_err(|_| Error::DecryptionFailed)
}

/// Encrypts the sender key for the holder of `ze`: `iv || ciphertext || tag`.
pub(crate) fn seal_sender(alg: CryptoAlgorithm, ze: &[u8], sender: &[u8]) -> Result<Vec<u8>, Error> {
    let key = concat_kdf(ze, SENDER_SEAL_ALG, &[], &[])?;
    let mut sealed = random_bytes(alg.nonce_len());
    let ciphertext = alg.encryptor()(&sealed, &key, sender, &[])?;
    sealed.extend(ciphertext);
    Ok(sealed)
}

pub(crate) fn open_sender(alg: CryptoAlgorithm, ze: &[u8], sealed: &[u8]) -> Result<Vec<u8>, Error> {
    if sealed.len() < alg.nonce_len() + TAG_LEN {
        return Err(Error::DecryptionFailed);
    }
    let key = concat_kdf(ze, SENDER_SEAL_ALG, &[], &[])?;
    let (iv, ciphertext) = sealed.split_at(alg.nonce_len());
    alg.decryptor()(iv, &key, ciphertext, &[]).map_err(|_| Error::DecryptionFailed)
}

/// Combines length of array and its its length into a vector.
fn get_length_and_input(vector: &[u8]) -> Result<Vec<u8>, Error> {
    let mut collected: Vec<u8> = u32::try_from(vector.len())
        .map_err(|err| Error::Generic(err.to_string()))?
        .to_be_bytes()
        .to_vec();
    collected.extend(vector);
    Ok(collected)
}
