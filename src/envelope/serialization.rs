use serde::{de::DeserializeOwned, Serialize};

use crate::{Error, Result};

/// (de)serialzies between `Vec<u8>` and base64 `String`
/// see `<https://users.rust-lang.org/t/serialize-a-vec-u8-to-json-as-base64/57781/2>`
pub(crate) mod serialization_base64_buffer {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &[u8], s: S) -> Result<S::Ok, S::Error> {
        let base64 = base64_url::encode(v);
        String::serialize(&base64, s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let base64 = String::deserialize(d)?;
        base64_url::decode(&base64).map_err(serde::de::Error::custom)
    }
}

/// (de)serialzies between `Option<Vec<u8>>` and an optional base64 `String`
pub(crate) mod serialization_base64_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        let base64 = v.as_ref().map(base64_url::encode);
        <Option<String>>::serialize(&base64, s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        match <Option<String>>::deserialize(d)? {
            Some(base64) => base64_url::decode(&base64)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Serializes a protected header into its base64url form.
pub(crate) fn encode_protected<T: Serialize>(header: &T) -> Result<String> {
    Ok(base64_url::encode(&serde_json::to_vec(header)?))
}

pub(crate) fn decode_protected<T: DeserializeOwned>(protected: &str) -> Result<T> {
    let json = base64_url::decode(protected)
        .map_err(|e| Error::MalformedEnvelope(format!("protected header: {}", e)))?;
    serde_json::from_slice(&json)
        .map_err(|e| Error::MalformedEnvelope(format!("protected header: {}", e)))
}

pub(crate) fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::MalformedEnvelope(e.to_string()))
}

pub(crate) fn x25519_bytes(bytes: &[u8], field: &str) -> Result<[u8; 32]> {
    let mut key = [0u8; 32];
    if bytes.len() != key.len() {
        return Err(Error::MalformedEnvelope(format!("{} is not an X25519 key", field)));
    }
    key.copy_from_slice(bytes);
    Ok(key)
}
