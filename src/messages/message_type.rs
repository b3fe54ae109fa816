use std::collections::HashSet;

use serde_json::Value;

pub const DIDCOMM_PREFIX: &str = "https://didcomm.org/";
/// Prefix older Aries agents expect in `@type`.
pub const LEGACY_DID_SOV_PREFIX: &str = "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/";

const TYPE_FIELD: &str = "@type";

/// Protocols whose messages may go out with the legacy `did:sov` prefix.
///
/// Whether a protocol allows the legacy prefix is a property of the protocol,
/// never of a single message, so it is recorded here once per protocol URI
/// (`{name}/{version}`, prefix excluded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolRegistry {
    legacy_compatible: HashSet<String>,
}

impl ProtocolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry of the Aries protocols that predate `https://didcomm.org/`.
    pub fn aries_legacy() -> Self {
        [
            "connections/1.0",
            "notification/1.0",
            "trust_ping/1.0",
            "routing/1.0",
            "issue-credential/1.0",
            "present-proof/1.0",
            "discover-features/1.0",
            "basicmessage/1.0",
        ]
        .iter()
        .fold(Self::new(), |registry, protocol| registry.allow_legacy_prefix(protocol))
    }

    pub fn allow_legacy_prefix(mut self, protocol: &str) -> Self {
        self.legacy_compatible.insert(protocol.trim_matches('/').to_string());
        self
    }

    /// `true` when the protocol of `message_type` was registered as legacy
    /// compatible. Either prefix is accepted.
    pub fn allows_legacy_prefix(&self, message_type: &str) -> bool {
        protocol_of(message_type)
            .map(|protocol| self.legacy_compatible.contains(protocol))
            .unwrap_or(false)
    }

    /// Rewrites `@type` of `message` to the legacy prefix if its protocol
    /// allows it. Returns whether the message changed.
    pub fn to_legacy(&self, message: &mut Value) -> bool {
        let legacy = match message.get(TYPE_FIELD).and_then(Value::as_str) {
            Some(message_type) if self.allows_legacy_prefix(message_type) => message_type
                .strip_prefix(DIDCOMM_PREFIX)
                .map(|rest| format!("{}{}", LEGACY_DID_SOV_PREFIX, rest)),
            _ => None,
        };
        match legacy {
            Some(legacy) => {
                message[TYPE_FIELD] = Value::String(legacy);
                true
            }
            None => false,
        }
    }
}

/// Replaces a legacy `did:sov` prefix in `@type` with `https://didcomm.org/`.
/// Returns whether the message changed.
pub fn replace_legacy_prefix(message: &mut Value) -> bool {
    let normalized = message
        .get(TYPE_FIELD)
        .and_then(Value::as_str)
        .and_then(|message_type| message_type.strip_prefix(LEGACY_DID_SOV_PREFIX))
        .map(|rest| format!("{}{}", DIDCOMM_PREFIX, rest));
    match normalized {
        Some(normalized) => {
            message[TYPE_FIELD] = Value::String(normalized);
            true
        }
        None => false,
    }
}

// `{prefix}{name}/{version}/{message name}` -> `{name}/{version}`
fn protocol_of(message_type: &str) -> Option<&str> {
    let unprefixed = message_type
        .strip_prefix(DIDCOMM_PREFIX)
        .or_else(|| message_type.strip_prefix(LEGACY_DID_SOV_PREFIX))?;
    unprefixed.rsplit_once('/').map(|(protocol, _)| protocol)
}
