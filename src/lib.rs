//! DIDComm v1/v2 envelopes and DID verification method key resolution.
//!
//! [`DidCommService`] packs plaintext messages into encrypted envelopes and
//! unpacks envelopes of either protocol version. [`KeyDidRegistry`] converts
//! between [`Key`]s and the verification methods of DID documents.
#[macro_use]
extern crate serde;
#[macro_use]
extern crate log;

pub mod config;
pub mod crypto;
pub mod dids;
pub mod envelope;
mod error;
pub mod keys;
pub mod messages;
mod result;
mod service;
pub mod wallet;

pub use config::DidCommConfig;
pub use dids::{KeyDidRegistry, VerificationMethod};
pub use envelope::DidCommVersion;
pub use error::*;
pub use keys::{Jwk, Key, KeyAlgorithm};
pub use messages::{Problem, ProtocolRegistry};
pub use result::*;
pub use service::{DidCommService, EncryptedMessage, UnpackedMessageContext};
#[cfg(feature = "mock")]
pub use wallet::MockKeyManager;
pub use wallet::{InMemoryKeyManager, KeyManager, KeyManagerError};
