//! Resolution between keys and DID document verification methods.
pub mod key_type;
mod registry;
mod verification_method;

pub use registry::KeyDidRegistry;
pub use verification_method::*;
