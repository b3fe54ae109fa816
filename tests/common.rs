#![allow(dead_code, unused_imports)]
extern crate didcomm_agent;

use std::sync::Arc;

pub use didcomm_agent::{
    DidCommConfig,
    DidCommService,
    DidCommVersion,
    Error,
    InMemoryKeyManager,
    Key,
    KeyAlgorithm,
    KeyDidRegistry,
};
use utilities::get_keypair_set;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn registry() -> Arc<KeyDidRegistry> {
    Arc::new(KeyDidRegistry::with_default_capabilities().expect("default registry"))
}

/// An agent holding one fixed Ed25519 key.
pub struct Agent {
    pub service: DidCommService,
    pub key: Key,
}

fn agent(seed: &[u8; 32], config: DidCommConfig) -> Agent {
    let mut key_manager = InMemoryKeyManager::new();
    let key = key_manager.import_ed25519_seed(seed).expect("fixture seed");
    Agent {
        service: DidCommService::new(registry(), Arc::new(key_manager), config),
        key,
    }
}

pub fn alice() -> Agent {
    alice_with(DidCommConfig::default())
}

pub fn alice_with(config: DidCommConfig) -> Agent {
    agent(&get_keypair_set().alice.seed, config)
}

pub fn bob() -> Agent {
    agent(&get_keypair_set().bob.seed, DidCommConfig::default())
}

/// An agent holding the fixed X25519 mediator key.
pub fn mediator() -> Agent {
    let mut key_manager = InMemoryKeyManager::new();
    let key = key_manager
        .import_x25519_secret(&get_keypair_set().mediator.secret)
        .expect("fixture secret");
    Agent {
        service: DidCommService::new(registry(), Arc::new(key_manager), DidCommConfig::default()),
        key,
    }
}

/// Agent with a freshly generated key of `algorithm`.
pub fn stranger(algorithm: KeyAlgorithm) -> Agent {
    let mut key_manager = InMemoryKeyManager::new();
    let key = key_manager.generate(algorithm).expect("generated key");
    Agent {
        service: DidCommService::new(registry(), Arc::new(key_manager), DidCommConfig::default()),
        key,
    }
}
