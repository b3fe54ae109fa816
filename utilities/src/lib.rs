//! Fixed key material shared by the integration tests.
use ed25519_dalek::SigningKey;
use x25519_dalek::{PublicKey, StaticSecret};

const ALICE_SEED: &str = "6QN8DfuN9hjgHgPvLXqgzqYE3jRRGRrmJQZkd5tL8paR";
const BOB_SEED: &str = "HBTcN2MrXNRj9xF9oi8QqYyuEPv3JLLjQKuEgW9oxVKP";
const MEDIATOR_SECRET: &str = "ACa4PPJ1LnPNq1iwS4AxvUnZ1TG8SWRvSB3ngwHnyQp4";

pub struct Ed25519Fixture {
    pub seed: [u8; 32],
    pub public: [u8; 32],
}

pub struct X25519Fixture {
    pub secret: [u8; 32],
    pub public: [u8; 32],
}

pub struct KeyPairSet {
    pub alice: Ed25519Fixture,
    pub bob: Ed25519Fixture,
    pub mediator: X25519Fixture,
}

fn decode_32(base58: &str) -> [u8; 32] {
    let bytes = bs58::decode(base58).into_vec().expect("fixture is base58");
    let mut fixed = [0u8; 32];
    fixed.copy_from_slice(&bytes[..32]);
    fixed
}

fn ed25519(seed: &str) -> Ed25519Fixture {
    let seed = decode_32(seed);
    let public = SigningKey::from_bytes(&seed).verifying_key().to_bytes();
    Ed25519Fixture { seed, public }
}

fn x25519(secret: &str) -> X25519Fixture {
    let secret = StaticSecret::from(decode_32(secret));
    X25519Fixture {
        secret: secret.to_bytes(),
        public: PublicKey::from(&secret).to_bytes(),
    }
}

pub fn get_keypair_set() -> KeyPairSet {
    KeyPairSet {
        alice: ed25519(ALICE_SEED),
        bob: ed25519(BOB_SEED),
        mediator: x25519(MEDIATOR_SECRET),
    }
}
