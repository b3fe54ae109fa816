mod common;

use common::*;
use didcomm_agent::{crypto::CryptoAlgorithm, Problem};
use fake::{faker::lorem::en::Sentence, Fake};
use quickcheck_macros::quickcheck;
use serde_json::{json, Value};

const ALICE_DID: &str = "did:example:alice";
const BOB_DID: &str = "did:example:bob";

fn basic_message() -> Value {
    let content: String = Sentence(3..8).fake();
    json!({
        "@type": "https://didcomm.org/basicmessage/1.0/message",
        "@id": "d0b4d2ec-6e1a-4b4c-8c6f-0bbd1b3e51a4",
        "content": content
    })
}

fn protected_header(packed: &[u8]) -> Value {
    let wire: Value = serde_json::from_slice(packed).expect("json envelope");
    let protected = base64_url::decode(wire["protected"].as_str().expect("protected"))
        .expect("base64url protected header");
    serde_json::from_slice(&protected).expect("json protected header")
}

/// Flips the lowest bit of the first byte of a base64url member.
fn tampered(packed: &[u8], member: &str) -> Vec<u8> {
    let mut wire: Value = serde_json::from_slice(packed).expect("json envelope");
    let mut bytes = base64_url::decode(wire[member].as_str().expect("member")).expect("base64url");
    bytes[0] ^= 1;
    wire[member] = Value::String(base64_url::encode(&bytes));
    serde_json::to_vec(&wire).expect("json")
}

#[tokio::test]
async fn round_trip_in_both_versions_and_modes() -> Result<(), Error> {
    init_logger();
    let alice = alice();
    let bob = bob();
    for version in [DidCommVersion::V1, DidCommVersion::V2] {
        for sender in [None, Some(&alice.key)] {
            let message = basic_message();
            let packed = alice
                .service
                .pack(&message, &[bob.key.clone()], sender, version)
                .await?;
            let unpacked = bob.service.unpack(packed.as_bytes()).await?;

            assert_eq!(unpacked.plaintext_message, message);
            assert_eq!(unpacked.protocol_version, version);
            assert_eq!(unpacked.recipient_key, bob.key);
            assert_eq!(unpacked.sender_key.as_ref(), sender);
        }
    }
    Ok(())
}

#[tokio::test]
async fn every_recipient_can_unpack() -> Result<(), Error> {
    let alice = alice();
    let bob = bob();
    let mediator = mediator();
    let message = basic_message();
    let packed = alice
        .service
        .pack(
            &message,
            &[bob.key.clone(), mediator.key.clone()],
            Some(&alice.key),
            DidCommVersion::V2,
        )
        .await?;

    for recipient in [&bob, &mediator] {
        let unpacked = recipient.service.unpack(packed.as_bytes()).await?;
        assert_eq!(unpacked.plaintext_message, message);
        assert_eq!(unpacked.recipient_key, recipient.key);
        assert_eq!(unpacked.sender_key.as_ref(), Some(&alice.key));
    }
    Ok(())
}

#[tokio::test]
async fn v1_only_names_ed25519_verkeys() {
    let alice = alice();
    let mediator = mediator();
    let result = alice
        .service
        .pack(&basic_message(), &[mediator.key], None, DidCommVersion::V1)
        .await;
    assert!(matches!(
        result,
        Err(Error::UnsupportedKeyAlgorithm(KeyAlgorithm::X25519))
    ));
}

#[tokio::test]
async fn disjoint_key_set_is_no_match() -> Result<(), Error> {
    let alice = alice();
    let bob = bob();
    for (version, algorithm) in [
        (DidCommVersion::V1, KeyAlgorithm::Ed25519),
        (DidCommVersion::V2, KeyAlgorithm::Ed25519),
        (DidCommVersion::V2, KeyAlgorithm::X25519),
    ] {
        let packed = alice
            .service
            .pack(&basic_message(), &[bob.key.clone()], Some(&alice.key), version)
            .await?;
        let result = stranger(algorithm).service.unpack(packed.as_bytes()).await;
        assert!(matches!(result, Err(Error::NoMatchingRecipientKey)));
    }
    Ok(())
}

#[tokio::test]
async fn tampered_ciphertext_or_tag_fails_decryption() -> Result<(), Error> {
    let alice = alice();
    let bob = bob();
    for version in [DidCommVersion::V1, DidCommVersion::V2] {
        for sender in [None, Some(&alice.key)] {
            let packed = alice
                .service
                .pack(&basic_message(), &[bob.key.clone()], sender, version)
                .await?;
            for member in ["ciphertext", "tag"] {
                let result = bob.service.unpack(&tampered(packed.as_bytes(), member)).await;
                assert!(
                    matches!(result, Err(Error::DecryptionFailed)),
                    "{:?} {} accepted: {:?}",
                    version,
                    member,
                    result
                );
            }
        }
    }
    Ok(())
}

#[tokio::test]
async fn wire_identifiers() -> Result<(), Error> {
    let alice = alice();
    let bob = bob();

    let v2 = alice
        .service
        .pack(&basic_message(), &[bob.key.clone()], Some(&alice.key), DidCommVersion::V2)
        .await?;
    let header = protected_header(v2.as_bytes());
    assert_eq!(header["typ"], "application/didcomm-encrypted+json");
    assert_eq!(header["alg"], "ECDH-1PU+XC20PKW");
    assert_eq!(header["enc"], "XC20P");
    let skid = format!("{}#{}", alice.key.to_did_key(), alice.key.to_multibase());
    assert_eq!(header["skid"], Value::String(skid));
    let wire: Value = serde_json::from_slice(v2.as_bytes())?;
    let kid = format!("{}#{}", bob.key.to_did_key(), bob.key.to_multibase());
    assert_eq!(wire["recipients"][0]["header"]["kid"], Value::String(kid));
    assert_eq!(wire["recipients"][0]["header"]["epk"]["crv"], "X25519");

    let v1 = alice
        .service
        .pack(&basic_message(), &[bob.key.clone()], None, DidCommVersion::V1)
        .await?;
    let header = protected_header(v1.as_bytes());
    assert_eq!(header["typ"], "JWM/1.0");
    assert_eq!(header["alg"], "Anoncrypt");
    assert_eq!(header["enc"], "xchacha20poly1305_ietf");
    assert_eq!(header["recipients"][0]["header"]["kid"], Value::String(bob.key.to_base58()));
    assert!(header["recipients"][0]["header"].get("sender").is_none());
    Ok(())
}

#[tokio::test]
async fn configured_content_encryption_is_used() -> Result<(), Error> {
    let alice = alice_with(DidCommConfig {
        content_encryption: CryptoAlgorithm::A256GCM,
        ..Default::default()
    });
    let bob = bob();
    let message = basic_message();

    let v2 = alice
        .service
        .pack(&message, &[bob.key.clone()], None, DidCommVersion::V2)
        .await?;
    let header = protected_header(v2.as_bytes());
    assert_eq!(header["enc"], "A256GCM");
    assert_eq!(header["alg"], "ECDH-ES+A256KW");
    assert_eq!(bob.service.unpack(v2.as_bytes()).await?.plaintext_message, message);

    let v1 = alice
        .service
        .pack(&message, &[bob.key.clone()], Some(&alice.key), DidCommVersion::V1)
        .await?;
    assert_eq!(protected_header(v1.as_bytes())["enc"], "aes256gcm");
    assert_eq!(bob.service.unpack(v1.as_bytes()).await?.sender_key, Some(alice.key.clone()));
    Ok(())
}

#[tokio::test]
async fn verification_methods_as_recipients_and_sender() -> Result<(), Error> {
    let alice = alice();
    let bob = bob();
    let bob_methods = bob.service.resolve_verification_methods_for_key(BOB_DID, &bob.key)?;
    let alice_methods = alice.service.resolve_verification_methods_for_key(ALICE_DID, &alice.key)?;

    let packed = alice
        .service
        .pack_for_verification_methods(&basic_message(), &bob_methods[..1], Some(&alice.key), DidCommVersion::V2)
        .await?;
    let unpacked = bob.service.unpack(packed.as_bytes()).await?;

    assert!(bob.service.sender_matches(&unpacked, &alice_methods));
    assert!(!bob.service.sender_matches(&unpacked, &bob_methods));
    Ok(())
}

#[tokio::test]
async fn unpack_failures_report_the_same_problem() -> Result<(), Error> {
    let alice = alice();
    let bob = bob();
    let packed = alice
        .service
        .pack(&basic_message(), &[bob.key.clone()], None, DidCommVersion::V2)
        .await?;

    let failures = vec![
        bob.service.unpack(b"{}").await,
        stranger(KeyAlgorithm::X25519).service.unpack(packed.as_bytes()).await,
        bob.service.unpack(&tampered(packed.as_bytes(), "ciphertext")).await,
    ];
    let reports: Vec<Problem> = failures
        .iter()
        .map(|failure| Problem::from_error(failure.as_ref().expect_err("unpack must fail")))
        .collect();
    assert!(reports.windows(2).all(|pair| pair[0] == pair[1]));
    Ok(())
}

#[quickcheck]
fn any_message_round_trips(content: String, authenticated: bool, legacy: bool) -> bool {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    runtime.block_on(async {
        let alice = alice();
        let bob = bob();
        let version = if legacy { DidCommVersion::V1 } else { DidCommVersion::V2 };
        let sender = if authenticated { Some(&alice.key) } else { None };
        let message = json!({ "content": content });

        let packed = match alice.service.pack(&message, &[bob.key.clone()], sender, version).await {
            Ok(packed) => packed,
            Err(_) => return false,
        };
        match bob.service.unpack(packed.as_bytes()).await {
            Ok(unpacked) => {
                unpacked.plaintext_message == message && unpacked.sender_key.is_some() == authenticated
            }
            Err(_) => false,
        }
    })
}
