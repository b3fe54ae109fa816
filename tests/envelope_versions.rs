mod common;

use common::*;
use didcomm_agent::envelope;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde_json::{json, Value};

async fn packed(version: DidCommVersion) -> Vec<u8> {
    let alice = alice();
    let bob = bob();
    alice
        .service
        .pack(&json!({ "content": "hi" }), &[bob.key], Some(&alice.key), version)
        .await
        .expect("pack")
        .into_bytes()
}

/// Re-serializes the top level members of `envelope` in a shuffled order.
fn shuffled(envelope: &[u8], seed: u64) -> Vec<u8> {
    let value: Value = serde_json::from_slice(envelope).expect("json envelope");
    let mut members: Vec<String> = value
        .as_object()
        .expect("json object")
        .iter()
        .map(|(name, member)| format!("{}:{}", Value::String(name.clone()), member))
        .collect();
    members.shuffle(&mut StdRng::seed_from_u64(seed));
    format!("{{{}}}", members.join(",")).into_bytes()
}

#[tokio::test]
async fn version_is_detected_in_any_member_order() {
    init_logger();
    for version in [DidCommVersion::V1, DidCommVersion::V2] {
        let envelope = packed(version).await;
        let expected = envelope::parse(&envelope).expect("parse");
        for seed in 0..32 {
            let reordered = shuffled(&envelope, seed);
            assert_eq!(envelope::detect_version(&reordered).expect("detect"), version);
            assert_eq!(envelope::parse(&reordered).expect("parse"), expected);
        }
    }
}

#[tokio::test]
async fn serialize_is_version_explicit() {
    for version in [DidCommVersion::V1, DidCommVersion::V2] {
        let parsed = envelope::parse(&packed(version).await).expect("parse");
        let bytes = envelope::serialize(&parsed).expect("serialize");
        assert_eq!(envelope::parse(&bytes).expect("parse"), parsed);

        let wire: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(wire.get("recipients").is_some(), version == DidCommVersion::V2);
    }
}

#[tokio::test]
async fn empty_recipient_list_is_malformed() {
    let mut wire: Value = serde_json::from_slice(&packed(DidCommVersion::V2).await).expect("json");
    wire["recipients"] = json!([]);
    let bytes = serde_json::to_vec(&wire).expect("json");
    assert!(matches!(envelope::parse(&bytes), Err(Error::MalformedEnvelope(_))));
}

#[test]
fn unrelated_json_is_malformed() {
    let inputs = [
        json!({ "protected": "e30", "iv": "", "ciphertext": "", "tag": "" }),
        json!({ "payload": "eyJ9", "signatures": [] }),
        json!({ "protected": "not base64!", "iv": "" }),
        json!("recipients"),
    ];
    for input in inputs {
        let bytes = serde_json::to_vec(&input).expect("json");
        assert!(matches!(envelope::parse(&bytes), Err(Error::MalformedEnvelope(_))));
    }
}
