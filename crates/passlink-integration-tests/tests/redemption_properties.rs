//! End-to-end properties of share-link redemption.
//!
//! Each test drives the full pipeline: decode, signer recovery, view
//! admission and ownership resolution.

mod common;

use passlink_capabilities::ShareToken;
use passlink_crypto::{Signer, recover_address};
use passlink_gateway::RedeemError;

use common::{Harness, credential, signer, token};

fn decoded_nonce(link: &str) -> String {
    ShareToken::decode(link).unwrap().payload.nonce
}

#[test]
fn round_trip_reproduces_token() {
    let owner = signer(1);
    let issued = ShareToken::issue("cred-a", 4, &owner).unwrap();

    let decoded = ShareToken::decode(&issued.encode().unwrap()).unwrap();
    assert_eq!(decoded, issued);
}

#[test]
fn recovery_is_deterministic() {
    let owner = signer(1);
    let issued = ShareToken::issue("cred-a", 1, &owner).unwrap();
    let message = issued.payload.canonical_bytes().unwrap();

    let first = recover_address(&message, &issued.signature).unwrap();
    for _ in 0..10 {
        assert_eq!(recover_address(&message, &issued.signature).unwrap(), first);
    }
    assert_eq!(first, owner.address());
}

#[tokio::test]
async fn tampered_payload_never_redeems() {
    let owner = signer(1);
    let harness = Harness::new(vec![
        credential("cred-a", &owner),
        credential("cred-b", &owner),
    ]);

    let issued = ShareToken::issue("cred-a", 5, &owner).unwrap();
    let mut payload = issued.payload.clone();
    payload.credential_id = "cred-b".into();
    let forged = ShareToken::new(payload, issued.signature).encode().unwrap();

    let err = harness.service().redeem(Some(&forged)).await.unwrap_err();
    assert!(
        matches!(err, RedeemError::NotFound { .. } | RedeemError::Signature(_)),
        "unexpected: {err:?}"
    );
}

#[tokio::test]
async fn exact_cap_enforcement() {
    let owner = signer(2);
    let harness = Harness::new(vec![credential("cred-a", &owner)]);
    let link = token(&owner, "cred-a", 3);

    let mut left = Vec::new();
    for _ in 0..3 {
        let redemption = harness.service().redeem(Some(&link)).await.unwrap();
        assert_eq!(redemption.owner, owner.address());
        left.push(redemption.views_left);
    }
    assert_eq!(left, vec![2, 1, 0]);

    let err = harness.service().redeem(Some(&link)).await.unwrap_err();
    assert!(matches!(err, RedeemError::ViewLimitReached { max_views: 3, .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_redemptions_respect_cap() {
    let owner = signer(3);
    let harness = Harness::new(vec![credential("cred-a", &owner)]);
    let link = token(&owner, "cred-a", 5);

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let service = harness.cloned_service();
            let link = link.clone();
            tokio::spawn(async move { service.redeem(Some(&link)).await })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();
    let admitted = results.iter().filter(|r| r.is_ok()).count();
    let limited = results
        .iter()
        .filter(|r| matches!(r, Err(RedeemError::ViewLimitReached { .. })))
        .count();

    assert_eq!(admitted, 5);
    assert_eq!(limited, 45);
    assert_eq!(
        harness.service().gate().views_used(&decoded_nonce(&link)).await.unwrap(),
        5
    );
}

#[tokio::test]
async fn ownership_isolation() {
    let alice = signer(4);
    let bob = signer(5);
    let harness = Harness::new(vec![credential("cred-bob", &bob)]);

    let link = token(&alice, "cred-bob", 3);
    let err = harness.service().redeem(Some(&link)).await.unwrap_err();
    assert!(matches!(err, RedeemError::NotFound { .. }));
    assert_eq!(err.status().as_u16(), 404);
}

#[tokio::test]
async fn independent_nonces() {
    let owner = signer(6);
    let harness = Harness::new(vec![credential("cred-a", &owner)]);
    let first = token(&owner, "cred-a", 1);
    let second = token(&owner, "cred-a", 2);

    harness.service().redeem(Some(&first)).await.unwrap();
    assert!(harness.service().redeem(Some(&first)).await.is_err());

    let redemption = harness.service().redeem(Some(&second)).await.unwrap();
    assert_eq!(redemption.views_left, 1);
}

#[tokio::test]
async fn failed_resolution_consumes_view() {
    let owner = signer(7);
    let harness = Harness::new(Vec::new());
    let issued = ShareToken::issue("cred-missing", 2, &owner).unwrap();
    let link = issued.encode().unwrap();

    for _ in 0..2 {
        let err = harness.service().redeem(Some(&link)).await.unwrap_err();
        assert!(matches!(err, RedeemError::NotFound { .. }));
    }
    let err = harness.service().redeem(Some(&link)).await.unwrap_err();
    assert!(matches!(err, RedeemError::ViewLimitReached { .. }));
}
