mod common;

use chrono::{Duration, Utc};
use backend::nonce::NonceStore;
use common::{TestSetup, TestWallet};
use common_types::CompleteSiweResponse;
use http::{header, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_sign_in_round_trip_and_replay() {
    let context = TestSetup::default().await;
    let wallet = TestWallet::random();

    let (nonce, cookie) = context.issue_nonce().await;
    let request = wallet.complete_siwe_request(&wallet.message(&nonce), &nonce);

    let response = context
        .send_post_request_with_cookie("/v1/complete-siwe", request.clone(), Some(&cookie))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    // The nonce cookie is deleted on success
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Missing Set-Cookie header");
    assert!(set_cookie.to_str().unwrap().contains("Max-Age=0"));

    let body = context.parse_response_body(response).await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["isValid"], true);
    assert_eq!(body["address"], wallet.address);

    // Replaying the same payload with the same cookie fails
    let replay = context
        .send_post_request_with_cookie("/v1/complete-siwe", request, Some(&cookie))
        .await
        .expect("Failed to send request");

    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
    let body = context.parse_response_body(replay).await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["isValid"], false);
    assert_eq!(body["message"], "Invalid nonce");
}

#[tokio::test]
async fn test_nonce_not_matching_cookie_is_rejected() {
    let context = TestSetup::default().await;
    let wallet = TestWallet::random();

    let (_, cookie) = context.issue_nonce().await;
    let (other_nonce, _) = context.issue_nonce().await;

    // Properly signed, but for a nonce this caller's cookie does not carry
    let request = wallet.complete_siwe_request(&wallet.message(&other_nonce), &other_nonce);
    let response = context
        .send_post_request_with_cookie("/v1/complete-siwe", request, Some(&cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = context.parse_response_body(response).await.unwrap();
    assert_eq!(body["isValid"], false);
    assert_eq!(body["message"], "Invalid nonce");
}

#[tokio::test]
async fn test_missing_cookie_is_rejected() {
    let context = TestSetup::default().await;
    let wallet = TestWallet::random();

    let (nonce, _) = context.issue_nonce().await;
    let request = wallet.complete_siwe_request(&wallet.message(&nonce), &nonce);

    let response = context
        .send_post_request("/v1/complete-siwe", request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = context.parse_response_body(response).await.unwrap();
    assert_eq!(body["message"], "Invalid nonce");
}

#[tokio::test]
async fn test_tampered_cookie_is_rejected() {
    let context = TestSetup::default().await;
    let wallet = TestWallet::random();

    let (nonce, cookie) = context.issue_nonce().await;
    let request = wallet.complete_siwe_request(&wallet.message(&nonce), &nonce);

    // Keep the nonce, forge the signature
    let forged = format!("siwe={nonce}.{}", "0".repeat(64));
    assert_ne!(forged, cookie);

    let response = context
        .send_post_request_with_cookie("/v1/complete-siwe", request, Some(&forged))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = context.parse_response_body(response).await.unwrap();
    assert_eq!(body["message"], "Invalid nonce");
}

#[tokio::test]
async fn test_nonce_never_issued_is_rejected() {
    let context = TestSetup::default().await;
    let wallet = TestWallet::random();

    // A validly signed cookie for a nonce the store never recorded
    let nonce = "abcdef0123456789";
    let cookie = format!("siwe={}", context.cookie_signer.sign(nonce));
    let request = wallet.complete_siwe_request(&wallet.message(nonce), nonce);

    let response = context
        .send_post_request_with_cookie("/v1/complete-siwe", request, Some(&cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = context.parse_response_body(response).await.unwrap();
    assert_eq!(body["message"], "Invalid nonce");
}

#[tokio::test]
async fn test_expired_nonce_is_rejected() {
    let context = TestSetup::new(Some(0)).await;
    let wallet = TestWallet::random();

    let (nonce, cookie) = context.issue_nonce().await;
    let request = wallet.complete_siwe_request(&wallet.message(&nonce), &nonce);

    let response = context
        .send_post_request_with_cookie("/v1/complete-siwe", request, Some(&cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = context.parse_response_body(response).await.unwrap();
    assert_eq!(body["message"], "Invalid nonce");
}

#[tokio::test]
async fn test_signature_from_another_wallet_is_rejected() {
    let context = TestSetup::default().await;
    let wallet = TestWallet::random();
    let impostor = TestWallet::random();

    let (nonce, cookie) = context.issue_nonce().await;
    let message = wallet.message(&nonce).to_string();

    let request = json!({
        "payload": {
            "status": "success",
            "message": message,
            "signature": impostor.sign(&message),
            "address": wallet.address,
            "version": 1,
        },
        "nonce": nonce,
    });

    let response = context
        .send_post_request_with_cookie("/v1/complete-siwe", request, Some(&cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = context.parse_response_body(response).await.unwrap();
    assert_eq!(body["isValid"], false);
    assert_eq!(body["message"], "Invalid signature");

    // A failed attempt leaves the nonce usable
    assert!(context.nonce_store.is_live(&nonce).await.unwrap());
}

#[tokio::test]
async fn test_expired_message_is_rejected() {
    let context = TestSetup::default().await;
    let wallet = TestWallet::random();

    let (nonce, cookie) = context.issue_nonce().await;
    let now = Utc::now();
    let message =
        wallet.message_with_window(&nonce, now - Duration::days(8), now - Duration::days(1));
    let request = wallet.complete_siwe_request(&message, &nonce);

    let response = context
        .send_post_request_with_cookie("/v1/complete-siwe", request, Some(&cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = context.parse_response_body(response).await.unwrap();
    assert_eq!(body["message"], "Invalid signature");
}

#[tokio::test]
async fn test_message_for_other_address_is_rejected() {
    let context = TestSetup::default().await;
    let wallet = TestWallet::random();
    let other = TestWallet::random();

    let (nonce, cookie) = context.issue_nonce().await;
    // Signed by `wallet` but claims `other`'s address in the payload
    let mut request = wallet.complete_siwe_request(&wallet.message(&nonce), &nonce);
    request["payload"]["address"] = json!(other.address);

    let response = context
        .send_post_request_with_cookie("/v1/complete-siwe", request, Some(&cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = context.parse_response_body(response).await.unwrap();
    assert_eq!(body["message"], "Invalid signature");
}

#[tokio::test]
async fn test_malformed_payload_fails_validation() {
    let context = TestSetup::default().await;
    let (nonce, cookie) = context.issue_nonce().await;

    let request = json!({
        "payload": {
            "status": "success",
            "message": "hello",
            "signature": "0x1234",
            "address": "0xabc",
            "version": 1,
        },
        "nonce": nonce,
    });

    let response = context
        .send_post_request_with_cookie("/v1/complete-siwe", request, Some(&cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = context.parse_response_body(response).await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["isValid"], false);
    assert!(body["message"].is_string());

    // Clients read validation failures like any other rejection
    let decoded: CompleteSiweResponse = serde_json::from_value(body).unwrap();
    assert!(!decoded.is_valid);

    // Nothing was consumed
    assert!(context.nonce_store.is_live(&nonce).await.unwrap());
}

#[tokio::test]
async fn test_unparseable_body_is_a_rejection() {
    let context = TestSetup::default().await;
    let (_nonce, cookie) = context.issue_nonce().await;

    let response = context
        .send_post_request_with_cookie("/v1/complete-siwe", json!({ "nonce": 42 }), Some(&cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = context.parse_response_body(response).await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["isValid"], false);
    assert_eq!(body["message"], "Invalid JSON payload");
}
