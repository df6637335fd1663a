use std::sync::Arc;

use alloy_signer_local::PrivateKeySigner;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use price_attestor::{
    attestation_payload::NetworkMode,
    encoding::FeedId,
    price_source::fixed::{FixedPrice, FixedPriceSource},
    rpc::{router, AttestorService, VerifierService},
    signer::{local::LocalSigner, Signer},
    verifier::{registry, EventLog, Verifier},
};
use serde_json::{json, Value};
use tower::ServiceExt;

const BTC_USD: &str = "0xe62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43";

async fn app(trust_oracle: bool) -> Router {
    let oracle = LocalSigner::new(PrivateKeySigner::random());
    let trusted_key = if trust_oracle {
        oracle.public_key()
    } else {
        LocalSigner::new(PrivateKeySigner::random()).public_key()
    };
    let registry = registry::deploy(&oracle, trusted_key, NetworkMode::Testnet)
        .await
        .unwrap();
    let verifier = Verifier::new(Arc::new(registry), Arc::new(EventLog::default()));

    let source = FixedPriceSource::new([FixedPrice {
        feed: FeedId::from_hex(BTC_USD).unwrap(),
        price: 787,
        expo: -8,
    }]);
    let attestor = AttestorService::new(source, "fixed", oracle, "local", NetworkMode::Testnet);

    router(attestor, VerifierService::new(verifier))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn attest(app: &Router) -> Value {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/price",
        Some(json!({ "feed": BTC_USD, "maxAge": 60 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn signed_price_verifies_and_is_recorded() {
    let app = app(true).await;

    let signed = attest(&app).await;
    assert_eq!(signed["data"]["price"], 787);
    assert_eq!(signed["data"]["maxAge"], 60);
    assert_eq!(signed["data"]["feed"], BTC_USD);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/verify",
        Some(json!({
            "price": 787,
            "maxAge": 60,
            "feed": BTC_USD,
            "signature": signed["signature"],
            "publicKey": signed["publicKey"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, json!({ "price": 787 }));

    let (status, events) = call(&app, Method::GET, "/api/events", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events, json!([{ "price": 787 }]));
}

#[tokio::test]
async fn tampered_fields_are_rejected() {
    let app = app(true).await;
    let signed = attest(&app).await;

    let tampered = [
        json!({ "price": 788, "maxAge": 60, "feed": BTC_USD }),
        json!({ "price": 787, "maxAge": 61, "feed": BTC_USD }),
        json!({
            "price": 787,
            "maxAge": 60,
            "feed": "0xe62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b44"
        }),
    ];

    for mut body in tampered {
        body["signature"] = signed["signature"].clone();
        let (status, response) = call(&app, Method::POST, "/api/verify", Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{response}");
    }

    let (_, events) = call(&app, Method::GET, "/api/events", None).await;
    assert_eq!(events, json!([]));
}

#[tokio::test]
async fn signature_from_untrusted_key_is_stale_registry_state() {
    let app = app(false).await;
    let signed = attest(&app).await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/verify",
        Some(json!({
            "price": 787,
            "maxAge": 60,
            "feed": BTC_USD,
            "signature": signed["signature"],
            "publicKey": signed["publicKey"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/verify",
        Some(json!({
            "price": 787,
            "maxAge": 60,
            "feed": BTC_USD,
            "signature": signed["signature"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/verify",
        Some(json!({
            "price": 787,
            "maxAge": 60,
            "feed": BTC_USD,
            "signature": "1",
            "publicKey": signed["publicKey"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn bad_requests_map_to_client_errors() {
    let app = app(true).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/price",
        Some(json!({ "feed": "0xnothex", "maxAge": 60 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/price",
        Some(json!({ "feed": "0x01", "maxAge": 60 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
