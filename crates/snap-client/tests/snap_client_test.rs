//! Contract tests for SnapClient against a simulated Snap / Core API.
//!
//! Uses wiremock to stand in for both `app.sandbox.midtrans.com` and
//! `api.sandbox.midtrans.com` (one mock server serves both paths).
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/snap/v1/transactions` | `create_*` |
//! | GET    | `/v2/{order_id}/status` | `status_*` |
//! | POST   | `/v2/{order_id}/cancel` | `cancel_*` |

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use snap_client::{
    CStoreTransactionInput, CancelInput, CheckStatusInput, ConvenienceStore, Credentials,
    EWalletProvider, EWalletTransactionInput, Endpoints, Environment, RequestOptions, SnapClient,
    SnapConfig, SnapError, TransactionInput, TransactionStatus, TransportError, VirtualAccountBank,
    VirtualAccountTransactionInput,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVER_KEY: &str = "SB-Mid-server-test";
/// base64("SB-Mid-server-test:")
const EXPECTED_AUTH: &str = "Basic U0ItTWlkLXNlcnZlci10ZXN0Og==";

/// Build a SnapClient with both APIs pointed at a wiremock server.
fn test_client(mock_server: &MockServer) -> SnapClient {
    let config = SnapConfig::new(Environment::Sandbox, Credentials::new(SERVER_KEY).unwrap())
        .unwrap()
        .with_endpoints(Endpoints::single(&mock_server.uri()).unwrap())
        .with_timeout_secs(5);
    SnapClient::new(config).unwrap()
}

fn snap_created(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(201).set_body_json(serde_json::json!({
        "token": token,
        "redirect_url": format!("https://app.sandbox.midtrans.com/snap/v4/redirection/{token}"),
    }))
}

// ── POST /snap/v1/transactions ───────────────────────────────────────

#[tokio::test]
async fn create_virtual_account_sends_normalized_body_and_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .and(header("authorization", EXPECTED_AUTH))
        .and(header("accept", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "transaction_details": { "order_id": "INV-VA-1", "gross_amount": 150000 },
            "enabled_payments": ["bca_va"],
            "bca_va": { "va_number": "12345678" }
        })))
        .respond_with(snap_created("66e4fa55-fdac-4ef9-91b5-733b97d1b862"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let input = VirtualAccountTransactionInput::new("INV-VA-1", 150_000, VirtualAccountBank::Bca)
        .unwrap()
        .with_va_number("12345678")
        .unwrap();

    let out = client.create_virtual_account(&input).await.unwrap();
    assert_eq!(out.channel, "snap");
    assert_eq!(out.token, "66e4fa55-fdac-4ef9-91b5-733b97d1b862");
    assert!(out.redirect_url.ends_with("/66e4fa55-fdac-4ef9-91b5-733b97d1b862"));
    assert!(out.bank.is_none());
    assert_eq!(out.raw.len(), 2);
}

#[tokio::test]
async fn create_ewallet_returns_typed_output() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .and(body_partial_json(serde_json::json!({
            "enabled_payments": ["gopay"],
            "gopay": { "enable_callback": true, "callback_url": "https://merchant.example/done" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "token": "abc",
            "redirect_url": "https://pay/abc",
            "new_field_from_gateway": { "nested": true }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let input = EWalletTransactionInput::new("INV-EW-1", 25_000, EWalletProvider::Gopay)
        .unwrap()
        .with_callback_url("https://merchant.example/done")
        .unwrap();

    let out = client.create_ewallet(&input).await.unwrap();
    assert_eq!(out.token, "abc");
    assert_eq!(out.redirect_url, "https://pay/abc");
    assert_eq!(out.mobile_url, "https://pay/abc");
    assert_eq!(
        out.raw.get("new_field_from_gateway"),
        Some(&serde_json::json!({ "nested": true }))
    );
}

#[tokio::test]
async fn create_convenience_store_via_generic_create() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .and(body_partial_json(serde_json::json!({
            "enabled_payments": ["alfamart"],
            "cstore": { "store": "alfamart", "message": "Order 77" }
        })))
        .respond_with(snap_created("cs-token"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let input: TransactionInput =
        CStoreTransactionInput::new("INV-CS-1", 30_000, ConvenienceStore::Alfamart)
            .unwrap()
            .with_message("Order 77")
            .unwrap()
            .into();

    let out = client.create(&input).await.unwrap();
    assert_eq!(out.token(), "cs-token");
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["kind"], "cstore");
    assert!(json["payment_code"].is_null());
}

#[tokio::test]
async fn create_handles_400_as_gateway_rejected() {
    let mock_server = MockServer::start().await;
    let body = r#"{"error_messages":["transaction_details.order_id sudah digunakan"]}"#;

    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .respond_with(ResponseTemplate::new(400).set_body_string(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let input =
        VirtualAccountTransactionInput::new("INV-DUP", 10_000, VirtualAccountBank::Bni).unwrap();

    match client.create_virtual_account(&input).await.unwrap_err() {
        SnapError::GatewayRejected { status, body: got, .. } => {
            assert_eq!(status, 400);
            assert_eq!(got, body);
        }
        other => panic!("expected GatewayRejected, got: {other:?}"),
    }
}

#[tokio::test]
async fn create_rejects_well_formed_body_with_wrong_status() {
    let mock_server = MockServer::start().await;
    let body = serde_json::json!({ "token": "abc", "redirect_url": "https://pay/abc" });

    // 200 is not 201: even a perfectly valid body must not be decoded.
    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let input = EWalletTransactionInput::new("INV-200", 1, EWalletProvider::Shopeepay).unwrap();

    match client.create_ewallet(&input).await.unwrap_err() {
        SnapError::GatewayRejected { status, body: got, .. } => {
            assert_eq!(status, 200);
            let raw: serde_json::Value = serde_json::from_str(&got).unwrap();
            assert_eq!(raw, body);
        }
        other => panic!("expected GatewayRejected, got: {other:?}"),
    }
}

#[tokio::test]
async fn create_missing_redirect_url_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "token": "abc" })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let input =
        CStoreTransactionInput::new("INV-MAL", 5_000, ConvenienceStore::Indomaret).unwrap();

    let err = client.create_convenience_store(&input).await.unwrap_err();
    assert_eq!(err.invalid_fields(), vec!["redirect_url"]);
    match err {
        SnapError::MalformedResponse { raw, .. } => {
            assert_eq!(raw, serde_json::json!({ "token": "abc" }));
        }
        other => panic!("expected MalformedResponse, got: {other:?}"),
    }
}

#[tokio::test]
async fn create_non_json_success_body_is_transport_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let input =
        VirtualAccountTransactionInput::new("INV-HTML", 5_000, VirtualAccountBank::Bri).unwrap();

    let err = client.create_virtual_account(&input).await.unwrap_err();
    assert!(
        matches!(err, SnapError::Transport(TransportError::Decode { .. })),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn create_against_closed_port_is_transport_failure() {
    let config = SnapConfig::new(Environment::Sandbox, Credentials::new(SERVER_KEY).unwrap())
        .unwrap()
        .with_endpoints(Endpoints::single("http://127.0.0.1:1").unwrap())
        .with_timeout_secs(2);
    let client = SnapClient::new(config).unwrap();
    let input =
        VirtualAccountTransactionInput::new("INV-DOWN", 5_000, VirtualAccountBank::Bca).unwrap();

    let err = client.create_virtual_account(&input).await.unwrap_err();
    assert!(
        matches!(err, SnapError::Transport(TransportError::Http { .. })),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn per_call_options_reach_the_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .and(header("x-override-notification", "https://merchant.example/notify"))
        .respond_with(snap_created("with-header"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-override-notification",
        HeaderValue::from_static("https://merchant.example/notify"),
    );
    let client = test_client(&mock_server).with_options(&RequestOptions {
        timeout: None,
        headers,
    });
    let input =
        EWalletTransactionInput::new("INV-HDR", 1_000, EWalletProvider::Gopay).unwrap();

    let out = client.create_ewallet(&input).await.unwrap();
    assert_eq!(out.token, "with-header");
}

#[tokio::test]
async fn per_call_timeout_surfaces_as_transport_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .respond_with(snap_created("slow").set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).with_options(&RequestOptions {
        timeout: Some(Duration::from_millis(100)),
        headers: HeaderMap::new(),
    });
    let input =
        CStoreTransactionInput::new("INV-SLOW", 1_000, ConvenienceStore::Indomaret).unwrap();

    match client.create_convenience_store(&input).await.unwrap_err() {
        SnapError::Transport(e) => assert!(e.is_timeout(), "got: {e:?}"),
        other => panic!("expected Transport, got: {other:?}"),
    }
}

// ── GET /v2/{order_id}/status ────────────────────────────────────────

#[tokio::test]
async fn status_returns_decoded_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/INV-VA-1/status"))
        .and(header("authorization", EXPECTED_AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status_code": "201",
            "status_message": "Success, transaction is found",
            "transaction_id": "b1f1c2d3-0000-4000-8000-00000000abcd",
            "order_id": "INV-VA-1",
            "gross_amount": "150000.00",
            "payment_type": "bank_transfer",
            "transaction_time": "2026-10-16 09:12:44",
            "transaction_status": "pending",
            "va_numbers": [{ "bank": "bca", "va_number": "12345678" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let out = client
        .status(&CheckStatusInput::new("INV-VA-1").unwrap())
        .await
        .unwrap();

    assert_eq!(out.order_id, "INV-VA-1");
    assert_eq!(out.status, TransactionStatus::Pending);
    assert_eq!(out.status_code.as_deref(), Some("201"));
    assert_eq!(out.payment_type.as_deref(), Some("bank_transfer"));
    assert!(out.raw.contains_key("va_numbers"));
}

#[tokio::test]
async fn status_expired_transaction_is_not_a_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/INV-OLD/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status_code": "407",
            "order_id": "INV-OLD",
            "transaction_status": "expire"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let out = client
        .status(&CheckStatusInput::new("INV-OLD").unwrap())
        .await
        .unwrap();
    assert_eq!(out.status, TransactionStatus::Expire);
}

#[tokio::test]
async fn status_unknown_order_in_body_is_gateway_rejected() {
    let mock_server = MockServer::start().await;
    let body = r#"{"status_code":"404","status_message":"Transaction doesn't exist.","id":"e1"}"#;

    Mock::given(method("GET"))
        .and(path("/v2/INV-NOPE/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    match client
        .status(&CheckStatusInput::new("INV-NOPE").unwrap())
        .await
        .unwrap_err()
    {
        SnapError::GatewayRejected { status, body: got, .. } => {
            assert_eq!(status, 404);
            assert_eq!(got, body);
        }
        other => panic!("expected GatewayRejected, got: {other:?}"),
    }
}

#[tokio::test]
async fn status_http_500_is_gateway_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/INV-500/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .status(&CheckStatusInput::new("INV-500").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

// ── POST /v2/{order_id}/cancel ───────────────────────────────────────

#[tokio::test]
async fn cancel_returns_cancelled_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/INV-CS-1/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status_code": "200",
            "status_message": "Success, transaction is canceled",
            "transaction_id": "c2e2d3f4-0000-4000-8000-00000000cdef",
            "order_id": "INV-CS-1",
            "payment_type": "cstore",
            "transaction_status": "cancel"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let out = client
        .cancel(&CancelInput::new("INV-CS-1").unwrap())
        .await
        .unwrap();
    assert_eq!(out.status, TransactionStatus::Cancel);
    assert!(out.status.is_final());
    assert_eq!(
        out.transaction_id.as_deref(),
        Some("c2e2d3f4-0000-4000-8000-00000000cdef")
    );
}

#[tokio::test]
async fn cancel_settled_transaction_is_gateway_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/INV-PAID/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status_code": "412",
            "status_message": "Merchant cannot modify the status of the transaction"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .cancel(&CancelInput::new("INV-PAID").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(412));
}

#[tokio::test]
async fn cancel_malformed_body_names_missing_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/INV-ODD/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status_code": "200",
            "order_id": "INV-ODD"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .cancel(&CancelInput::new("INV-ODD").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.invalid_fields(), vec!["transaction_status"]);
}
