//! Recebimento de vendas via POST /webhook-receiver.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use gerencia_roi::models::{registry::RecordStatus, sale::SaleStatus};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

// ============================================================================
// Autenticação por token
// ============================================================================

#[tokio::test]
async fn lowify_sale_is_normalized_and_stored() {
    let harness = TestHarness::new();
    let webhook_id = harness.active_webhook("lowify", "whk_loja");

    let response = harness
        .server
        .post("/webhook-receiver")
        .add_query_param("token", "whk_loja")
        .json(&json!({
            "status": "paid",
            "transaction_id": "TX-1",
            "sale_amount": "197.00",
            "buyer": {"name": "Maria", "email": "maria@exemplo.com"},
            "product": {"id": "p-1", "name": "Curso"}
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body.get("duplicate").is_none());

    let sales = harness.store.sales();
    assert_eq!(sales.len(), 1);
    let sale = &sales[0];
    assert_eq!(body["sale_id"], sale.id.to_string());
    assert_eq!(sale.user_id, harness.user_id);
    assert_eq!(sale.webhook_id, Some(webhook_id));
    assert_eq!(sale.status, SaleStatus::Approved);
    assert_eq!(sale.amount, Decimal::new(19700, 2));
    assert_eq!(sale.currency, "BRL");
    assert_eq!(sale.customer_email.as_deref(), Some("maria@exemplo.com"));
    assert_eq!(sale.raw_data["buyer"]["name"], "Maria");
}

#[tokio::test]
async fn waiting_payment_lowify_sale_is_pending() {
    let harness = TestHarness::new();
    harness.active_webhook("lowify", "whk_loja");

    harness
        .server
        .post("/webhook-receiver")
        .add_query_param("token", "whk_loja")
        .json(&json!({"status": "waiting_payment", "sale_amount": 150, "buyer": {"email": "a@b.com"}}))
        .await
        .assert_status_ok();

    let sales = harness.store.sales();
    assert_eq!(sales[0].status, SaleStatus::Pending);
    assert_eq!(sales[0].amount, Decimal::from(150));
    assert_eq!(sales[0].customer_email.as_deref(), Some("a@b.com"));
    assert_eq!(sales[0].currency, "BRL");
}

#[tokio::test]
async fn token_can_come_from_header() {
    let harness = TestHarness::new();
    harness.active_webhook("hotmart", "whk_cabecalho");

    harness
        .server
        .post("/webhook-receiver")
        .add_header("x-webhook-token", "whk_cabecalho")
        .json(&json!({"status": "waiting_payment", "value": 50}))
        .await
        .assert_status_ok();

    let sales = harness.store.sales();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].status, SaleStatus::Pending);
    assert_eq!(sales[0].platform, "hotmart");
}

#[tokio::test]
async fn missing_or_unknown_token_is_rejected() {
    let harness = TestHarness::new();
    harness.active_webhook("lowify", "whk_loja");

    let response = harness
        .server
        .post("/webhook-receiver")
        .json(&json!({"status": "paid"}))
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    harness
        .server
        .post("/webhook-receiver")
        .add_query_param("token", "whk_desconhecido")
        .json(&json!({"status": "paid"}))
        .await
        .assert_status_bad_request();

    assert_eq!(harness.store.sale_count(), 0);
}

#[tokio::test]
async fn inactive_webhook_stores_nothing() {
    let harness = TestHarness::new();
    harness
        .store
        .seed_webhook(harness.user_id, "lowify", Some("whk_inativo"), RecordStatus::Inactive);

    harness
        .server
        .post("/webhook-receiver")
        .add_query_param("token", "whk_inativo")
        .json(&json!({"status": "paid", "value": 10}))
        .await
        .assert_status_bad_request();

    assert_eq!(harness.store.sale_count(), 0);
}

// ============================================================================
// Corpo e plataforma
// ============================================================================

#[tokio::test]
async fn malformed_body_is_rejected_with_error_shape() {
    let harness = TestHarness::new();
    harness.active_webhook("lowify", "whk_loja");

    let response = harness
        .server
        .post("/webhook-receiver")
        .add_query_param("token", "whk_loja")
        .text("isto não é json")
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert_eq!(harness.store.sale_count(), 0);
}

#[tokio::test]
async fn repeated_token_param_is_rejected_with_error_shape() {
    let harness = TestHarness::new();
    harness.active_webhook("lowify", "whk_loja");

    let response = harness
        .server
        .post("/webhook-receiver?token=whk_loja&token=whk_outro")
        .json(&json!({"status": "paid", "value": 10}))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert_eq!(harness.store.sale_count(), 0);
}

#[tokio::test]
async fn empty_body_is_stored_with_defaults() {
    let harness = TestHarness::new();
    harness.active_webhook("kiwify", "whk_vazio");

    harness
        .server
        .post("/webhook-receiver")
        .add_query_param("token", "whk_vazio")
        .await
        .assert_status_ok();

    let sales = harness.store.sales();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].status, SaleStatus::Other("unknown".into()));
    assert_eq!(sales[0].amount, Decimal::ZERO);
}

#[tokio::test]
async fn platform_query_overrides_registered_platform() {
    let harness = TestHarness::new();
    harness.active_webhook("hotmart", "whk_multi");

    harness
        .server
        .post("/webhook-receiver")
        .add_query_param("token", "whk_multi")
        .add_query_param("platform", "lowify")
        .json(&json!({"status": "approved", "sale_amount": 80}))
        .await
        .assert_status_ok();

    let sales = harness.store.sales();
    assert_eq!(sales[0].platform, "lowify");
    assert_eq!(sales[0].amount, Decimal::from(80));
}

// ============================================================================
// Isolamento e reentregas
// ============================================================================

#[tokio::test]
async fn same_transaction_for_two_owners_creates_two_sales() {
    let harness = TestHarness::new();
    let other_user = Uuid::new_v4();
    harness.active_webhook("lowify", "whk_a");
    harness
        .store
        .seed_webhook(other_user, "lowify", Some("whk_b"), RecordStatus::Active);

    for token in ["whk_a", "whk_b"] {
        harness
            .server
            .post("/webhook-receiver")
            .add_query_param("token", token)
            .json(&json!({"status": "paid", "transaction_id": "TX-COMUM", "value": 10}))
            .await
            .assert_status_ok();
    }

    let sales = harness.store.sales();
    assert_eq!(sales.len(), 2);
    assert!(sales.iter().any(|s| s.user_id == harness.user_id));
    assert!(sales.iter().any(|s| s.user_id == other_user));
}

#[tokio::test]
async fn redelivery_is_stored_twice_without_dedup() {
    let harness = TestHarness::new();
    harness.active_webhook("lowify", "whk_loja");

    for _ in 0..2 {
        harness
            .server
            .post("/webhook-receiver")
            .add_query_param("token", "whk_loja")
            .json(&json!({"status": "paid", "transaction_id": "TX-9"}))
            .await
            .assert_status_ok();
    }

    assert_eq!(harness.store.sale_count(), 2);
}

#[tokio::test]
async fn redelivery_returns_existing_sale_with_dedup() {
    let harness = TestHarness::with_dedup(true);
    harness.active_webhook("lowify", "whk_loja");

    let first: Value = harness
        .server
        .post("/webhook-receiver")
        .add_query_param("token", "whk_loja")
        .json(&json!({"status": "paid", "transaction_id": "TX-9"}))
        .await
        .json();

    let second = harness
        .server
        .post("/webhook-receiver")
        .add_query_param("token", "whk_loja")
        .json(&json!({"status": "paid", "transaction_id": "TX-9"}))
        .await;

    second.assert_status_ok();
    let second: Value = second.json();
    assert_eq!(second["duplicate"], true);
    assert_eq!(second["sale_id"], first["sale_id"]);
    assert_eq!(harness.store.sale_count(), 1);
}

#[tokio::test]
async fn storage_failure_returns_500() {
    let harness = TestHarness::new();
    harness.active_webhook("lowify", "whk_loja");
    harness.store.fail_sale_inserts(true);

    let response = harness
        .server
        .post("/webhook-receiver")
        .add_query_param("token", "whk_loja")
        .json(&json!({"status": "paid", "value": 10}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(harness.store.sale_count(), 0);
}
