//! Sincronização de plano via POST /payment-webhook.

mod common;

use common::TestHarness;
use gerencia_roi::models::{
    profile::{Plan, PlanStatus},
    registry::RecordStatus,
};
use serde_json::{json, Value};
use uuid::Uuid;

const OFFER_PROFISSIONAL: &str = "offer-1771698186014";

#[tokio::test]
async fn approved_purchase_activates_mapped_plan() {
    let harness = TestHarness::new();
    harness.active_credential("groi_teste");
    let buyer = Uuid::new_v4();
    harness.free_profile(buyer, "cliente@exemplo.com");

    let response = harness
        .server
        .post("/payment-webhook")
        .add_query_param("token", "groi_teste")
        .json(&json!({
            "event": "approved",
            "offer": {"id": OFFER_PROFISSIONAL},
            "buyer": {"email": "cliente@exemplo.com"}
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["email"], "cliente@exemplo.com");
    assert_eq!(body["plan"], "profissional");
    assert_eq!(body["status"], "active");

    let profile = harness.store.profile(buyer).expect("perfil semeado");
    assert_eq!(profile.plan, Plan::Profissional);
    assert_eq!(profile.plan_status, PlanStatus::Active);
}

#[tokio::test]
async fn chargeback_downgrades_to_free() {
    let harness = TestHarness::new();
    harness.active_credential("groi_teste");
    let buyer = Uuid::new_v4();
    harness
        .store
        .seed_profile(buyer, "cliente@exemplo.com", Plan::Profissional, PlanStatus::Active);

    harness
        .server
        .post("/payment-webhook")
        .add_header("x-api-token", "groi_teste")
        .json(&json!({
            "event": "chargeback_issued",
            "offer": {"id": OFFER_PROFISSIONAL},
            "buyer": {"email": "cliente@exemplo.com"}
        }))
        .await
        .assert_status_ok();

    let profile = harness.store.profile(buyer).expect("perfil semeado");
    assert_eq!(profile.plan, Plan::Free);
    assert_eq!(profile.plan_status, PlanStatus::Cancelled);
}

#[tokio::test]
async fn unknown_offer_falls_back_to_free() {
    let harness = TestHarness::new();
    harness.active_credential("groi_teste");
    let buyer = Uuid::new_v4();
    harness.free_profile(buyer, "cliente@exemplo.com");

    let body: Value = harness
        .server
        .post("/payment-webhook")
        .add_query_param("token", "groi_teste")
        .json(&json!({
            "event": "sale.approved",
            "offer": {"id": "oferta-desconhecida"},
            "buyer": {"email": "cliente@exemplo.com"}
        }))
        .await
        .json();

    assert_eq!(body["plan"], "free");
    assert_eq!(body["status"], "active");
}

#[tokio::test]
async fn invalid_or_inactive_credential_is_unauthorized() {
    let harness = TestHarness::new();
    harness
        .store
        .seed_credential(harness.user_id, "groi_inativa", RecordStatus::Inactive);
    let buyer = Uuid::new_v4();
    harness.free_profile(buyer, "cliente@exemplo.com");

    let payload = json!({"event": "sale.approved", "buyer": {"email": "cliente@exemplo.com"}});

    harness
        .server
        .post("/payment-webhook")
        .json(&payload)
        .await
        .assert_status_unauthorized();

    harness
        .server
        .post("/payment-webhook")
        .add_query_param("token", "groi_inativa")
        .json(&payload)
        .await
        .assert_status_unauthorized();

    let profile = harness.store.profile(buyer).expect("perfil semeado");
    assert_eq!(profile.plan, Plan::Free);
}

#[tokio::test]
async fn missing_buyer_email_is_bad_request() {
    let harness = TestHarness::new();
    harness.active_credential("groi_teste");

    let response = harness
        .server
        .post("/payment-webhook")
        .add_query_param("token", "groi_teste")
        .json(&json!({"event": "sale.approved", "offer": {"id": OFFER_PROFISSIONAL}}))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn repeated_token_param_is_rejected_with_error_shape() {
    let harness = TestHarness::new();
    harness.active_credential("groi_teste");
    let buyer = Uuid::new_v4();
    harness.free_profile(buyer, "cliente@exemplo.com");

    let response = harness
        .server
        .post("/payment-webhook?token=groi_teste&token=groi_teste")
        .json(&json!({
            "event": "approved",
            "offer": {"id": OFFER_PROFISSIONAL},
            "buyer": {"email": "cliente@exemplo.com"}
        }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    let profile = harness.store.profile(buyer).expect("perfil semeado");
    assert_eq!(profile.plan, Plan::Free);
}

#[tokio::test]
async fn unknown_email_is_not_found() {
    let harness = TestHarness::new();
    harness.active_credential("groi_teste");

    harness
        .server
        .post("/payment-webhook")
        .add_query_param("token", "groi_teste")
        .json(&json!({"event": "sale.approved", "buyer": {"email": "ninguem@exemplo.com"}}))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn error_messages_follow_accept_language() {
    let harness = TestHarness::new();

    let pt: Value = harness
        .server
        .post("/payment-webhook")
        .json(&json!({}))
        .await
        .json();

    let en: Value = harness
        .server
        .post("/payment-webhook")
        .add_header("accept-language", "en-US,en;q=0.9")
        .json(&json!({}))
        .await
        .json();

    assert_ne!(pt["error"], en["error"]);
}
