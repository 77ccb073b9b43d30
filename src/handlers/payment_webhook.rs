// src/handlers/payment_webhook.rs

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::{
        query_params,
        webhook_receiver::{parse_body, token_from},
    },
    middleware::i18n::Locale,
    models::profile::PlanSyncResponse,
};

const API_TOKEN_HEADER: &str = "x-api-token";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentWebhookQuery {
    /// Credencial de API (alternativa ao cabeçalho `x-api-token`)
    pub token: Option<String>,
}

// POST /payment-webhook
#[utoipa::path(
    post,
    path = "/payment-webhook",
    tag = "Webhooks",
    params(
        PaymentWebhookQuery,
        ("x-api-token" = Option<String>, Header, description = "Credencial de API")
    ),
    request_body(content = Object, description = "Evento de assinatura do checkout"),
    responses(
        (status = 200, description = "Plano sincronizado", body = PlanSyncResponse),
        (status = 400, description = "E-mail do comprador ausente ou corpo inválido"),
        (status = 401, description = "Credencial de API inválida ou inativa"),
        (status = 404, description = "Perfil não encontrado para o e-mail")
    )
)]
pub async fn sync_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    query: Result<Query<PaymentWebhookQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let query = query_params(query, &locale)?;
    let token = token_from(query.token.as_deref(), &headers, API_TOKEN_HEADER);

    app_state
        .plan_sync_service
        .authenticate(token.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let payload = parse_body(&body).map_err(|e| e.to_api_error(&locale))?;

    let response = app_state
        .plan_sync_service
        .apply(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(response)))
}
