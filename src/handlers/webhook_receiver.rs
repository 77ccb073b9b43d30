// src/handlers/webhook_receiver.rs

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::query_params,
    middleware::i18n::Locale,
};

const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WebhookReceiverQuery {
    /// Token do webhook (alternativa ao cabeçalho `x-webhook-token`)
    pub token: Option<String>,
    /// Sobrescreve a plataforma cadastrada no webhook
    pub platform: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookReceiverResponse {
    pub success: bool,
    pub sale_id: Uuid,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

/// Token da query string, senão do cabeçalho.
pub(crate) fn token_from(query_token: Option<&str>, headers: &HeaderMap, header: &str) -> Option<String> {
    query_token
        .map(str::to_string)
        .or_else(|| {
            headers
                .get(header)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .filter(|t| !t.trim().is_empty())
}

/// Corpo vazio vira `{}`; qualquer outra coisa precisa ser JSON.
pub(crate) fn parse_body(body: &Bytes) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| AppError::InvalidPayload(e.to_string()))
}

// POST /webhook-receiver
#[utoipa::path(
    post,
    path = "/webhook-receiver",
    tag = "Webhooks",
    params(
        WebhookReceiverQuery,
        ("x-webhook-token" = Option<String>, Header, description = "Token do webhook")
    ),
    request_body(content = Object, description = "Payload livre da plataforma de pagamento"),
    responses(
        (status = 200, description = "Venda registrada", body = WebhookReceiverResponse),
        (status = 400, description = "Token inválido/inativo ou corpo inválido"),
        (status = 500, description = "Falha ao gravar a venda")
    )
)]
pub async fn receive_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    query: Result<Query<WebhookReceiverQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let query = query_params(query, &locale)?;
    let token = token_from(query.token.as_deref(), &headers, WEBHOOK_TOKEN_HEADER);

    // 1. Autentica antes de olhar o corpo
    let webhook = app_state
        .receiver_service
        .authenticate(token.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let payload = parse_body(&body).map_err(|e| e.to_api_error(&locale))?;

    let received = app_state
        .receiver_service
        .ingest(&webhook, query.platform.as_deref(), payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((
        StatusCode::OK,
        Json(WebhookReceiverResponse {
            success: true,
            sale_id: received.sale.id,
            duplicate: received.duplicate,
        }),
    ))
}
