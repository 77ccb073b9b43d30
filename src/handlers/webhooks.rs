// src/handlers/webhooks.rs

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::json_body,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::registry::{CreateWebhookPayload, UpdateStatusPayload, WebhookConfig},
};

// POST /api/webhooks
#[utoipa::path(
    post,
    path = "/api/webhooks",
    tag = "Cadastro",
    request_body = CreateWebhookPayload,
    responses(
        (status = 201, description = "Webhook criado (token gerado)", body = WebhookConfig),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_webhook(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    payload: Result<Json<CreateWebhookPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(payload, &locale)?;

    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let webhook = app_state
        .registry_service
        .create_webhook(user.0.id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(webhook)))
}

// GET /api/webhooks
#[utoipa::path(
    get,
    path = "/api/webhooks",
    tag = "Cadastro",
    responses(
        (status = 200, description = "Webhooks do usuário", body = Vec<WebhookConfig>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_webhooks(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let webhooks = app_state
        .registry_service
        .list_webhooks(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(webhooks)))
}

// PATCH /api/webhooks/{id}
#[utoipa::path(
    patch,
    path = "/api/webhooks/{id}",
    tag = "Cadastro",
    params(("id" = Uuid, Path, description = "ID do webhook")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = WebhookConfig),
        (status = 404, description = "Webhook não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_webhook_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateStatusPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(payload, &locale)?;

    let webhook = app_state
        .registry_service
        .set_webhook_status(user.0.id, id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(webhook)))
}

// DELETE /api/webhooks/{id}
#[utoipa::path(
    delete,
    path = "/api/webhooks/{id}",
    tag = "Cadastro",
    params(("id" = Uuid, Path, description = "ID do webhook")),
    responses(
        (status = 204, description = "Removido"),
        (status = 404, description = "Webhook não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_webhook(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .registry_service
        .delete_webhook(user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
