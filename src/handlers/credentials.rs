// src/handlers/credentials.rs

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
    models::registry::{
        ApiCredential, CreateCredentialPayload, CreatedCredential, UpdateStatusPayload,
    },
};

// POST /api/credentials
#[utoipa::path(
    post,
    path = "/api/credentials",
    tag = "Cadastro",
    request_body = CreateCredentialPayload,
    responses(
        (status = 201, description = "Credencial criada; o token só aparece aqui", body = CreatedCredential),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_credential(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    payload: Result<Json<CreateCredentialPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(payload, &locale)?;

    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let created = app_state
        .registry_service
        .create_credential(user.0.id, &payload.name)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/credentials
#[utoipa::path(
    get,
    path = "/api/credentials",
    tag = "Cadastro",
    responses(
        (status = 200, description = "Credenciais do usuário (sem o token)", body = Vec<ApiCredential>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_credentials(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = app_state
        .registry_service
        .list_credentials(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(credentials)))
}

// PATCH /api/credentials/{id}
#[utoipa::path(
    patch,
    path = "/api/credentials/{id}",
    tag = "Cadastro",
    params(("id" = Uuid, Path, description = "ID da credencial")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = ApiCredential),
        (status = 404, description = "Credencial não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_credential_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateStatusPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(payload, &locale)?;

    let credential = app_state
        .registry_service
        .set_credential_status(user.0.id, id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(credential)))
}

// DELETE /api/credentials/{id}
#[utoipa::path(
    delete,
    path = "/api/credentials/{id}",
    tag = "Cadastro",
    params(("id" = Uuid, Path, description = "ID da credencial")),
    responses(
        (status = 204, description = "Removida"),
        (status = 404, description = "Credencial não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_credential(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .registry_service
        .delete_credential(user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
