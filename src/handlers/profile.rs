// src/handlers/profile.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::profile::UserProfile,
};

// GET /api/profile
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Perfil",
    responses(
        (status = 200, description = "Plano atual do usuário", body = UserProfile),
        (status = 401, description = "Não autenticado"),
        (status = 404, description = "Perfil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .profile_repo
        .find_by_user_id(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?
        .ok_or_else(|| AppError::ProfileNotFound.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(profile)))
}
