// src/handlers/sales.rs

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::query_params,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::sale::{Sale, SalesFilter, SalesMetrics},
};

// GET /api/sales
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Vendas",
    params(SalesFilter),
    responses(
        (status = 200, description = "Vendas do usuário, mais recentes primeiro", body = Vec<Sale>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    query: Result<Query<SalesFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query_params(query, &locale)?;

    let sales = app_state
        .sales_service
        .list(user.0.id, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(sales)))
}

// GET /api/sales/metrics
#[utoipa::path(
    get,
    path = "/api/sales/metrics",
    tag = "Vendas",
    params(SalesFilter),
    responses(
        (status = 200, description = "Faturamento, aprovação, ARPU e ticket médio", body = SalesMetrics),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn sales_metrics(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    query: Result<Query<SalesFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query_params(query, &locale)?;

    let metrics = app_state
        .sales_service
        .metrics(user.0.id, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(metrics)))
}

// DELETE /api/sales/{id}
#[utoipa::path(
    delete,
    path = "/api/sales/{id}",
    tag = "Vendas",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 204, description = "Removida"),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .sales_service
        .delete(user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
