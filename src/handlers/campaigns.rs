// src/handlers/campaigns.rs

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    handlers::json_body,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::campaign::{CampaignMetricsRequest, DerivedCampaignMetrics},
    services::campaign_metrics::build_campaign_metrics,
};

// POST /api/campaigns/metrics
// O cliente busca entidades e insights na Graph API e manda aqui para o cálculo
#[utoipa::path(
    post,
    path = "/api/campaigns/metrics",
    tag = "Campanhas",
    request_body = CampaignMetricsRequest,
    responses(
        (status = 200, description = "Métricas derivadas, ativas primeiro e por gasto", body = Vec<DerivedCampaignMetrics>),
        (status = 400, description = "Corpo inválido"),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn campaign_metrics(
    locale: Locale,
    _user: AuthenticatedUser,
    payload: Result<Json<CampaignMetricsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload, &locale)?;

    let metrics = build_campaign_metrics(
        request.level,
        &request.entities,
        &request.insights,
        &request.options,
    );

    Ok((StatusCode::OK, Json(metrics)))
}
