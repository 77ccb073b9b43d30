// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

/// Monta o router completo (usado pelo binário e pelos testes).
pub fn create_router(app_state: AppState) -> Router {
    // Rotas do painel (protegidas pelo JWT do usuário)
    let webhook_routes = Router::new()
        .route("/", post(handlers::webhooks::create_webhook)
               .get(handlers::webhooks::list_webhooks)
        )
        .route("/{id}", patch(handlers::webhooks::update_webhook_status)
               .delete(handlers::webhooks::delete_webhook)
        );

    let credential_routes = Router::new()
        .route("/", post(handlers::credentials::create_credential)
               .get(handlers::credentials::list_credentials)
        )
        .route("/{id}", patch(handlers::credentials::update_credential_status)
               .delete(handlers::credentials::delete_credential)
        );

    let sales_routes = Router::new()
        .route("/", get(handlers::sales::list_sales))
        .route("/metrics", get(handlers::sales::sales_metrics))
        .route("/{id}", delete(handlers::sales::delete_sale));

    let dashboard_routes = Router::new()
        .nest("/webhooks", webhook_routes)
        .nest("/credentials", credential_routes)
        .nest("/sales", sales_routes)
        .route("/campaigns/metrics", post(handlers::campaigns::campaign_metrics))
        .route("/profile", get(handlers::profile::get_profile))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        // Recebimento: autenticação por token, não por JWT
        .route("/webhook-receiver", post(handlers::webhook_receiver::receive_sale))
        .route("/payment-webhook", post(handlers::payment_webhook::sync_plan))
        .nest("/api", dashboard_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
