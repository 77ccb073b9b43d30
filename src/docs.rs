// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Recebimento (públicas, autenticadas por token) ---
        handlers::webhook_receiver::receive_sale,
        handlers::payment_webhook::sync_plan,

        // --- Cadastro ---
        handlers::webhooks::create_webhook,
        handlers::webhooks::list_webhooks,
        handlers::webhooks::update_webhook_status,
        handlers::webhooks::delete_webhook,
        handlers::credentials::create_credential,
        handlers::credentials::list_credentials,
        handlers::credentials::update_credential_status,
        handlers::credentials::delete_credential,

        // --- Vendas ---
        handlers::sales::list_sales,
        handlers::sales::sales_metrics,
        handlers::sales::delete_sale,

        // --- Campanhas ---
        handlers::campaigns::campaign_metrics,

        // --- Perfil ---
        handlers::profile::get_profile,
    ),
    components(
        schemas(
            // --- Cadastro ---
            models::registry::RecordStatus,
            models::registry::WebhookConfig,
            models::registry::CreateWebhookPayload,
            models::registry::UpdateStatusPayload,
            models::registry::ApiCredential,
            models::registry::CreateCredentialPayload,
            models::registry::CreatedCredential,

            // --- Vendas ---
            models::sale::Sale,
            models::sale::SalesMetrics,
            handlers::webhook_receiver::WebhookReceiverResponse,

            // --- Perfil / Plano ---
            models::profile::Plan,
            models::profile::PlanStatus,
            models::profile::UserProfile,
            models::profile::PlanSyncResponse,

            // --- Campanhas ---
            models::campaign::MetaEntity,
            models::campaign::MetaAction,
            models::campaign::MetaInsight,
            models::campaign::CampaignLevel,
            models::campaign::CampaignMetricsOptions,
            models::campaign::CampaignMetricsRequest,
            models::campaign::DerivedCampaignMetrics,
        )
    ),
    tags(
        (name = "Webhooks", description = "Recebimento de vendas e eventos de assinatura"),
        (name = "Cadastro", description = "Webhooks e credenciais de API do usuário"),
        (name = "Vendas", description = "Listagem e indicadores de vendas"),
        (name = "Campanhas", description = "Métricas derivadas de campanhas da Meta"),
        (name = "Perfil", description = "Plano e status da assinatura")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
