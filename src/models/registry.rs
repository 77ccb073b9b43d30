// src/models/registry.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums (Mapeando o Postgres) ---

/// Status compartilhado por webhooks e credenciais de API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "record_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn is_active(self) -> bool {
        self == RecordStatus::Active
    }
}

// --- Webhooks de venda ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    pub id: Uuid,

    #[schema(ignore)]
    pub user_id: Uuid,

    // Nome livre da plataforma (ex: "lowify", "hotmart", "kiwify")
    #[schema(example = "lowify")]
    pub platform: String,

    #[schema(example = "Minha loja na Lowify")]
    pub name: String,

    // Plataformas que só usam URL não têm token
    #[schema(example = "whk_3f0c9a7e0e9b4a57a1c3f3b1c2d4e5f6")]
    pub token: Option<String>,

    pub client_id: Option<String>,

    #[serde(skip_serializing)]
    pub client_secret: Option<String>,

    pub pixel_id: Option<String>,
    pub webhook_url: Option<String>,

    pub status: RecordStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// `length(min = 1)` aceita "   "
fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("O campo não pode ficar em branco.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebhookPayload {
    #[validate(
        length(min = 1, message = "A plataforma é obrigatória."),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "lowify")]
    pub platform: String,

    #[validate(
        length(min = 1, max = 120, message = "O nome deve ter entre 1 e 120 caracteres."),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Loja principal")]
    pub name: String,

    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub pixel_id: Option<String>,

    #[validate(url(message = "A URL do webhook é inválida."))]
    pub webhook_url: Option<String>,

    // Quando true, nenhum token é gerado (plataforma autentica só pela URL)
    #[serde(default)]
    pub url_only: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatusPayload {
    pub status: RecordStatus,
}

// --- Credenciais de API (Plan Sync) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiCredential {
    pub id: Uuid,

    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Integração Lowify")]
    pub name: String,

    // IMPORTANTE: o token só aparece uma vez, na resposta de criação
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub token: String,

    pub status: RecordStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCredentialPayload {
    #[validate(
        length(min = 1, max = 120, message = "O nome deve ter entre 1 e 120 caracteres."),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Checkout principal")]
    pub name: String,
}

/// Resposta de criação: única vez em que o token em claro é devolvido.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCredential {
    #[serde(flatten)]
    pub credential: ApiCredential,

    #[schema(example = "groi_9b2f...")]
    pub token: String,
}

// Dados já resolvidos para inserção (token gerado pelo serviço)
#[derive(Debug, Clone)]
pub struct NewWebhook {
    pub user_id: Uuid,
    pub platform: String,
    pub name: String,
    pub token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub pixel_id: Option<String>,
    pub webhook_url: Option<String>,
}
