// src/services/registry_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ApiCredentialRepository, WebhookRepository},
    models::registry::{
        ApiCredential, CreateWebhookPayload, CreatedCredential, NewWebhook, RecordStatus,
        WebhookConfig,
    },
};

pub const WEBHOOK_TOKEN_PREFIX: &str = "whk_";
pub const CREDENTIAL_TOKEN_PREFIX: &str = "groi_";

// Token opaco: 128 bits aleatórios do UUID v4 em hexadecimal
pub fn generate_webhook_token() -> String {
    format!("{WEBHOOK_TOKEN_PREFIX}{}", Uuid::new_v4().simple())
}

pub fn generate_credential_token() -> String {
    format!(
        "{CREDENTIAL_TOKEN_PREFIX}{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Cadastro de webhooks e credenciais de API de cada usuário.
#[derive(Clone)]
pub struct RegistryService {
    webhooks: Arc<dyn WebhookRepository>,
    credentials: Arc<dyn ApiCredentialRepository>,
}

impl RegistryService {
    pub fn new(
        webhooks: Arc<dyn WebhookRepository>,
        credentials: Arc<dyn ApiCredentialRepository>,
    ) -> Self {
        Self {
            webhooks,
            credentials,
        }
    }

    // =========================================================================
    //  WEBHOOKS
    // =========================================================================

    pub async fn create_webhook(
        &self,
        user_id: Uuid,
        payload: CreateWebhookPayload,
    ) -> Result<WebhookConfig, AppError> {
        let token = if payload.url_only {
            None
        } else {
            Some(generate_webhook_token())
        };

        let webhook = self
            .webhooks
            .create(NewWebhook {
                user_id,
                platform: payload.platform.trim().to_string(),
                name: payload.name.trim().to_string(),
                token,
                client_id: non_empty(payload.client_id),
                client_secret: non_empty(payload.client_secret),
                pixel_id: non_empty(payload.pixel_id),
                webhook_url: non_empty(payload.webhook_url),
            })
            .await?;

        tracing::info!(webhook_id = %webhook.id, platform = %webhook.platform, "Webhook criado");
        Ok(webhook)
    }

    pub async fn list_webhooks(&self, user_id: Uuid) -> Result<Vec<WebhookConfig>, AppError> {
        self.webhooks.list_by_user(user_id).await
    }

    pub async fn set_webhook_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: RecordStatus,
    ) -> Result<WebhookConfig, AppError> {
        self.webhooks
            .set_status(user_id, id, status)
            .await?
            .ok_or(AppError::NotFound("Webhook"))
    }

    pub async fn delete_webhook(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if self.webhooks.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Webhook"))
        }
    }

    // =========================================================================
    //  CREDENCIAIS DE API
    // =========================================================================

    /// Cria a credencial e devolve o token em claro. Ele não é mostrado de novo.
    pub async fn create_credential(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<CreatedCredential, AppError> {
        let token = generate_credential_token();
        let credential = self.credentials.create(user_id, name.trim(), &token).await?;

        tracing::info!(credential_id = %credential.id, "Credencial de API criada");
        Ok(CreatedCredential { credential, token })
    }

    pub async fn list_credentials(&self, user_id: Uuid) -> Result<Vec<ApiCredential>, AppError> {
        self.credentials.list_by_user(user_id).await
    }

    pub async fn set_credential_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: RecordStatus,
    ) -> Result<ApiCredential, AppError> {
        self.credentials
            .set_status(user_id, id, status)
            .await?
            .ok_or(AppError::NotFound("Credencial"))
    }

    pub async fn delete_credential(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if self.credentials.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Credencial"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_prefixed_and_unique() {
        let a = generate_webhook_token();
        let b = generate_webhook_token();

        assert!(a.starts_with(WEBHOOK_TOKEN_PREFIX));
        assert_eq!(a.len(), WEBHOOK_TOKEN_PREFIX.len() + 32);
        assert_ne!(a, b);

        let c = generate_credential_token();
        assert!(c.starts_with(CREDENTIAL_TOKEN_PREFIX));
        assert_eq!(c.len(), CREDENTIAL_TOKEN_PREFIX.len() + 64);
    }
}
