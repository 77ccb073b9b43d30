// src/db/webhook_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::registry::{NewWebhook, RecordStatus, WebhookConfig},
};

/// Acesso à tabela `webhooks`.
#[async_trait]
pub trait WebhookRepository: Send + Sync {
    /// Busca pelo token, sem filtrar status. Quem chama decide se aceita.
    async fn find_by_token(&self, token: &str) -> Result<Option<WebhookConfig>, AppError>;

    async fn create(&self, input: NewWebhook) -> Result<WebhookConfig, AppError>;

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<WebhookConfig>, AppError>;

    async fn set_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: RecordStatus,
    ) -> Result<Option<WebhookConfig>, AppError>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgWebhookRepository {
    pool: PgPool,
}

impl PgWebhookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookRepository for PgWebhookRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<WebhookConfig>, AppError> {
        let webhook = sqlx::query_as::<_, WebhookConfig>("SELECT * FROM webhooks WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(webhook)
    }

    async fn create(&self, input: NewWebhook) -> Result<WebhookConfig, AppError> {
        sqlx::query_as::<_, WebhookConfig>(
            r#"
            INSERT INTO webhooks (
                user_id, platform, name, token, client_id, client_secret, pixel_id, webhook_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(input.user_id)
        .bind(&input.platform)
        .bind(&input.name)
        .bind(&input.token)
        .bind(&input.client_id)
        .bind(&input.client_secret)
        .bind(&input.pixel_id)
        .bind(&input.webhook_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // O token é UNIQUE entre todos os usuários
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe um webhook com este token.".to_string(),
                    );
                }
            }
            e.into()
        })
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<WebhookConfig>, AppError> {
        let webhooks = sqlx::query_as::<_, WebhookConfig>(
            "SELECT * FROM webhooks WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(webhooks)
    }

    async fn set_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: RecordStatus,
    ) -> Result<Option<WebhookConfig>, AppError> {
        let webhook = sqlx::query_as::<_, WebhookConfig>(
            r#"
            UPDATE webhooks
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(webhook)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM webhooks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
