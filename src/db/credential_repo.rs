// src/db/credential_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::registry::{ApiCredential, RecordStatus},
};

#[async_trait]
pub trait ApiCredentialRepository: Send + Sync {
    async fn find_by_token(&self, token: &str) -> Result<Option<ApiCredential>, AppError>;

    async fn create(&self, user_id: Uuid, name: &str, token: &str)
    -> Result<ApiCredential, AppError>;

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ApiCredential>, AppError>;

    async fn set_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: RecordStatus,
    ) -> Result<Option<ApiCredential>, AppError>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgApiCredentialRepository {
    pool: PgPool,
}

impl PgApiCredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiCredentialRepository for PgApiCredentialRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<ApiCredential>, AppError> {
        let credential =
            sqlx::query_as::<_, ApiCredential>("SELECT * FROM api_credentials WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        Ok(credential)
    }

    async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        token: &str,
    ) -> Result<ApiCredential, AppError> {
        sqlx::query_as::<_, ApiCredential>(
            "INSERT INTO api_credentials (user_id, name, token) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(name)
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe uma credencial com este token.".to_string(),
                    );
                }
            }
            e.into()
        })
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ApiCredential>, AppError> {
        let credentials = sqlx::query_as::<_, ApiCredential>(
            "SELECT * FROM api_credentials WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(credentials)
    }

    async fn set_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: RecordStatus,
    ) -> Result<Option<ApiCredential>, AppError> {
        let credential = sqlx::query_as::<_, ApiCredential>(
            r#"
            UPDATE api_credentials
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

        Ok(credential)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM api_credentials WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
