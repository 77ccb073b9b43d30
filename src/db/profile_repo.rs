// src/db/profile_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::profile::{Plan, PlanStatus, UserProfile},
};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Busca por e-mail exato (sem normalização além do que o chamador fizer).
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, AppError>;

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError>;

    /// Sobrescreve plano e status (last-write-wins).
    async fn update_plan(
        &self,
        user_id: Uuid,
        plan: Plan,
        plan_status: PlanStatus,
    ) -> Result<UserProfile, AppError>;
}

#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT user_id, email, plan, plan_status, updated_at FROM profiles WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT user_id, email, plan, plan_status, updated_at FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn update_plan(
        &self,
        user_id: Uuid,
        plan: Plan,
        plan_status: PlanStatus,
    ) -> Result<UserProfile, AppError> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE profiles
            SET plan = $2, plan_status = $3, updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, email, plan, plan_status, updated_at
            "#,
        )
        .bind(user_id)
        .bind(plan)
        .bind(plan_status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ProfileNotFound)
    }
}
