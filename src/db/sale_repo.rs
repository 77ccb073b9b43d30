// src/db/sale_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sale::{NewSale, Sale},
};

#[async_trait]
pub trait SaleRepository: Send + Sync {
    async fn insert(&self, sale: NewSale) -> Result<Sale, AppError>;

    /// Venda já registrada para o mesmo webhook e transação (deduplicação opcional).
    async fn find_by_transaction(
        &self,
        webhook_id: Uuid,
        transaction_id: &str,
    ) -> Result<Option<Sale>, AppError>;

    /// Vendas do usuário, da mais recente para a mais antiga.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Sale>, AppError>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgSaleRepository {
    pool: PgPool,
}

impl PgSaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SaleRepository for PgSaleRepository {
    async fn insert(&self, sale: NewSale) -> Result<Sale, AppError> {
        let created = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (
                user_id, webhook_id, platform, transaction_id, status,
                customer_name, customer_email, customer_phone,
                product_id, product_name,
                amount, currency, payment_method, commission, raw_data
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(sale.user_id)
        .bind(sale.webhook_id)
        .bind(&sale.platform)
        .bind(&sale.transaction_id)
        .bind(sale.status.as_str())
        .bind(&sale.customer_name)
        .bind(&sale.customer_email)
        .bind(&sale.customer_phone)
        .bind(&sale.product_id)
        .bind(&sale.product_name)
        .bind(sale.amount)
        .bind(&sale.currency)
        .bind(&sale.payment_method)
        .bind(sale.commission)
        .bind(&sale.raw_data)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_transaction(
        &self,
        webhook_id: Uuid,
        transaction_id: &str,
    ) -> Result<Option<Sale>, AppError> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE webhook_id = $1 AND transaction_id = $2
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(webhook_id)
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
