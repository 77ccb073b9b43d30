// src/db/memory.rs
//
// Implementação em memória de todos os repositórios. Usada pelos testes de
// integração; segue as mesmas regras de escopo por usuário do Postgres.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard,
};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ApiCredentialRepository, ProfileRepository, SaleRepository, WebhookRepository},
    models::{
        profile::{Plan, PlanStatus, UserProfile},
        registry::{ApiCredential, NewWebhook, RecordStatus, WebhookConfig},
        sale::{NewSale, Sale},
    },
};

#[derive(Default)]
pub struct InMemoryStore {
    webhooks: Mutex<Vec<WebhookConfig>>,
    credentials: Mutex<Vec<ApiCredential>>,
    sales: Mutex<Vec<Sale>>,
    profiles: Mutex<Vec<UserProfile>>,
    fail_sale_inserts: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex
        .lock()
        .map_err(|_| AppError::InternalServerError(anyhow!("mutex do store envenenado")))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faz os próximos inserts de venda falharem (simula queda do banco).
    pub fn fail_sale_inserts(&self, fail: bool) {
        self.fail_sale_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn seed_webhook(
        &self,
        user_id: Uuid,
        platform: &str,
        token: Option<&str>,
        status: RecordStatus,
    ) -> WebhookConfig {
        let now = Utc::now();
        let webhook = WebhookConfig {
            id: Uuid::new_v4(),
            user_id,
            platform: platform.to_string(),
            name: format!("{platform} webhook"),
            token: token.map(str::to_string),
            client_id: None,
            client_secret: None,
            pixel_id: None,
            webhook_url: None,
            status,
            created_at: now,
            updated_at: now,
        };
        if let Ok(mut webhooks) = self.webhooks.lock() {
            webhooks.push(webhook.clone());
        }
        webhook
    }

    pub fn seed_credential(&self, user_id: Uuid, token: &str, status: RecordStatus) -> ApiCredential {
        let now = Utc::now();
        let credential = ApiCredential {
            id: Uuid::new_v4(),
            user_id,
            name: "credencial de teste".to_string(),
            token: token.to_string(),
            status,
            created_at: now,
            updated_at: now,
        };
        if let Ok(mut credentials) = self.credentials.lock() {
            credentials.push(credential.clone());
        }
        credential
    }

    pub fn seed_profile(&self, user_id: Uuid, email: &str, plan: Plan, plan_status: PlanStatus) {
        let profile = UserProfile {
            user_id,
            email: email.to_string(),
            plan,
            plan_status,
            updated_at: Utc::now(),
        };
        if let Ok(mut profiles) = self.profiles.lock() {
            profiles.push(profile);
        }
    }

    pub fn sales(&self) -> Vec<Sale> {
        self.sales.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn sale_count(&self) -> usize {
        self.sales.lock().map(|s| s.len()).unwrap_or_default()
    }

    pub fn profile(&self, user_id: Uuid) -> Option<UserProfile> {
        self.profiles
            .lock()
            .ok()
            .and_then(|p| p.iter().find(|p| p.user_id == user_id).cloned())
    }
}

#[async_trait]
impl WebhookRepository for InMemoryStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<WebhookConfig>, AppError> {
        let webhooks = lock(&self.webhooks)?;
        Ok(webhooks
            .iter()
            .find(|w| w.token.as_deref() == Some(token))
            .cloned())
    }

    async fn create(&self, input: NewWebhook) -> Result<WebhookConfig, AppError> {
        let mut webhooks = lock(&self.webhooks)?;
        if let Some(token) = &input.token {
            if webhooks.iter().any(|w| w.token.as_ref() == Some(token)) {
                return Err(AppError::UniqueConstraintViolation(
                    "Já existe um webhook com este token.".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let webhook = WebhookConfig {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            platform: input.platform,
            name: input.name,
            token: input.token,
            client_id: input.client_id,
            client_secret: input.client_secret,
            pixel_id: input.pixel_id,
            webhook_url: input.webhook_url,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        };
        webhooks.push(webhook.clone());
        Ok(webhook)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<WebhookConfig>, AppError> {
        let webhooks = lock(&self.webhooks)?;
        let mut owned: Vec<_> = webhooks.iter().filter(|w| w.user_id == user_id).cloned().collect();
        owned.reverse();
        Ok(owned)
    }

    async fn set_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: RecordStatus,
    ) -> Result<Option<WebhookConfig>, AppError> {
        let mut webhooks = lock(&self.webhooks)?;
        Ok(webhooks
            .iter_mut()
            .find(|w| w.id == id && w.user_id == user_id)
            .map(|w| {
                w.status = status;
                w.updated_at = Utc::now();
                w.clone()
            }))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut webhooks = lock(&self.webhooks)?;
        let before = webhooks.len();
        webhooks.retain(|w| !(w.id == id && w.user_id == user_id));
        Ok(webhooks.len() < before)
    }
}

#[async_trait]
impl ApiCredentialRepository for InMemoryStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<ApiCredential>, AppError> {
        let credentials = lock(&self.credentials)?;
        Ok(credentials.iter().find(|c| c.token == token).cloned())
    }

    async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        token: &str,
    ) -> Result<ApiCredential, AppError> {
        let mut credentials = lock(&self.credentials)?;
        if credentials.iter().any(|c| c.token == token) {
            return Err(AppError::UniqueConstraintViolation(
                "Já existe uma credencial com este token.".to_string(),
            ));
        }

        let now = Utc::now();
        let credential = ApiCredential {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            token: token.to_string(),
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        };
        credentials.push(credential.clone());
        Ok(credential)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ApiCredential>, AppError> {
        let credentials = lock(&self.credentials)?;
        let mut owned: Vec<_> = credentials.iter().filter(|c| c.user_id == user_id).cloned().collect();
        owned.reverse();
        Ok(owned)
    }

    async fn set_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: RecordStatus,
    ) -> Result<Option<ApiCredential>, AppError> {
        let mut credentials = lock(&self.credentials)?;
        Ok(credentials
            .iter_mut()
            .find(|c| c.id == id && c.user_id == user_id)
            .map(|c| {
                c.status = status;
                c.updated_at = Utc::now();
                c.clone()
            }))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut credentials = lock(&self.credentials)?;
        let before = credentials.len();
        credentials.retain(|c| !(c.id == id && c.user_id == user_id));
        Ok(credentials.len() < before)
    }
}

#[async_trait]
impl SaleRepository for InMemoryStore {
    async fn insert(&self, sale: NewSale) -> Result<Sale, AppError> {
        if self.fail_sale_inserts.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }

        let now = Utc::now();
        let created = Sale {
            id: Uuid::new_v4(),
            user_id: sale.user_id,
            webhook_id: sale.webhook_id,
            platform: sale.platform,
            transaction_id: sale.transaction_id,
            status: sale.status,
            customer_name: sale.customer_name,
            customer_email: sale.customer_email,
            customer_phone: sale.customer_phone,
            product_id: sale.product_id,
            product_name: sale.product_name,
            amount: sale.amount,
            currency: sale.currency,
            payment_method: sale.payment_method,
            commission: sale.commission,
            raw_data: sale.raw_data,
            created_at: now,
            updated_at: now,
        };
        lock(&self.sales)?.push(created.clone());
        Ok(created)
    }

    async fn find_by_transaction(
        &self,
        webhook_id: Uuid,
        transaction_id: &str,
    ) -> Result<Option<Sale>, AppError> {
        let sales = lock(&self.sales)?;
        Ok(sales
            .iter()
            .find(|s| {
                s.webhook_id == Some(webhook_id) && s.transaction_id.as_deref() == Some(transaction_id)
            })
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let sales = lock(&self.sales)?;
        let mut owned: Vec<_> = sales.iter().filter(|s| s.user_id == user_id).cloned().collect();
        owned.reverse();
        Ok(owned)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut sales = lock(&self.sales)?;
        let before = sales.len();
        sales.retain(|s| !(s.id == id && s.user_id == user_id));
        Ok(sales.len() < before)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, AppError> {
        let profiles = lock(&self.profiles)?;
        Ok(profiles.iter().find(|p| p.email == email).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let profiles = lock(&self.profiles)?;
        Ok(profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn update_plan(
        &self,
        user_id: Uuid,
        plan: Plan,
        plan_status: PlanStatus,
    ) -> Result<UserProfile, AppError> {
        let mut profiles = lock(&self.profiles)?;
        let profile = profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or(AppError::ProfileNotFound)?;

        profile.plan = plan;
        profile.plan_status = plan_status;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }
}
