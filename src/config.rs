// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        ApiCredentialRepository, InMemoryStore, PgApiCredentialRepository, PgProfileRepository,
        PgSaleRepository, PgWebhookRepository, ProfileRepository, SaleRepository,
        WebhookRepository,
    },
    services::{
        auth::AuthService,
        normalizer::PayloadNormalizer,
        plan_sync::{OfferPlanTable, PlanEventClassifier, PlanSyncService},
        registry_service::RegistryService,
        sales_service::SalesService,
        webhook_receiver::WebhookReceiverService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub offer_plans: OfferPlanTable,
    // Ignora reentregas com o mesmo (webhook, transaction_id)
    pub sale_dedup: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {raw}"))?,
            Err(_) => 5,
        };

        let mut offer_plans = OfferPlanTable::default();
        if let Ok(raw) = env::var("OFFER_PLAN_MAP") {
            let pairs = OfferPlanTable::parse_pairs(&raw)
                .map_err(|e| anyhow::anyhow!("OFFER_PLAN_MAP inválido: {e}"))?;
            offer_plans.extend(pairs);
        }

        let sale_dedup = match env::var("SALE_DEDUP") {
            Ok(raw) => parse_bool(&raw).with_context(|| format!("SALE_DEDUP inválido: {raw}"))?,
            Err(_) => false,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr,
            db_max_connections,
            offer_plans,
            sale_dedup,
        })
    }

    pub async fn connect_database(&self) -> anyhow::Result<PgPool> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let pool = PgPoolOptions::new()
            .max_connections(self.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&self.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(pool)
    }
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow::anyhow!("esperado true/false, recebido '{other}'")),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub receiver_service: WebhookReceiverService,
    pub plan_sync_service: PlanSyncService,
    pub registry_service: RegistryService,
    pub sales_service: SalesService,
    pub profile_repo: Arc<dyn ProfileRepository>,
}

impl AppState {
    /// Estado de produção, com os repositórios no Postgres.
    pub fn from_pool(pool: PgPool, config: &AppConfig) -> Self {
        Self::assemble(
            Arc::new(PgWebhookRepository::new(pool.clone())),
            Arc::new(PgApiCredentialRepository::new(pool.clone())),
            Arc::new(PgSaleRepository::new(pool.clone())),
            Arc::new(PgProfileRepository::new(pool)),
            config,
        )
    }

    /// Estado sobre o store em memória (testes).
    pub fn in_memory(store: Arc<InMemoryStore>, config: &AppConfig) -> Self {
        Self::assemble(store.clone(), store.clone(), store.clone(), store, config)
    }

    // --- Monta o gráfico de dependências ---
    fn assemble(
        webhooks: Arc<dyn WebhookRepository>,
        credentials: Arc<dyn ApiCredentialRepository>,
        sales: Arc<dyn SaleRepository>,
        profiles: Arc<dyn ProfileRepository>,
        config: &AppConfig,
    ) -> Self {
        Self {
            auth_service: AuthService::new(&config.jwt_secret),
            receiver_service: WebhookReceiverService::new(
                webhooks.clone(),
                sales.clone(),
                PayloadNormalizer::default(),
                config.sale_dedup,
            ),
            plan_sync_service: PlanSyncService::new(
                credentials.clone(),
                profiles.clone(),
                config.offer_plans.clone(),
                PlanEventClassifier::default(),
            ),
            registry_service: RegistryService::new(webhooks, credentials),
            sales_service: SalesService::new(sales),
            profile_repo: profiles,
        }
    }
}
