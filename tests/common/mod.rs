//! Utilitários compartilhados pelos testes de integração.

#![allow(dead_code)] // Cada arquivo de teste usa uma parte diferente

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use gerencia_roi::{
    config::{AppConfig, AppState},
    create_router,
    db::InMemoryStore,
    models::{
        auth::{Claims, JWT_AUDIENCE},
        profile::{Plan, PlanStatus},
        registry::RecordStatus,
    },
    services::plan_sync::OfferPlanTable,
};

pub const JWT_SECRET: &str = "segredo-de-teste";

/// Servidor de teste sobre o store em memória.
pub struct TestHarness {
    pub server: TestServer,
    pub store: Arc<InMemoryStore>,
    /// Usuário dono dos dados nos testes
    pub user_id: Uuid,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_dedup(false)
    }

    pub fn with_dedup(sale_dedup: bool) -> Self {
        let config = AppConfig {
            database_url: "postgres://localhost/unused".into(),
            jwt_secret: JWT_SECRET.into(),
            server_addr: "127.0.0.1:0".into(),
            db_max_connections: 1,
            offer_plans: OfferPlanTable::default(),
            sale_dedup,
        };

        let store = Arc::new(InMemoryStore::new());
        let state = AppState::in_memory(store.clone(), &config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Falha ao criar o servidor de teste");

        Self {
            server,
            store,
            user_id: Uuid::new_v4(),
        }
    }

    /// Cabeçalho Authorization com um JWT válido para `user_id`.
    pub fn auth_header_for(user_id: Uuid) -> String {
        let claims = Claims {
            sub: user_id,
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
            aud: JWT_AUDIENCE.into(),
            email: Some("dono@exemplo.com".into()),
            role: Some("authenticated".into()),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .expect("Falha ao assinar o JWT de teste");
        format!("Bearer {token}")
    }

    pub fn user_auth_header(&self) -> String {
        Self::auth_header_for(self.user_id)
    }

    /// Webhook ativo do usuário principal, com o token dado.
    pub fn active_webhook(&self, platform: &str, token: &str) -> Uuid {
        self.store
            .seed_webhook(self.user_id, platform, Some(token), RecordStatus::Active)
            .id
    }

    pub fn active_credential(&self, token: &str) {
        self.store
            .seed_credential(self.user_id, token, RecordStatus::Active);
    }

    pub fn free_profile(&self, user_id: Uuid, email: &str) {
        self.store
            .seed_profile(user_id, email, Plan::Free, PlanStatus::Active);
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
