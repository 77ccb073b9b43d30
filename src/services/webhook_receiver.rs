// src/services/webhook_receiver.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::{
    common::error::AppError,
    db::{SaleRepository, WebhookRepository},
    models::{registry::WebhookConfig, sale::Sale},
    services::normalizer::PayloadNormalizer,
};

/// Resultado de uma entrega aceita.
#[derive(Debug, Clone)]
pub struct ReceivedSale {
    pub sale: Sale,
    /// true quando a entrega repetiu uma transação já registrada
    pub duplicate: bool,
}

#[derive(Clone)]
pub struct WebhookReceiverService {
    webhooks: Arc<dyn WebhookRepository>,
    sales: Arc<dyn SaleRepository>,
    normalizer: PayloadNormalizer,
    dedup_by_transaction: bool,
}

impl WebhookReceiverService {
    pub fn new(
        webhooks: Arc<dyn WebhookRepository>,
        sales: Arc<dyn SaleRepository>,
        normalizer: PayloadNormalizer,
        dedup_by_transaction: bool,
    ) -> Self {
        Self {
            webhooks,
            sales,
            normalizer,
            dedup_by_transaction,
        }
    }

    /// Resolve o webhook pelo token. Não existe fallback por nome de
    /// plataforma: sem token ativo, nada é gravado.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<WebhookConfig, AppError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::InvalidWebhookToken)?;

        let webhook = self
            .webhooks
            .find_by_token(token)
            .await?
            .ok_or(AppError::InvalidWebhookToken)?;

        if !webhook.status.is_active() {
            tracing::warn!(webhook_id = %webhook.id, "Entrega recebida para webhook inativo");
            return Err(AppError::InvalidWebhookToken);
        }

        Ok(webhook)
    }

    /// Normaliza o payload e grava a venda do dono do webhook.
    pub async fn ingest(
        &self,
        webhook: &WebhookConfig,
        platform_override: Option<&str>,
        payload: Value,
    ) -> Result<ReceivedSale, AppError> {
        // O parâmetro explícito vence a plataforma cadastrada
        let platform = platform_override
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(webhook.platform.as_str());

        let candidate = self
            .normalizer
            .normalize(platform, &payload, webhook.user_id, Some(webhook.id));

        if !candidate.status.is_canonical() {
            tracing::warn!(
                webhook_id = %webhook.id,
                platform = %platform,
                status = %candidate.status,
                "Status não reconhecido, gravado como veio"
            );
        }
        if candidate.amount == Decimal::ZERO {
            tracing::warn!(
                webhook_id = %webhook.id,
                platform = %platform,
                "Nenhum valor reconhecido no payload, venda gravada com valor zero"
            );
        }

        if self.dedup_by_transaction {
            if let Some(transaction_id) = candidate.transaction_id.as_deref() {
                if let Some(existing) = self.sales.find_by_transaction(webhook.id, transaction_id).await? {
                    tracing::warn!(
                        webhook_id = %webhook.id,
                        transaction_id = %transaction_id,
                        sale_id = %existing.id,
                        "Entrega duplicada ignorada"
                    );
                    return Ok(ReceivedSale {
                        sale: existing,
                        duplicate: true,
                    });
                }
            }
        }

        let sale = self.sales.insert(candidate).await?;

        tracing::info!(
            webhook_id = %webhook.id,
            sale_id = %sale.id,
            platform = %sale.platform,
            status = %sale.status,
            amount = %sale.amount,
            "Venda registrada"
        );

        Ok(ReceivedSale {
            sale,
            duplicate: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::InMemoryStore, models::registry::RecordStatus, models::sale::SaleStatus};
    use serde_json::json;
    use uuid::Uuid;

    fn service(store: &Arc<InMemoryStore>, dedup: bool) -> WebhookReceiverService {
        WebhookReceiverService::new(store.clone(), store.clone(), PayloadNormalizer::default(), dedup)
    }

    #[tokio::test]
    async fn blank_and_unknown_tokens_are_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let receiver = service(&store, false);

        assert!(matches!(receiver.authenticate(None).await, Err(AppError::InvalidWebhookToken)));
        assert!(matches!(receiver.authenticate(Some("  ")).await, Err(AppError::InvalidWebhookToken)));
        assert!(matches!(receiver.authenticate(Some("nope")).await, Err(AppError::InvalidWebhookToken)));
    }

    #[tokio::test]
    async fn explicit_platform_overrides_the_registered_one() {
        let store = Arc::new(InMemoryStore::new());
        let webhook = store.seed_webhook(Uuid::new_v4(), "hotmart", Some("t1"), RecordStatus::Active);
        let receiver = service(&store, false);

        let received = receiver
            .ingest(&webhook, Some("lowify"), json!({"status": "paid", "sale_amount": 80}))
            .await
            .unwrap();

        assert_eq!(received.sale.platform, "lowify");
        assert_eq!(received.sale.amount, Decimal::from(80));
        assert_eq!(received.sale.status, SaleStatus::Approved);
    }

    #[tokio::test]
    async fn dedup_returns_the_existing_sale() {
        let store = Arc::new(InMemoryStore::new());
        let webhook = store.seed_webhook(Uuid::new_v4(), "kiwify", Some("t1"), RecordStatus::Active);
        let receiver = service(&store, true);
        let payload = json!({"status": "paid", "transaction_id": "tx-1", "value": 10});

        let first = receiver.ingest(&webhook, None, payload.clone()).await.unwrap();
        let second = receiver.ingest(&webhook, None, payload).await.unwrap();

        assert!(!first.duplicate);
        assert!(second.duplicate);
        assert_eq!(first.sale.id, second.sale.id);
        assert_eq!(store.sale_count(), 1);
    }

    #[tokio::test]
    async fn without_dedup_each_delivery_is_a_new_row() {
        let store = Arc::new(InMemoryStore::new());
        let webhook = store.seed_webhook(Uuid::new_v4(), "kiwify", Some("t1"), RecordStatus::Active);
        let receiver = service(&store, false);
        let payload = json!({"status": "paid", "transaction_id": "tx-1", "value": 10});

        receiver.ingest(&webhook, None, payload.clone()).await.unwrap();
        receiver.ingest(&webhook, None, payload).await.unwrap();

        assert_eq!(store.sale_count(), 2);
    }
}
