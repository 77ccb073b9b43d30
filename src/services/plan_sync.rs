// src/services/plan_sync.rs

use std::{collections::HashMap, sync::Arc};

use serde_json::Value;

use crate::{
    common::error::AppError,
    db::{ApiCredentialRepository, ProfileRepository},
    models::profile::{Plan, PlanStatus, PlanSyncResponse},
};

/// Tabela offer id → plano. Ofertas desconhecidas caem no `free`.
#[derive(Debug, Clone)]
pub struct OfferPlanTable {
    offers: HashMap<String, Plan>,
}

impl Default for OfferPlanTable {
    fn default() -> Self {
        Self::new([("offer-1771698186014", Plan::Profissional)])
    }
}

impl OfferPlanTable {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, Plan)>) -> Self {
        Self {
            offers: entries
                .into_iter()
                .map(|(offer, plan)| (offer.to_string(), plan))
                .collect(),
        }
    }

    /// Lê pares `oferta=plano` separados por vírgula (ex: `OFFER_PLAN_MAP`).
    pub fn parse_pairs(raw: &str) -> Result<Vec<(String, Plan)>, String> {
        raw.split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (offer, plan) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("par inválido (esperado oferta=plano): {pair}"))?;
                Ok((offer.trim().to_string(), plan.parse::<Plan>()?))
            })
            .collect()
    }

    pub fn extend(&mut self, entries: Vec<(String, Plan)>) {
        self.offers.extend(entries);
    }

    pub fn plan_for(&self, offer_id: Option<&str>) -> Plan {
        offer_id
            .and_then(|id| self.offers.get(id))
            .copied()
            .unwrap_or(Plan::Free)
    }
}

/// Resultado da classificação de um evento de pagamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanEvent {
    /// Reembolso, chargeback, cancelamento ou expiração: volta para o `free`.
    Cancelled,
    /// Pagamento atrasado: mantém o plano.
    Overdue,
    Active,
}

/// Vocabulário mais estreito que o das vendas.
#[derive(Debug, Clone)]
pub struct PlanEventClassifier {
    cancel_keywords: Vec<String>,
    overdue_keywords: Vec<String>,
}

impl Default for PlanEventClassifier {
    fn default() -> Self {
        Self::new(
            &["refunded", "chargeback", "cancelled", "canceled", "expired"],
            &["overdue", "past_due", "unpaid"],
        )
    }
}

impl PlanEventClassifier {
    pub fn new(cancel_keywords: &[&str], overdue_keywords: &[&str]) -> Self {
        Self {
            cancel_keywords: lowercase_all(cancel_keywords),
            overdue_keywords: lowercase_all(overdue_keywords),
        }
    }

    pub fn classify(&self, event: &str) -> PlanEvent {
        let lowered = event.to_lowercase();
        let contains_any = |words: &[String]| words.iter().any(|w| lowered.contains(w.as_str()));

        if contains_any(self.cancel_keywords.as_slice()) {
            PlanEvent::Cancelled
        } else if contains_any(self.overdue_keywords.as_slice()) {
            PlanEvent::Overdue
        } else {
            PlanEvent::Active
        }
    }

    /// Plano e status finais para a oferta comprada.
    pub fn resolve(&self, event: &str, offer_plan: Plan) -> (Plan, PlanStatus) {
        match self.classify(event) {
            PlanEvent::Cancelled => (Plan::Free, PlanStatus::Cancelled),
            PlanEvent::Overdue => (offer_plan, PlanStatus::Overdue),
            PlanEvent::Active => (offer_plan, PlanStatus::Active),
        }
    }
}

fn lowercase_all(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

// --- Leitura tolerante do payload ---

fn text_at(payload: &Value, path: &[&str]) -> Option<String> {
    let node = path.iter().try_fold(payload, |node, key| node.get(*key))?;
    match node {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn buyer_email(payload: &Value) -> Option<String> {
    text_at(payload, &["buyer", "email"])
        .or_else(|| text_at(payload, &["customer", "email"]))
        .or_else(|| text_at(payload, &["email"]))
}

pub fn offer_id(payload: &Value) -> Option<String> {
    text_at(payload, &["offer", "id"]).or_else(|| text_at(payload, &["offer_id"]))
}

pub fn event_name(payload: &Value) -> String {
    text_at(payload, &["event"])
        .or_else(|| text_at(payload, &["status"]))
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct PlanSyncService {
    credentials: Arc<dyn ApiCredentialRepository>,
    profiles: Arc<dyn ProfileRepository>,
    offers: OfferPlanTable,
    classifier: PlanEventClassifier,
}

impl PlanSyncService {
    pub fn new(
        credentials: Arc<dyn ApiCredentialRepository>,
        profiles: Arc<dyn ProfileRepository>,
        offers: OfferPlanTable,
        classifier: PlanEventClassifier,
    ) -> Self {
        Self {
            credentials,
            profiles,
            offers,
            classifier,
        }
    }

    /// Valida a credencial de API. Inativa conta como inválida.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<(), AppError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::InvalidApiCredential)?;

        match self.credentials.find_by_token(token).await? {
            Some(credential) if credential.status.is_active() => Ok(()),
            Some(credential) => {
                tracing::warn!(credential_id = %credential.id, "Credencial de API inativa usada no payment-webhook");
                Err(AppError::InvalidApiCredential)
            }
            None => Err(AppError::InvalidApiCredential),
        }
    }

    /// Aplica o evento ao perfil do comprador. Última escrita vence.
    pub async fn apply(&self, payload: &Value) -> Result<PlanSyncResponse, AppError> {
        let email = buyer_email(payload).ok_or(AppError::MissingBuyerEmail)?;
        let offer = offer_id(payload);
        let event = event_name(payload);

        let offer_plan = self.offers.plan_for(offer.as_deref());
        let (plan, status) = self.classifier.resolve(&event, offer_plan);

        let profile = self
            .profiles
            .find_by_email(&email)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        if profile.plan_status == PlanStatus::Cancelled && status == PlanStatus::Active {
            // Entrega fora de ordem pode reativar um plano cancelado
            tracing::warn!(
                email = %email,
                event = %event,
                "Plano cancelado reativado por evento de pagamento"
            );
        }

        let updated = self
            .profiles
            .update_plan(profile.user_id, plan, status)
            .await?;

        tracing::info!(
            email = %email,
            offer_id = ?offer,
            event = %event,
            plan = %updated.plan,
            status = %updated.plan_status,
            "Plano sincronizado"
        );

        Ok(PlanSyncResponse {
            success: true,
            email,
            plan: updated.plan,
            status: updated.plan_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::InMemoryStore, models::registry::RecordStatus};
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn known_offer_maps_to_its_plan_and_unknown_defaults_to_free() {
        let table = OfferPlanTable::default();

        assert_eq!(table.plan_for(Some("offer-1771698186014")), Plan::Profissional);
        assert_eq!(table.plan_for(Some("offer-desconhecida")), Plan::Free);
        assert_eq!(table.plan_for(None), Plan::Free);
    }

    #[test]
    fn offer_pairs_are_parsed_and_merged() {
        let mut table = OfferPlanTable::default();
        let pairs = OfferPlanTable::parse_pairs(" offer-a=starter , offer-b = Enterprise,").unwrap();
        table.extend(pairs);

        assert_eq!(table.plan_for(Some("offer-a")), Plan::Starter);
        assert_eq!(table.plan_for(Some("offer-b")), Plan::Enterprise);
        assert!(OfferPlanTable::parse_pairs("offer-c").is_err());
        assert!(OfferPlanTable::parse_pairs("offer-c=gold").is_err());
    }

    #[test]
    fn event_classification() {
        let classifier = PlanEventClassifier::default();

        assert_eq!(classifier.classify("chargeback_issued"), PlanEvent::Cancelled);
        assert_eq!(classifier.classify("subscription.canceled"), PlanEvent::Cancelled);
        assert_eq!(classifier.classify("PAST_DUE"), PlanEvent::Overdue);
        assert_eq!(classifier.classify("invoice_unpaid"), PlanEvent::Overdue);
        assert_eq!(classifier.classify("approved"), PlanEvent::Active);
        assert_eq!(classifier.classify(""), PlanEvent::Active);
    }

    #[test]
    fn cancellation_forces_free_regardless_of_offer() {
        let classifier = PlanEventClassifier::default();

        assert_eq!(
            classifier.resolve("chargeback_issued", Plan::Profissional),
            (Plan::Free, PlanStatus::Cancelled)
        );
        assert_eq!(
            classifier.resolve("overdue", Plan::Starter),
            (Plan::Starter, PlanStatus::Overdue)
        );
    }

    #[test]
    fn payload_field_fallbacks() {
        let payload = json!({"customer": {"email": "c@x.com"}, "offer_id": 77, "status": "paid"});

        assert_eq!(buyer_email(&payload).as_deref(), Some("c@x.com"));
        assert_eq!(offer_id(&payload).as_deref(), Some("77"));
        assert_eq!(event_name(&payload), "paid");
        assert_eq!(buyer_email(&json!({"email": "  "})), None);
    }

    #[tokio::test]
    async fn inactive_credential_is_rejected() {
        let store = Arc::new(InMemoryStore::new());
        store.seed_credential(Uuid::new_v4(), "tok-off", RecordStatus::Inactive);
        store.seed_credential(Uuid::new_v4(), "tok-on", RecordStatus::Active);
        let service = PlanSyncService::new(
            store.clone(),
            store.clone(),
            OfferPlanTable::default(),
            PlanEventClassifier::default(),
        );

        assert!(matches!(
            service.authenticate(Some("tok-off")).await,
            Err(AppError::InvalidApiCredential)
        ));
        assert!(matches!(service.authenticate(None).await, Err(AppError::InvalidApiCredential)));
        assert!(service.authenticate(Some("tok-on")).await.is_ok());
    }
}
