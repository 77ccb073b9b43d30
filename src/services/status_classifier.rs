// src/services/status_classifier.rs

use crate::models::sale::SaleStatus;

/// Uma regra: se o texto contém qualquer palavra-chave, vira `status`.
#[derive(Debug, Clone)]
pub struct StatusRule {
    pub keywords: Vec<String>,
    pub status: SaleStatus,
}

impl StatusRule {
    pub fn new(keywords: &[&str], status: SaleStatus) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            status,
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Mapeia o status livre do fornecedor para o status canônico da venda.
///
/// As regras são avaliadas em ordem e a primeira que casa vence. Estados
/// intermediários e negativos vêm antes do `purchase`/`sale` genérico: um
/// `waiting_payment` nunca pode virar `approved`.
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    rules: Vec<StatusRule>,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new(vec![
            StatusRule::new(
                &["pending", "waiting", "awaiting", "waiting_payment", "pix_pending"],
                SaleStatus::Pending,
            ),
            StatusRule::new(
                &["refunded", "refund", "chargeback", "chargedback", "dispute"],
                SaleStatus::Refunded,
            ),
            StatusRule::new(
                &["cancelled", "canceled", "expired", "abandoned"],
                SaleStatus::Cancelled,
            ),
            StatusRule::new(&["approved", "paid", "confirmed", "completed"], SaleStatus::Approved),
            StatusRule::new(&["purchase", "sale"], SaleStatus::Approved),
        ])
    }
}

impl StatusClassifier {
    pub fn new(rules: Vec<StatusRule>) -> Self {
        Self { rules }
    }

    pub fn classify(&self, raw_status: &str) -> SaleStatus {
        let lowered = raw_status.to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.status.clone())
            .unwrap_or(SaleStatus::Other(lowered))
    }
}
