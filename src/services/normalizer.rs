// src/services/normalizer.rs

use std::{collections::HashMap, sync::Arc};

use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::decimal::decimal_from_value,
    models::sale::NewSale,
    services::status_classifier::StatusClassifier,
};

pub const DEFAULT_CURRENCY: &str = "BRL";

/// Campos extraídos de um payload de fornecedor. Tudo é opcional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialSale {
    pub transaction_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
    pub commission: Option<Decimal>,
}

/// Extração de campos específica de uma plataforma.
pub trait SaleExtractor: Send + Sync {
    fn extract(&self, payload: &Value) -> PartialSale;
}

// --- Acesso tolerante ao JSON ---

/// Segue um caminho de chaves (`["customer", "email"]`).
fn at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(payload, |node, key| node.get(*key))
}

/// Texto não vazio; números viram texto (ids numéricos são comuns).
fn text(payload: &Value, path: &[&str]) -> Option<String> {
    match at(payload, path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(payload: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| text(payload, path))
}

fn first_decimal(payload: &Value, paths: &[&[&str]]) -> Option<Decimal> {
    paths
        .iter()
        .find_map(|path| at(payload, path).and_then(decimal_from_value))
}

/// Campos comuns a todas as plataformas, com a prioridade genérica.
fn extract_common(payload: &Value) -> PartialSale {
    PartialSale {
        transaction_id: first_text(payload, &[&["transaction_id"], &["order_id"], &["id"]]),
        customer_name: text(payload, &["customer", "name"]),
        customer_email: text(payload, &["customer", "email"]),
        customer_phone: text(payload, &["customer", "phone"]),
        product_id: first_text(payload, &[&["product", "id"], &["product_id"]]),
        product_name: first_text(payload, &[&["product", "name"], &["product_name"]]),
        amount: first_decimal(payload, &[&["payment", "amount"], &["value"], &["price"]]),
        currency: first_text(payload, &[&["currency"], &["payment", "currency"]]),
        payment_method: first_text(payload, &[&["payment", "method"], &["payment_method"]]),
        commission: first_decimal(payload, &[&["commission"]]),
    }
}

/// Extrator padrão para plataformas sem parser dedicado.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericExtractor;

impl SaleExtractor for GenericExtractor {
    fn extract(&self, payload: &Value) -> PartialSale {
        extract_common(payload)
    }
}

/// Lowify: valor em `sale_amount`/`product.price` e comprador em `buyer.*`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowifyExtractor;

impl SaleExtractor for LowifyExtractor {
    fn extract(&self, payload: &Value) -> PartialSale {
        let common = extract_common(payload);

        PartialSale {
            customer_name: common
                .customer_name
                .or_else(|| text(payload, &["buyer", "name"])),
            customer_email: common
                .customer_email
                .or_else(|| text(payload, &["buyer", "email"])),
            customer_phone: common
                .customer_phone
                .or_else(|| text(payload, &["buyer", "phone"])),
            amount: first_decimal(
                payload,
                &[
                    &["sale_amount"],
                    &["product", "price"],
                    &["payment", "amount"],
                    &["value"],
                    &["price"],
                ],
            ),
            ..common
        }
    }
}

/// Registro plataforma → extrator, com fallback para o genérico.
#[derive(Clone)]
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn SaleExtractor>>,
    fallback: Arc<dyn SaleExtractor>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty(Arc::new(GenericExtractor));
        registry.register("lowify", Arc::new(LowifyExtractor));
        registry
    }
}

impl ExtractorRegistry {
    pub fn empty(fallback: Arc<dyn SaleExtractor>) -> Self {
        Self {
            extractors: HashMap::new(),
            fallback,
        }
    }

    pub fn register(&mut self, platform: &str, extractor: Arc<dyn SaleExtractor>) {
        self.extractors.insert(platform_key(platform), extractor);
    }

    pub fn for_platform(&self, platform: &str) -> &dyn SaleExtractor {
        self.extractors
            .get(&platform_key(platform))
            .map(|e| e.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    pub fn has_dedicated(&self, platform: &str) -> bool {
        self.extractors.contains_key(&platform_key(platform))
    }
}

fn platform_key(platform: &str) -> String {
    platform.trim().to_lowercase()
}

/// Texto de status do payload: `status`, depois `event`, senão `"unknown"`.
pub fn raw_status(payload: &Value) -> String {
    first_text(payload, &[&["status"], &["event"]]).unwrap_or_else(|| "unknown".to_string())
}

/// Transforma um payload qualquer numa venda pronta para inserir.
#[derive(Clone, Default)]
pub struct PayloadNormalizer {
    classifier: StatusClassifier,
    extractors: ExtractorRegistry,
}

impl PayloadNormalizer {
    pub fn new(classifier: StatusClassifier, extractors: ExtractorRegistry) -> Self {
        Self {
            classifier,
            extractors,
        }
    }

    pub fn normalize(
        &self,
        platform: &str,
        payload: &Value,
        user_id: Uuid,
        webhook_id: Option<Uuid>,
    ) -> NewSale {
        let raw = raw_status(payload);
        let status = self.classifier.classify(&raw);
        let extracted = self.extractors.for_platform(platform).extract(payload);

        NewSale {
            user_id,
            webhook_id,
            platform: platform.to_string(),
            transaction_id: extracted.transaction_id,
            status,
            customer_name: extracted.customer_name,
            customer_email: extracted.customer_email,
            customer_phone: extracted.customer_phone,
            product_id: extracted.product_id,
            product_name: extracted.product_name,
            amount: extracted.amount.unwrap_or(Decimal::ZERO),
            currency: extracted
                .currency
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            payment_method: extracted.payment_method,
            commission: extracted.commission.unwrap_or(Decimal::ZERO),
            raw_data: payload.clone(),
        }
    }
}
