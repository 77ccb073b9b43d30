// src/models/sale.rs

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Status canônico de uma venda.
///
/// `Other` carrega o texto do fornecedor (já em minúsculas) quando nenhuma
/// regra do classificador casou, para que a venda continue visível.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SaleStatus {
    Pending,
    Approved,
    Refunded,
    Cancelled,
    Other(String),
}

impl SaleStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Approved => "approved",
            SaleStatus::Refunded => "refunded",
            SaleStatus::Cancelled => "cancelled",
            SaleStatus::Other(raw) => raw.as_str(),
        }
    }

    /// Lê o valor persistido. `paid` e `chargedback` são rótulos legados.
    pub fn parse(value: &str) -> Self {
        match value {
            "pending" => SaleStatus::Pending,
            "approved" | "paid" => SaleStatus::Approved,
            "refunded" | "chargedback" => SaleStatus::Refunded,
            "cancelled" => SaleStatus::Cancelled,
            other => SaleStatus::Other(other.to_string()),
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, SaleStatus::Other(_))
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SaleStatus {
    fn from(value: String) -> Self {
        SaleStatus::parse(&value)
    }
}

impl Serialize for SaleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SaleStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(SaleStatus::parse(&raw.to_lowercase()))
    }
}

// --- Venda persistida ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,

    #[schema(ignore)]
    pub user_id: Uuid,

    // Referência ao webhook de origem (não é posse)
    pub webhook_id: Option<Uuid>,

    #[schema(example = "lowify")]
    pub platform: String,

    #[schema(example = "TX-98765")]
    pub transaction_id: Option<String>,

    #[sqlx(try_from = "String")]
    #[schema(value_type = String, example = "approved")]
    pub status: SaleStatus,

    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,

    pub product_id: Option<String>,
    pub product_name: Option<String>,

    #[schema(example = "197.00")]
    pub amount: Decimal,

    #[schema(example = "BRL")]
    pub currency: String,

    pub payment_method: Option<String>,

    #[schema(example = "0")]
    pub commission: Decimal,

    // Payload original, guardado para auditoria
    #[schema(value_type = Object)]
    pub raw_data: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Venda pronta para inserção (saída do normalizador).
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub user_id: Uuid,
    pub webhook_id: Option<Uuid>,
    pub platform: String,
    pub transaction_id: Option<String>,
    pub status: SaleStatus,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: Option<String>,
    pub commission: Decimal,
    pub raw_data: Value,
}

// --- Filtros e métricas ---

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SalesFilter {
    /// Início do período (inclusivo)
    pub from: Option<DateTime<Utc>>,
    /// Fim do período (inclusivo)
    pub to: Option<DateTime<Utc>>,
    #[param(value_type = Option<String>, example = "approved")]
    pub status: Option<SaleStatus>,
    #[param(example = "lowify")]
    pub platform: Option<String>,
}

impl SalesFilter {
    pub fn matches(&self, sale: &Sale) -> bool {
        if self.from.is_some_and(|from| sale.created_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| sale.created_at > to) {
            return false;
        }
        if self.status.as_ref().is_some_and(|status| *status != sale.status) {
            return false;
        }
        if let Some(platform) = &self.platform {
            if !platform.eq_ignore_ascii_case(&sale.platform) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesMetrics {
    pub total_revenue: Decimal,
    pub total_pending: Decimal,
    pub total_refunds: Decimal,
    pub approved_sales: u64,
    pub total_sales: u64,
    /// Percentual (0-100)
    pub approval_rate: Decimal,
    pub arpu: Decimal,
    pub avg_ticket: Decimal,
}
