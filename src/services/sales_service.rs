// src/services/sales_service.rs

use std::{collections::HashSet, sync::Arc};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::SaleRepository,
    models::sale::{Sale, SaleStatus, SalesFilter, SalesMetrics},
};

/// Reduz as vendas às métricas do painel.
///
/// Função pura: pode ser chamada quantas vezes for preciso sobre o mesmo
/// conjunto e sempre devolve o mesmo resultado. Divisões por zero resultam
/// em zero.
pub fn aggregate(sales: &[Sale]) -> SalesMetrics {
    let mut total_revenue = Decimal::ZERO;
    let mut total_pending = Decimal::ZERO;
    let mut total_refunds = Decimal::ZERO;
    let mut approved_sales: u64 = 0;
    let mut customers: HashSet<String> = HashSet::new();
    let mut approved_without_identity = false;

    for sale in sales {
        match sale.status {
            SaleStatus::Approved => {
                total_revenue += sale.amount;
                approved_sales += 1;
                match customer_key(sale) {
                    Some(key) => {
                        customers.insert(key);
                    }
                    None => approved_without_identity = true,
                }
            }
            SaleStatus::Pending => total_pending += sale.amount,
            SaleStatus::Refunded => total_refunds += sale.amount,
            SaleStatus::Cancelled | SaleStatus::Other(_) => {}
        }
    }

    let total_sales = sales.len() as u64;
    let approval_rate = ratio(Decimal::from(approved_sales) * Decimal::ONE_HUNDRED, total_sales);
    let avg_ticket = ratio(total_revenue, approved_sales);

    // Sem identidade de cliente em alguma venda aprovada, usa o número de vendas
    let arpu = if approved_without_identity || customers.is_empty() {
        avg_ticket
    } else {
        ratio(total_revenue, customers.len() as u64)
    };

    SalesMetrics {
        total_revenue,
        total_pending,
        total_refunds,
        approved_sales,
        total_sales,
        approval_rate: approval_rate.round_dp(2),
        arpu: arpu.round_dp(2),
        avg_ticket: avg_ticket.round_dp(2),
    }
}

fn ratio(numerator: Decimal, denominator: u64) -> Decimal {
    if denominator == 0 {
        Decimal::ZERO
    } else {
        numerator / Decimal::from(denominator)
    }
}

fn customer_key(sale: &Sale) -> Option<String> {
    sale.customer_email
        .as_deref()
        .or(sale.customer_name.as_deref())
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
}

#[derive(Clone)]
pub struct SalesService {
    repo: Arc<dyn SaleRepository>,
}

impl SalesService {
    pub fn new(repo: Arc<dyn SaleRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, user_id: Uuid, filter: &SalesFilter) -> Result<Vec<Sale>, AppError> {
        let sales = self.repo.list_by_user(user_id).await?;
        Ok(sales.into_iter().filter(|s| filter.matches(s)).collect())
    }

    pub async fn metrics(&self, user_id: Uuid, filter: &SalesFilter) -> Result<SalesMetrics, AppError> {
        let sales = self.list(user_id, filter).await?;
        Ok(aggregate(&sales))
    }

    pub async fn delete(&self, user_id: Uuid, sale_id: Uuid) -> Result<(), AppError> {
        if self.repo.delete(user_id, sale_id).await? {
            tracing::info!(sale_id = %sale_id, "Venda removida pelo dono");
            Ok(())
        } else {
            Err(AppError::NotFound("Venda"))
        }
    }
}
