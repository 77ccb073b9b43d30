// src/models/campaign.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// A Graph API manda números como string ("12.34") e às vezes como número
use crate::common::decimal::lenient_decimal;

// --- Entrada: objetos da Meta Ads ---

/// Campanha, conjunto ou anúncio.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MetaEntity {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[schema(example = "ACTIVE")]
    pub status: String,
    pub effective_status: Option<String>,

    // Orçamentos chegam em centavos
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<String>, example = "5000")]
    pub daily_budget: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<String>)]
    pub lifetime_budget: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MetaAction {
    pub action_type: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<String>, example = "3")]
    pub value: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MetaInsight {
    pub campaign_id: Option<String>,
    pub adset_id: Option<String>,
    pub ad_id: Option<String>,
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<String>, example = "152.37")]
    pub spend: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<String>)]
    pub impressions: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<String>)]
    pub clicks: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<String>)]
    pub reach: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<String>)]
    pub frequency: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<String>)]
    pub cpc: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<String>)]
    pub cpm: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<String>)]
    pub ctr: Option<Decimal>,

    #[serde(default)]
    pub actions: Vec<MetaAction>,
    #[serde(default)]
    pub action_values: Vec<MetaAction>,
    #[serde(default)]
    pub cost_per_action_type: Vec<MetaAction>,

    #[serde(default)]
    pub video_p25_watched_actions: Vec<MetaAction>,
    #[serde(default)]
    pub video_p50_watched_actions: Vec<MetaAction>,
    #[serde(default)]
    pub video_p75_watched_actions: Vec<MetaAction>,
    #[serde(default)]
    pub video_p100_watched_actions: Vec<MetaAction>,
}

impl MetaInsight {
    /// Id da entidade à qual o insight se refere.
    pub fn entity_id(&self) -> Option<&str> {
        self.campaign_id
            .as_deref()
            .or(self.adset_id.as_deref())
            .or(self.ad_id.as_deref())
            .or(self.id.as_deref())
    }
}

/// Nível da listagem no Gerenciador de Anúncios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CampaignLevel {
    #[default]
    Campaign,
    Adset,
    Ad,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMetricsOptions {
    /// Esconde entidades sem impressões e sem gasto. Sem valor, só vale
    /// para o nível de campanha.
    #[serde(default)]
    pub only_with_delivery: Option<bool>,
}

impl CampaignMetricsOptions {
    pub fn only_with_delivery_for(&self, level: CampaignLevel) -> bool {
        self.only_with_delivery
            .unwrap_or(level == CampaignLevel::Campaign)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMetricsRequest {
    #[serde(default)]
    pub level: CampaignLevel,
    pub entities: Vec<MetaEntity>,
    #[serde(default)]
    pub insights: Vec<MetaInsight>,
    #[serde(default)]
    pub options: CampaignMetricsOptions,
}

// --- Saída: métricas derivadas ---

/// Métricas derivadas por entidade. `None` significa denominador zero ou
/// valor fora da faixa do `Decimal` (a interface mostra "N/A").
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DerivedCampaignMetrics {
    pub id: String,
    pub name: String,
    pub status: String,
    pub status_active: bool,

    pub daily_budget: Option<Decimal>,
    pub lifetime_budget: Option<Decimal>,

    pub spent: Decimal,
    pub impressions: Decimal,
    pub clicks: Decimal,
    pub reach: Decimal,
    pub frequency: Option<Decimal>,
    pub ctr: Option<Decimal>,
    pub cpc: Option<Decimal>,
    pub cpm: Option<Decimal>,

    pub sales: Decimal,
    pub revenue: Decimal,
    pub profit: Option<Decimal>,
    pub cpa: Option<Decimal>,
    pub roi: Option<Decimal>,
    pub margin: Option<Decimal>,

    pub initiated_checkouts: Decimal,
    pub checkout_conversion: Option<Decimal>,
    pub cost_per_checkout: Option<Decimal>,
    pub landing_page_views: Decimal,
    pub link_clicks: Decimal,
    pub connect_rate: Option<Decimal>,

    pub video_views: Decimal,
    pub cpv: Option<Decimal>,
    pub hook_play_rate: Option<Decimal>,
    pub hold_rate: Option<Decimal>,
    pub video_p25_rate: Option<Decimal>,
    pub video_p50_rate: Option<Decimal>,
    pub video_p75_rate: Option<Decimal>,
    pub video_p100_rate: Option<Decimal>,
}
