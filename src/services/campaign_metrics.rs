// src/services/campaign_metrics.rs

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::campaign::{
    CampaignLevel, CampaignMetricsOptions, DerivedCampaignMetrics, MetaAction, MetaEntity,
    MetaInsight,
};

// Aliases que a Meta usa para a mesma ação. O primeiro presente vence.
const PURCHASE: &[&str] = &["purchase", "omni_purchase", "offsite_conversion.fb_pixel_purchase"];
const INITIATE_CHECKOUT: &[&str] = &[
    "initiate_checkout",
    "omni_initiated_checkout",
    "offsite_conversion.fb_pixel_initiate_checkout",
];
const LANDING_PAGE_VIEW: &[&str] = &["landing_page_view", "omni_landing_page_view"];
const LINK_CLICK: &[&str] = &["link_click"];
const VIDEO_VIEW: &[&str] = &["video_view"];

fn action_value(actions: &[MetaAction], aliases: &[&str]) -> Decimal {
    aliases
        .iter()
        .find_map(|alias| {
            actions
                .iter()
                .find(|a| a.action_type == *alias)
                .and_then(|a| a.value)
        })
        .unwrap_or(Decimal::ZERO)
}

// Para os vídeos a Meta manda uma lista com um único "video_view"
fn first_value(actions: &[MetaAction]) -> Decimal {
    actions
        .iter()
        .find_map(|a| a.value)
        .unwrap_or(Decimal::ZERO)
}

/// Divisão que devolve `None` quando o denominador é zero ou o
/// resultado estoura o `Decimal`.
fn ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    numerator
        .checked_div(denominator)
        .map(|value| value.round_dp(4))
}

fn percent(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    numerator
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| ratio(scaled, denominator))
}

fn is_active(entity: &MetaEntity) -> bool {
    entity
        .effective_status
        .as_deref()
        .unwrap_or(entity.status.as_str())
        .eq_ignore_ascii_case("ACTIVE")
}

fn cents(value: Option<Decimal>) -> Option<Decimal> {
    value.map(|v| v / Decimal::ONE_HUNDRED)
}

/// Calcula as métricas de uma entidade com (ou sem) seu insight.
pub fn derive(entity: &MetaEntity, insight: Option<&MetaInsight>) -> DerivedCampaignMetrics {
    let empty = MetaInsight::default();
    let insight = insight.unwrap_or(&empty);
    let zero = |v: Option<Decimal>| v.unwrap_or(Decimal::ZERO);

    let spent = zero(insight.spend);
    let impressions = zero(insight.impressions);
    let clicks = zero(insight.clicks);
    let reach = zero(insight.reach);

    let sales = action_value(&insight.actions, PURCHASE);
    let revenue = action_value(&insight.action_values, PURCHASE);
    let initiated_checkouts = action_value(&insight.actions, INITIATE_CHECKOUT);
    let landing_page_views = action_value(&insight.actions, LANDING_PAGE_VIEW);
    let link_clicks = action_value(&insight.actions, LINK_CLICK);
    let video_views = action_value(&insight.actions, VIDEO_VIEW);

    let p25 = first_value(&insight.video_p25_watched_actions);
    let p50 = first_value(&insight.video_p50_watched_actions);
    let p75 = first_value(&insight.video_p75_watched_actions);
    let p100 = first_value(&insight.video_p100_watched_actions);
    let profit = revenue.checked_sub(spent);

    DerivedCampaignMetrics {
        id: entity.id.clone(),
        name: entity.name.clone(),
        status: entity
            .effective_status
            .clone()
            .unwrap_or_else(|| entity.status.clone()),
        status_active: is_active(entity),

        daily_budget: cents(entity.daily_budget),
        lifetime_budget: cents(entity.lifetime_budget),

        spent,
        impressions,
        clicks,
        reach,
        frequency: insight.frequency.or_else(|| ratio(impressions, reach)),
        ctr: insight.ctr.or_else(|| percent(clicks, impressions)),
        cpc: insight.cpc.or_else(|| ratio(spent, clicks)),
        cpm: insight.cpm.or_else(|| {
            spent
                .checked_mul(Decimal::ONE_THOUSAND)
                .and_then(|scaled| ratio(scaled, impressions))
        }),

        sales,
        revenue,
        profit,
        cpa: ratio(spent, sales),
        roi: ratio(revenue, spent),
        margin: profit.and_then(|p| percent(p, revenue)),

        initiated_checkouts,
        checkout_conversion: percent(sales, initiated_checkouts),
        cost_per_checkout: ratio(spent, initiated_checkouts),
        landing_page_views,
        link_clicks,
        connect_rate: percent(landing_page_views, link_clicks),

        video_views,
        cpv: ratio(spent, video_views),
        hook_play_rate: percent(video_views, impressions),
        hold_rate: percent(p75, video_views),
        video_p25_rate: percent(p25, video_views),
        video_p50_rate: percent(p50, video_views),
        video_p75_rate: percent(p75, video_views),
        video_p100_rate: percent(p100, video_views),
    }
}

/// Junta entidades e insights pelo id, calcula as métricas e ordena:
/// ativas primeiro, depois maior gasto.
pub fn build_campaign_metrics(
    level: CampaignLevel,
    entities: &[MetaEntity],
    insights: &[MetaInsight],
    options: &CampaignMetricsOptions,
) -> Vec<DerivedCampaignMetrics> {
    let only_with_delivery = options.only_with_delivery_for(level);

    let by_id: HashMap<&str, &MetaInsight> = insights
        .iter()
        .filter_map(|i| i.entity_id().map(|id| (id, i)))
        .collect();

    let mut metrics: Vec<DerivedCampaignMetrics> = entities
        .iter()
        .map(|entity| derive(entity, by_id.get(entity.id.as_str()).copied()))
        .filter(|m| {
            !only_with_delivery || m.impressions > Decimal::ZERO || m.spent > Decimal::ZERO
        })
        .collect();

    metrics.sort_by(|a, b| {
        b.status_active
            .cmp(&a.status_active)
            .then_with(|| b.spent.cmp(&a.spent))
    });

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entities(value: serde_json::Value) -> Vec<MetaEntity> {
        serde_json::from_value(value).unwrap()
    }

    fn insights(value: serde_json::Value) -> Vec<MetaInsight> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn derives_ratios_from_string_encoded_insights() {
        let entity_list = entities(json!([{"id": "c1", "name": "Black Friday", "status": "ACTIVE", "daily_budget": "5000"}]));
        let insight_list = insights(json!([{
            "campaign_id": "c1",
            "spend": "100.00",
            "impressions": "10000",
            "clicks": "200",
            "reach": "5000",
            "actions": [
                {"action_type": "purchase", "value": "4"},
                {"action_type": "initiate_checkout", "value": "10"},
                {"action_type": "link_click", "value": "150"},
                {"action_type": "landing_page_view", "value": "120"},
                {"action_type": "video_view", "value": "2000"}
            ],
            "action_values": [{"action_type": "purchase", "value": "400.00"}],
            "video_p75_watched_actions": [{"action_type": "video_view", "value": "500"}]
        }]));

        let m = derive(&entity_list[0], Some(&insight_list[0]));

        assert!(m.status_active);
        assert_eq!(m.daily_budget, Some(Decimal::from(50)));
        assert_eq!(m.cpa, Some(Decimal::from(25)));
        assert_eq!(m.roi, Some(Decimal::from(4)));
        assert_eq!(m.margin, Some(Decimal::from(75)));
        assert_eq!(m.profit, Some(Decimal::from(300)));
        assert_eq!(m.ctr, Some(Decimal::from(2)));
        assert_eq!(m.cpm, Some(Decimal::from(10)));
        assert_eq!(m.frequency, Some(Decimal::from(2)));
        assert_eq!(m.checkout_conversion, Some(Decimal::from(40)));
        assert_eq!(m.connect_rate, Some(Decimal::from(80)));
        assert_eq!(m.hook_play_rate, Some(Decimal::from(20)));
        assert_eq!(m.hold_rate, Some(Decimal::from(25)));
        assert_eq!(m.cpv, Some(Decimal::new(5, 2)));
    }

    #[test]
    fn zero_denominators_become_none() {
        let entity_list = entities(json!([{"id": "c1", "status": "PAUSED"}]));
        let m = derive(&entity_list[0], None);

        assert!(!m.status_active);
        assert_eq!(m.spent, Decimal::ZERO);
        assert_eq!(m.cpa, None);
        assert_eq!(m.roi, None);
        assert_eq!(m.margin, None);
        assert_eq!(m.ctr, None);
        assert_eq!(m.checkout_conversion, None);
        assert_eq!(m.hold_rate, None);
    }

    #[test]
    fn sorts_active_first_then_by_spend_and_filters_empty() {
        let entities = entities(json!([
            {"id": "a", "status": "PAUSED"},
            {"id": "b", "status": "ACTIVE"},
            {"id": "c", "status": "ACTIVE"},
            {"id": "d", "status": "ACTIVE"}
        ]));
        let insights = insights(json!([
            {"campaign_id": "a", "spend": "500"},
            {"campaign_id": "b", "spend": "10", "impressions": "100"},
            {"campaign_id": "c", "spend": 90.5}
        ]));

        let filtered = build_campaign_metrics(
            CampaignLevel::Campaign,
            &entities,
            &insights,
            &CampaignMetricsOptions::default(),
        );
        let ids: Vec<_> = filtered.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        let all = build_campaign_metrics(
            CampaignLevel::Campaign,
            &entities,
            &insights,
            &CampaignMetricsOptions { only_with_delivery: Some(false) },
        );
        let ids: Vec<_> = all.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "d", "a"]);
    }

    #[test]
    fn adset_and_ad_levels_keep_entities_without_delivery() {
        let entities = entities(json!([
            {"id": "s1", "status": "ACTIVE"},
            {"id": "s2", "status": "PAUSED"}
        ]));
        let insights = insights(json!([{"adset_id": "s1", "spend": "12"}]));
        let defaults = CampaignMetricsOptions::default();

        for level in [CampaignLevel::Adset, CampaignLevel::Ad] {
            let ids: Vec<_> = build_campaign_metrics(level, &entities, &insights, &defaults)
                .into_iter()
                .map(|m| m.id)
                .collect();
            assert_eq!(ids, vec!["s1", "s2"]);
        }

        let filtered = build_campaign_metrics(
            CampaignLevel::Adset,
            &entities,
            &insights,
            &CampaignMetricsOptions { only_with_delivery: Some(true) },
        );
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn values_beyond_decimal_range_become_none() {
        let entity_list = entities(json!([{"id": "c1", "status": "ACTIVE"}]));
        let insight_list = insights(json!([{
            "campaign_id": "c1",
            "spend": "79228162514264337593543950335",
            "impressions": "1",
            "clicks": "79228162514264337593543950335",
            "actions": [{"action_type": "purchase", "value": "0.0000000000000000000000000001"}],
            "action_values": [{"action_type": "purchase", "value": "-79228162514264337593543950335"}]
        }]));

        let m = derive(&entity_list[0], Some(&insight_list[0]));

        assert_eq!(m.cpm, None);
        assert_eq!(m.cpa, None);
        assert_eq!(m.profit, None);
        assert_eq!(m.margin, None);
        assert_eq!(m.ctr, None);
        assert_eq!(m.cpc, Some(Decimal::ONE));
    }
}
