pub mod auth;
pub mod campaign_metrics;
pub mod normalizer;
pub mod plan_sync;
pub mod registry_service;
pub mod sales_service;
pub mod status_classifier;
pub mod webhook_receiver;
