// src/handlers.rs

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Json,
};

use crate::{
    common::error::{ApiError, AppError},
    middleware::i18n::Locale,
};

pub mod campaigns;
pub mod credentials;
pub mod payment_webhook;
pub mod profile;
pub mod sales;
pub mod webhook_receiver;
pub mod webhooks;

// JSON malformado também sai no formato `{success:false, error}`
pub(crate) fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    locale: &Locale,
) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::InvalidPayload(rejection.body_text()).to_api_error(locale))
}

// Query string inválida (ex.: `?token=a&token=b`) idem
pub(crate) fn query_params<T>(
    query: Result<Query<T>, QueryRejection>,
    locale: &Locale,
) -> Result<T, ApiError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::InvalidPayload(rejection.body_text()).to_api_error(locale))
}
