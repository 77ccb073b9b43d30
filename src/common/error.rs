use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Token do webhook ausente, desconhecido ou de um webhook inativo
    #[error("Token de webhook inválido")]
    InvalidWebhookToken,

    // Token de credencial de API ausente, desconhecido ou inativo
    #[error("Credencial de API inválida")]
    InvalidApiCredential,

    // JWT do usuário (rotas do painel)
    #[error("Token inválido")]
    InvalidToken,

    #[error("Corpo da requisição inválido: {0}")]
    InvalidPayload(String),

    #[error("E-mail do comprador ausente")]
    MissingBuyerEmail,

    #[error("Perfil não encontrado")]
    ProfileNotFound,

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que vai de fato para o cliente HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.error,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidWebhookToken
            | AppError::InvalidPayload(_)
            | AppError::MissingBuyerEmail => StatusCode::BAD_REQUEST,
            AppError::InvalidApiCredential | AppError::InvalidToken | AppError::JwtError(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::ProfileNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converte para a resposta da API, traduzida para o idioma da requisição.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let en = locale.is_english();
        let status = self.status_code();

        let error = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                let message = if en {
                    "One or more fields are invalid."
                } else {
                    "Um ou mais campos são inválidos."
                };
                return ApiError {
                    status,
                    error: message.to_string(),
                    details: Some(Value::Object(details)),
                };
            }
            AppError::InvalidWebhookToken => pick(
                en,
                "Token de webhook inválido, ausente ou inativo.",
                "Webhook token is invalid, missing or inactive.",
            ),
            AppError::InvalidApiCredential => pick(
                en,
                "Credencial de API inválida, ausente ou inativa.",
                "API credential is invalid, missing or inactive.",
            ),
            AppError::InvalidToken | AppError::JwtError(_) => pick(
                en,
                "Token de autenticação inválido ou ausente.",
                "Authentication token is invalid or missing.",
            ),
            AppError::InvalidPayload(reason) => {
                if en {
                    format!("Invalid request body: {reason}")
                } else {
                    format!("Corpo da requisição inválido: {reason}")
                }
            }
            AppError::MissingBuyerEmail => pick(
                en,
                "E-mail do comprador não informado.",
                "Buyer email is missing.",
            ),
            AppError::ProfileNotFound => pick(
                en,
                "Nenhum perfil encontrado para este e-mail.",
                "No profile found for this email.",
            ),
            AppError::NotFound(resource) => {
                if en {
                    format!("{resource} not found.")
                } else {
                    format!("{resource} não encontrado.")
                }
            }
            AppError::UniqueConstraintViolation(message) => message.clone(),

            // Todos os outros erros viram 500, com o detalhe só no log.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                pick(
                    en,
                    "Ocorreu um erro inesperado.",
                    "An unexpected error occurred.",
                )
            }
        };

        ApiError {
            status,
            error,
            details: None,
        }
    }
}

fn pick(en: bool, pt: &str, english: &str) -> String {
    let text = if en { english } else { pt };
    text.to_string()
}

// Usado pelos middlewares, onde não há Locale disponível.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failures_map_to_their_status_codes() {
        assert_eq!(AppError::InvalidWebhookToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidApiCredential.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::MissingBuyerEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ProfileNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_follow_the_locale() {
        let pt = AppError::ProfileNotFound.to_api_error(&Locale("pt".into()));
        let en = AppError::ProfileNotFound.to_api_error(&Locale("en".into()));

        assert_eq!(pt.error, "Nenhum perfil encontrado para este e-mail.");
        assert_eq!(en.error, "No profile found for this email.");
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"));
        let api = err.to_api_error(&Locale::default());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("hunter2"));
    }
}
