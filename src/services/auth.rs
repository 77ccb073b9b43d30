// src/services/auth.rs

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    models::auth::{Claims, User, JWT_AUDIENCE},
};

/// Valida os JWTs do painel (HS256, assinados com o segredo do projeto).
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[JWT_AUDIENCE]);

        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("JWT rejeitado: {}", e);
                AppError::InvalidToken
            })?;

        Ok(User {
            id: token_data.claims.sub,
            email: token_data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    fn token(secret: &str, aud: &str, expires_in: Duration) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let claims = Claims {
            sub: user_id,
            exp: (Utc::now() + expires_in).timestamp() as usize,
            aud: aud.to_string(),
            email: Some("dono@loja.com".to_string()),
            role: Some("authenticated".to_string()),
        };
        let jwt = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap();
        (user_id, jwt)
    }

    #[test]
    fn accepts_a_valid_token() {
        let service = AuthService::new("segredo");
        let (user_id, jwt) = token("segredo", JWT_AUDIENCE, Duration::hours(1));

        let user = service.validate_token(&jwt).unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.email.as_deref(), Some("dono@loja.com"));
    }

    #[test]
    fn rejects_wrong_secret_audience_or_expired() {
        let service = AuthService::new("segredo");

        let (_, wrong_secret) = token("outro", JWT_AUDIENCE, Duration::hours(1));
        let (_, wrong_aud) = token("segredo", "anon", Duration::hours(1));
        let (_, expired) = token("segredo", JWT_AUDIENCE, Duration::hours(-2));

        for jwt in [wrong_secret, wrong_aud, expired] {
            assert!(matches!(service.validate_token(&jwt), Err(AppError::InvalidToken)));
        }
    }
}
