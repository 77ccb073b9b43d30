// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audiência dos tokens de usuário emitidos pelo Supabase Auth.
pub const JWT_AUDIENCE: &str = "authenticated";

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

// Usuário autenticado, como os handlers o enxergam
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
}
