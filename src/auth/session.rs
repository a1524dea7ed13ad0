use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Role, User};

pub const SESSION_COOKIE: &str = "zis_session";

/// Signed session payload: who is acting and with which role.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub usr: String,
    pub name: String,
    pub role: Role,
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User, hours: i64) -> Self {
        Self {
            sub: user.id,
            usr: user.username.clone(),
            name: user.name.clone(),
            role: user.role,
            exp: (Utc::now() + Duration::hours(hours)).timestamp(),
        }
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Session encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Session decode failed: {e}"))
}
