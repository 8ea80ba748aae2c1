//! HS256 access/refresh token pair. The `token_type` claim keeps the two
//! from being used interchangeably.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub token_type: TokenType,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token is invalid or expired")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("Token has wrong type")]
    WrongType,
}

pub fn encode_claims(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let header = Header::new(Algorithm::HS256);
    encode(&header, claims, &EncodingKey::from_secret(secret.as_ref()))
}

pub fn issue(
    user_id: &Uuid,
    username: &str,
    token_type: TokenType,
    secret: &str,
    lifetime_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        user_id: user_id.to_string(),
        username: username.to_string(),
        token_type,
        iat: now.timestamp() as usize,
        exp: (now + Duration::seconds(lifetime_secs as i64)).timestamp() as usize,
    };
    encode_claims(&claims, secret)
}

pub fn issue_pair(user_id: &Uuid, username: &str, config: &Config) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    Ok(TokenPair {
        access: issue(
            user_id,
            username,
            TokenType::Access,
            &config.jwt_secret,
            config.jwt_access_expiration,
        )?,
        refresh: issue(
            user_id,
            username,
            TokenType::Refresh,
            &config.jwt_secret,
            config.jwt_refresh_expiration,
        )?,
    })
}

pub fn verify(token: &str, secret: &str, expected: TokenType) -> Result<Claims, TokenError> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)?;
    if data.claims.token_type != expected {
        return Err(TokenError::WrongType);
    }
    Ok(data.claims)
}
