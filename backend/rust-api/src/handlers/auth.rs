use axum::{extract::State, response::Json};
use bcrypt::verify;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::tokens::{self, TokenPair, TokenType};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

const BAD_CREDENTIALS: &str = "No active account found with the given credentials";

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username is required".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }

    let user = sqlx::query("SELECT id, username, password_hash FROM users WHERE username = $1 AND is_active = true")
        .bind(username)
        .fetch_optional(&*state.db_pool)
        .await?;

    let Some(user) = user else {
        tracing::info!("auth: login failed for unknown user {}", username);
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    };

    let user_id: Uuid = user.try_get("id")?;
    let stored_username: String = user.try_get("username")?;
    let password_hash: String = user.try_get("password_hash")?;

    if !verify(&payload.password, &password_hash)? {
        tracing::info!("auth: login failed for {}", username);
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    let pair = tokens::issue_pair(&user_id, &stored_username, &state.config)?;
    tracing::info!("auth: {} logged in", stored_username);
    Ok(Json(pair))
}

/// Exchange a refresh token for a new access token. Access tokens are refused.
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    if payload.refresh.is_empty() {
        return Err(AppError::BadRequest("Refresh token is required".into()));
    }
    let claims = tokens::verify(&payload.refresh, &state.config.jwt_secret, TokenType::Refresh).map_err(|e| {
        tracing::debug!("auth: refresh rejected: {}", e);
        AppError::Unauthorized("Token is invalid or expired".into())
    })?;
    let user_id = Uuid::parse_str(&claims.user_id)
        .map_err(|_| AppError::Unauthorized("Token is invalid or expired".into()))?;

    let access = tokens::issue(
        &user_id,
        &claims.username,
        TokenType::Access,
        &state.config.jwt_secret,
        state.config.jwt_access_expiration,
    )?;
    Ok(Json(RefreshResponse { access }))
}
