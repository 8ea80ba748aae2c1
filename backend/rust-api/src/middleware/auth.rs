use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::services::tokens::{self, TokenType};
use crate::AppState;

/// Paths reachable without a bearer token.
const PUBLIC_PATHS: &[&str] = &["/health", "/api/auth/login/", "/api/auth/refresh/"];

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

fn unauthorized(detail: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(serde_json::json!({ "detail": detail }))).into_response()
}

fn token_not_valid() -> Response {
    unauthorized("Given token not valid for any token type")
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path();
    if PUBLIC_PATHS.iter().any(|p| *p == path) {
        return Ok(next.run(req).await);
    }

    let token = match req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => return Ok(unauthorized("Authentication credentials were not provided.")),
    };

    // Refresh tokens are rejected here, before any database work.
    let claims = match tokens::verify(&token, &state.config.jwt_secret, TokenType::Access) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!("auth: rejected bearer on {}: {}", path, e);
            return Ok(token_not_valid());
        }
    };

    let user_id = match Uuid::parse_str(&claims.user_id) {
        Ok(u) => u,
        Err(_) => return Ok(token_not_valid()),
    };

    let active = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND is_active = true)")
        .bind(user_id)
        .fetch_one(&*state.db_pool)
        .await
        .map_err(|e| {
            tracing::error!("auth: user lookup failed: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    if !active {
        return Ok(unauthorized("User not found"));
    }

    req.extensions_mut().insert(AuthUser {
        user_id,
        username: claims.username,
    });

    Ok(next.run(req).await)
}
