//! Admin bearer-secret extractor.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// Proof that the request carried `Authorization: Bearer <ADMIN_SECRET>`.
///
/// Rejects with 401 when the server has no secret configured, so an unset
/// secret can never be matched by an empty credential.
#[derive(Debug)]
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(secret) = state.config.admin_secret.as_deref() else {
            warn!("Admin request rejected: ADMIN_SECRET is not configured");
            return Err(AppError::Unauthorized);
        };

        let provided = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match provided {
            Some(value) if is_authorized(value, secret) => Ok(AdminAuth),
            Some(_) => {
                warn!("Admin request rejected: invalid credential");
                Err(AppError::Unauthorized)
            }
            None => {
                warn!("Admin request rejected: missing Authorization header");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// Exact match against `Bearer <secret>`, compared without early exit.
pub fn is_authorized(header_value: &str, secret: &str) -> bool {
    let expected = format!("Bearer {secret}");
    let (a, b) = (header_value.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
