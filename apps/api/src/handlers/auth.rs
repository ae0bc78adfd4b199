// [apps/api/src/handlers/auth.rs]
//! `POST /auth/login`. Real credential verification is scoped out of
//! this core — this only mints a token for whatever role the caller
//! claims, same trust boundary `token.rs` documents.

use aegis_domain_models::Role;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::token;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

pub async fn login(Json(req): Json<LoginRequest>) -> ApiResult<Json<LoginResponse>> {
    let token = token::mint(&req.username, req.role);
    Ok(Json(LoginResponse { token, role: req.role }))
}
