// [apps/api/src/token.rs]
//! Minimal unsigned-JWT-shaped token issuance for `/auth/login`.
//! Real token issuance (and its signature) is scoped out of the
//! core's responsibility — the core only ever consumes an
//! already-validated `Principal`. This mints a three-segment token
//! whose claims segment `auth_guard` can decode the same way it
//! already decodes any other bearer token, with no signature
//! verification on either side.

use aegis_domain_models::Role;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL;
use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
}

const UNSIGNED_HEADER: &str = "unsigned";
const UNSIGNED_SIGNATURE: &str = "unsigned";

pub fn mint(sub: &str, role: Role) -> String {
    let claims = Claims { sub: sub.to_string(), role };
    let claims_json = serde_json::to_vec(&claims).expect("Claims always serialises");
    let claims_segment = BASE64_URL.encode(claims_json);
    format!("{UNSIGNED_HEADER}.{claims_segment}.{UNSIGNED_SIGNATURE}")
}
