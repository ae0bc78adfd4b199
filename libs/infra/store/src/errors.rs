// [libs/infra/store/src/errors.rs]
/*!
 * Catálogo de errores del Store. Se traduce a `CoreError` en la
 * frontera de dominio; nunca cruza esa frontera sin traducir.
 */

use aegis_domain_models::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("[L3_DB_NET_FAULT]: connection failed -> {0}")]
    Connection(String),

    #[error("[L3_DB_QUERY_FAULT]: query rejected -> {0}")]
    Query(#[from] libsql::Error),

    #[error("[L3_DB_MAPPING_FAULT]: row mapping failed -> {0}")]
    Mapping(String),

    #[error("[L3_NOT_FOUND]: {0}")]
    NotFound(String),

    /// A conditional `UPDATE ... WHERE status = ?` affected zero rows:
    /// either the row moved under us (optimistic-concurrency conflict)
    /// or it no longer matches the expected predecessor state.
    #[error("[L3_CONFLICT]: {0}")]
    Conflict(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => CoreError::NotFound(msg),
            StoreError::Conflict(msg) => CoreError::Conflict(msg),
            other => CoreError::Internal(other.to_string()),
        }
    }
}
