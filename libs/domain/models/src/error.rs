// [libs/domain/models/src/error.rs]
/*!
 * Catálogo de errores transporte-agnóstico compartido por todos los
 * componentes del núcleo. La capa HTTP en `apps/api` es la única
 * responsable de mapear estas variantes a códigos de estado.
 */

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Validación de esquema o de campo falló. El `String` nombra el campo.
    #[error("[INVALID_INPUT] {0}")]
    InvalidInput(String),

    /// El principal no está autorizado para la acción solicitada.
    #[error("[FORBIDDEN] {0}")]
    Forbidden(String),

    /// La transición solicitada no es válida desde el estado actual.
    #[error("[INVALID_STATE] expected one of {expected:?}, found {found}")]
    InvalidState { expected: Vec<String>, found: String },

    /// Una escritura concurrente en conflicto invalidó esta transacción.
    #[error("[CONFLICT] {0}")]
    Conflict(String),

    /// El candidato elegido por el motor de asignación ya no coincide
    /// con el estado de la flota; el llamador debe volver a rankear.
    #[error("[STALE_SNAPSHOT] {0}")]
    StaleSnapshot(String),

    /// La entidad objetivo no tiene capacidad disponible.
    #[error("[CAPACITY_EXCEEDED] {0}")]
    CapacityExceeded(String),

    /// Una dependencia externa (LLM, clima, STT, sumidero de despacho)
    /// no respondió; nunca debe propagarse más allá del componente que
    /// la invoca — el fallback correspondiente siempre se aplica antes.
    #[error("[DEPENDENCY_UNAVAILABLE] {0}")]
    DependencyUnavailable(String),

    /// El request original excedió su plazo.
    #[error("[TIMEOUT] {0}")]
    Timeout(String),

    /// La entidad solicitada no existe.
    #[error("[NOT_FOUND] {0}")]
    NotFound(String),

    /// Fallo interno inesperado; se mapea a 500 en la frontera HTTP.
    #[error("[INTERNAL] {0}")]
    Internal(String),
}
