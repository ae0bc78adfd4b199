// [libs/domain/models/src/principal.rs]
/*!
 * Representa el sujeto ya autenticado que entra al núcleo. La emisión
 * del token en sí vive fuera de este repositorio, en un colaborador
 * externo; aquí sólo consumimos un principal ya validado.
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Responder,
    /// Caller with write access to /sos endpoints but no responder duties.
    Reporter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable identifier: a staff id for responders, an operator id for admins.
    pub id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_responder(&self) -> bool {
        self.role == Role::Responder
    }
}
