use serde::{Deserialize, Serialize};

use super::{requerido, Recurso, RecursoId};
use crate::api::{AppError, AppResult};

/// Huésped registrado en el hotel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Persona {
    pub id: Option<RecursoId>,
    pub nombrecompleto: String,
    pub nrodocumento: String,
    pub correo: String,
    pub telefono: String,
}

/// Resumen de persona que algunas respuestas de reserva traen embebido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaResumen {
    pub id: RecursoId,
    #[serde(default)]
    pub nombrecompleto: String,
}

/// Validación básica de email, equivalente a un `<input type="email">`.
fn validate_email(email: &str) -> bool {
    email.contains('@') && email.contains('.')
}

impl Recurso for Persona {
    const RUTA: &'static str = "/api/persona";
    const NOMBRE: &'static str = "Persona";

    fn id(&self) -> Option<&RecursoId> {
        self.id.as_ref()
    }

    fn validar(&self) -> AppResult<()> {
        requerido("nombrecompleto", &self.nombrecompleto)?;
        requerido("nrodocumento", &self.nrodocumento)?;
        requerido("correo", &self.correo)?;
        requerido("telefono", &self.telefono)?;

        if !validate_email(&self.correo) {
            return Err(AppError::validation_field("correo", "Email inválido"));
        }
        Ok(())
    }
}
